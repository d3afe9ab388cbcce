use std::sync::Arc;

use url::Url;

use super::client::PushbulletClient;
use crate::cache::TokenStore;
use crate::config::{ClientCredentials, Config};
use crate::error::BridgeError;

/// OAuth 授权流程
///
/// 跳转授权页后等待回调，回调里用授权码换取令牌并保存。
/// 换取失败时不写入任何状态，用户仍处于未授权。
pub struct OAuthFlow {
    credentials: Option<ClientCredentials>,
    client: PushbulletClient,
    tokens: Arc<dyn TokenStore>,
    authorize_url: Url,
    callback_url: String,
}

impl OAuthFlow {
    pub fn new(
        credentials: Option<ClientCredentials>,
        client: PushbulletClient,
        tokens: Arc<dyn TokenStore>,
        config: &Config,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            credentials,
            client,
            tokens,
            authorize_url: Url::parse(&config.authorize_url)?,
            callback_url: config.callback_url(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&ClientCredentials, BridgeError> {
        self.credentials.as_ref().ok_or(BridgeError::MissingConfig)
    }

    /// 授权页地址
    pub fn initiate(&self) -> Result<String, BridgeError> {
        let credentials = self.credentials()?;

        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &credentials.client_id)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("response_type", "code");

        Ok(url.into())
    }

    /// 授权码换令牌，令牌落盘后才返回成功
    pub async fn complete_exchange(&self, code: &str, user_id: i64) -> Result<(), BridgeError> {
        let credentials = self.credentials()?;
        if code.is_empty() {
            return Err(BridgeError::InvalidRequest("missing code".into()));
        }

        let token = self.client.exchange_code(credentials, code).await?;
        self.tokens.save(user_id, &token).await?;

        tracing::info!("[push-bridge] uid {} linked a Pushbullet account", user_id);
        Ok(())
    }
}
