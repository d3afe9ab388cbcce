use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{ClientCredentials, Config};
use crate::error::BridgeError;

/// Pushbullet 返回的错误对象
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

/// 响应要么带 error 对象，要么是正常数据
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderReply<T> {
    Failure { error: ProviderErrorBody },
    Success(T),
}

/// 解析 Pushbullet 响应体，error 对象转换为 `BridgeError::Provider`
pub fn parse_reply<T: DeserializeOwned>(body: &str) -> Result<T, BridgeError> {
    match serde_json::from_str::<ProviderReply<T>>(body)? {
        ProviderReply::Success(data) => Ok(data),
        ProviderReply::Failure { error } => Err(BridgeError::provider(error.kind, error.message)),
    }
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: Option<String>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// 推送请求体，以表单提交
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub url: String,
    pub body: String,
}

#[derive(Clone)]
pub struct PushbulletClient {
    http: Client,
    api_url: String,
}

impl PushbulletClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.http_timeout()).build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// 用授权码换取 access token
    pub async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
    ) -> Result<String, BridgeError> {
        let form = TokenRequest {
            grant_type: "authorization_code",
            client_id: &credentials.client_id,
            client_secret: &credentials.client_secret,
            code,
        };

        let body = self
            .http
            .post(self.endpoint("/oauth2/token"))
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        let reply: TokenReply = parse_reply(&body)?;
        reply
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| BridgeError::provider("missing_token", "no access_token in response"))
    }

    /// 发送一条推送，令牌作为 Basic 认证用户名
    pub async fn push(&self, token: &str, payload: &PushPayload) -> Result<(), BridgeError> {
        let body = self
            .http
            .post(self.endpoint("/v2/pushes"))
            .basic_auth(token, None::<&str>)
            .form(payload)
            .send()
            .await?
            .text()
            .await?;

        if body.trim().is_empty() {
            return Ok(());
        }

        parse_reply::<serde::de::IgnoredAny>(&body)?;
        Ok(())
    }
}
