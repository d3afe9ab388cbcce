use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::client::{PushPayload, PushbulletClient};
use super::translator::NotificationTranslator;
use crate::cache::TokenStore;
use crate::config::Config;
use crate::error::BridgeError;

/// 论坛通知事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub uid: i64,
    pub text: String,
    pub path: String,
}

impl Notification {
    /// 链接只能指向论坛站内路径
    pub fn has_local_path(&self) -> bool {
        self.path.starts_with('/')
    }
}

/// 推送分发
///
/// 尽力而为：任何失败都只记录日志，不会影响触发它的通知流程。
pub struct PushDispatcher {
    tokens: Arc<dyn TokenStore>,
    translator: Arc<NotificationTranslator>,
    client: PushbulletClient,
    site_title: String,
    base_url: String,
}

impl PushDispatcher {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        translator: Arc<NotificationTranslator>,
        client: PushbulletClient,
        config: &Config,
    ) -> Self {
        Self {
            tokens,
            translator,
            client,
            site_title: config.site_title().to_string(),
            base_url: config.base_url.clone(),
        }
    }

    pub async fn dispatch(&self, notification: &Notification) {
        if !notification.has_local_path() {
            tracing::warn!(
                "[push-bridge] Dropping notification for uid {} with non-local path {:?}",
                notification.uid,
                notification.path
            );
            return;
        }

        let token = match self.tokens.load(notification.uid).await {
            Ok(Some(token)) => token,
            // 用户未授权
            Ok(None) => return,
            Err(e) => {
                tracing::error!(
                    "[push-bridge] Failed to load token for uid {}: {}",
                    notification.uid,
                    e
                );
                return;
            }
        };

        let body = self
            .translator
            .localize(notification.uid, &notification.text)
            .await;
        let payload = self.build_payload(notification, body);

        match self.client.push(&token, &payload).await {
            Ok(()) => {
                tracing::debug!("[push-bridge] Pushed notification to uid {}", notification.uid);
            }
            Err(BridgeError::Provider { kind, message }) => {
                tracing::error!("[push-bridge] {} ({})", message, kind);
            }
            Err(e) => {
                tracing::error!("[push-bridge] Push to uid {} failed: {}", notification.uid, e);
            }
        }
    }

    pub fn build_payload(&self, notification: &Notification, body: String) -> PushPayload {
        PushPayload {
            kind: "link".into(),
            title: format!("New Notification from {}", self.site_title),
            url: format!("{}{}", self.base_url, notification.path),
            body,
        }
    }
}
