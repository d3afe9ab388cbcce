use std::collections::HashMap;
use std::sync::Arc;

use redis::{AsyncCommands, Client as RedisClient};

use crate::cache::keys::{ACTIVE_USERS_KEY, PLUGIN_SETTINGS_KEY};
use crate::config::ClientCredentials;

/// 插件配置读取
pub struct PluginCacheOperations;

impl PluginCacheOperations {
    /// 读取 Pushbullet 应用凭据，未配置时返回 None
    pub async fn load_credentials(
        redis: &Arc<RedisClient>,
    ) -> Result<Option<ClientCredentials>, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        let fields: HashMap<String, String> = conn.hgetall(PLUGIN_SETTINGS_KEY).await?;
        Ok(credentials_from_fields(&fields))
    }

    /// 活跃用户数
    pub async fn active_user_count(redis: &Arc<RedisClient>) -> Result<u64, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;
        conn.zcard(ACTIVE_USERS_KEY).await
    }
}

pub(crate) fn credentials_from_fields(fields: &HashMap<String, String>) -> Option<ClientCredentials> {
    let client_id = fields.get("id").filter(|v| !v.is_empty())?;
    let client_secret = fields.get("secret").filter(|v| !v.is_empty())?;

    Some(ClientCredentials {
        client_id: client_id.clone(),
        client_secret: client_secret.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_fields() {
        let mut fields = HashMap::new();
        assert!(credentials_from_fields(&fields).is_none());

        fields.insert("id".to_string(), "client".to_string());
        assert!(credentials_from_fields(&fields).is_none());

        fields.insert("secret".to_string(), String::new());
        assert!(credentials_from_fields(&fields).is_none());

        fields.insert("secret".to_string(), "s3cret".to_string());
        assert_eq!(
            credentials_from_fields(&fields),
            Some(ClientCredentials {
                client_id: "client".into(),
                client_secret: "s3cret".into(),
            })
        );
    }
}
