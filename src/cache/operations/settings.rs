use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::RwLock;

use crate::cache::keys::{LANGUAGE_FIELD, user_settings_key};

/// 用户设置存储，对应宿主论坛的 `user:{uid}:settings` 哈希
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn save_fields(
        &self,
        user_id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<(), redis::RedisError>;

    async fn load_fields(
        &self,
        user_id: i64,
        fields: &[&str],
    ) -> Result<HashMap<String, Option<String>>, redis::RedisError>;

    /// 用户设置中的语言，未设置时为 None
    async fn language(&self, user_id: i64) -> Result<Option<String>, redis::RedisError> {
        let mut fields = self.load_fields(user_id, &[LANGUAGE_FIELD]).await?;
        Ok(fields
            .remove(LANGUAGE_FIELD)
            .flatten()
            .filter(|lang| !lang.is_empty()))
    }
}

#[derive(Clone)]
pub struct RedisSettingsStore {
    redis: Arc<RedisClient>,
}

impl RedisSettingsStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SettingsStore for RedisSettingsStore {
    async fn save_fields(
        &self,
        user_id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<(), redis::RedisError> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let _: () = conn.hset_multiple(user_settings_key(user_id), &items).await?;
        Ok(())
    }

    async fn load_fields(
        &self,
        user_id: i64,
        fields: &[&str],
    ) -> Result<HashMap<String, Option<String>>, redis::RedisError> {
        if fields.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        // 单个字段时 HMGET 仍返回数组
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(user_settings_key(user_id))
            .arg(fields)
            .query_async(&mut conn)
            .await?;

        Ok(fields
            .iter()
            .map(|f| f.to_string())
            .zip(values)
            .collect())
    }
}

/// 内存设置存储
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RwLock<HashMap<i64, HashMap<String, String>>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_field(&self, user_id: i64, field: &str, value: &str) {
        self.settings
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(field.to_string(), value.to_string());
    }

    pub async fn is_empty(&self) -> bool {
        self.settings.read().await.is_empty()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn save_fields(
        &self,
        user_id: i64,
        fields: &HashMap<String, String>,
    ) -> Result<(), redis::RedisError> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut settings = self.settings.write().await;
        let entry = settings.entry(user_id).or_default();
        for (k, v) in fields {
            entry.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    async fn load_fields(
        &self,
        user_id: i64,
        fields: &[&str],
    ) -> Result<HashMap<String, Option<String>>, redis::RedisError> {
        let settings = self.settings.read().await;
        let user = settings.get(&user_id);
        Ok(fields
            .iter()
            .map(|f| (f.to_string(), user.and_then(|u| u.get(*f).cloned())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn language_reads_settings_field() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.language(3).await.unwrap(), None);

        store.set_field(3, LANGUAGE_FIELD, "de").await;
        assert_eq!(store.language(3).await.unwrap().as_deref(), Some("de"));
    }

    #[tokio::test]
    async fn empty_language_counts_as_unset() {
        let store = MemorySettingsStore::new();
        store.set_field(3, LANGUAGE_FIELD, "").await;
        assert_eq!(store.language(3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_fields_load_as_none() {
        let store = MemorySettingsStore::new();
        let mut fields = HashMap::new();
        fields.insert("pushbullet:enabled".to_string(), "on".to_string());
        store.save_fields(5, &fields).await.unwrap();

        let loaded = store
            .load_fields(5, &["pushbullet:enabled", "other"])
            .await
            .unwrap();
        assert_eq!(loaded["pushbullet:enabled"].as_deref(), Some("on"));
        assert_eq!(loaded["other"], None);
    }
}
