use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::RwLock;

use crate::cache::keys::TOKENS_KEY;

/// 用户令牌存储
///
/// 每个用户一个不透明的 access token，重新授权时覆盖。
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn save(&self, user_id: i64, token: &str) -> Result<(), redis::RedisError>;

    async fn load(&self, user_id: i64) -> Result<Option<String>, redis::RedisError>;
}

/// 基于 Redis 哈希的令牌存储
#[derive(Clone)]
pub struct RedisTokenStore {
    redis: Arc<RedisClient>,
}

impl RedisTokenStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn save(&self, user_id: i64, token: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.hset(TOKENS_KEY, user_id, token).await?;
        Ok(())
    }

    async fn load(&self, user_id: i64) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let token: Option<String> = conn.hget(TOKENS_KEY, user_id).await?;
        Ok(token.filter(|t| !t.is_empty()))
    }
}

/// 内存令牌存储，无 Redis 时使用
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<i64, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, user_id: i64, token: &str) -> Result<(), redis::RedisError> {
        self.tokens.write().await.insert(user_id, token.to_string());
        Ok(())
    }

    async fn load(&self, user_id: i64) -> Result<Option<String>, redis::RedisError> {
        Ok(self.tokens.read().await.get(&user_id).cloned())
    }
}
