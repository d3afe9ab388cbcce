use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// 活跃用户数未知或过少时的最小容量
pub const MIN_CAPACITY: usize = 50;

/// 每 20 个活跃用户缓存一条
pub const USERS_PER_ENTRY: u64 = 20;

/// 语言缓存有效期
pub const LANGUAGE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Clone)]
struct CachedLanguage {
    language: String,
    inserted_at: Instant,
}

/// 用户语言缓存
///
/// LRU 淘汰加固定 TTL。内容仅作参考，未命中时调用方必须回源读取用户设置。
/// 用户修改语言后不会主动失效，只能等待过期或被淘汰。
pub struct LanguageCache {
    store: Mutex<LruCache<i64, CachedLanguage>>,
    ttl: Duration,
}

impl LanguageCache {
    const MIN: NonZeroUsize = match NonZeroUsize::new(MIN_CAPACITY) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// 根据活跃用户数计算容量：floor(n / 20)，不低于 50
    pub fn capacity_for(active_users: Option<u64>) -> NonZeroUsize {
        active_users
            .map(|n| (n / USERS_PER_ENTRY) as usize)
            .and_then(NonZeroUsize::new)
            .filter(|cap| *cap >= Self::MIN)
            .unwrap_or(Self::MIN)
    }

    pub fn new(active_users: Option<u64>) -> Self {
        Self::with_capacity(Self::capacity_for(active_users), LANGUAGE_TTL)
    }

    pub fn with_capacity(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub async fn capacity(&self) -> usize {
        self.store.lock().await.cap().get()
    }

    pub async fn get(&self, user_id: i64) -> Option<String> {
        let mut store = self.store.lock().await;

        // get 会刷新 LRU 顺序
        let expired = match store.get(&user_id) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.language.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            store.pop(&user_id);
        }
        None
    }

    pub async fn set(&self, user_id: i64, language: impl Into<String>) {
        let entry = CachedLanguage {
            language: language.into(),
            inserted_at: Instant::now(),
        };
        self.store.lock().await.put(user_id, entry);
    }
}
