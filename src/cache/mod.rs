// 缓存模块
// 包含语言缓存和 Redis 存储操作

pub mod keys;
pub mod language;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use language::LanguageCache;
pub use operations::{
    MemorySettingsStore, MemoryTokenStore, PluginCacheOperations, RedisSettingsStore,
    RedisTokenStore, SettingsStore, TokenStore,
};
