/// 存储操作
/// 令牌、用户设置与插件配置的读写

// 用户令牌
pub mod token;

// 用户设置
pub mod settings;

// 插件配置
pub mod plugin;

pub use plugin::PluginCacheOperations;
pub use settings::{MemorySettingsStore, RedisSettingsStore, SettingsStore};
pub use token::{MemoryTokenStore, RedisTokenStore, TokenStore};
