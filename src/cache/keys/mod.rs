/// 缓存键模块
/// 提供各种存储键生成函数

// 用户相关键
pub mod user_keys;

// 插件相关键
pub mod plugin_keys;

pub use plugin_keys::{PLUGIN_SETTINGS_KEY, TOKENS_KEY};
pub use user_keys::{ACTIVE_USERS_KEY, ENABLED_FIELD, LANGUAGE_FIELD, user_settings_key};
