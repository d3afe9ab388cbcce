/// 用户令牌哈希，字段为用户ID
pub const TOKENS_KEY: &str = "pushbullet:tokens";

/// 插件配置哈希，字段 id / secret
pub const PLUGIN_SETTINGS_KEY: &str = "settings:pushbullet";
