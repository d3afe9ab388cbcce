/// 用户设置哈希键前缀
const USER_SETTINGS_PREFIX: &str = "user:";

/// 有发帖记录的用户集合，用于估算活跃用户数
pub const ACTIVE_USERS_KEY: &str = "users:postcount";

/// 用户设置中的语言字段
pub const LANGUAGE_FIELD: &str = "language";

/// 用户设置中的推送开关字段
pub const ENABLED_FIELD: &str = "pushbullet:enabled";

/// 生成用户设置键
pub fn user_settings_key(user_id: i64) -> String {
    format!("{}{}:settings", USER_SETTINGS_PREFIX, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_key_embeds_uid() {
        assert_eq!(user_settings_key(42), "user:42:settings");
    }
}
