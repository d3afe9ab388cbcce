use std::env;
use std::time::Duration;

/// 默认站点名，未配置 SITE_TITLE 时使用
pub const DEFAULT_SITE_TITLE: &str = "NodeBB";

/// 兜底语言
pub const FALLBACK_LANGUAGE: &str = "en_GB";

pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.pushbullet.com/authorize";
pub const DEFAULT_API_URL: &str = "https://api.pushbullet.com";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// 论坛对外地址，不带结尾斜杠
    pub base_url: String,
    pub jwt_secret: String,
    /// 通知钩子的共享密钥，宿主调用时放在 `x-hook-secret` 头
    pub hook_secret: String,
    pub site_title: Option<String>,
    pub default_language: Option<String>,
    pub languages_dir: String,
    pub authorize_url: String,
    pub api_url: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置，缺少必填项时返回 `VarError::NotPresent`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, env::VarError> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| optional(key).ok_or(env::VarError::NotPresent);

        Ok(Config {
            redis_url: required("REDIS_URL")?,
            server_host: required("SERVER_HOST")?,
            server_port: optional("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            base_url: required("BASE_URL")?.trim_end_matches('/').to_string(),
            jwt_secret: required("JWT_SECRET")?,
            hook_secret: required("HOOK_SECRET")?,
            site_title: optional("SITE_TITLE"),
            default_language: optional("DEFAULT_LANG"),
            languages_dir: optional("LANGUAGES_DIR").unwrap_or_else(|| "languages".into()),
            authorize_url: optional("PUSHBULLET_AUTHORIZE_URL")
                .unwrap_or_else(|| DEFAULT_AUTHORIZE_URL.into()),
            api_url: optional("PUSHBULLET_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.into()),
            http_timeout_secs: optional("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// 推送标题中使用的站点名
    pub fn site_title(&self) -> &str {
        self.site_title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_SITE_TITLE)
    }

    /// OAuth 回调地址
    pub fn callback_url(&self) -> String {
        format!("{}/pushbullet/auth", self.base_url)
    }
}

/// Pushbullet 应用凭据，启动时从持久化配置读取一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[cfg(test)]
pub(crate) fn test_config(api_url: &str) -> Config {
    Config {
        redis_url: "redis://127.0.0.1/".into(),
        server_host: "127.0.0.1".into(),
        server_port: 3000,
        base_url: "https://forum.example.com".into(),
        jwt_secret: "test-secret".into(),
        hook_secret: "hook-secret".into(),
        site_title: Some("Test Forum".into()),
        default_language: None,
        languages_dir: "languages".into(),
        authorize_url: format!("{}/authorize", api_url),
        api_url: api_url.trim_end_matches('/').to_string(),
        http_timeout_secs: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn site_title_falls_back_to_default() {
        let mut config = test_config("http://localhost");
        assert_eq!(config.site_title(), "Test Forum");

        config.site_title = Some(String::new());
        assert_eq!(config.site_title(), DEFAULT_SITE_TITLE);

        config.site_title = None;
        assert_eq!(config.site_title(), DEFAULT_SITE_TITLE);
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("REDIS_URL", "redis://127.0.0.1/"),
        ("SERVER_HOST", "0.0.0.0"),
        ("BASE_URL", "https://forum.example.com/"),
        ("JWT_SECRET", "jwt"),
        ("HOOK_SECRET", "hook"),
    ];

    #[test]
    fn optional_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(REQUIRED)).unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.base_url, "https://forum.example.com");
        assert_eq!(config.languages_dir, "languages");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.site_title, None);
    }

    #[test]
    fn explicit_port_is_used() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "8080"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn missing_required_value_is_an_error() {
        let pairs: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != "HOOK_SECRET")
            .collect();
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(env::VarError::NotPresent)
        ));
    }

    #[test]
    fn callback_url_is_built_from_base_url() {
        let config = test_config("http://localhost");
        assert_eq!(
            config.callback_url(),
            "https://forum.example.com/pushbullet/auth"
        );
    }
}
