// Pushbullet 集成
// OAuth 授权、推送分发、通知翻译与用户设置

pub mod client;
pub mod dispatch;
pub mod oauth;
pub mod settings;
pub mod translator;

pub use client::{PushPayload, PushbulletClient};
pub use dispatch::{Notification, PushDispatcher};
pub use oauth::OAuthFlow;
pub use settings::SettingsService;
pub use translator::{LanguagePackTranslator, NotificationTranslator, Translator, strip_tags};
