use std::sync::Arc;

use cache::{LanguageCache, SettingsStore, TokenStore};
use config::{ClientCredentials, Config};
use pushbullet::{
    NotificationTranslator, OAuthFlow, PushDispatcher, PushbulletClient, SettingsService,
    Translator,
};

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pushbullet;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub oauth: Arc<OAuthFlow>,
    pub dispatcher: Arc<PushDispatcher>,
    pub settings: Arc<SettingsService>,
}

/// 组装应用状态所需的外部依赖
pub struct Collaborators {
    pub tokens: Arc<dyn TokenStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub translator: Arc<dyn Translator>,
    pub credentials: Option<ClientCredentials>,
    pub active_users: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid authorize url: {0}")]
    AuthorizeUrl(#[from] url::ParseError),
}

impl AppState {
    pub fn build(config: Config, deps: Collaborators) -> Result<Self, SetupError> {
        let client = PushbulletClient::new(&config)?;
        let language_cache = Arc::new(LanguageCache::new(deps.active_users));

        let translator = Arc::new(NotificationTranslator::new(
            language_cache,
            deps.settings.clone(),
            deps.translator,
            config.default_language.clone(),
        ));

        let dispatcher =
            PushDispatcher::new(deps.tokens.clone(), translator, client.clone(), &config);
        let oauth = OAuthFlow::new(deps.credentials, client, deps.tokens, &config)?;

        Ok(AppState {
            oauth: Arc::new(oauth),
            dispatcher: Arc::new(dispatcher),
            settings: Arc::new(SettingsService::new(deps.settings)),
            config,
        })
    }
}
