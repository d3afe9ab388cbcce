use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use push_bridge::{
    AppState, Collaborators,
    cache::{PluginCacheOperations, RedisSettingsStore, RedisTokenStore},
    config::Config,
    pushbullet::LanguagePackTranslator,
    routes,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置 Redis 客户端
    let redis = Arc::new(
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client"),
    );

    // 插件凭据只在启动时读取一次
    let credentials = match PluginCacheOperations::load_credentials(&redis).await {
        Ok(Some(credentials)) => Some(credentials),
        Ok(None) => {
            tracing::info!("[push-bridge] Please complete setup: client id/secret are missing");
            None
        }
        Err(e) => {
            tracing::error!("[push-bridge] Failed to load plugin settings: {}", e);
            None
        }
    };

    // 语言缓存容量按活跃用户数计算
    let active_users = match PluginCacheOperations::active_user_count(&redis).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!("[push-bridge] Failed to count active users: {}", e);
            None
        }
    };

    let state = AppState::build(
        config.clone(),
        Collaborators {
            tokens: Arc::new(RedisTokenStore::new(redis.clone())),
            settings: Arc::new(RedisSettingsStore::new(redis)),
            translator: Arc::new(LanguagePackTranslator::new(&config.languages_dir)),
            credentials,
            active_users,
        },
    )
    .expect("Failed to build application state");

    let router = routes::router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
