use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{identify_caller, log_errors, require_hook_secret},
};

pub mod notification;
pub mod pushbullet;

pub fn router(state: AppState) -> Router {
    // 面向用户的授权与设置路由
    let pushbullet_routes = Router::new()
        .route("/pushbullet/setup", get(pushbullet::redirect_setup))
        .route("/pushbullet/auth", get(pushbullet::complete_setup))
        .route(
            "/pushbullet/settings",
            get(pushbullet::load_settings).post(pushbullet::save_settings),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identify_caller,
        ));

    // 宿主通知流程调用的钩子，需要共享密钥
    let hook_routes = Router::new()
        .route(
            "/notifications/push",
            post(notification::push_notification),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_hook_secret,
        ));

    Router::new()
        .merge(pushbullet_routes)
        .merge(hook_routes)
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::{
        Collaborators,
        cache::{MemorySettingsStore, MemoryTokenStore, TokenStore},
        cache::keys::ENABLED_FIELD,
        config::{ClientCredentials, test_config},
        middleware::HOOK_SECRET_HEADER,
        pushbullet::Translator,
        utils::generate_token,
    };

    struct PlainTranslator;

    #[async_trait]
    impl Translator for PlainTranslator {
        async fn translate(&self, text: &str, _language: &str) -> String {
            text.to_string()
        }
    }

    struct Fixture {
        app: Router,
        tokens: Arc<MemoryTokenStore>,
        settings: Arc<MemorySettingsStore>,
        bearer: String,
    }

    fn fixture(api_url: &str, configured: bool) -> Fixture {
        let config = test_config(api_url);
        let tokens = Arc::new(MemoryTokenStore::new());
        let settings = Arc::new(MemorySettingsStore::new());
        let credentials = configured.then(|| ClientCredentials {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
        });

        let bearer = format!(
            "Bearer {}",
            generate_token(21, &config, chrono::Duration::hours(1)).unwrap()
        );

        let state = AppState::build(
            config,
            Collaborators {
                tokens: tokens.clone(),
                settings: settings.clone(),
                translator: Arc::new(PlainTranslator),
                credentials,
                active_users: Some(1000),
            },
        )
        .unwrap();

        Fixture {
            app: router(state),
            tokens,
            settings,
            bearer,
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn setup_redirects_to_authorize_page() {
        let fx = fixture("https://api.example.com", true);

        let response = fx
            .app
            .oneshot(Request::get("/pushbullet/setup").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://api.example.com/authorize?client_id=client-id"));
        assert!(location.contains("response_type=code"));
    }

    #[tokio::test]
    async fn setup_without_credentials_does_not_redirect() {
        let fx = fixture("https://api.example.com", false);

        let response = fx
            .app
            .oneshot(Request::get("/pushbullet/setup").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn auth_callback_links_logged_in_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"access_token":"abc123"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server.uri(), true);
        let response = fx
            .app
            .oneshot(
                Request::get("/pushbullet/auth?code=xyz")
                    .header(header::AUTHORIZATION, &fx.bearer)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["code"], 0);
        assert_eq!(json["resp_data"]["connected"], true);
        assert_eq!(fx.tokens.load(21).await.unwrap().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn auth_callback_requires_code_and_login() {
        let fx = fixture("http://127.0.0.1:9", true);
        let response = fx
            .app
            .clone()
            .oneshot(
                Request::get("/pushbullet/auth")
                    .header(header::AUTHORIZATION, &fx.bearer)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = fx
            .app
            .oneshot(
                Request::get("/pushbullet/auth?code=xyz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(fx.tokens.is_empty().await);
    }

    #[tokio::test]
    async fn auth_callback_reports_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"type":"invalid_grant","message":"bad code"}}"#,
            ))
            .mount(&server)
            .await;

        let fx = fixture(&server.uri(), true);
        let response = fx
            .app
            .oneshot(
                Request::get("/pushbullet/auth?code=bad")
                    .header(header::AUTHORIZATION, &fx.bearer)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["msg"], "invalid_grant");
        assert!(fx.tokens.is_empty().await);
    }

    #[tokio::test]
    async fn anonymous_settings_save_is_rejected() {
        let fx = fixture("http://127.0.0.1:9", true);

        let response = fx
            .app
            .oneshot(
                Request::post("/pushbullet/settings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"pushbullet:enabled":"on"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["msg"], "not-logged-in");
        assert!(fx.settings.is_empty().await);
    }

    #[tokio::test]
    async fn settings_round_trip_for_logged_in_user() {
        let fx = fixture("http://127.0.0.1:9", true);

        let response = fx
            .app
            .clone()
            .oneshot(
                Request::post("/pushbullet/settings")
                    .header(header::AUTHORIZATION, &fx.bearer)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"pushbullet:enabled":"on"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = fx
            .app
            .oneshot(
                Request::get("/pushbullet/settings")
                    .header(header::AUTHORIZATION, &fx.bearer)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["resp_data"][ENABLED_FIELD], "on");
    }

    fn hook_request(secret: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::post("/notifications/push")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(secret) = secret {
            builder = builder.header(HOOK_SECRET_HEADER, secret);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn mount_push_endpoint(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v2/pushes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn push_hook_accepts_and_dispatches_in_background() {
        let server = MockServer::start().await;
        mount_push_endpoint(&server).await;

        let fx = fixture(&server.uri(), true);
        fx.tokens.save(5, "tok").await.unwrap();

        let response = fx
            .app
            .oneshot(hook_request(
                Some("hook-secret"),
                r#"{"uid":5,"text":"<p>New reply</p>","path":"/topic/3"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let mut delivered = Vec::new();
        for _ in 0..50 {
            delivered = server.received_requests().await.unwrap();
            if !delivered.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(delivered.len(), 1);

        let form: HashMap<String, String> = url::form_urlencoded::parse(&delivered[0].body)
            .into_owned()
            .collect();
        assert_eq!(form["body"], "New reply");
        assert_eq!(form["url"], "https://forum.example.com/topic/3");
    }

    #[tokio::test]
    async fn push_hook_rejects_missing_or_wrong_secret() {
        let server = MockServer::start().await;
        mount_push_endpoint(&server).await;

        let fx = fixture(&server.uri(), true);
        fx.tokens.save(5, "tok").await.unwrap();
        let body = r#"{"uid":5,"text":"spam","path":"/topic/3"}"#;

        for secret in [None, Some("wrong"), Some("")] {
            let response = fx
                .app
                .clone()
                .oneshot(hook_request(secret, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn push_hook_rejects_off_site_links() {
        let server = MockServer::start().await;
        mount_push_endpoint(&server).await;

        let fx = fixture(&server.uri(), true);
        fx.tokens.save(5, "tok").await.unwrap();

        for link in ["@evil.example/phish", "https://evil.example/", ""] {
            let body = serde_json::json!({ "uid": 5, "text": "spam", "path": link }).to_string();
            let response = fx
                .app
                .clone()
                .oneshot(hook_request(Some("hook-secret"), &body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
