use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::{AppState, error::BridgeError};

/// 宿主调用钩子时携带的共享密钥头
pub const HOOK_SECRET_HEADER: HeaderName = HeaderName::from_static("x-hook-secret");

/// 只放行携带正确共享密钥的宿主请求
pub async fn require_hook_secret(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(&HOOK_SECRET_HEADER)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    let expected = state.config.hook_secret.as_bytes();
    if expected.is_empty() || !bool::from(presented.ct_eq(expected)) {
        tracing::warn!("[push-bridge] Rejected hook call without a valid secret");
        return BridgeError::NotAuthorized.into_response();
    }

    next.run(req).await
}
