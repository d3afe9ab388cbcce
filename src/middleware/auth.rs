use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    utils::{Caller, verify_token},
};

/// 解析宿主会话令牌，写入 `Caller` 扩展
///
/// 令牌缺失或无效时写入匿名身份，由具体处理函数决定是否拒绝。
pub async fn identify_caller(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let caller = match token {
        Some(token) => match verify_token(token, &state.config) {
            Ok(claims) => Caller::from_claims(&claims),
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                Caller::anonymous()
            }
        },
        None => Caller::anonymous(),
    };

    req.extensions_mut().insert(caller);
    next.run(req).await
}
