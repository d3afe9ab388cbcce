use axum::{
    extract::{Json, State},
    http::StatusCode,
};

use crate::{AppState, error::BridgeError, pushbullet::Notification};

/// 宿主通知流程的推送钩子
///
/// 分发在后台任务中进行，这里立即返回。
pub async fn push_notification(
    State(state): State<AppState>,
    Json(notification): Json<Notification>,
) -> Result<StatusCode, BridgeError> {
    if !notification.has_local_path() {
        return Err(BridgeError::InvalidRequest(
            "path must start with '/'".into(),
        ));
    }

    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.dispatch(&notification).await;
    });

    Ok(StatusCode::ACCEPTED)
}
