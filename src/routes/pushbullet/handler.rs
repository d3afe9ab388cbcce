use std::collections::HashMap;

use axum::{
    extract::{Extension, Json, Query, State},
    response::{IntoResponse, Redirect},
};

use crate::{
    AppState,
    error::BridgeError,
    utils::{Caller, success_to_api_response},
};

use super::model::{AuthQuery, AuthResponse, SettingsResponse};

/// 跳转到 Pushbullet 授权页
pub async fn redirect_setup(State(state): State<AppState>) -> Result<Redirect, BridgeError> {
    let url = state.oauth.initiate()?;
    Ok(Redirect::to(&url))
}

/// 授权回调：用 code 换取令牌并保存
#[axum::debug_handler]
pub async fn complete_setup(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<AuthQuery>,
) -> Result<impl IntoResponse, BridgeError> {
    if !state.oauth.is_configured() {
        return Err(BridgeError::MissingConfig);
    }
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| BridgeError::InvalidRequest("missing code".into()))?;
    let user_id = caller.require_uid()?;

    state.oauth.complete_exchange(&code, user_id).await?;
    Ok(success_to_api_response(AuthResponse { connected: true }))
}

#[axum::debug_handler]
pub async fn save_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(data): Json<HashMap<String, String>>,
) -> Result<impl IntoResponse, BridgeError> {
    state.settings.save(&caller, data).await?;
    Ok(success_to_api_response(()))
}

#[axum::debug_handler]
pub async fn load_settings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, BridgeError> {
    let fields = state.settings.load(&caller).await?;
    Ok(success_to_api_response(SettingsResponse { fields }))
}
