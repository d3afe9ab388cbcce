use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::utils::error_codes;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// 调用方没有登录身份
    #[error("not-logged-in")]
    NotAuthorized,

    /// 尚未配置 client id / secret
    #[error("pushbullet client credentials are not configured")]
    MissingConfig,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Pushbullet 返回的 error 对象
    #[error("{kind}")]
    Provider { kind: String, message: String },

    #[error("malformed provider response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BridgeError {
    pub fn provider(kind: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Provider {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    msg: String,
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            BridgeError::NotAuthorized => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            BridgeError::MissingConfig => {
                (StatusCode::SERVICE_UNAVAILABLE, error_codes::NOT_CONFIGURED)
            }
            BridgeError::Transport(_) | BridgeError::Parse(_) => {
                (StatusCode::BAD_GATEWAY, error_codes::PROVIDER_ERROR)
            }
            BridgeError::Provider { .. } => (StatusCode::BAD_GATEWAY, error_codes::PROVIDER_ERROR),
            BridgeError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
            BridgeError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR)
            }
        };

        let body = Json(ErrorResponse {
            code,
            msg: self.to_string(),
        });

        (status, body).into_response()
    }
}
