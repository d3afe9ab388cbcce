use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::BridgeError;

/// 宿主论坛签发的会话令牌声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
}

/// 请求方身份，由认证中间件写入请求扩展
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller {
    pub uid: Option<i64>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { uid: None }
    }

    pub fn user(uid: i64) -> Self {
        Self { uid: Some(uid) }
    }

    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            uid: claims.sub.parse().ok(),
        }
    }

    /// 已登录用户的ID，uid 必须为正数
    pub fn require_uid(&self) -> Result<i64, BridgeError> {
        self.uid
            .filter(|uid| *uid > 0)
            .ok_or(BridgeError::NotAuthorized)
    }
}

pub fn generate_token(
    user_id: i64,
    config: &Config,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, config: &Config) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

// 统一响应结构
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const AUTH_FAILED: i32 = 1002;
    pub const NOT_CONFIGURED: i32 = 1006;
    pub const PROVIDER_ERROR: i32 = 1007;
    pub const INTERNAL_ERROR: i32 = 5000;
}
