use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub connected: bool,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub fields: HashMap<String, Option<String>>,
}
