use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::SettingsStore;
use crate::cache::keys::ENABLED_FIELD;
use crate::error::BridgeError;
use crate::utils::Caller;

/// 用户推送设置的读写，调用方必须已登录
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub async fn save(
        &self,
        caller: &Caller,
        data: HashMap<String, String>,
    ) -> Result<(), BridgeError> {
        let user_id = caller.require_uid()?;
        self.store.save_fields(user_id, &data).await?;
        Ok(())
    }

    pub async fn load(&self, caller: &Caller) -> Result<HashMap<String, Option<String>>, BridgeError> {
        let user_id = caller.require_uid()?;
        Ok(self.store.load_fields(user_id, &[ENABLED_FIELD]).await?)
    }
}
