use super::{ReadCallback, ReadResult, Storage, StorageConfig, StorageError};
use serde_json::Value;

/// Browser `localStorage` backend.
///
/// Values are stored as JSON text under namespaced keys (see
/// [`StorageConfig`]). The `web_sys::Storage` handle is looked up per call,
/// which keeps this type `Send + Sync`. Read callbacks are delivered on the
/// browser's microtask queue.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    config: StorageConfig,
}

impl LocalStorage {
    /// Create a backend using the default namespace.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn backing() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }

    fn read(&self, key: &str) -> ReadResult {
        let storage = Self::backing()?;
        let raw = storage
            .get_item(&self.config.namespaced(key))
            .map_err(|e| StorageError::Backend(format!("{e:?}")))?;

        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(StorageError::Deserialize),
            None => Ok(None),
        }
    }

    fn write(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let storage = Self::backing()?;
        let json = serde_json::to_string(value).map_err(StorageError::Serialize)?;
        storage
            .set_item(&self.config.namespaced(key), &json)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn owned_keys(&self, storage: &web_sys::Storage) -> Vec<String> {
        let len = storage.length().unwrap_or(0);
        (0..len)
            .filter_map(|i| storage.key(i).ok().flatten())
            .filter(|raw| self.config.strip(raw).is_some())
            .collect()
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str, callback: ReadCallback) {
        let result = self.read(key);
        wasm_bindgen_futures::spawn_local(async move { callback(result) });
    }

    fn set_item(&self, key: &str, value: Value) {
        if let Err(e) = self.write(key, &value) {
            log::warn!("failed to write `{key}` to localStorage: {e}");
        }
    }

    fn remove_item(&self, key: &str) {
        match Self::backing() {
            Ok(storage) => {
                if let Err(e) = storage.remove_item(&self.config.namespaced(key)) {
                    log::warn!("failed to remove `{key}` from localStorage: {e:?}");
                }
            }
            Err(e) => log::warn!("failed to remove `{key}` from localStorage: {e}"),
        }
    }

    fn clear(&self) {
        let storage = match Self::backing() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("failed to clear localStorage: {e}");
                return;
            }
        };

        // Only this namespace; other stores on the origin are left alone
        for raw in self.owned_keys(&storage) {
            if let Err(e) = storage.remove_item(&raw) {
                log::warn!("failed to remove `{raw}` from localStorage: {e:?}");
            }
        }
    }
}
