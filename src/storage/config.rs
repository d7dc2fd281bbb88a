use serde::{Deserialize, Serialize};

/// Namespace for keys in a shared backing store.
///
/// Keys are stored as `"{name}/{key}"` when `store_name` is the default
/// `"keyvaluepairs"` and as `"{name}/{store_name}/{key}"` otherwise, the
/// same layout localforage's localStorage driver uses. Several applications
/// (or several logical stores of one application) can share a single
/// browser origin without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Database name.
    pub name: String,
    /// Store name within the database.
    pub store_name: String,
}

const DEFAULT_NAME: &str = "localforage";
const DEFAULT_STORE_NAME: &str = "keyvaluepairs";

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            store_name: DEFAULT_STORE_NAME.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn new(name: impl Into<String>, store_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_name: store_name.into(),
        }
    }

    /// Prefix prepended to every key.
    pub fn key_prefix(&self) -> String {
        if self.store_name == DEFAULT_STORE_NAME {
            format!("{}/", self.name)
        } else {
            format!("{}/{}/", self.name, self.store_name)
        }
    }

    /// Full backing-store key for `key`.
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix(), key)
    }

    /// Strip this namespace from a backing-store key, if it carries it.
    pub fn strip<'a>(&self, raw: &'a str) -> Option<&'a str> {
        raw.strip_prefix(&self.key_prefix())
    }
}
