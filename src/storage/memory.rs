use super::{ReadCallback, Storage};
use crate::runtime::ReactiveRuntime;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory [`Storage`] backend.
///
/// Clones share the same map, so a test can keep one handle for inspection
/// and inject another. Read callbacks are queued on the current reactive
/// runtime and fire on its next flush, carrying the value as it was when
/// the read was issued.
///
/// # Examples
///
/// ```
/// use tincan_persist::runtime::{self, ReactiveRuntime};
/// use tincan_persist::storage::{MemoryStorage, ReadResult, Storage};
/// use serde_json::json;
///
/// ReactiveRuntime::scope(|| {
///     let storage = MemoryStorage::new();
///     storage.set_item("volume", json!(7));
///
///     storage.get_item("volume", Box::new(|result: ReadResult| {
///         assert_eq!(result.unwrap(), Some(json!(7)));
///     }));
///     runtime::flush();
/// });
/// ```
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `items`.
    pub fn with_items<K, I>(items: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let items = items.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    /// Synchronously look at the value stored under `key`.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.items.lock().unwrap().get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.items.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str, callback: ReadCallback) {
        let value = self.peek(key);
        ReactiveRuntime::current().queue_task(Box::new(move || callback(Ok(value))));
    }

    fn set_item(&self, key: &str, value: Value) {
        self.items.lock().unwrap().insert(key.to_string(), value);
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap().remove(key);
    }

    fn clear(&self) {
        self.items.lock().unwrap().clear();
    }
}
