//! Asynchronous key/value storage backends.
//!
//! A [`Storage`] is injected into every persisted value rather than reached
//! through a global, so tests can substitute an in-memory fake:
//! - [`MemoryStorage`] keeps values in a process-local map
//! - `LocalStorage` (wasm32 only) uses the browser's `localStorage`

mod config;
mod error;
#[cfg(target_arch = "wasm32")]
mod local;
mod memory;

pub use config::StorageConfig;
pub use error::StorageError;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;

use serde_json::Value;

/// Result handed to a read callback: `Ok(None)` when nothing is stored.
pub type ReadResult = Result<Option<Value>, StorageError>;

/// Completion callback for [`Storage::get_item`]. Invoked exactly once.
pub type ReadCallback = Box<dyn FnOnce(ReadResult) + Send>;

/// A key/value store holding JSON values.
///
/// Reads complete asynchronously through a callback; writes are
/// fire-and-forget and report their own failures. Requests are served in
/// the order they are issued, so a read issued before a write sees the
/// store as it was before that write.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str, callback: ReadCallback);

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: Value);

    /// Delete the value stored under `key`, if any.
    fn remove_item(&self, key: &str);

    /// Delete every value in this store.
    fn clear(&self);
}
