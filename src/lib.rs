//! # Tincan Persist
//!
//! Reactive values that survive reloads.
//!
//! A [`Persisted<T>`] wraps a fine-grained reactive [`Signal<T>`] and keeps
//! it in sync with a key/value [`Storage`](storage::Storage):
//! - Created synchronously with a default value
//! - Replaced by the stored value once the asynchronous read completes
//! - Written back to the store on setup and after every change
//!
//! ## Signals
//!
//! The reactive primitives the persisted value is built on:
//! - `Signal<T>` - Reactive values that notify dependents when changed
//! - `Effect` - Side effects that run when dependencies change
//!
//! ## Storage
//!
//! Backends are injected, never global:
//! - `MemoryStorage` - In-memory store, handy for tests and native builds
//! - `LocalStorage` - Browser `localStorage` (wasm32 only)
//!
//! Asynchronous storage callbacks are delivered on the reactive runtime's
//! task queue; call [`runtime::flush`] where your app yields to its loop.

pub mod persist;
pub mod runtime;
pub mod signal;
pub mod storage;

// Re-export main types for convenience
pub use persist::{create_persisted, create_persisted_with, PersistOptions, Persisted, WritePolicy};
pub use signal::{create_effect, create_signal, Effect, Signal};
pub use storage::{MemoryStorage, Storage, StorageError};
