//! Reactive values backed by persistent storage.
//!
//! A [`Persisted`] value starts at a caller-supplied default, is replaced by
//! whatever the store holds once the asynchronous read completes, and writes
//! every change back under its key until it is dropped.

mod options;
mod persisted;

pub use options::{PersistOptions, WritePolicy};
pub use persisted::{create_persisted, create_persisted_with, Persisted};
