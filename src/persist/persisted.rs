use super::options::{PersistOptions, WritePolicy};
use crate::runtime::ReactiveRuntime;
use crate::signal::{Effect, Signal};
use crate::storage::{ReadResult, Storage, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct LoadState {
    loaded: AtomicBool,
    cancelled: AtomicBool,
}

/// A reactive value mirrored into a [`Storage`] under a fixed key.
///
/// Reads and writes go through the wrapped [`Signal`]; every change is
/// written back to the store. Dropping (or [disposing](Self::dispose)) the
/// handle stops the write-back and makes a still-pending load a no-op.
/// Clones of the signal obtained through [`signal`](Self::signal) stay
/// usable afterwards but are no longer persisted.
///
/// The handle keeps the runtime it was created in alive, so it can be
/// returned out of a [`ReactiveRuntime::scope`] and keep persisting.
pub struct Persisted<T> {
    key: Arc<str>,
    signal: Signal<T>,
    state: Arc<LoadState>,
    _effect: Effect,
    _runtime: Arc<ReactiveRuntime>,
}

impl<T> Persisted<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Key this value is stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the initial load attempt has finished.
    pub fn is_loaded(&self) -> bool {
        self.state.loaded.load(Ordering::SeqCst)
    }

    /// Get the current value, tracking the read.
    pub fn get(&self) -> T {
        self.signal.get()
    }

    /// Plain snapshot of the current value.
    pub fn get_untracked(&self) -> T {
        self.signal.get_untracked()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }

    pub fn set(&self, value: T) {
        self.signal.set(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.signal.update(f);
    }

    /// The underlying signal, for passing to code that only knows signals.
    pub fn signal(&self) -> Signal<T> {
        self.signal.clone()
    }

    /// Stop persisting. Equivalent to dropping the handle.
    pub fn dispose(self) {
        drop(self);
    }
}

impl<T> Drop for Persisted<T> {
    fn drop(&mut self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Create a persisted value with default options.
///
/// Returns immediately with `default`. The stored value, if any, replaces it
/// once the read completes; from then on (and already once during setup)
/// every change is written to `storage` under `key`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use tincan_persist::runtime::{self, ReactiveRuntime};
/// use tincan_persist::storage::MemoryStorage;
/// use tincan_persist::create_persisted;
///
/// ReactiveRuntime::scope(|| {
///     let storage = MemoryStorage::with_items([("theme", json!("dark"))]);
///     let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());
///     assert_eq!(theme.get(), "light");
///
///     runtime::flush();
///     assert_eq!(theme.get(), "dark");
///
///     theme.set("solarized".to_string());
///     assert_eq!(storage.peek("theme"), Some(json!("solarized")));
/// });
/// ```
pub fn create_persisted<T>(
    storage: Arc<dyn Storage>,
    key: impl Into<String>,
    default: T,
) -> Persisted<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    create_persisted_with(storage, key, default, PersistOptions::default())
}

/// Create a persisted value with explicit [`PersistOptions`].
pub fn create_persisted_with<T>(
    storage: Arc<dyn Storage>,
    key: impl Into<String>,
    default: T,
    options: PersistOptions,
) -> Persisted<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let runtime = ReactiveRuntime::current();
    let key: Arc<str> = Arc::from(key.into());
    let signal = Signal::new(default);
    let state = Arc::new(LoadState::default());
    let policy = options.write_policy;

    // Issued before the first write so the read sees what was stored before
    storage.get_item(&key, {
        let key = Arc::clone(&key);
        let signal = signal.clone();
        let state = Arc::clone(&state);
        let storage = Arc::clone(&storage);
        Box::new(move |result| apply_load(&*storage, &key, &signal, &state, policy, result))
    });

    let effect = Effect::new({
        let key = Arc::clone(&key);
        let signal = signal.clone();
        let state = Arc::clone(&state);
        move || {
            // Always read so the effect stays subscribed while writes are held
            let snapshot = signal.with(|value| serde_json::to_value(value));
            if policy == WritePolicy::AfterLoad && !state.loaded.load(Ordering::SeqCst) {
                return;
            }
            write_back(&*storage, &key, snapshot);
        }
    });

    Persisted {
        key,
        signal,
        state,
        _effect: effect,
        _runtime: runtime,
    }
}

fn apply_load<T>(
    storage: &dyn Storage,
    key: &str,
    signal: &Signal<T>,
    state: &LoadState,
    policy: WritePolicy,
    result: ReadResult,
) where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    if state.cancelled.load(Ordering::SeqCst) {
        log::debug!("load of `{key}` completed after dispose, ignoring");
        return;
    }

    let stored = match result {
        Err(e) => {
            log::error!("failed to load `{key}`: {e}");
            None
        }
        Ok(None) | Ok(Some(Value::Null)) => {
            log::debug!("nothing stored under `{key}`, keeping current value");
            None
        }
        Ok(Some(raw)) => match serde_json::from_value::<T>(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("failed to load `{key}`: {}", StorageError::Deserialize(e));
                None
            }
        },
    };

    state.loaded.store(true, Ordering::SeqCst);

    match stored {
        // The effect writes the loaded value back
        Some(value) => signal.set(value),
        None if policy == WritePolicy::AfterLoad => {
            write_back(storage, key, serde_json::to_value(signal.get_untracked()));
        }
        None => {}
    }
}

fn write_back(storage: &dyn Storage, key: &str, snapshot: Result<Value, serde_json::Error>) {
    match snapshot {
        Ok(value) => {
            log::trace!("persisting `{key}`");
            storage.set_item(key, value);
        }
        Err(e) => log::warn!("not persisting `{key}`: {}", StorageError::Serialize(e)),
    }
}
