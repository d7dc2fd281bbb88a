use crate::runtime::ReactiveRuntime;
use std::sync::{Arc, RwLock, Weak};

/// A reactive signal that holds a value and notifies subscribers when changed.
///
/// A signal belongs to the runtime that was current when it was created, so
/// writes made later from a queued task still reach the right observers.
/// Once that runtime is gone the signal keeps its value but no longer
/// tracks reads or notifies anyone.
pub struct Signal<T> {
    value: Arc<RwLock<T>>,
    id: usize,
    runtime: Weak<ReactiveRuntime>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            id: self.id,
            runtime: Weak::clone(&self.runtime),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(initial: T) -> Self {
        let runtime = ReactiveRuntime::current();
        let id = runtime.next_id();

        Self {
            value: Arc::new(RwLock::new(initial)),
            id,
            runtime: Arc::downgrade(&runtime),
        }
    }

    // IDs are only unique within one runtime, so never fall back to another
    fn track_read(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.track_read(self.id);
        }
    }

    fn notify(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.notify_observers(self.id);
        }
    }

    /// Get the current value of the signal.
    pub fn get(&self) -> T {
        self.track_read();
        self.value.read().unwrap().clone()
    }

    /// Get a plain copy of the current value without registering a
    /// dependency.
    pub fn get_untracked(&self) -> T {
        self.value.read().unwrap().clone()
    }

    /// Set a new value for the signal.
    pub fn set(&self, new_value: T) {
        *self.value.write().unwrap() = new_value;
        self.notify();
    }

    /// Update the value using a function.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.value.write().unwrap();
        f(&mut *value);
        drop(value); // Release the write lock before notifying
        self.notify();
    }

    /// Read the value with a function without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track_read();
        let value = self.value.read().unwrap();
        f(&*value)
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> usize {
        self.id
    }
}

/// Create a new signal.
///
/// # Example
///
/// ```
/// let count = tincan_persist::create_signal(0);
/// count.set(3);
/// assert_eq!(count.get(), 3);
/// ```
pub fn create_signal<T: Clone + Send + Sync + 'static>(initial: T) -> Signal<T> {
    Signal::new(initial)
}
