//! Integration tests for Tincan Persist

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tincan_persist::runtime::{self, ReactiveRuntime};
use tincan_persist::storage::{ReadCallback, StorageError};
use tincan_persist::{
    create_effect, create_persisted, create_persisted_with, MemoryStorage, PersistOptions,
    Storage, WritePolicy,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wraps a `MemoryStorage` and records every write in order.
#[derive(Clone, Default)]
struct RecordingStorage {
    inner: MemoryStorage,
    writes: Arc<Mutex<Vec<(String, Value)>>>,
}

impl RecordingStorage {
    fn with_items(items: Vec<(&str, Value)>) -> Self {
        Self {
            inner: MemoryStorage::with_items(items),
            writes: Arc::default(),
        }
    }

    fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().unwrap().clone()
    }

    fn written_values(&self) -> Vec<Value> {
        self.writes().into_iter().map(|(_, v)| v).collect()
    }
}

impl Storage for RecordingStorage {
    fn get_item(&self, key: &str, callback: ReadCallback) {
        self.inner.get_item(key, callback);
    }

    fn set_item(&self, key: &str, value: Value) {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), value.clone()));
        self.inner.set_item(key, value);
    }

    fn remove_item(&self, key: &str) {
        self.inner.remove_item(key);
    }

    fn clear(&self) {
        self.inner.clear();
    }
}

/// Every read fails; writes are dropped.
struct FailingStorage;

impl Storage for FailingStorage {
    fn get_item(&self, _key: &str, callback: ReadCallback) {
        ReactiveRuntime::current().queue_task(Box::new(move || {
            callback(Err(StorageError::Backend("disk on fire".to_string())))
        }));
    }

    fn set_item(&self, _key: &str, _value: Value) {}

    fn remove_item(&self, _key: &str) {}

    fn clear(&self) {}
}

#[test]
fn default_is_returned_before_load() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::default();
        let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());

        assert_eq!(theme.get(), "light");
        assert!(!theme.is_loaded());
    });
}

#[test]
fn empty_store_keeps_default_and_persists_it() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::default();
        let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());
        assert_eq!(theme.get(), "light");

        runtime::flush();

        assert_eq!(theme.get(), "light");
        assert_eq!(storage.inner.peek("theme"), Some(json!("light")));
        assert_eq!(storage.writes(), vec![("theme".to_string(), json!("light"))]);
    });
}

#[test]
fn stored_value_replaces_default() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::with_items(vec![("theme", json!("dark"))]);
        let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());
        assert_eq!(theme.get(), "light");

        runtime::flush();

        assert_eq!(theme.get(), "dark");
        assert_eq!(storage.written_values(), vec![json!("light"), json!("dark")]);
        assert_eq!(storage.inner.peek("theme"), Some(json!("dark")));
    });
}

#[test]
fn every_mutation_is_written_through() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::default();
        let count = create_persisted(Arc::new(storage.clone()), "count", 0i64);
        runtime::flush();

        count.set(1);
        count.set(1);
        count.update(|n| *n += 10);

        assert_eq!(
            storage.written_values(),
            vec![json!(0), json!(1), json!(1), json!(11)]
        );
    });
}

#[test]
fn read_error_is_contained() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let count = create_persisted(Arc::new(FailingStorage), "count", 7u32);
        runtime::flush();

        assert!(count.is_loaded());
        assert_eq!(count.get(), 7);
    });
}

#[test]
fn write_before_load_is_not_clobbered() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::default();
        let draft = create_persisted(Arc::new(storage.clone()), "draft", String::new());

        draft.set("typed early".to_string());
        runtime::flush();

        // Absent read leaves the in-memory value alone
        assert_eq!(draft.get(), "typed early");
        assert_eq!(storage.inner.peek("draft"), Some(json!("typed early")));
    });
}

#[test]
fn disposed_value_stops_writing() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::with_items(vec![("theme", json!("dark"))]);
        let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());
        let signal = theme.signal();

        theme.dispose();
        runtime::flush();

        // Late load was ignored
        assert_eq!(signal.get(), "light");

        signal.set("blue".to_string());
        assert_eq!(storage.written_values(), vec![json!("light")]);
    });
}

#[test]
fn after_load_policy_writes_nothing_until_loaded() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::with_items(vec![("theme", json!("dark"))]);
        let options = PersistOptions::new().write_policy(WritePolicy::AfterLoad);
        let theme = create_persisted_with(
            Arc::new(storage.clone()),
            "theme",
            "light".to_string(),
            options,
        );

        assert!(storage.writes().is_empty());

        runtime::flush();

        assert_eq!(theme.get(), "dark");
        assert_eq!(storage.written_values(), vec![json!("dark")]);
    });
}

#[test]
fn after_load_policy_persists_default_when_store_is_empty() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::default();
        let options = PersistOptions::new().write_policy(WritePolicy::AfterLoad);
        let _theme = create_persisted_with(
            Arc::new(storage.clone()),
            "theme",
            "light".to_string(),
            options,
        );

        runtime::flush();
        assert_eq!(storage.written_values(), vec![json!("light")]);
    });
}

#[test]
fn structured_values_round_trip_through_store() {
    init_logging();

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        volume: u8,
        muted: bool,
    }

    ReactiveRuntime::scope(|| {
        let storage = MemoryStorage::new();
        let defaults = Settings {
            volume: 5,
            muted: false,
        };

        let first = create_persisted(Arc::new(storage.clone()), "settings", defaults.clone());
        runtime::flush();
        first.update(|s| s.muted = true);
        first.dispose();

        let second = create_persisted(Arc::new(storage.clone()), "settings", defaults);
        runtime::flush();
        assert_eq!(
            second.get(),
            Settings {
                volume: 5,
                muted: true
            }
        );
    });
}

#[test]
fn dependent_effects_see_loaded_value() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = MemoryStorage::with_items([("name", json!("Ada"))]);
        let name = create_persisted(Arc::new(storage), "name", "guest".to_string());
        let greetings = Arc::new(Mutex::new(Vec::new()));

        let _effect = create_effect({
            let name = name.signal();
            let greetings = greetings.clone();
            move || greetings.lock().unwrap().push(format!("hello {}", name.get()))
        });

        runtime::flush();

        assert_eq!(
            *greetings.lock().unwrap(),
            vec!["hello guest".to_string(), "hello Ada".to_string()]
        );
    });
}

#[test]
fn keys_are_independent() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = MemoryStorage::with_items([("a", json!(1))]);
        let a = create_persisted(Arc::new(storage.clone()), "a", 0);
        let b = create_persisted(Arc::new(storage.clone()), "b", 0);
        runtime::flush();

        b.set(2);
        assert_eq!(a.get(), 1);
        assert_eq!(storage.keys(), vec!["a", "b"]);
        assert_eq!(storage.peek("b"), Some(json!(2)));
    });
}

#[test]
fn write_before_load_is_overwritten_by_stored_value() {
    init_logging();
    ReactiveRuntime::scope(|| {
        let storage = RecordingStorage::with_items(vec![("theme", json!("dark"))]);
        let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());

        theme.set("blue".to_string());
        runtime::flush();

        assert_eq!(theme.get(), "dark");
        assert_eq!(
            storage.written_values(),
            vec![json!("light"), json!("blue"), json!("dark")]
        );
    });
}

#[test]
fn value_returned_from_scope_keeps_persisting() {
    init_logging();
    let storage = RecordingStorage::default();

    let count = ReactiveRuntime::scope(|| {
        let count = create_persisted(Arc::new(storage.clone()), "count", 0);
        runtime::flush();
        count
    });

    ReactiveRuntime::scope(|| {
        let other = tincan_persist::create_signal(100);
        assert_eq!(other.id(), count.signal().id());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _effect = create_effect({
            let other = other.clone();
            let seen = seen.clone();
            move || seen.lock().unwrap().push(other.get())
        });

        count.set(5);

        assert_eq!(*seen.lock().unwrap(), vec![100]);
        assert_eq!(storage.inner.peek("count"), Some(json!(5)));
        assert_eq!(storage.written_values(), vec![json!(0), json!(5)]);
    });
}
