//! A theme preference that survives "reloads" of the app.

use serde_json::json;
use std::sync::Arc;
use tincan_persist::runtime::{self, ReactiveRuntime};
use tincan_persist::{create_effect, create_persisted, MemoryStorage};

fn main() {
    env_logger::init();
    println!("=== Persisted Theme Example ===\n");

    // Pretend a previous session already chose a theme
    let storage = MemoryStorage::with_items([("theme", json!("dark"))]);

    println!("1. First launch");
    ReactiveRuntime::scope(|| {
        let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());
        println!("   Before load: {}", theme.get());

        let _render = create_effect({
            let theme = theme.signal();
            move || println!("   [Effect] Rendering with theme: {}", theme.get())
        });

        runtime::flush();
        println!("   After load: {}", theme.get());

        println!("\n2. User switches theme");
        theme.set("solarized".to_string());
        println!("   Stored: {:?}", storage.peek("theme"));
    });

    println!("\n3. Second launch");
    ReactiveRuntime::scope(|| {
        let theme = create_persisted(Arc::new(storage.clone()), "theme", "light".to_string());
        runtime::flush();
        println!("   Restored: {}", theme.get());
    });

    println!("\n✓ Example complete!");
}
