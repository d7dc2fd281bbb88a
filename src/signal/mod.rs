//! Fine-grained reactive primitives.
//!
//! This module provides the building blocks persisted values sit on:
//! - Signals: Reactive state containers
//! - Effects: Side effects that react to changes

mod effect;
mod signal;

pub use effect::{create_effect, Effect};
pub use signal::{create_signal, Signal};
