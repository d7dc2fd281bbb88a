//! Runtime support for reactive primitives.
//!
//! This module provides the infrastructure for dependency tracking,
//! reactive graph management, execution contexts and the cooperative task
//! queue that asynchronous storage callbacks are delivered on.

mod context;

pub use context::{ReactiveRuntime, RuntimeInner, Task};

/// Drain the current runtime's task queue.
///
/// Call this wherever the application yields back to its event loop.
/// Returns the number of tasks that ran.
pub fn flush() -> usize {
    ReactiveRuntime::current().run_pending()
}
