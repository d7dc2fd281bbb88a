/// When a persisted value starts writing back to its store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Write on setup and after every change, even while the initial load
    /// is still pending. The default value reaches the store first.
    #[default]
    Eager,
    /// Hold writes until the initial load attempt finishes (with a value,
    /// with nothing, or with an error), then write the current value once
    /// and after every change.
    AfterLoad,
}

/// Options for [`create_persisted_with`](super::create_persisted_with).
#[derive(Debug, Clone, Default)]
pub struct PersistOptions {
    pub write_policy: WritePolicy,
}

impl PersistOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }
}
