use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// A unit of deferred work queued on the runtime.
pub type Task = Box<dyn FnOnce() + Send>;

type Observer = Arc<dyn Fn() + Send + Sync>;

/// Reactive context for tracking dependencies.
struct ReactiveContext {
    current_observer: Option<usize>,
    // Map from signal ID to set of observer IDs that depend on it
    dependencies: HashMap<usize, HashSet<usize>>,
    // Map from observer ID to set of signal IDs it depends on
    observer_deps: HashMap<usize, HashSet<usize>>,
    // Map from observer ID to the effect function
    observers: HashMap<usize, Observer>,
}

impl ReactiveContext {
    fn new() -> Self {
        Self {
            current_observer: None,
            dependencies: HashMap::new(),
            observer_deps: HashMap::new(),
            observers: HashMap::new(),
        }
    }

    fn unlink(&mut self, observer_id: usize) {
        if let Some(old_deps) = self.observer_deps.remove(&observer_id) {
            for signal_id in old_deps {
                if let Some(deps) = self.dependencies.get_mut(&signal_id) {
                    deps.remove(&observer_id);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.current_observer = None;
        self.dependencies.clear();
        self.observer_deps.clear();
        self.observers.clear();
    }
}

/// Inner runtime state that can be shared.
pub struct RuntimeInner {
    context: Mutex<ReactiveContext>,
}

impl RuntimeInner {
    fn new() -> Self {
        Self {
            context: Mutex::new(ReactiveContext::new()),
        }
    }

    /// Unregister an observer and drop all of its dependency edges.
    pub fn remove_observer(&mut self, observer_id: usize) {
        let mut ctx = self.context.lock().unwrap();
        ctx.observers.remove(&observer_id);
        ctx.unlink(observer_id);
    }

    fn clear(&mut self) {
        let mut ctx = self.context.lock().unwrap();
        ctx.clear();
    }
}

/// Reactive runtime: dependency tracking plus a cooperative task queue.
///
/// Supports both a global runtime (default) and scoped runtimes for
/// isolation. Work that must happen "later", such as storage read
/// callbacks, is queued with [`ReactiveRuntime::queue_task`] and runs when
/// the owner of the loop calls [`ReactiveRuntime::run_pending`].
///
/// # Examples
///
/// Using the default global runtime:
///
/// ```
/// use tincan_persist::Signal;
///
/// let signal = Signal::new(42);
/// assert_eq!(signal.get(), 42);
/// ```
///
/// Using scoped runtimes for isolation:
///
/// ```
/// use tincan_persist::runtime::ReactiveRuntime;
/// use tincan_persist::Signal;
///
/// ReactiveRuntime::scope(|| {
///     let signal = Signal::new(0);
///     assert_eq!(signal.get(), 0);
/// });
/// // Runtime and all its state is dropped here
/// ```
pub struct ReactiveRuntime {
    next_id: AtomicUsize,
    inner: Arc<RwLock<RuntimeInner>>,
    tasks: Mutex<VecDeque<Task>>,
}

// Thread-local stack for scoped runtimes
thread_local! {
    static RUNTIME_STACK: RefCell<Vec<Arc<ReactiveRuntime>>> = RefCell::new(vec![]);
}

impl ReactiveRuntime {
    /// Create a new isolated runtime.
    ///
    /// This creates a completely independent reactive runtime with its own
    /// dependency graph and task queue.
    pub fn new() -> Arc<Self> {
        Arc::new(ReactiveRuntime {
            next_id: AtomicUsize::new(0),
            inner: Arc::new(RwLock::new(RuntimeInner::new())),
            tasks: Mutex::new(VecDeque::new()),
        })
    }

    /// Run a function with a fresh isolated runtime.
    ///
    /// The runtime and all its state is cleaned up when the function
    /// returns. Tasks still queued at that point are discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use tincan_persist::runtime::ReactiveRuntime;
    /// use tincan_persist::Signal;
    ///
    /// ReactiveRuntime::scope(|| {
    ///     let signal = Signal::new(0);
    ///     assert_eq!(signal.get(), 0);
    /// });
    /// ```
    pub fn scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let runtime = Self::new();
        Self::with_runtime(runtime, f)
    }

    /// Get or create the global runtime (fallback).
    pub fn global() -> Arc<Self> {
        use std::sync::OnceLock;
        static RUNTIME: OnceLock<Arc<ReactiveRuntime>> = OnceLock::new();
        Arc::clone(RUNTIME.get_or_init(Self::new))
    }

    /// Get the current reactive runtime (scoped or global fallback).
    pub fn current() -> Arc<Self> {
        RUNTIME_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .cloned()
                .unwrap_or_else(Self::global)
        })
    }

    /// Run a function with a specific runtime as the current context.
    ///
    /// # Examples
    ///
    /// ```
    /// use tincan_persist::runtime::ReactiveRuntime;
    /// use tincan_persist::Signal;
    ///
    /// let runtime = ReactiveRuntime::new();
    /// ReactiveRuntime::with_runtime(runtime, || {
    ///     let signal = Signal::new(42);
    ///     assert_eq!(signal.get(), 42);
    /// });
    /// ```
    pub fn with_runtime<F, R>(runtime: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().push(runtime);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        RUNTIME_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// Clear all observers, dependencies and queued tasks.
    ///
    /// The ID counter keeps counting, so primitives created afterwards never
    /// share an ID with handles that are still alive.
    pub fn clear(&self) {
        {
            let mut inner = self.inner.write().unwrap();
            inner.clear();
        }
        self.tasks.lock().unwrap().clear();
    }

    /// Get a reference to the inner runtime state.
    pub fn inner(&self) -> Arc<RwLock<RuntimeInner>> {
        Arc::clone(&self.inner)
    }

    /// Generate the next unique ID for a reactive primitive.
    pub fn next_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Track a read of a signal by the current observer.
    pub fn track_read(&self, signal_id: usize) {
        let inner = self.inner.read().unwrap();
        let mut ctx = inner.context.lock().unwrap();
        if let Some(current_observer) = ctx.current_observer {
            ctx.dependencies
                .entry(signal_id)
                .or_default()
                .insert(current_observer);
            ctx.observer_deps
                .entry(current_observer)
                .or_default()
                .insert(signal_id);
        }
    }

    /// Re-run every observer that depends on a signal, in registration
    /// order of their IDs.
    pub fn notify_observers(&self, signal_id: usize) {
        let mut observers = {
            let inner = self.inner.read().unwrap();
            let ctx = inner.context.lock().unwrap();
            ctx.dependencies
                .get(&signal_id)
                .map(|obs| obs.iter().copied().collect::<Vec<_>>())
                .unwrap_or_default()
        };
        observers.sort_unstable();

        for observer_id in observers {
            self.run_observer(observer_id);
        }
    }

    fn run_observer(&self, observer_id: usize) {
        let observer = {
            let inner = self.inner.read().unwrap();
            let ctx = inner.context.lock().unwrap();
            ctx.observers.get(&observer_id).cloned()
        };

        // Removed between notification and execution
        if let Some(observer) = observer {
            self.with_observer(observer_id, || observer());
        }
    }

    /// Register (or replace) the function run when an observer's
    /// dependencies change. Old dependency edges are dropped.
    pub fn create_observer<F>(&self, observer_id: usize, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = self.inner.read().unwrap();
        let mut ctx = inner.context.lock().unwrap();
        ctx.unlink(observer_id);
        ctx.observers.insert(observer_id, Arc::new(f));
    }

    /// Run a function with a specific observer as the current context.
    ///
    /// No runtime lock is held while `f` runs, so `f` may freely read and
    /// write signals.
    pub fn with_observer<F, R>(&self, observer_id: usize, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let prev = self.swap_observer(Some(observer_id));
        let result = f();
        self.swap_observer(prev);
        result
    }

    fn swap_observer(&self, observer: Option<usize>) -> Option<usize> {
        let inner = self.inner.read().unwrap();
        let mut ctx = inner.context.lock().unwrap();
        std::mem::replace(&mut ctx.current_observer, observer)
    }

    /// Queue a task to run on the next [`run_pending`](Self::run_pending).
    pub fn queue_task(&self, task: Task) {
        self.tasks.lock().unwrap().push_back(task);
    }

    /// Number of tasks waiting in the queue.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Run queued tasks in FIFO order until the queue is empty, including
    /// tasks queued by the tasks themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.tasks.lock().unwrap().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}
