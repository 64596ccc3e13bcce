//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever data it
//! read changes.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency notifies, the effect re-runs synchronously.
//!
//! 3. Every run records a fresh dependency set. Nodes read last time but not
//!    this time are unsubscribed afterwards.
//!
//! A notification that reaches the effect while it is already running (the
//! effect wrote data it reads) is ignored.
//!
//! # Differences from Memo
//!
//! - Memos return a value; effects do not.
//! - Memos are lazy (compute on access); effects are eager (run when deps change).

use std::cell::Cell;
use std::rc::{Rc, Weak};

use super::dep::Dep;
use super::runtime::Runtime;
use super::subscriber::{DepTracker, Subscriber, SubscriberId};

struct EffectInner {
    id: SubscriberId,
    this: Weak<EffectInner>,
    runtime: Runtime,
    run: Box<dyn Fn()>,
    deps: DepTracker,
    disposed: Cell<bool>,
    running: Cell<bool>,
    run_count: Cell<usize>,
}

impl EffectInner {
    fn execute(&self) {
        if self.disposed.get() || self.running.get() {
            return;
        }
        let Some(this) = self.this.upgrade() else {
            return;
        };

        self.running.set(true);
        {
            let subscriber: Rc<dyn Subscriber> = this;
            let _guard = self.runtime.context().enter(subscriber);
            (self.run)();
        }
        self.running.set(false);

        self.deps.cleanup(self.id);
        self.run_count.set(self.run_count.get() + 1);
    }
}

impl Subscriber for EffectInner {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn add_dep(&self, dep: &Dep) -> bool {
        self.deps.add(dep)
    }

    fn update(&self) {
        self.execute();
    }
}

/// A side-effecting computation that runs when dependencies change.
///
/// # Example
///
/// ```rust,ignore
/// let effect = Effect::new(&runtime, move || {
///     println!("Count is: {:?}", state.get("count"));
/// });
///
/// state.set("count", 5); // Prints: "Count is: Some(5)"
/// ```
#[derive(Clone)]
pub struct Effect(Rc<EffectInner>);

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately to establish initial dependencies.
    pub fn new<F>(runtime: &Runtime, run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let effect = Self::new_lazy(runtime, run);
        effect.execute();
        effect
    }

    /// Create a new effect without running it.
    ///
    /// The effect records no dependencies until [`execute`](Self::execute)
    /// is called.
    pub fn new_lazy<F>(runtime: &Runtime, run: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self(Rc::new_cyclic(|this| EffectInner {
            id: SubscriberId::new(),
            this: this.clone(),
            runtime: runtime.clone(),
            run: Box::new(run),
            deps: DepTracker::new(),
            disposed: Cell::new(false),
            running: Cell::new(false),
            run_count: Cell::new(0),
        }))
    }

    pub fn id(&self) -> SubscriberId {
        self.0.id
    }

    /// Run the effect function, recording what it reads.
    pub fn execute(&self) {
        self.0.execute();
    }

    /// Stop the effect and unsubscribe it from every node.
    pub fn dispose(&self) {
        self.0.disposed.set(true);
        self.0.deps.teardown(self.0.id);
    }

    pub fn is_disposed(&self) -> bool {
        self.0.disposed.get()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        self.0.run_count.get()
    }

    /// Get the number of dependencies.
    pub fn dependency_count(&self) -> usize {
        self.0.deps.len()
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.0.id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
