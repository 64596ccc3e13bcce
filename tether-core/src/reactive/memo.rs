//! Memo Implementation
//!
//! A Memo is a cached derived value that re-evaluates only when data it read
//! changes.
//!
//! # How Memos Work
//!
//! 1. On first access, the memo runs its computation with itself as the
//!    active subscriber and caches the result.
//!
//! 2. When accessed again while clean, the cached value is returned.
//!
//! 3. When a dependency notifies, the memo is only marked dirty. Nothing is
//!    recomputed until the next access.
//!
//! 4. A memo read inside another subscriber forwards its own dependencies
//!    to that subscriber, so the outer computation hears about the same
//!    writes the memo does.
//!
//! Memos that are never read stay dirty and cost nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::dep::Dep;
use super::runtime::Runtime;
use super::subscriber::{DepTracker, Subscriber, SubscriberId};

/// Dirty state for a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// The cached value is up-to-date.
    Clean,

    /// The memo needs to recompute on next access.
    Dirty,
}

struct MemoInner<T> {
    id: SubscriberId,
    this: Weak<MemoInner<T>>,
    runtime: Runtime,
    compute: Box<dyn Fn() -> T>,
    value: RefCell<Option<T>>,
    state: Cell<MemoState>,
    deps: DepTracker,
}

impl<T: Clone + 'static> MemoInner<T> {
    fn recompute(&self) {
        let Some(this) = self.this.upgrade() else {
            return;
        };

        let value = {
            let subscriber: Rc<dyn Subscriber> = this;
            let _guard = self.runtime.context().enter(subscriber);
            (self.compute)()
        };
        self.deps.cleanup(self.id);

        *self.value.borrow_mut() = Some(value);
        self.state.set(MemoState::Clean);
    }
}

impl<T: Clone + 'static> Subscriber for MemoInner<T> {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn add_dep(&self, dep: &Dep) -> bool {
        self.deps.add(dep)
    }

    fn update(&self) {
        self.state.set(MemoState::Dirty);
    }
}

/// A lazily computed, cached derived value.
///
/// # Example
///
/// ```rust,ignore
/// let doubled = Memo::new(&runtime, move || {
///     state.get("count").and_then(|v| v.as_f64()).unwrap_or(0.0) * 2.0
/// });
///
/// assert_eq!(doubled.get(), 0.0);
/// state.set("count", 4);
/// assert_eq!(doubled.get(), 8.0);
/// ```
pub struct Memo<T> {
    inner: Rc<MemoInner<T>>,
}

impl<T: Clone + 'static> Memo<T> {
    pub fn new<F>(runtime: &Runtime, compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let inner = Rc::new_cyclic(|this| MemoInner {
            id: SubscriberId::new(),
            this: this.clone(),
            runtime: runtime.clone(),
            compute: Box::new(compute),
            value: RefCell::new(None),
            state: Cell::new(MemoState::Dirty),
            deps: DepTracker::new(),
        });
        Self { inner }
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    /// Get the current value, recomputing if dirty.
    ///
    /// When another subscriber is active, it is registered on every node the
    /// memo depends on.
    pub fn get(&self) -> T {
        let inner = &self.inner;
        if inner.state.get() == MemoState::Dirty || inner.value.borrow().is_none() {
            inner.recompute();
        }

        if inner.runtime.is_tracking() {
            for dep in inner.deps.deps() {
                dep.depend();
            }
        }

        let cached = inner.value.borrow().clone();
        // Empty only if the memo was dropped mid-recompute.
        cached.unwrap_or_else(|| (inner.compute)())
    }

    /// Force a recompute on next access.
    pub fn mark_dirty(&self) {
        self.inner.state.set(MemoState::Dirty);
    }

    pub fn state(&self) -> MemoState {
        self.inner.state.get()
    }

    /// Check if the memo has a cached value.
    pub fn has_value(&self) -> bool {
        self.inner.value.borrow().is_some()
    }

    pub fn dependency_count(&self) -> usize {
        self.inner.deps.len()
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> std::fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("has_value", &self.has_value())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
