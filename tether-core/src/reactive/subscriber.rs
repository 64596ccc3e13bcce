//! Subscriber contract for the tracking engine.
//!
//! A subscriber is any computation that reads tracked data and wants to hear
//! about later writes: render functions, watchers, effects, memos. The engine
//! only needs three things from it, captured by the [`Subscriber`] trait.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use super::dep::{Dep, DepId};

/// Unique identifier for a subscriber.
///
/// Ids are handed out from a monotonically increasing counter, so comparing
/// two ids tells which subscriber was created first. Dependency nodes use
/// this to order notifications when configured to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// A computation that can be the active subscriber.
pub trait Subscriber {
    /// Stable identity, also the creation-order key.
    fn id(&self) -> SubscriberId;

    /// Called by [`Dep::depend`] while this subscriber is active.
    ///
    /// Returns `true` when the dependency node should record this subscriber.
    /// De-duplication is the subscriber's responsibility.
    fn add_dep(&self, dep: &Dep) -> bool;

    /// Called by [`Dep::notify`] when a recorded dependency changed.
    fn update(&self);
}

/// Dependency bookkeeping shared by the bundled subscribers.
///
/// Keeps two generations of dependencies: the ones recorded by the previous
/// evaluation and the ones being recorded by the current one. After an
/// evaluation, [`cleanup`](Self::cleanup) unsubscribes from every node that
/// was not read again.
#[derive(Default)]
pub struct DepTracker {
    deps: RefCell<Vec<Dep>>,
    dep_ids: RefCell<HashSet<DepId>>,
    new_deps: RefCell<Vec<Dep>>,
    new_dep_ids: RefCell<HashSet<DepId>>,
}

impl DepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dep` for the current evaluation.
    ///
    /// Returns `true` only the first time a node is seen across both
    /// generations, which is exactly when the node must add the subscriber.
    pub fn add(&self, dep: &Dep) -> bool {
        let id = dep.id();
        if !self.new_dep_ids.borrow_mut().insert(id) {
            return false;
        }
        self.new_deps.borrow_mut().push(dep.clone());
        !self.dep_ids.borrow().contains(&id)
    }

    /// Promote the current generation and drop stale subscriptions.
    pub fn cleanup(&self, owner: SubscriberId) {
        let stale: Vec<Dep> = {
            let new_ids = self.new_dep_ids.borrow();
            self.deps
                .borrow()
                .iter()
                .filter(|dep| !new_ids.contains(&dep.id()))
                .cloned()
                .collect()
        };
        for dep in stale {
            dep.remove_subscriber(owner);
        }

        std::mem::swap(&mut *self.deps.borrow_mut(), &mut *self.new_deps.borrow_mut());
        std::mem::swap(
            &mut *self.dep_ids.borrow_mut(),
            &mut *self.new_dep_ids.borrow_mut(),
        );
        self.new_deps.borrow_mut().clear();
        self.new_dep_ids.borrow_mut().clear();
    }

    /// Unsubscribe from every recorded node.
    pub fn teardown(&self, owner: SubscriberId) {
        let deps = std::mem::take(&mut *self.deps.borrow_mut());
        for dep in deps {
            dep.remove_subscriber(owner);
        }
        self.dep_ids.borrow_mut().clear();
    }

    /// Snapshot of the dependencies recorded by the last finished evaluation.
    pub fn deps(&self) -> Vec<Dep> {
        self.deps.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.deps.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Runtime;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn subscriber_ids_increase() {
        let first = SubscriberId::new();
        let second = SubscriberId::new();
        assert!(first < second);
        assert!(first.raw() < second.raw());
    }

    #[test]
    fn tracker_accepts_each_dep_once_per_pass() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let tracker = DepTracker::new();

        assert!(tracker.add(&dep));
        assert!(!tracker.add(&dep));

        tracker.cleanup(SubscriberId::new());
        assert_eq!(tracker.len(), 1);

        // Already recorded by the previous pass: the node keeps its entry.
        assert!(!tracker.add(&dep));
    }

    #[test]
    fn cleanup_drops_deps_not_read_again() {
        let runtime = Runtime::new();
        let a = Dep::new(&runtime);
        let b = Dep::new(&runtime);
        let tracker = DepTracker::new();
        let owner = SubscriberId::new();

        tracker.add(&a);
        tracker.add(&b);
        tracker.cleanup(owner);
        assert_eq!(tracker.len(), 2);

        tracker.add(&a);
        tracker.cleanup(owner);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.deps()[0].id(), a.id());
    }
}
