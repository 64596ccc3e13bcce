//! Watcher
//!
//! The smallest useful subscriber: it runs a callback whenever one of the
//! nodes it read during its last [`track`](Watcher::track) pass notifies.
//! Render loops and user watchers sit on top of this shape.

use std::cell::Cell;
use std::rc::Rc;

use super::dep::Dep;
use super::runtime::Runtime;
use super::subscriber::{DepTracker, Subscriber, SubscriberId};

struct WatcherInner {
    id: SubscriberId,
    runtime: Runtime,
    on_update: Box<dyn Fn()>,
    deps: DepTracker,
    update_count: Cell<usize>,
}

impl Subscriber for WatcherInner {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn add_dep(&self, dep: &Dep) -> bool {
        self.deps.add(dep)
    }

    fn update(&self) {
        self.update_count.set(self.update_count.get() + 1);
        (self.on_update)();
    }
}

/// A subscriber that calls back on every notification.
///
/// # Example
///
/// ```rust,ignore
/// let watcher = Watcher::new(&runtime, || println!("changed"));
/// watcher.track(|| object.get("count"));
///
/// object.set("count", 1); // prints "changed"
/// ```
#[derive(Clone)]
pub struct Watcher(Rc<WatcherInner>);

impl Watcher {
    pub fn new<F>(runtime: &Runtime, on_update: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self(Rc::new(WatcherInner {
            id: SubscriberId::new(),
            runtime: runtime.clone(),
            on_update: Box::new(on_update),
            deps: DepTracker::new(),
            update_count: Cell::new(0),
        }))
    }

    /// Evaluate `f` with this watcher active.
    ///
    /// Nodes read during the previous pass but not during this one stop
    /// notifying the watcher.
    pub fn track<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber: Rc<dyn Subscriber> = self.0.clone();
        let result = {
            let _guard = self.0.runtime.context().enter(subscriber);
            f()
        };
        self.0.deps.cleanup(self.0.id);
        result
    }

    pub fn id(&self) -> SubscriberId {
        self.0.id
    }

    /// How many notifications the watcher has received.
    pub fn update_count(&self) -> usize {
        self.0.update_count.get()
    }

    pub fn dep_count(&self) -> usize {
        self.0.deps.len()
    }

    /// Stop listening to every recorded node.
    pub fn teardown(&self) {
        self.0.deps.teardown(self.0.id);
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.0.id)
            .field("dep_count", &self.dep_count())
            .field("update_count", &self.update_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_records_reads() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let watcher = Watcher::new(&runtime, || {});

        let answer = watcher.track(|| {
            dep.depend();
            dep.depend();
            42
        });

        assert_eq!(answer, 42);
        assert_eq!(watcher.dep_count(), 1);
        assert_eq!(dep.subscriber_count(), 1);
    }

    #[test]
    fn notify_calls_back() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let watcher = Watcher::new(&runtime, move || counter.set(counter.get() + 1));

        watcher.track(|| dep.depend());
        dep.notify();
        dep.notify();

        assert_eq!(hits.get(), 2);
        assert_eq!(watcher.update_count(), 2);
    }

    #[test]
    fn second_pass_drops_unread_nodes() {
        let runtime = Runtime::new();
        let a = Dep::new(&runtime);
        let b = Dep::new(&runtime);
        let watcher = Watcher::new(&runtime, || {});

        watcher.track(|| {
            a.depend();
            b.depend();
        });
        watcher.track(|| a.depend());

        assert!(a.has_subscriber(watcher.id()));
        assert!(!b.has_subscriber(watcher.id()));
    }

    #[test]
    fn teardown_unsubscribes_everywhere() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let watcher = Watcher::new(&runtime, || {});

        watcher.track(|| dep.depend());
        watcher.teardown();

        assert_eq!(dep.subscriber_count(), 0);
        assert_eq!(watcher.dep_count(), 0);
    }

    #[test]
    fn context_is_restored_after_track() {
        let runtime = Runtime::new();
        let watcher = Watcher::new(&runtime, || {});

        watcher.track(|| assert!(runtime.is_tracking()));
        assert!(!runtime.is_tracking());
        assert_eq!(runtime.context().depth(), 0);
    }
}
