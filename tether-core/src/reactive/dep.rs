//! Dependency Nodes
//!
//! A [`Dep`] is the subscriber list bound to one trackable slot: a property
//! of an observed object, or an observed container as a whole.
//!
//! # Lifetime
//!
//! Subscribers are held weakly, keyed by id in insertion order. The node
//! itself is a cheap reference-counted handle: the owning slot or observer
//! holds one, and every subscriber that recorded the node holds another, so
//! the node lives exactly as long as its longest-lived holder.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::runtime::Runtime;
use super::subscriber::{Subscriber, SubscriberId};
use crate::config::NotifyOrder;

/// Unique identifier for a dependency node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DepId(u64);

impl DepId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for DepId {
    fn default() -> Self {
        Self::new()
    }
}

struct DepInner {
    id: DepId,
    runtime: Runtime,
    subscribers: RefCell<IndexMap<SubscriberId, Weak<dyn Subscriber>>>,
}

/// A subscriber list bound to one trackable slot.
#[derive(Clone)]
pub struct Dep(Rc<DepInner>);

impl Dep {
    /// Create a node whose reads consult `runtime` for the active subscriber.
    pub fn new(runtime: &Runtime) -> Self {
        Self(Rc::new(DepInner {
            id: DepId::new(),
            runtime: runtime.clone(),
            subscribers: RefCell::new(IndexMap::new()),
        }))
    }

    pub fn id(&self) -> DepId {
        self.0.id
    }

    /// Register the active subscriber, if any.
    ///
    /// The subscriber decides through [`Subscriber::add_dep`] whether it has
    /// already recorded this node.
    pub fn depend(&self) {
        if let Some(subscriber) = self.0.runtime.context().current() {
            if subscriber.add_dep(self) {
                self.add_subscriber(&subscriber);
            }
        }
    }

    /// Record `subscriber`. A subscriber already present keeps its position.
    pub fn add_subscriber(&self, subscriber: &Rc<dyn Subscriber>) {
        self.0
            .subscribers
            .borrow_mut()
            .entry(subscriber.id())
            .or_insert_with(|| Rc::downgrade(subscriber));
    }

    pub fn remove_subscriber(&self, id: SubscriberId) {
        self.0.subscribers.borrow_mut().shift_remove(&id);
    }

    /// Invoke `update()` on every recorded subscriber.
    ///
    /// Iterates over a snapshot, so subscribers may write tracked state (and
    /// thereby touch this node) while updating.
    pub fn notify(&self) {
        let mut subscribers: Vec<Rc<dyn Subscriber>> = {
            let mut recorded = self.0.subscribers.borrow_mut();
            recorded.retain(|_, subscriber| subscriber.strong_count() > 0);
            recorded.values().filter_map(Weak::upgrade).collect()
        };

        if self.0.runtime.config().notify_order == NotifyOrder::CreationOrder {
            subscribers.sort_by_key(|subscriber| subscriber.id());
        }

        tracing::trace!(dep = self.0.id.raw(), subscribers = subscribers.len(), "notify");

        for subscriber in subscribers {
            subscriber.update();
        }
    }

    pub fn has_subscriber(&self, id: SubscriberId) -> bool {
        self.0.subscribers.borrow().contains_key(&id)
    }

    /// Number of recorded subscribers, including ones already dropped.
    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.borrow().len()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.0.id)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::cell::{Cell, RefCell};

    struct Recorder {
        id: SubscriberId,
        accept: bool,
        updates: Cell<usize>,
        log: Rc<RefCell<Vec<SubscriberId>>>,
    }

    impl Recorder {
        fn new(log: &Rc<RefCell<Vec<SubscriberId>>>) -> Rc<Self> {
            Rc::new(Self {
                id: SubscriberId::new(),
                accept: true,
                updates: Cell::new(0),
                log: log.clone(),
            })
        }
    }

    impl Subscriber for Recorder {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn add_dep(&self, _dep: &Dep) -> bool {
            self.accept
        }

        fn update(&self) {
            self.updates.set(self.updates.get() + 1);
            self.log.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn depend_without_active_subscriber_is_noop() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);

        dep.depend();
        assert_eq!(dep.subscriber_count(), 0);
    }

    #[test]
    fn depend_records_active_subscriber_once() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::new(&log);

        {
            let _guard = runtime.context().enter(recorder.clone());
            dep.depend();
            dep.depend();
        }

        assert_eq!(dep.subscriber_count(), 1);
        assert!(dep.has_subscriber(recorder.id));

        dep.notify();
        assert_eq!(recorder.updates.get(), 1);
    }

    #[test]
    fn subscriber_can_decline_registration() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let declining = Rc::new(Recorder {
            id: SubscriberId::new(),
            accept: false,
            updates: Cell::new(0),
            log: Rc::new(RefCell::new(Vec::new())),
        });

        let _guard = runtime.context().enter(declining);
        dep.depend();
        assert_eq!(dep.subscriber_count(), 0);
    }

    #[test]
    fn notify_uses_insertion_order_by_default() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let log = Rc::new(RefCell::new(Vec::new()));
        let older = Recorder::new(&log);
        let newer = Recorder::new(&log);

        let newer_dyn: Rc<dyn Subscriber> = newer.clone();
        let older_dyn: Rc<dyn Subscriber> = older.clone();
        dep.add_subscriber(&newer_dyn);
        dep.add_subscriber(&older_dyn);

        dep.notify();
        assert_eq!(*log.borrow(), vec![newer.id, older.id]);
    }

    #[test]
    fn notify_can_sort_by_creation_order() {
        let runtime =
            Runtime::with_config(Config::default().with_notify_order(NotifyOrder::CreationOrder));
        let dep = Dep::new(&runtime);
        let log = Rc::new(RefCell::new(Vec::new()));
        let older = Recorder::new(&log);
        let newer = Recorder::new(&log);

        let newer_dyn: Rc<dyn Subscriber> = newer.clone();
        let older_dyn: Rc<dyn Subscriber> = older.clone();
        dep.add_subscriber(&newer_dyn);
        dep.add_subscriber(&older_dyn);

        dep.notify();
        assert_eq!(*log.borrow(), vec![older.id, newer.id]);
    }

    #[test]
    fn remove_subscriber_stops_notifications() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::new(&log);

        let as_dyn: Rc<dyn Subscriber> = recorder.clone();
        dep.add_subscriber(&as_dyn);
        dep.remove_subscriber(recorder.id);

        dep.notify();
        assert_eq!(recorder.updates.get(), 0);
    }

    #[test]
    fn dropped_subscribers_are_pruned_on_notify() {
        let runtime = Runtime::new();
        let dep = Dep::new(&runtime);
        let log = Rc::new(RefCell::new(Vec::new()));

        {
            let recorder: Rc<dyn Subscriber> = Recorder::new(&log);
            dep.add_subscriber(&recorder);
        }
        assert_eq!(dep.subscriber_count(), 1);

        dep.notify();
        assert_eq!(dep.subscriber_count(), 0);
        assert!(log.borrow().is_empty());
    }
}
