//! Container Observers
//!
//! An [`Observer`] is attached at most once to an object or list. It owns
//! the container-level dependency node, which stands for "this container
//! changed shape": list mutations and keys added or removed through the
//! structural operators notify it.
//!
//! Attaching makes the container traceable:
//!
//! - objects get a reactive slot for every enumerable own key
//! - lists are observed element by element, and their mutators start
//!   notifying the observer's node

use std::cell::Cell;
use std::rc::Rc;

use crate::reactive::{Dep, Runtime};
use crate::value::{List, Object, Value, WeakList, WeakObject};

use super::accessor::{define_reactive, DefineReactive};

enum Target {
    Object(WeakObject),
    List(WeakList),
}

/// The instrumentation attached to one observed container.
pub struct Observer {
    target: Target,
    dep: Dep,
    root_count: Cell<usize>,
    runtime: Runtime,
}

impl Observer {
    fn attach_object(runtime: &Runtime, object: &Object) -> Rc<Observer> {
        let observer = Rc::new(Observer {
            target: Target::Object(object.downgrade()),
            dep: Dep::new(runtime),
            root_count: Cell::new(0),
            runtime: runtime.clone(),
        });
        object.attach_observer(observer.clone());
        tracing::trace!(dep = observer.dep.id().raw(), kind = "object", "observer attached");

        for key in object.keys() {
            define_reactive(runtime, object, &key, DefineReactive::default());
        }
        observer
    }

    fn attach_list(runtime: &Runtime, list: &List) -> Rc<Observer> {
        let observer = Rc::new(Observer {
            target: Target::List(list.downgrade()),
            dep: Dep::new(runtime),
            root_count: Cell::new(0),
            runtime: runtime.clone(),
        });
        list.attach_observer(observer.clone());
        tracing::trace!(dep = observer.dep.id().raw(), kind = "list", "observer attached");

        for item in list.to_vec() {
            runtime.observe(&item, false);
        }
        observer
    }

    /// The container-level dependency node.
    pub fn dep(&self) -> &Dep {
        &self.dep
    }

    /// How many root data scopes treat this container as their state.
    pub fn root_count(&self) -> usize {
        self.root_count.get()
    }

    /// The observed container, while it is still alive.
    pub fn value(&self) -> Option<Value> {
        match &self.target {
            Target::Object(object) => object.upgrade().map(Value::Object),
            Target::List(list) => list.upgrade().map(Value::List),
        }
    }

    /// The runtime this observer was attached under.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("dep", &self.dep)
            .field("root_count", &self.root_count())
            .finish()
    }
}

impl Runtime {
    /// Attach an observer to `value`, or return the one already attached.
    ///
    /// Returns `None` for primitives, for values the host marks as
    /// non-observable, and (when no observer exists yet) for root instances,
    /// non-extensible objects, while observation is toggled off, and during
    /// server rendering. With `as_root`, the returned observer's root count
    /// is incremented.
    pub fn observe(&self, value: &Value, as_root: bool) -> Option<Rc<Observer>> {
        if !value.is_container() || self.host().is_non_observable(value) {
            return None;
        }

        let observer = match value.observer() {
            Some(existing) => existing,
            None if !self.should_observe() || self.is_server_rendering() => return None,
            None => match value {
                Value::Object(object) => {
                    if !object.is_extensible() || self.host().is_root_instance(object) {
                        return None;
                    }
                    Observer::attach_object(self, object)
                }
                Value::List(list) => Observer::attach_list(self, list),
                _ => return None,
            },
        };

        if as_root {
            observer.root_count.set(observer.root_count.get() + 1);
        }
        Some(observer)
    }

    /// Observe `value` and hand it back.
    pub fn observable(&self, value: impl Into<Value>) -> Value {
        let value = value.into();
        self.observe(&value, false);
        value
    }

    /// Install one reactive slot on `object`. Returns whether a slot was
    /// installed; non-configurable keys are skipped.
    pub fn define_reactive(&self, object: &Object, key: &str, options: DefineReactive) -> bool {
        define_reactive(self, object, key, options)
    }
}
