//! Reactive Accessors
//!
//! [`define_reactive`] turns one property into a tracked slot. The slot
//! owns a private dependency node and, when its value is itself a container,
//! a cached handle to that container's observer.
//!
//! # Reads
//!
//! With a subscriber active, a read registers the slot's node, the nested
//! observer's node (so shape changes of the value reach the reader), and for
//! lists the node of every element's observer, recursively. Element reads
//! cannot be intercepted the way property reads can; this closes that gap.
//!
//! # Writes
//!
//! A write that leaves the value strictly equal (or NaN over NaN) does
//! nothing. Otherwise the value is stored (or handed to a pre-existing
//! setter), the nested observer is recomputed, and the node notifies.

use std::cell::RefCell;
use std::rc::Rc;

use crate::reactive::{Dep, Runtime};
use crate::value::{Existing, Getter, List, Object, Setter, Value};

use super::Observer;

/// Hook run on accepted writes outside production mode. Receives the
/// incoming value.
pub type WriteHook = Rc<dyn Fn(&Value)>;

/// Options for [`Runtime::define_reactive`].
#[derive(Clone, Default)]
pub struct DefineReactive {
    /// Initial value. When absent, the current value of the property is used.
    pub value: Option<Value>,
    pub on_write: Option<WriteHook>,
    /// Leave nested containers uninstrumented.
    pub shallow: bool,
}

impl DefineReactive {
    pub fn with_value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn on_write<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) + 'static,
    {
        self.on_write = Some(Rc::new(hook));
        self
    }

    pub fn shallow(mut self) -> Self {
        self.shallow = true;
        self
    }
}

/// One tracked property slot.
pub(crate) struct ReactiveSlot {
    dep: Dep,
    getter: Option<Getter>,
    setter: Option<Setter>,
    value: RefCell<Value>,
    child: RefCell<Option<Rc<Observer>>>,
    shallow: bool,
    on_write: Option<WriteHook>,
    runtime: Runtime,
}

impl ReactiveSlot {
    fn current(&self, object: &Object) -> Value {
        match &self.getter {
            Some(getter) => getter(object),
            None => self.value.borrow().clone(),
        }
    }

    pub(crate) fn get(&self, object: &Object) -> Value {
        let value = self.current(object);

        if self.runtime.is_tracking() {
            self.dep.depend();
            let child = self.child.borrow().clone();
            if let Some(child) = child {
                child.dep().depend();
                if let Value::List(list) = &value {
                    depend_items(list);
                }
            }
        }
        value
    }

    pub(crate) fn set(&self, object: &Object, value: Value) {
        let old = self.current(object);
        if value.is_unchanged_by(&old) {
            return;
        }

        if !self.runtime.is_production() {
            if let Some(hook) = &self.on_write {
                hook(&value);
            }
        }

        match (&self.getter, &self.setter) {
            // Getter without setter: read-only.
            (Some(_), None) => return,
            (_, Some(setter)) => setter(object, value.clone()),
            (None, None) => *self.value.borrow_mut() = value.clone(),
        }

        let child = if self.shallow {
            None
        } else {
            self.runtime.observe(&value, false)
        };
        *self.child.borrow_mut() = child;

        self.dep.notify();
    }

    #[cfg(test)]
    pub(crate) fn dep(&self) -> &Dep {
        &self.dep
    }
}

/// Register the active subscriber on the observer of every element.
fn depend_items(list: &List) {
    for item in list.to_vec() {
        if let Some(observer) = item.observer() {
            observer.dep().depend();
        }
        if let Value::List(nested) = &item {
            depend_items(nested);
        }
    }
}

/// Convert `key` of `object` into a tracked slot.
///
/// Pre-existing getters and setters are kept and called through. Returns
/// `false` when the property is non-configurable, or when the key is new and
/// the object does not accept new keys.
pub(crate) fn define_reactive(
    runtime: &Runtime,
    object: &Object,
    key: &str,
    options: DefineReactive,
) -> bool {
    let (getter, setter) = match object.existing(key) {
        Existing::NonConfigurable => return false,
        Existing::Absent | Existing::Data => (None, None),
        Existing::Accessor { get, set } => (get, set),
    };

    let DefineReactive {
        value,
        on_write,
        shallow,
    } = options;

    let value = match value {
        Some(value) => value,
        None if getter.is_none() || setter.is_some() => object.get(key).unwrap_or_default(),
        None => Value::Null,
    };

    let child = if shallow {
        None
    } else {
        runtime.observe(&value, false)
    };

    let slot = ReactiveSlot {
        dep: Dep::new(runtime),
        getter,
        setter,
        value: RefCell::new(value),
        child: RefCell::new(child),
        shallow,
        on_write,
        runtime: runtime.clone(),
    };
    object.install(key, Rc::new(slot))
}
