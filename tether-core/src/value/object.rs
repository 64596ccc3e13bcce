//! Objects
//!
//! An [`Object`] is an insertion-ordered map from names to properties. A
//! property is one of:
//!
//! - a data slot holding a value
//! - a custom accessor pair (getter and/or setter closures)
//! - a reactive slot installed by the tracking engine
//!
//! Every property carries `enumerable` and `configurable` flags. Only
//! enumerable properties are walked when an object is observed, and
//! non-configurable properties are never converted.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::Value;
use crate::observer::{Observer, ReactiveSlot};

/// Custom getter. Receives the object the property lives on.
pub type Getter = Rc<dyn Fn(&Object) -> Value>;

/// Custom setter. Receives the object the property lives on.
pub type Setter = Rc<dyn Fn(&Object, Value)>;

/// What a property holds.
#[derive(Clone)]
pub enum DescriptorKind {
    Data(Value),
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

/// Description of a property for [`Object::define_property`].
#[derive(Clone)]
pub struct PropertyDescriptor {
    pub kind: DescriptorKind,
    pub enumerable: bool,
    pub configurable: bool,
}

impl PropertyDescriptor {
    /// An enumerable, configurable data property.
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            kind: DescriptorKind::Data(value.into()),
            enumerable: true,
            configurable: true,
        }
    }

    /// An enumerable, configurable accessor property.
    pub fn accessor(get: Option<Getter>, set: Option<Setter>) -> Self {
        Self {
            kind: DescriptorKind::Accessor { get, set },
            enumerable: true,
            configurable: true,
        }
    }

    /// A getter-only accessor. Writes to it are ignored.
    pub fn getter<F>(get: F) -> Self
    where
        F: Fn(&Object) -> Value + 'static,
    {
        Self::accessor(Some(Rc::new(get)), None)
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }
}

pub(crate) enum Property {
    Data {
        value: Value,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
        enumerable: bool,
        configurable: bool,
    },
    Reactive {
        slot: Rc<ReactiveSlot>,
        configurable: bool,
    },
}

impl Property {
    fn from_descriptor(descriptor: PropertyDescriptor) -> Self {
        let PropertyDescriptor {
            kind,
            enumerable,
            configurable,
        } = descriptor;
        match kind {
            DescriptorKind::Data(value) => Property::Data {
                value,
                enumerable,
                configurable,
            },
            DescriptorKind::Accessor { get, set } => Property::Accessor {
                get,
                set,
                enumerable,
                configurable,
            },
        }
    }

    fn enumerable(&self) -> bool {
        match self {
            Property::Data { enumerable, .. } | Property::Accessor { enumerable, .. } => *enumerable,
            Property::Reactive { .. } => true,
        }
    }

    fn configurable(&self) -> bool {
        match self {
            Property::Data { configurable, .. }
            | Property::Accessor { configurable, .. }
            | Property::Reactive { configurable, .. } => *configurable,
        }
    }

    fn seal(&mut self) {
        match self {
            Property::Data { configurable, .. }
            | Property::Accessor { configurable, .. }
            | Property::Reactive { configurable, .. } => *configurable = false,
        }
    }
}

/// How a key is currently defined, as seen by the accessor installer.
pub(crate) enum Existing {
    Absent,
    NonConfigurable,
    Data,
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

enum Access {
    Get(Option<Getter>),
    Slot(Rc<ReactiveSlot>),
}

enum Assign {
    Set(Option<Setter>),
    Slot(Rc<ReactiveSlot>),
}

struct ObjectInner {
    props: RefCell<IndexMap<String, Property>>,
    observer: RefCell<Option<Rc<Observer>>>,
    extensible: Cell<bool>,
}

/// Handle to a shared, mutable property map.
#[derive(Clone)]
pub struct Object(Rc<ObjectInner>);

/// Non-owning back-reference held by an [`Observer`].
#[derive(Clone)]
pub(crate) struct WeakObject(Weak<ObjectInner>);

impl WeakObject {
    pub(crate) fn upgrade(&self) -> Option<Object> {
        self.0.upgrade().map(Object)
    }
}

impl Object {
    pub fn new() -> Self {
        Self(Rc::new(ObjectInner {
            props: RefCell::new(IndexMap::new()),
            observer: RefCell::new(None),
            extensible: Cell::new(true),
        }))
    }

    /// Read a property.
    ///
    /// Goes through getters and reactive slots, so the read is recorded when
    /// a subscriber is active. Returns `None` for a missing key.
    pub fn get(&self, key: &str) -> Option<Value> {
        // The borrow must end before any getter runs: getters may read or
        // write this object again.
        let access = {
            let props = self.0.props.borrow();
            match props.get(key)? {
                Property::Data { value, .. } => return Some(value.clone()),
                Property::Accessor { get, .. } => Access::Get(get.clone()),
                Property::Reactive { slot, .. } => Access::Slot(slot.clone()),
            }
        };

        Some(match access {
            Access::Get(Some(get)) => get(self),
            Access::Get(None) => Value::Null,
            Access::Slot(slot) => slot.get(self),
        })
    }

    /// Assign a property.
    ///
    /// Existing keys go through their setter or reactive slot. A getter-only
    /// accessor ignores the write. A new key becomes a plain data property,
    /// unless the object is not extensible, in which case nothing happens.
    /// New keys are never tracked; use [`Runtime::set`](crate::reactive::Runtime::set)
    /// for that.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let assign = {
            let mut props = self.0.props.borrow_mut();
            if !props.contains_key(key) {
                if self.0.extensible.get() {
                    props.insert(
                        key.to_owned(),
                        Property::Data {
                            value,
                            enumerable: true,
                            configurable: true,
                        },
                    );
                }
                return;
            }
            match props.get_mut(key) {
                Some(Property::Data { value: slot, .. }) => {
                    *slot = value;
                    return;
                }
                Some(Property::Accessor { set, .. }) => Assign::Set(set.clone()),
                Some(Property::Reactive { slot, .. }) => Assign::Slot(slot.clone()),
                None => return,
            }
        };

        match assign {
            Assign::Set(Some(set)) => set(self, value),
            Assign::Set(None) => {}
            Assign::Slot(slot) => slot.set(self, value),
        }
    }

    /// Delete an own property. Returns `false` if it is not configurable.
    ///
    /// Deleting a missing key succeeds trivially.
    pub fn remove(&self, key: &str) -> bool {
        let mut props = self.0.props.borrow_mut();
        match props.get(key) {
            None => true,
            Some(property) if !property.configurable() => false,
            Some(_) => {
                props.shift_remove(key);
                true
            }
        }
    }

    /// Define or redefine a property. An existing key keeps its position.
    ///
    /// Fails when the existing property is not configurable, or when the key
    /// is new and the object is not extensible.
    pub fn define_property(&self, key: &str, descriptor: PropertyDescriptor) -> bool {
        let mut props = self.0.props.borrow_mut();
        match props.get(key) {
            Some(existing) if !existing.configurable() => return false,
            None if !self.0.extensible.get() => return false,
            _ => {}
        }
        props.insert(key.to_owned(), Property::from_descriptor(descriptor));
        true
    }

    /// Whether `key` is an own property, enumerable or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.props.borrow().contains_key(key)
    }

    /// Enumerable own keys, in definition order.
    pub fn keys(&self) -> Vec<String> {
        self.0
            .props
            .borrow()
            .iter()
            .filter(|(_, property)| property.enumerable())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of enumerable own keys.
    pub fn len(&self) -> usize {
        self.0
            .props
            .borrow()
            .values()
            .filter(|property| property.enumerable())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` currently holds an installed reactive slot.
    pub fn is_reactive(&self, key: &str) -> bool {
        matches!(self.0.props.borrow().get(key), Some(Property::Reactive { .. }))
    }

    pub fn is_extensible(&self) -> bool {
        self.0.extensible.get()
    }

    /// Refuse new keys from now on. Non-extensible objects are never observed.
    pub fn prevent_extensions(&self) {
        self.0.extensible.set(false);
    }

    /// Refuse new keys and make every existing property non-configurable.
    pub fn seal(&self) {
        self.prevent_extensions();
        for property in self.0.props.borrow_mut().values_mut() {
            property.seal();
        }
    }

    /// The observer attached to this object, if any.
    pub fn observer(&self) -> Option<Rc<Observer>> {
        self.0.observer.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> WeakObject {
        WeakObject(Rc::downgrade(&self.0))
    }

    pub(crate) fn attach_observer(&self, observer: Rc<Observer>) {
        *self.0.observer.borrow_mut() = Some(observer);
    }

    pub(crate) fn existing(&self, key: &str) -> Existing {
        let props = self.0.props.borrow();
        match props.get(key) {
            None => Existing::Absent,
            Some(property) if !property.configurable() => Existing::NonConfigurable,
            Some(Property::Data { .. }) => Existing::Data,
            Some(Property::Accessor { get, set, .. }) => Existing::Accessor {
                get: get.clone(),
                set: set.clone(),
            },
            Some(Property::Reactive { slot, .. }) => {
                let (reader, writer) = (slot.clone(), slot.clone());
                Existing::Accessor {
                    get: Some(Rc::new(move |object: &Object| reader.get(object))),
                    set: Some(Rc::new(move |object: &Object, value| writer.set(object, value))),
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn reactive_slot(&self, key: &str) -> Option<Rc<ReactiveSlot>> {
        match self.0.props.borrow().get(key) {
            Some(Property::Reactive { slot, .. }) => Some(slot.clone()),
            _ => None,
        }
    }

    /// Put `slot` under `key`. Fails for a new key on a non-extensible object.
    pub(crate) fn install(&self, key: &str, slot: Rc<ReactiveSlot>) -> bool {
        let mut props = self.0.props.borrow_mut();
        if !props.contains_key(key) && !self.0.extensible.get() {
            return false;
        }
        props.insert(
            key.to_owned(),
            Property::Reactive {
                slot,
                configurable: true,
            },
        );
        true
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Object::new();
        {
            let mut props = object.0.props.borrow_mut();
            for (key, value) in iter {
                props.insert(
                    key.into(),
                    Property::Data {
                        value: value.into(),
                        enumerable: true,
                        configurable: true,
                    },
                );
            }
        }
        object
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .field("observed", &self.observer().is_some())
            .finish()
    }
}
