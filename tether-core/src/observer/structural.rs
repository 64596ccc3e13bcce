//! Structural Mutation
//!
//! Adding a key to an observed object or writing a list element by index
//! cannot go through an existing reactive slot, because there is none.
//! [`Runtime::set`] and [`Runtime::delete`] cover those cases and notify the
//! container-level dependency node instead.
//!
//! Root data (containers observed with `as_root`) and host root instances
//! are protected: their shape is fixed once registered, since instrumentation
//! happens when the container is walked.

use crate::error::ReactivityWarning;
use crate::reactive::Runtime;
use crate::value::{Key, Object, Value};

use super::accessor::{define_reactive, DefineReactive};

/// How far past the end an index write may pad a list with nulls.
const MAX_LIST_GAP: usize = 1 << 20;

/// `key` as a non-negative splice start. Indices beyond `isize::MAX` have no
/// start position and are rejected rather than wrapped.
fn list_start(key: &Key) -> Option<isize> {
    key.as_index().and_then(|index| isize::try_from(index).ok())
}

impl Runtime {
    /// Set `key` on `target`, adding a tracked slot when the key is new.
    ///
    /// - List with a valid index: grows the list if needed, then replaces the
    ///   element through `splice`, which observes it and notifies once.
    ///   Indices the list cannot grow to are rejected with a warning.
    /// - Existing own key: plain assignment through the existing slot.
    /// - New key on an observed object: installs a reactive slot and
    ///   notifies the object's observer node.
    /// - New key on an unobserved object: plain assignment.
    ///
    /// Returns `value`.
    pub fn set(&self, target: &Value, key: impl Into<Key>, value: impl Into<Value>) -> Value {
        let key = key.into();
        let value = value.into();

        match target {
            Value::List(list) => {
                let reachable = list_start(&key).filter(|&start| {
                    start.unsigned_abs().saturating_sub(list.len()) <= MAX_LIST_GAP
                });
                let Some(start) = reachable.filter(|&start| list.grow_to(start.unsigned_abs()))
                else {
                    self.warn(ReactivityWarning::InvalidListKey {
                        key: key.to_string(),
                    });
                    return value;
                };
                list.splice(start, Some(1), [value.clone()]);
                value
            }
            Value::Object(object) => {
                self.set_on_object(object, &key.as_name(), value.clone());
                value
            }
            primitive => {
                self.warn(ReactivityWarning::SetOnPrimitive {
                    target: format!("{primitive:?}"),
                });
                value
            }
        }
    }

    fn set_on_object(&self, object: &Object, key: &str, value: Value) {
        if object.contains_key(key) {
            object.set(key, value);
            return;
        }

        let observer = object.observer();
        let is_root_data = observer
            .as_ref()
            .is_some_and(|observer| observer.root_count() > 0);
        if is_root_data || self.host().is_root_instance(object) {
            self.warn(ReactivityWarning::AddToRoot {
                key: key.to_owned(),
            });
            return;
        }

        let Some(observer) = observer else {
            object.set(key, value);
            return;
        };

        let owner = match observer.value() {
            Some(Value::Object(owner)) => owner,
            _ => object.clone(),
        };
        if define_reactive(self, &owner, key, DefineReactive::with_value(value)) {
            observer.dep().notify();
        }
    }

    /// Remove `key` from `target`, notifying when the container is observed.
    ///
    /// Lists remove the element through `splice`. Missing keys are a no-op.
    pub fn delete(&self, target: &Value, key: impl Into<Key>) {
        let key = key.into();

        match target {
            Value::List(list) => match list_start(&key) {
                // Past the end this removes nothing but still notifies.
                Some(start) => {
                    list.splice(start, Some(1), []);
                }
                None => self.warn(ReactivityWarning::InvalidListKey {
                    key: key.to_string(),
                }),
            },
            Value::Object(object) => self.delete_on_object(object, &key.as_name()),
            primitive => self.warn(ReactivityWarning::DeleteOnPrimitive {
                target: format!("{primitive:?}"),
            }),
        }
    }

    fn delete_on_object(&self, object: &Object, key: &str) {
        let observer = object.observer();
        let is_root_data = observer
            .as_ref()
            .is_some_and(|observer| observer.root_count() > 0);
        if is_root_data || self.host().is_root_instance(object) {
            self.warn(ReactivityWarning::DeleteFromRoot {
                key: key.to_owned(),
            });
            return;
        }

        if !object.contains_key(key) || !object.remove(key) {
            return;
        }
        if let Some(observer) = observer {
            observer.dep().notify();
        }
    }
}
