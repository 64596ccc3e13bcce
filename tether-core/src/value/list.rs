//! Lists
//!
//! A [`List`] wraps a `Vec<Value>`. Index and length reads are plain. The
//! seven structural mutators are the interception layer: once the list has
//! an observer, each of them
//!
//! 1. performs the underlying mutation and captures its result,
//! 2. observes the elements it inserted (if any),
//! 3. notifies the dependency node of the list's observer,
//! 4. returns the captured result.
//!
//! Lists without an observer mutate silently. Element writes by index are
//! not intercepted; use [`Runtime::set`](crate::reactive::Runtime::set).

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use super::Value;
use crate::observer::Observer;

/// Elements introduced by one mutation.
type Inserted = SmallVec<[Value; 4]>;

struct ListInner {
    items: RefCell<Vec<Value>>,
    observer: RefCell<Option<Rc<Observer>>>,
}

/// Handle to a shared, mutable list.
#[derive(Clone)]
pub struct List(Rc<ListInner>);

/// Non-owning back-reference held by an [`Observer`].
#[derive(Clone)]
pub(crate) struct WeakList(Weak<ListInner>);

impl WeakList {
    pub(crate) fn upgrade(&self) -> Option<List> {
        self.0.upgrade().map(List)
    }
}

impl List {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(ListInner {
            items: RefCell::new(items),
            observer: RefCell::new(None),
        }))
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.borrow().get(index).cloned()
    }

    /// Snapshot of the current elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    /// Append `items`. Returns the new length.
    pub fn push<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = Value>,
    {
        let inserted: Inserted = items.into_iter().collect();
        self.intercept(|vec| {
            vec.extend(inserted.iter().cloned());
            (vec.len(), inserted)
        })
    }

    /// Prepend `items`, keeping their order. Returns the new length.
    pub fn unshift<I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = Value>,
    {
        let inserted: Inserted = items.into_iter().collect();
        self.intercept(|vec| {
            vec.splice(0..0, inserted.iter().cloned());
            (vec.len(), inserted)
        })
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<Value> {
        self.intercept(|vec| (vec.pop(), Inserted::new()))
    }

    /// Remove and return the first element.
    pub fn shift(&self) -> Option<Value> {
        self.intercept(|vec| {
            let first = if vec.is_empty() {
                None
            } else {
                Some(vec.remove(0))
            };
            (first, Inserted::new())
        })
    }

    /// Remove `delete_count` elements starting at `start` and insert `items`
    /// in their place. Returns the removed elements.
    ///
    /// A negative `start` counts from the end. `start` is clamped to the
    /// list, `delete_count` to the elements after `start`; `None` removes
    /// everything from `start` on.
    pub fn splice<I>(&self, start: isize, delete_count: Option<usize>, items: I) -> Vec<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        let inserted: Inserted = items.into_iter().collect();
        self.intercept(|vec| {
            let len = vec.len();
            let from = if start < 0 {
                len.saturating_sub(start.unsigned_abs())
            } else {
                start.unsigned_abs().min(len)
            };
            let count = delete_count.map_or(len - from, |n| n.min(len - from));
            let removed: Vec<Value> = vec
                .splice(from..from + count, inserted.iter().cloned())
                .collect();
            (removed, inserted)
        })
    }

    /// Sort in place with `compare`. Returns the list itself.
    ///
    /// The comparator sorts a snapshot without the list borrowed, so it may
    /// read the list or tracked data. The sorted snapshot replaces the
    /// contents afterwards; a panicking comparator leaves the list as it was.
    pub fn sort_by<F>(&self, mut compare: F) -> List
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        let mut items = self.to_vec();
        items.sort_by(&mut compare);
        self.intercept(|vec| {
            *vec = items;
            (self.clone(), Inserted::new())
        })
    }

    /// Reverse in place. Returns the list itself.
    pub fn reverse(&self) -> List {
        self.intercept(|vec| {
            vec.reverse();
            (self.clone(), Inserted::new())
        })
    }

    /// The observer attached to this list, if any.
    pub fn observer(&self) -> Option<Rc<Observer>> {
        self.0.observer.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> WeakList {
        WeakList(Rc::downgrade(&self.0))
    }

    pub(crate) fn attach_observer(&self, observer: Rc<Observer>) {
        *self.0.observer.borrow_mut() = Some(observer);
    }

    /// Extend with nulls up to `len` elements, without notifying.
    ///
    /// Returns `false`, leaving the list untouched, when the space cannot be
    /// reserved.
    pub(crate) fn grow_to(&self, len: usize) -> bool {
        let mut items = self.0.items.borrow_mut();
        let missing = len.saturating_sub(items.len());
        if missing == 0 {
            return true;
        }
        if items.try_reserve(missing).is_err() {
            return false;
        }
        items.resize(len, Value::Null);
        true
    }

    fn intercept<R>(&self, mutate: impl FnOnce(&mut Vec<Value>) -> (R, Inserted)) -> R {
        let (result, inserted) = {
            let mut items = self.0.items.borrow_mut();
            mutate(&mut items)
        };

        if let Some(observer) = self.observer() {
            for item in &inserted {
                observer.runtime().observe(item, false);
            }
            observer.dep().notify();
        }

        result
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("len", &self.len())
            .field("observed", &self.observer().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{Runtime, Watcher};
    use crate::value::Object;
    use std::cell::Cell;

    fn numbers(list: &List) -> Vec<f64> {
        list.to_vec().iter().filter_map(Value::as_f64).collect()
    }

    fn list_of(values: &[i32]) -> List {
        values.iter().map(|&n| Value::from(n)).collect()
    }

    #[test]
    fn push_and_pop() {
        let list = list_of(&[1, 2]);
        assert_eq!(list.push([Value::from(3), Value::from(4)]), 4);
        assert_eq!(list.pop().and_then(|v| v.as_f64()), Some(4.0));
        assert_eq!(numbers(&list), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn shift_and_unshift() {
        let list = list_of(&[3]);
        assert_eq!(list.unshift([Value::from(1), Value::from(2)]), 3);
        assert_eq!(numbers(&list), vec![1.0, 2.0, 3.0]);

        assert_eq!(list.shift().and_then(|v| v.as_f64()), Some(1.0));
        assert!(List::new().shift().is_none());
    }

    #[test]
    fn splice_follows_clamping_rules() {
        let list = list_of(&[1, 2, 3, 4, 5]);

        let removed = list.splice(1, Some(2), [Value::from(9)]);
        assert_eq!(removed.len(), 2);
        assert_eq!(numbers(&list), vec![1.0, 9.0, 4.0, 5.0]);

        let removed = list.splice(-1, None, []);
        assert_eq!(removed.len(), 1);
        assert_eq!(numbers(&list), vec![1.0, 9.0, 4.0]);

        let removed = list.splice(10, Some(3), [Value::from(7)]);
        assert!(removed.is_empty());
        assert_eq!(numbers(&list), vec![1.0, 9.0, 4.0, 7.0]);

        let removed = list.splice(-10, Some(1), []);
        assert_eq!(removed.len(), 1);
        assert_eq!(numbers(&list), vec![9.0, 4.0, 7.0]);
    }

    #[test]
    fn sort_and_reverse_return_the_same_list() {
        let list = list_of(&[3, 1, 2]);

        let sorted = list.sort_by(|a, b| {
            a.as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal)
        });
        assert!(sorted.ptr_eq(&list));
        assert_eq!(numbers(&list), vec![1.0, 2.0, 3.0]);

        assert!(list.reverse().ptr_eq(&list));
        assert_eq!(numbers(&list), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn grow_to_pads_with_null() {
        let list = list_of(&[1]);
        assert!(list.grow_to(3));
        assert_eq!(list.len(), 3);
        assert!(list.get(2).unwrap().is_null());

        assert!(list.grow_to(1));
        assert_eq!(list.len(), 3);
    }

    fn observed(values: &[i32]) -> (Runtime, List, Watcher, Rc<Cell<usize>>) {
        let runtime = Runtime::new();
        let list = list_of(values);
        runtime.observe(&Value::from(list.clone()), false);

        let updates = Rc::new(Cell::new(0));
        let counter = updates.clone();
        let watcher = Watcher::new(&runtime, move || counter.set(counter.get() + 1));
        watcher.track(|| list.observer().unwrap().dep().depend());
        (runtime, list, watcher, updates)
    }

    #[test]
    fn every_mutator_notifies_an_observed_list_once() {
        let mutations: Vec<(&str, Box<dyn Fn(&List)>)> = vec![
            ("push", Box::new(|l: &List| {
                l.push([Value::from(9)]);
            })),
            ("pop", Box::new(|l: &List| {
                l.pop();
            })),
            ("shift", Box::new(|l: &List| {
                l.shift();
            })),
            ("unshift", Box::new(|l: &List| {
                l.unshift([Value::from(0)]);
            })),
            ("splice", Box::new(|l: &List| {
                l.splice(1, Some(1), []);
            })),
            ("sort_by", Box::new(|l: &List| {
                l.sort_by(|a, b| {
                    b.as_f64()
                        .partial_cmp(&a.as_f64())
                        .unwrap_or(Ordering::Equal)
                });
            })),
            ("reverse", Box::new(|l: &List| {
                l.reverse();
            })),
        ];

        for (name, mutate) in mutations {
            let (_runtime, list, _watcher, updates) = observed(&[1, 2, 3]);
            mutate(&list);
            assert_eq!(updates.get(), 1, "{name} should notify exactly once");
        }
    }

    #[test]
    fn unshift_and_splice_observe_inserted_objects() {
        let (_runtime, list, _watcher, updates) = observed(&[1]);
        let front = Object::new();
        let middle = Object::new();

        list.unshift([Value::from(front.clone())]);
        list.splice(1, Some(0), [Value::from(middle.clone())]);

        assert!(front.observer().is_some());
        assert!(middle.observer().is_some());
        assert_eq!(updates.get(), 2);
    }

    #[test]
    fn unobserved_list_mutates_silently() {
        let list = list_of(&[1]);
        let element = Object::new();

        list.push([Value::from(element.clone())]);
        assert!(element.observer().is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn sort_comparator_sees_the_unsorted_list() {
        let list = list_of(&[2, 1]);
        let reader = list.clone();

        list.sort_by(|a, b| {
            assert_eq!(reader.len(), 2);
            a.as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal)
        });
        assert_eq!(numbers(&list), vec![1.0, 2.0]);
    }
}
