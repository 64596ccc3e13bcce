//! Tracking Context
//!
//! The tracking context records which computation is currently reading
//! data. When a tracked slot is read, its dependency node asks the context
//! for the active subscriber and registers it.
//!
//! # Implementation
//!
//! The context is an explicit stack owned by a [`Runtime`](super::Runtime)
//! rather than ambient global state. Entering a computation pushes it and
//! returns a guard; dropping the guard pops it again. Nested evaluations
//! (a memo read from inside an effect) therefore restore the outer
//! subscriber when they finish.
//!
//! An entry may also be empty: [`TrackingContext::enter_untracked`] pushes a
//! frame under which reads record nothing.

use std::cell::RefCell;
use std::rc::Rc;

use super::subscriber::{Subscriber, SubscriberId};

/// Stack of active subscribers.
#[derive(Default)]
pub struct TrackingContext {
    stack: RefCell<Vec<Option<Rc<dyn Subscriber>>>>,
}

/// Guard that pops the context when dropped.
///
/// This keeps the stack balanced even if the computation panics.
#[must_use = "the subscriber is only active while the guard is alive"]
pub struct ContextGuard<'a> {
    context: &'a TrackingContext,
    subscriber_id: Option<SubscriberId>,
}

impl TrackingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `subscriber` the active subscriber until the guard drops.
    pub fn enter(&self, subscriber: Rc<dyn Subscriber>) -> ContextGuard<'_> {
        let subscriber_id = Some(subscriber.id());
        self.stack.borrow_mut().push(Some(subscriber));
        ContextGuard {
            context: self,
            subscriber_id,
        }
    }

    /// Suspend tracking until the guard drops.
    pub fn enter_untracked(&self) -> ContextGuard<'_> {
        self.stack.borrow_mut().push(None);
        ContextGuard {
            context: self,
            subscriber_id: None,
        }
    }

    /// Check if a subscriber is currently active.
    pub fn is_active(&self) -> bool {
        matches!(self.stack.borrow().last(), Some(Some(_)))
    }

    /// Get the active subscriber, if any.
    pub fn current(&self) -> Option<Rc<dyn Subscriber>> {
        self.stack.borrow().last().cloned().flatten()
    }

    /// Number of frames on the stack, tracked or not.
    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        let popped = self.context.stack.borrow_mut().pop();

        // Catch guards dropped out of order.
        if let Some(entry) = popped {
            debug_assert_eq!(
                entry.as_ref().map(|s| s.id()),
                self.subscriber_id,
                "TrackingContext mismatch"
            );
        }
    }
}
