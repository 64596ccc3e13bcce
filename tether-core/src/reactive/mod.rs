//! Reactive Primitives
//!
//! This module implements dependency tracking: who is reading right now,
//! which dependency nodes they read, and who to tell when a node changes.
//!
//! # Concepts
//!
//! ## Dependency nodes
//!
//! A [`Dep`] sits behind every trackable slot (one per reactive property,
//! one per observed container). Reading the slot calls [`Dep::depend`];
//! writing it calls [`Dep::notify`].
//!
//! ## Subscribers
//!
//! Anything implementing [`Subscriber`] can be the active reader. The crate
//! ships three: [`Watcher`] (callback on change), [`Effect`] (eager re-run)
//! and [`Memo`] (lazy cached value).
//!
//! ## Runtime
//!
//! The [`Runtime`] carries the [`TrackingContext`] stack and configuration.
//! There is no global "current subscriber"; every tracked structure holds
//! the runtime it was created under.
//!
//! # Implementation Notes
//!
//! Dependency nodes hold subscribers weakly. A dropped subscriber is pruned
//! the next time a node it subscribed to notifies.

mod context;
mod dep;
mod effect;
mod memo;
mod runtime;
mod subscriber;
mod watcher;

pub use context::{ContextGuard, TrackingContext};
pub use dep::{Dep, DepId};
pub use effect::Effect;
pub use memo::{Memo, MemoState};
pub use runtime::{DefaultHost, Host, Runtime};
pub use subscriber::{DepTracker, Subscriber, SubscriberId};
pub use watcher::Watcher;
