//! Observation
//!
//! This module makes plain data traceable:
//!
//! - [`Runtime::observe`](crate::reactive::Runtime::observe) attaches an
//!   [`Observer`] to an object or list (at most one, ever).
//! - [`Runtime::define_reactive`](crate::reactive::Runtime::define_reactive)
//!   converts a single property into a tracked slot.
//! - [`Runtime::set`](crate::reactive::Runtime::set) and
//!   [`Runtime::delete`](crate::reactive::Runtime::delete) change the shape
//!   of an observed container and notify it.
//!
//! The list interception layer lives on [`List`](crate::value::List) itself.

mod accessor;
mod container;
mod structural;

pub use accessor::{DefineReactive, WriteHook};
pub use container::Observer;

pub(crate) use accessor::ReactiveSlot;
