//! Tether Core
//!
//! Fine-grained dependency tracking over plain data. Objects and lists are
//! instrumented so that reading a property inside a computation records a
//! dependency, and writing it re-runs exactly the computations that read it.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `value`: the data model (objects, lists, keys, primitives)
//! - `observer`: instrumentation of containers and properties, plus
//!   structural `set` / `delete`
//! - `reactive`: dependency nodes, the tracking context and the bundled
//!   subscribers (watcher, effect, memo)
//! - `config` / `error`: runtime configuration and diagnostics
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::{Effect, Object, Runtime};
//!
//! let runtime = Runtime::new();
//! let state: Object = [("count", 0)].into_iter().collect();
//! runtime.observable(state.clone());
//!
//! let reader = state.clone();
//! let _effect = Effect::new(&runtime, move || {
//!     println!("count = {:?}", reader.get("count"));
//! });
//!
//! state.set("count", 5);
//! // Effect runs again, prints: "count = Some(5)"
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod reactive;
pub mod value;

pub use config::{Config, NotifyOrder};
pub use error::ReactivityWarning;
pub use observer::{DefineReactive, Observer};
pub use reactive::{Dep, Effect, Host, Memo, Runtime, Subscriber, Watcher};
pub use value::{Key, List, Object, Value};
