//! Tracking Runtime
//!
//! The runtime is the explicit context every tracked structure is created
//! under. It owns:
//!
//! - the [`TrackingContext`] (which subscriber is reading right now)
//! - the observation toggle used to suppress instrumentation during bulk
//!   internal updates
//! - the [`Config`]
//! - the [`Host`], which answers questions only the embedding layer can
//!
//! `Runtime` is a cheap handle; clones share the same state. Observers,
//! reactive slots and dependency nodes each keep a clone.
//!
//! # Threading
//!
//! Tracking is strictly single-threaded. A runtime and everything observed
//! under it stay on the thread that created them.

use std::cell::Cell;
use std::rc::Rc;

use super::context::TrackingContext;
use super::subscriber::Subscriber;
use crate::config::Config;
use crate::error::ReactivityWarning;
use crate::value::{Object, Value};

/// Read-only queries the tracking engine asks of its embedding layer.
pub trait Host {
    /// Whether `object` is a root instance of the embedding layer. Root
    /// instances are never observed and refuse structural mutation.
    fn is_root_instance(&self, _object: &Object) -> bool {
        false
    }

    /// Whether `value` is a special node type that must never be observed.
    fn is_non_observable(&self, _value: &Value) -> bool {
        false
    }

    /// Whether the process is rendering on a server.
    fn is_server_rendering(&self) -> bool {
        false
    }
}

/// Host that answers `false` to every query.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHost;

impl Host for DefaultHost {}

struct RuntimeInner {
    context: TrackingContext,
    config: Config,
    host: Box<dyn Host>,
    should_observe: Cell<bool>,
}

/// Handle to a tracking runtime.
#[derive(Clone)]
pub struct Runtime(Rc<RuntimeInner>);

impl Runtime {
    /// Create a runtime with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_host(config, DefaultHost)
    }

    /// Create a runtime that consults `host` for root instances,
    /// non-observable nodes and server rendering.
    pub fn with_host<H>(config: Config, host: H) -> Self
    where
        H: Host + 'static,
    {
        Self(Rc::new(RuntimeInner {
            context: TrackingContext::new(),
            config,
            host: Box::new(host),
            should_observe: Cell::new(true),
        }))
    }

    pub fn context(&self) -> &TrackingContext {
        &self.0.context
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }

    pub fn host(&self) -> &dyn Host {
        self.0.host.as_ref()
    }

    /// Check if a subscriber is currently reading.
    pub fn is_tracking(&self) -> bool {
        self.0.context.is_active()
    }

    /// Get the active subscriber, if any.
    pub fn current_subscriber(&self) -> Option<Rc<dyn Subscriber>> {
        self.0.context.current()
    }

    /// Enable or disable creation of new observers.
    ///
    /// Existing observers keep working; only `observe` calls that would
    /// attach a new observer are affected.
    pub fn toggle_observing(&self, enabled: bool) {
        self.0.should_observe.set(enabled);
    }

    pub fn should_observe(&self) -> bool {
        self.0.should_observe.get()
    }

    /// Run `f` with observation disabled, restoring the previous state.
    pub fn without_observing<R>(&self, f: impl FnOnce() -> R) -> R {
        let previous = self.should_observe();
        self.toggle_observing(false);
        let result = f();
        self.toggle_observing(previous);
        result
    }

    /// Run `f` without recording any dependency.
    pub fn untracked<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.0.context.enter_untracked();
        f()
    }

    pub fn is_server_rendering(&self) -> bool {
        self.0.config.server_rendering || self.0.host.is_server_rendering()
    }

    pub fn is_production(&self) -> bool {
        self.0.config.production
    }

    /// Report a non-fatal misuse. Dropped in production mode.
    pub(crate) fn warn(&self, warning: ReactivityWarning) {
        if self.0.config.production {
            return;
        }
        match &self.0.config.warn_handler {
            Some(handler) => handler(&warning),
            None => tracing::warn!(label = warning.as_label(), "{warning}"),
        }
    }

    /// Whether two handles refer to the same runtime.
    pub fn ptr_eq(&self, other: &Runtime) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.0.config)
            .field("should_observe", &self.should_observe())
            .field("depth", &self.0.context.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn toggle_observing_round_trips() {
        let runtime = Runtime::new();
        assert!(runtime.should_observe());

        runtime.toggle_observing(false);
        assert!(!runtime.should_observe());

        runtime.toggle_observing(true);
        assert!(runtime.should_observe());
    }

    #[test]
    fn without_observing_restores_previous_state() {
        let runtime = Runtime::new();

        let inside = runtime.without_observing(|| runtime.should_observe());
        assert!(!inside);
        assert!(runtime.should_observe());
    }

    #[test]
    fn warnings_reach_the_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let runtime = Runtime::with_config(
            Config::default().with_warn_handler(move |w| sink.borrow_mut().push(w.clone())),
        );

        runtime.warn(ReactivityWarning::AddToRoot { key: "a".into() });
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn warnings_are_dropped_in_production() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let runtime = Runtime::with_config(
            Config::default()
                .with_production(true)
                .with_warn_handler(move |w| sink.borrow_mut().push(w.clone())),
        );

        runtime.warn(ReactivityWarning::AddToRoot { key: "a".into() });
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn server_rendering_comes_from_config_or_host() {
        struct ServerHost;
        impl Host for ServerHost {
            fn is_server_rendering(&self) -> bool {
                true
            }
        }

        assert!(!Runtime::new().is_server_rendering());
        assert!(Runtime::with_config(Config::default().with_server_rendering(true))
            .is_server_rendering());
        assert!(Runtime::with_host(Config::default(), ServerHost).is_server_rendering());
    }
}
