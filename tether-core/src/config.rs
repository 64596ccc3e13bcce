//! # Runtime configuration.
//!
//! [`Config`] collects the switches a [`Runtime`](crate::reactive::Runtime) is
//! built with. All fields are public; the `with_*` helpers exist for chaining.
//!
//! ## Environment
//! [`Config::from_env`] reads:
//! - `TETHER_MODE=production` → `production = true`
//! - `TETHER_ENV=server` → `server_rendering = true`

use std::fmt;
use std::rc::Rc;

use crate::error::ReactivityWarning;

/// Callback receiving diagnostics in place of the log.
pub type WarnHandler = Rc<dyn Fn(&ReactivityWarning)>;

/// Order in which a dependency node invokes its subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyOrder {
    /// The order in which subscribers were recorded.
    #[default]
    Insertion,

    /// Ascending subscriber creation id, so outer computations run first.
    CreationOrder,
}

/// Configuration for a tracking runtime.
///
/// ## Field semantics
/// - `production`: suppresses diagnostics and write hooks
/// - `server_rendering`: no observers are created at all
/// - `notify_order`: subscriber invocation order on notify
/// - `warn_handler`: receives diagnostics instead of `tracing`
#[derive(Clone, Default)]
pub struct Config {
    /// Production mode. Diagnostics are dropped and `on_write` hooks never run.
    pub production: bool,

    /// Server-side rendering mode. `observe` never attaches new observers.
    pub server_rendering: bool,

    /// Invocation order used by every dependency node of the runtime.
    pub notify_order: NotifyOrder,

    /// Optional sink for diagnostics.
    pub warn_handler: Option<WarnHandler>,
}

impl Config {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        let production = std::env::var("TETHER_MODE")
            .map(|mode| mode.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        let server_rendering = std::env::var("TETHER_ENV")
            .map(|env| env.eq_ignore_ascii_case("server"))
            .unwrap_or(false);

        Self {
            production,
            server_rendering,
            ..Self::default()
        }
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn with_server_rendering(mut self, server_rendering: bool) -> Self {
        self.server_rendering = server_rendering;
        self
    }

    pub fn with_notify_order(mut self, order: NotifyOrder) -> Self {
        self.notify_order = order;
        self
    }

    pub fn with_warn_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ReactivityWarning) + 'static,
    {
        self.warn_handler = Some(Rc::new(handler));
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("production", &self.production)
            .field("server_rendering", &self.server_rendering)
            .field("notify_order", &self.notify_order)
            .field("warn_handler", &self.warn_handler.is_some())
            .finish()
    }
}
