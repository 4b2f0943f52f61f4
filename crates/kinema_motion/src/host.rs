//! Host capabilities
//!
//! A `Host` bundles the capabilities an `Animator` is built from: a required
//! animation engine and an optional scroll observer. Hosts are either built
//! explicitly or read from the process-wide registration made once at
//! startup:
//!
//! ```rust
//! use kinema_animation::{Scheduler, ScrollTracker};
//! use kinema_motion::{set_global_engine, set_global_scroll_observer, Animator};
//!
//! let scheduler = Scheduler::new();
//! set_global_engine(scheduler.clone());
//! set_global_scroll_observer(ScrollTracker::new(800.0));
//!
//! let animator = Animator::new().unwrap();
//! assert!(animator.has_scroll());
//! ```

use kinema_animation::{AnimationEngine, ScrollObserver};
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL_ENGINE: OnceLock<Arc<dyn AnimationEngine>> = OnceLock::new();
static GLOBAL_SCROLL_OBSERVER: OnceLock<Arc<dyn ScrollObserver>> = OnceLock::new();

/// Register the process-wide animation engine
///
/// Only the first registration takes effect; later calls return `false`.
pub fn set_global_engine(engine: impl AnimationEngine + 'static) -> bool {
    let accepted = GLOBAL_ENGINE.set(Arc::new(engine)).is_ok();
    if !accepted {
        tracing::warn!("set_global_engine() called more than once, keeping the first engine");
    }
    accepted
}

/// Register the process-wide scroll observer
///
/// Only the first registration takes effect; later calls return `false`.
pub fn set_global_scroll_observer(observer: impl ScrollObserver + 'static) -> bool {
    let accepted = GLOBAL_SCROLL_OBSERVER.set(Arc::new(observer)).is_ok();
    if !accepted {
        tracing::warn!("set_global_scroll_observer() called more than once, keeping the first observer");
    }
    accepted
}

/// Check if a global engine has been registered
pub fn is_engine_initialized() -> bool {
    GLOBAL_ENGINE.get().is_some()
}

/// The capabilities available to an `Animator`
#[derive(Clone, Default)]
pub struct Host {
    engine: Option<Arc<dyn AnimationEngine>>,
    scroll: Option<Arc<dyn ScrollObserver>>,
}

impl Host {
    /// An empty host with no capabilities
    pub fn new() -> Self {
        Self::default()
    }

    /// The host described by the global registrations
    pub fn global() -> Self {
        Self {
            engine: GLOBAL_ENGINE.get().cloned(),
            scroll: GLOBAL_SCROLL_OBSERVER.get().cloned(),
        }
    }

    pub fn with_engine(mut self, engine: impl AnimationEngine + 'static) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Use an engine that is already shared
    pub fn with_shared_engine(mut self, engine: Arc<dyn AnimationEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_scroll_observer(mut self, observer: impl ScrollObserver + 'static) -> Self {
        self.scroll = Some(Arc::new(observer));
        self
    }

    pub fn engine(&self) -> Option<&Arc<dyn AnimationEngine>> {
        self.engine.as_ref()
    }

    pub fn scroll_observer(&self) -> Option<&Arc<dyn ScrollObserver>> {
        self.scroll.as_ref()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("engine", &self.engine.is_some())
            .field("scroll", &self.scroll.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_animation::{Scheduler, ScrollTracker};

    #[test]
    fn test_empty_host() {
        let host = Host::new();
        assert!(host.engine().is_none());
        assert!(host.scroll_observer().is_none());
    }

    #[test]
    fn test_explicit_capabilities() {
        let host = Host::new()
            .with_engine(Scheduler::new())
            .with_scroll_observer(ScrollTracker::new(600.0));
        assert!(host.engine().is_some());
        assert!(host.scroll_observer().is_some());
        assert_eq!(format!("{host:?}"), "Host { engine: true, scroll: true }");
    }
}
