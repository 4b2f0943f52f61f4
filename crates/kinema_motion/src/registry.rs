//! Named timeline registry
//!
//! Maps caller-chosen names to timeline handles so a sequence can be built
//! in one place and driven from another without threading the handle
//! through. The registry only remembers handles: it never kills a timeline
//! on its own, and overwriting a name hands the displaced handle back to the
//! caller instead of stopping it.
//!
//! Control operations on unknown names are silent no-ops.

use crate::TimelineHandle;
use kinema_animation::AnimationEngine;
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name to timeline handle table, bound to the engine that owns the timelines
pub struct TimelineRegistry {
    engine: Arc<dyn AnimationEngine>,
    entries: RwLock<FxHashMap<String, TimelineHandle>>,
}

impl TimelineRegistry {
    pub fn new(engine: Arc<dyn AnimationEngine>) -> Self {
        Self {
            engine,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Store `handle` under `name`, returning the handle it replaces
    pub fn insert(&self, name: &str, handle: TimelineHandle) -> Option<TimelineHandle> {
        let displaced = self.write().insert(name.to_string(), handle);
        if displaced.is_some() {
            tracing::debug!(name, "timeline name reused, previous handle displaced");
        }
        displaced
    }

    /// Look up a handle without side effects
    pub fn get(&self, name: &str) -> Option<TimelineHandle> {
        self.read().get(name).copied()
    }

    /// Forget a name; the timeline itself keeps running
    pub fn remove(&self, name: &str) -> Option<TimelineHandle> {
        self.write().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Get all registered names
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Forget every name
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Play the named timeline forward; returns whether the name was known
    pub fn play(&self, name: &str) -> bool {
        self.control(name, "play", |engine, handle| engine.play(handle))
    }

    pub fn pause(&self, name: &str) -> bool {
        self.control(name, "pause", |engine, handle| engine.pause(handle))
    }

    pub fn resume(&self, name: &str) -> bool {
        self.control(name, "resume", |engine, handle| engine.resume(handle))
    }

    pub fn reverse(&self, name: &str) -> bool {
        self.control(name, "reverse", |engine, handle| engine.reverse(handle))
    }

    pub fn restart(&self, name: &str) -> bool {
        self.control(name, "restart", |engine, handle| engine.restart(handle))
    }

    fn control<F>(&self, name: &str, operation: &str, f: F) -> bool
    where
        F: FnOnce(&dyn AnimationEngine, TimelineHandle),
    {
        match self.get(name) {
            Some(handle) => {
                f(self.engine.as_ref(), handle);
                true
            }
            None => {
                tracing::trace!(name, operation, "no timeline registered under this name");
                false
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, FxHashMap<String, TimelineHandle>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FxHashMap<String, TimelineHandle>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_animation::{PlayState, Scheduler, TimelineConfig, TweenConfig};
    use kinema_core::{Element, Property, PropertyMap, Targets};

    fn setup() -> (Scheduler, TimelineRegistry) {
        let scheduler = Scheduler::new();
        let registry = TimelineRegistry::new(Arc::new(scheduler.clone()));
        (scheduler, registry)
    }

    #[test]
    fn test_insert_and_get() {
        let (scheduler, registry) = setup();
        let handle = scheduler.create_sequence(TimelineConfig::new().persist(true));

        assert_eq!(registry.insert("intro", handle), None);
        assert_eq!(registry.get("intro"), Some(handle));
        assert!(registry.contains("intro"));
        assert_eq!(registry.names(), vec!["intro".to_string()]);
        assert_eq!(registry.get("outro"), None);
    }

    #[test]
    fn test_overwrite_returns_displaced_handle() {
        let (scheduler, registry) = setup();
        let first = scheduler.create_sequence(TimelineConfig::new().persist(true));
        let second = scheduler.create_sequence(TimelineConfig::new().persist(true));

        registry.insert("intro", first);
        assert_eq!(registry.insert("intro", second), Some(first));
        assert_eq!(registry.get("intro"), Some(second));
        assert_eq!(registry.len(), 1);

        // the displaced timeline is left alone
        assert!(scheduler.state(first).is_some());
    }

    #[test]
    fn test_controls_drive_engine() {
        let (scheduler, registry) = setup();
        let el = Element::new();
        let handle = scheduler.create_sequence(TimelineConfig::new().persist(true).paused(true));
        scheduler.add_step(
            handle,
            &Targets::from(&el),
            &PropertyMap::new().with(Property::X, 10.0),
            TweenConfig::new(1.0),
        );
        registry.insert("slide", handle);

        assert!(registry.play("slide"));
        assert_eq!(scheduler.state(handle), Some(PlayState::Playing));
        assert!(registry.pause("slide"));
        assert_eq!(scheduler.state(handle), Some(PlayState::Paused));
        assert!(registry.resume("slide"));
        scheduler.advance(1.0);
        assert_eq!(el.get(&Property::X), 10.0);

        assert!(registry.reverse("slide"));
        scheduler.advance(1.0);
        assert_eq!(el.get(&Property::X), 0.0);

        assert!(registry.restart("slide"));
        assert_eq!(scheduler.state(handle), Some(PlayState::Playing));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let (_, registry) = setup();
        assert!(!registry.play("missing"));
        assert!(!registry.pause("missing"));
        assert!(!registry.reverse("missing"));
        assert!(!registry.restart("missing"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let (scheduler, registry) = setup();
        let handle = scheduler.create_sequence(TimelineConfig::new().persist(true));
        registry.insert("a", handle);
        registry.insert("b", handle);

        assert_eq!(registry.remove("a"), Some(handle));
        assert_eq!(registry.remove("a"), None);
        registry.clear();
        assert!(registry.is_empty());
    }
}
