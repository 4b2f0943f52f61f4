//! Preset dispatcher
//!
//! The `Animator` turns animation requests into engine calls and remembers
//! every handle it produces so they can be cancelled in bulk. Named presets
//! live in [`crate::presets`]; this module holds the primitives they are
//! built on plus timeline, scroll, and cancellation plumbing.

use crate::config::MotionConfig;
use crate::error::{MotionError, Result};
use crate::host::Host;
use crate::options::{AnimationOptions, PresetDefaults, ScrollTriggerOptions};
use crate::registry::TimelineRegistry;
use crate::{AnimationHandle, ScrollTriggerHandle, TimelineHandle};
use kinema_animation::{AnimationEngine, ScrollEvent, ScrollObserver};
use kinema_core::{PropertyMap, Targets};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Named-intent animation front end over an `AnimationEngine`
pub struct Animator {
    engine: Arc<dyn AnimationEngine>,
    scroll: Option<Arc<dyn ScrollObserver>>,
    config: MotionConfig,
    active: Mutex<FxHashSet<AnimationHandle>>,
    scroll_triggers: Mutex<Vec<ScrollTriggerHandle>>,
    timelines: TimelineRegistry,
}

impl Animator {
    /// Create an animator from the globally registered capabilities
    ///
    /// Fails with `MotionError::EngineUnavailable` if no engine has been
    /// registered with `set_global_engine`.
    pub fn new() -> Result<Self> {
        Self::with_host(Host::global())
    }

    /// Create an animator from explicit capabilities
    pub fn with_host(host: Host) -> Result<Self> {
        Self::with_config(host, MotionConfig::default())
    }

    /// Create an animator with custom option defaults
    pub fn with_config(host: Host, config: MotionConfig) -> Result<Self> {
        let engine = host.engine().cloned().ok_or(MotionError::EngineUnavailable)?;
        let scroll = host.scroll_observer().cloned();
        tracing::debug!(scroll = scroll.is_some(), "animator ready");

        Ok(Self {
            timelines: TimelineRegistry::new(engine.clone()),
            engine,
            scroll,
            config,
            active: Mutex::new(FxHashSet::default()),
            scroll_triggers: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn AnimationEngine> {
        &self.engine
    }

    /// Check if scroll triggers are available
    pub fn has_scroll(&self) -> bool {
        self.scroll.is_some()
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Animate `targets` to `properties` with option defaults applied
    pub fn animate(
        &self,
        targets: impl Into<Targets>,
        properties: &PropertyMap,
        options: &AnimationOptions,
    ) -> AnimationHandle {
        self.tween(&targets.into(), properties, options, PresetDefaults::NONE)
    }

    /// Write `from` immediately, then animate to `to`
    pub fn from_to(
        &self,
        targets: impl Into<Targets>,
        from: &PropertyMap,
        to: &PropertyMap,
        options: &AnimationOptions,
    ) -> AnimationHandle {
        let targets = targets.into();
        self.engine.set(&targets, from);
        self.tween(&targets, to, options, PresetDefaults::NONE)
    }

    /// Write `properties` immediately; nothing is tracked
    pub fn set(&self, targets: impl Into<Targets>, properties: &PropertyMap) {
        self.engine.set(&targets.into(), properties);
    }

    /// Submit one tween, applying the initial state first when given
    pub(crate) fn preset_tween(
        &self,
        targets: &Targets,
        initial: Option<&PropertyMap>,
        to: &PropertyMap,
        options: &AnimationOptions,
        preset: PresetDefaults,
    ) -> AnimationHandle {
        if let Some(initial) = initial {
            self.engine.set(targets, initial);
        }
        self.tween(targets, to, options, preset)
    }

    fn tween(
        &self,
        targets: &Targets,
        to: &PropertyMap,
        options: &AnimationOptions,
        preset: PresetDefaults,
    ) -> AnimationHandle {
        let config = options.tween_config(&preset, &self.config);
        let handle = self.engine.animate(targets, to, config);
        self.track(handle)
    }

    /// Submit a sequence of steps on the same targets
    ///
    /// Each step is `(values, seconds)`. `default_repeat` applies when the
    /// caller left `repeat` unset.
    pub(crate) fn sequence(
        &self,
        targets: &Targets,
        steps: &[(PropertyMap, f32)],
        options: &AnimationOptions,
        default_repeat: i32,
    ) -> AnimationHandle {
        let mut timeline = options.timeline_config(default_repeat, &self.config);
        let ease = options.resolve_ease(None, &self.config);

        // Held until every step is in, so a concurrent frame can't finish it empty
        let start_paused = timeline
            .extra
            .shift_remove("paused")
            .and_then(|value| value.as_bool())
            .unwrap_or(timeline.paused);
        let handle = self.engine.create_sequence(timeline.paused(true));

        for (values, seconds) in steps {
            let step = kinema_animation::TweenConfig::new(*seconds).ease(ease);
            if !self.engine.add_step(handle, targets, values, step) {
                tracing::warn!(id = handle.to_raw(), "sequence vanished while being built");
                return handle;
            }
        }
        if !start_paused {
            self.engine.resume(handle);
        }
        self.track(handle)
    }

    fn track(&self, handle: AnimationHandle) -> AnimationHandle {
        self.active().insert(handle);
        handle
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Stop one animation and stop tracking it
    ///
    /// Returns whether the handle was tracked or known to the engine.
    pub fn kill_animation(&self, handle: AnimationHandle) -> bool {
        let tracked = self.active().remove(&handle);
        let killed = self.engine.kill(handle);
        tracked || killed
    }

    /// Stop every animation this animator produced
    ///
    /// Unless `scoped_kill_all` is configured, every other animation in the
    /// engine is stopped as well. Returns the number of tracked handles
    /// that were cleared.
    pub fn kill_all(&self) -> usize {
        let handles: Vec<AnimationHandle> = self.active().drain().collect();
        for handle in &handles {
            self.engine.kill(*handle);
        }
        if !self.config.scoped_kill_all {
            let swept = self.engine.kill_all();
            tracing::debug!(tracked = handles.len(), swept, "killed all animations");
        }
        handles.len()
    }

    /// Stop the tracked animations on `targets` and clear the values applied
    ///
    /// Named timelines and animations started elsewhere keep running.
    pub fn reset_element(&self, targets: impl Into<Targets>) {
        let targets = targets.into();
        let doomed: Vec<AnimationHandle> = {
            let mut active = self.active();
            let doomed = active
                .iter()
                .copied()
                .filter(|handle| self.engine.touches(*handle, &targets))
                .collect::<Vec<_>>();
            for handle in &doomed {
                active.remove(handle);
            }
            doomed
        };
        for handle in doomed {
            self.engine.kill(handle);
        }
        for element in &targets {
            element.clear_props();
        }
    }

    /// Number of tracked handles
    pub fn active_count(&self) -> usize {
        self.active().len()
    }

    pub fn is_tracked(&self, handle: AnimationHandle) -> bool {
        self.active().contains(&handle)
    }

    fn active(&self) -> MutexGuard<'_, FxHashSet<AnimationHandle>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Named timelines
    // =========================================================================

    /// Create an empty timeline and register it under `name`
    ///
    /// An existing entry with the same name is replaced but not stopped.
    pub fn create_timeline(&self, name: &str, options: &AnimationOptions) -> TimelineHandle {
        let config = options.timeline_config(0, &self.config).persist(true);
        let handle = self.engine.create_sequence(config);
        self.timelines.insert(name, handle);
        handle
    }

    pub fn get_timeline(&self, name: &str) -> Option<TimelineHandle> {
        self.timelines.get(name)
    }

    pub fn play_timeline(&self, name: &str) {
        self.timelines.play(name);
    }

    pub fn pause_timeline(&self, name: &str) {
        self.timelines.pause(name);
    }

    pub fn reverse_timeline(&self, name: &str) {
        self.timelines.reverse(name);
    }

    pub fn restart_timeline(&self, name: &str) {
        self.timelines.restart(name);
    }

    /// Append a tween to a named timeline
    ///
    /// Returns `false` if no timeline is registered under `name`.
    pub fn add_to_timeline(
        &self,
        name: &str,
        targets: impl Into<Targets>,
        properties: &PropertyMap,
        options: &AnimationOptions,
    ) -> bool {
        let Some(handle) = self.timelines.get(name) else {
            tracing::trace!(name, "no timeline registered under this name");
            return false;
        };
        let step = options.tween_config(&PresetDefaults::NONE, &self.config);
        self.engine.add_step(handle, &targets.into(), properties, step)
    }

    /// The registry of named timelines
    pub fn timelines(&self) -> &TimelineRegistry {
        &self.timelines
    }

    // =========================================================================
    // Scroll triggers
    // =========================================================================

    /// Watch the first of `targets` against the viewport
    ///
    /// Returns `None`, with a warning, if the host has no scroll observer.
    pub fn scroll_trigger<F>(
        &self,
        targets: impl Into<Targets>,
        callback: F,
        options: &ScrollTriggerOptions,
    ) -> Option<ScrollTriggerHandle>
    where
        F: Fn(&ScrollEvent) + Send + Sync + 'static,
    {
        let Some(observer) = &self.scroll else {
            tracing::warn!("scroll observation unavailable, scroll trigger ignored");
            return None;
        };
        let targets = targets.into();
        if targets.is_empty() {
            tracing::warn!("scroll trigger requested with no targets");
            return None;
        }

        let config = options.resolve(&self.config);
        let handle = observer.observe(&targets, config, Arc::new(callback));
        let mut triggers = self
            .scroll_triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // spent `once` triggers
        triggers.retain(|id| observer.is_observing(*id));
        triggers.push(handle);
        Some(handle)
    }

    /// Number of scroll triggers this animator registered that are still watched
    pub fn scroll_trigger_count(&self) -> usize {
        let Some(observer) = &self.scroll else {
            return 0;
        };
        let mut triggers = self
            .scroll_triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        triggers.retain(|id| observer.is_observing(*id));
        triggers.len()
    }

    /// Stop every scroll trigger this animator registered
    pub fn kill_scroll_triggers(&self) -> usize {
        let handles: Vec<ScrollTriggerHandle> = self
            .scroll_triggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        match &self.scroll {
            Some(observer) => handles.into_iter().filter(|h| observer.kill(*h)).count(),
            None => 0,
        }
    }
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("active", &self.active_count())
            .field("timelines", &self.timelines.len())
            .field("scroll", &self.scroll.is_some())
            .field("config", &self.config)
            .finish()
    }
}
