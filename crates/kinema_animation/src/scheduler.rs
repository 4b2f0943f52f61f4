//! Animation scheduler
//!
//! Owns every live timeline and advances them each frame. The host drives it
//! from its frame callback, either with wall-clock time via `tick()` or with
//! an explicit step via `advance(dt)`.
//!
//! One-off tweens are removed automatically once they finish. Sequences
//! created with `persist` stay registered until killed, so they can be
//! replayed, reversed or restarted.
//!
//! Timelines render in registration order, so when two of them drive the
//! same property the one registered last wins the frame.
//!
//! Callbacks never run while the scheduler lock is held, so `on_start` and
//! `on_complete` handlers may freely start new animations.

use crate::engine::AnimationEngine;
use crate::timeline::{Callback, PlayState, Timeline, TimelineConfig, TweenConfig};
use kinema_core::{PropertyMap, Targets};
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

new_key_type! {
    /// Handle to a registered tween or sequence
    pub struct AnimationId;
}

impl AnimationId {
    /// Convert to raw u64 (for logging and FFI)
    pub fn to_raw(self) -> u64 {
        self.0.as_ffi()
    }

    /// Reconstruct from a value produced by `to_raw()`
    pub fn from_raw(raw: u64) -> Self {
        AnimationId::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Internal state of the scheduler
struct SchedulerInner {
    timelines: SlotMap<AnimationId, Timeline>,
    /// Registration order; slot indices are reused and can't provide it
    order: Vec<AnimationId>,
    last_frame: Instant,
}

impl SchedulerInner {
    fn any_playing(&self) -> bool {
        self.timelines.iter().any(|(_, t)| t.is_playing())
    }

    fn remove(&mut self, id: AnimationId) -> Option<Timeline> {
        let timeline = self.timelines.remove(id)?;
        self.order.retain(|other| *other != id);
        Some(timeline)
    }

    /// Drop every timeline `keep` rejects
    fn retain(&mut self, mut keep: impl FnMut(&Timeline) -> bool) {
        self.timelines.retain(|_, t| keep(t));
        let timelines = &self.timelines;
        self.order.retain(|id| timelines.contains_key(*id));
    }
}

/// The reference animation engine
///
/// Cloning yields another handle to the same scheduler.
///
/// ```rust
/// use kinema_animation::{AnimationEngine, Scheduler, TweenConfig};
/// use kinema_core::{Element, Property, PropertyMap, Targets};
///
/// let scheduler = Scheduler::new();
/// let el = Element::new();
/// scheduler.animate(
///     &Targets::from(&el),
///     &PropertyMap::new().with(Property::X, 100.0),
///     TweenConfig::new(1.0),
/// );
///
/// scheduler.advance(1.0);
/// assert_eq!(el.get(&Property::X), 100.0);
/// ```
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                timelines: SlotMap::with_key(),
                order: Vec::new(),
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a weak handle to this scheduler
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Advance all animations by the wall-clock time since the last tick
    ///
    /// Returns true if any animations are still playing.
    pub fn tick(&self) -> bool {
        let dt = {
            let mut inner = self.lock();
            let now = Instant::now();
            let dt = (now - inner.last_frame).as_secs_f32();
            inner.last_frame = now;
            dt
        };
        self.advance(dt)
    }

    /// Advance all animations by `dt` seconds
    ///
    /// Returns true if any animations are still playing.
    pub fn advance(&self, dt: f32) -> bool {
        let mut fired: Vec<Callback> = Vec::new();
        let active = {
            let mut inner = self.lock();
            let SchedulerInner {
                timelines, order, ..
            } = &mut *inner;
            for id in order.iter() {
                if let Some(timeline) = timelines.get_mut(*id) {
                    timeline.advance(dt, &mut fired);
                }
            }
            inner.retain(|t| t.persists() || t.state() != PlayState::Finished);
            inner.any_playing()
        };

        for callback in fired {
            callback();
        }
        active
    }

    /// Check if any animations are still playing
    pub fn has_active_animations(&self) -> bool {
        self.lock().any_playing()
    }

    /// Number of registered animations (playing, paused or finished)
    pub fn count(&self) -> usize {
        self.lock().timelines.len()
    }

    /// Remove every finished animation, including persistent sequences
    pub fn prune_finished(&self) -> usize {
        let mut inner = self.lock();
        let before = inner.timelines.len();
        inner.retain(|t| t.state() != PlayState::Finished);
        before - inner.timelines.len()
    }

    /// Register a prebuilt timeline
    pub fn add_timeline(&self, timeline: Timeline) -> AnimationId {
        let mut inner = self.lock();
        // Prevent a huge dt on the first tick after an idle period
        if !inner.any_playing() {
            inner.last_frame = Instant::now();
        }
        let id = inner.timelines.insert(timeline);
        inner.order.push(id);
        id
    }

    /// Apply a function to a timeline if it exists
    pub fn with_timeline<F, R>(&self, id: AnimationId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Timeline) -> R,
    {
        self.lock().timelines.get_mut(id).map(f)
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEngine for Scheduler {
    fn animate(&self, targets: &Targets, to: &PropertyMap, config: TweenConfig) -> AnimationId {
        let timeline = Timeline::tween(targets, to, &config);
        let id = self.add_timeline(timeline);
        tracing::trace!(
            id = id.to_raw(),
            targets = targets.len(),
            duration = config.duration,
            "registered tween"
        );
        id
    }

    fn set(&self, targets: &Targets, values: &PropertyMap) {
        targets.apply(values);
    }

    fn create_sequence(&self, config: TimelineConfig) -> AnimationId {
        let id = self.add_timeline(Timeline::new(config));
        tracing::trace!(id = id.to_raw(), "registered sequence");
        id
    }

    fn add_step(
        &self,
        sequence: AnimationId,
        targets: &Targets,
        to: &PropertyMap,
        config: TweenConfig,
    ) -> bool {
        self.with_timeline(sequence, |t| t.to(targets, to, &config))
            .is_some()
    }

    fn add_call(&self, sequence: AnimationId, callback: Callback) -> bool {
        self.with_timeline(sequence, |t| t.call(callback)).is_some()
    }

    fn play(&self, id: AnimationId) {
        self.with_timeline(id, Timeline::play);
    }

    fn pause(&self, id: AnimationId) {
        self.with_timeline(id, Timeline::pause);
    }

    fn resume(&self, id: AnimationId) {
        self.with_timeline(id, Timeline::resume);
    }

    fn reverse(&self, id: AnimationId) {
        self.with_timeline(id, Timeline::reverse);
    }

    fn restart(&self, id: AnimationId) {
        self.with_timeline(id, Timeline::restart);
    }

    fn seek(&self, id: AnimationId, time: f32) {
        self.with_timeline(id, |t| t.seek(time));
    }

    fn kill(&self, id: AnimationId) -> bool {
        match self.lock().remove(id) {
            Some(mut timeline) => {
                timeline.kill();
                true
            }
            None => false,
        }
    }

    fn kill_all(&self) -> usize {
        let mut inner = self.lock();
        let count = inner.timelines.len();
        for (_, timeline) in inner.timelines.iter_mut() {
            timeline.kill();
        }
        inner.timelines.clear();
        inner.order.clear();
        tracing::debug!(count, "killed all animations");
        count
    }

    fn kill_targets(&self, targets: &Targets) -> Vec<AnimationId> {
        let mut inner = self.lock();
        let doomed: Vec<AnimationId> = inner
            .timelines
            .iter()
            .filter(|(_, t)| t.touches(targets))
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            if let Some(mut timeline) = inner.remove(*id) {
                timeline.kill();
            }
        }
        doomed
    }

    fn touches(&self, id: AnimationId, targets: &Targets) -> bool {
        self.lock()
            .timelines
            .get(id)
            .is_some_and(|t| t.touches(targets))
    }

    fn state(&self, id: AnimationId) -> Option<PlayState> {
        self.lock().timelines.get(id).map(Timeline::state)
    }

    fn progress(&self, id: AnimationId) -> Option<f32> {
        self.lock().timelines.get(id).map(Timeline::progress)
    }
}

/// A weak handle to the scheduler
///
/// Passed to components that need to start animations without keeping the
/// scheduler alive. Every operation safely no-ops once it has been dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn upgrade(&self) -> Option<Scheduler> {
        self.inner.upgrade().map(|inner| Scheduler { inner })
    }
}

impl AnimationEngine for SchedulerHandle {
    fn animate(&self, targets: &Targets, to: &PropertyMap, config: TweenConfig) -> AnimationId {
        self.upgrade()
            .map(|s| s.animate(targets, to, config))
            .unwrap_or_default()
    }

    fn set(&self, targets: &Targets, values: &PropertyMap) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.set(targets, values);
        }
    }

    fn create_sequence(&self, config: TimelineConfig) -> AnimationId {
        self.upgrade()
            .map(|s| s.create_sequence(config))
            .unwrap_or_default()
    }

    fn add_step(
        &self,
        sequence: AnimationId,
        targets: &Targets,
        to: &PropertyMap,
        config: TweenConfig,
    ) -> bool {
        self.upgrade()
            .is_some_and(|s| s.add_step(sequence, targets, to, config))
    }

    fn add_call(&self, sequence: AnimationId, callback: Callback) -> bool {
        self.upgrade().is_some_and(|s| s.add_call(sequence, callback))
    }

    fn play(&self, id: AnimationId) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.play(id);
        }
    }

    fn pause(&self, id: AnimationId) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.pause(id);
        }
    }

    fn resume(&self, id: AnimationId) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.resume(id);
        }
    }

    fn reverse(&self, id: AnimationId) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.reverse(id);
        }
    }

    fn restart(&self, id: AnimationId) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.restart(id);
        }
    }

    fn seek(&self, id: AnimationId, time: f32) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.seek(id, time);
        }
    }

    fn kill(&self, id: AnimationId) -> bool {
        self.upgrade().is_some_and(|s| s.kill(id))
    }

    fn kill_all(&self) -> usize {
        self.upgrade().map_or(0, |s| s.kill_all())
    }

    fn kill_targets(&self, targets: &Targets) -> Vec<AnimationId> {
        self.upgrade()
            .map(|s| s.kill_targets(targets))
            .unwrap_or_default()
    }

    fn touches(&self, id: AnimationId, targets: &Targets) -> bool {
        self.upgrade().is_some_and(|s| s.touches(id, targets))
    }

    fn state(&self, id: AnimationId) -> Option<PlayState> {
        self.upgrade().and_then(|s| s.state(id))
    }

    fn progress(&self, id: AnimationId) -> Option<f32> {
        self.upgrade().and_then(|s| s.progress(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use kinema_core::{Element, Property};
    use slotmap::Key;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn x(value: f32) -> PropertyMap {
        PropertyMap::new().with(Property::X, value)
    }

    #[test]
    fn test_scheduler_advance() {
        let scheduler = Scheduler::new();
        let el = Element::new();

        let id = scheduler.animate(
            &Targets::from(&el),
            &x(100.0),
            TweenConfig::new(1.0).ease(Easing::LINEAR),
        );

        assert!(scheduler.advance(0.5));
        assert!((el.get(&Property::X) - 50.0).abs() < 1e-3);
        assert_eq!(scheduler.state(id), Some(PlayState::Playing));
        assert!((scheduler.progress(id).unwrap() - 0.5).abs() < 1e-6);

        assert!(!scheduler.advance(0.5));
        assert_eq!(el.get(&Property::X), 100.0);
        // finished tweens are dropped
        assert_eq!(scheduler.state(id), None);
        assert_eq!(scheduler.count(), 0);
    }

    #[test]
    fn test_tick_uses_wall_clock() {
        let scheduler = Scheduler::new();
        let el = Element::new();
        scheduler.animate(&Targets::from(&el), &x(10.0), TweenConfig::new(60.0));

        assert!(scheduler.tick());
        assert!(scheduler.has_active_animations());
    }

    #[test]
    fn test_persistent_sequences_survive_completion() {
        let scheduler = Scheduler::new();
        let el = Element::new();
        let id = scheduler.create_sequence(TimelineConfig::new().persist(true));
        assert!(scheduler.add_step(id, &Targets::from(&el), &x(10.0), TweenConfig::new(0.5)));

        scheduler.advance(1.0);
        assert_eq!(scheduler.state(id), Some(PlayState::Finished));

        scheduler.reverse(id);
        scheduler.advance(1.0);
        assert_eq!(el.get(&Property::X), 0.0);

        assert_eq!(scheduler.prune_finished(), 1);
        assert_eq!(scheduler.state(id), None);
    }

    #[test]
    fn test_kill_and_kill_all() {
        let scheduler = Scheduler::new();
        let a = Element::new();
        let b = Element::new();

        let first = scheduler.animate(&Targets::from(&a), &x(10.0), TweenConfig::new(1.0));
        let second = scheduler.animate(&Targets::from(&b), &x(10.0), TweenConfig::new(1.0));

        assert!(scheduler.kill(first));
        assert!(!scheduler.kill(first));
        assert!(scheduler.is_active(second));

        assert_eq!(scheduler.kill_all(), 1);
        assert!(!scheduler.is_active(second));
        assert_eq!(scheduler.count(), 0);

        scheduler.advance(1.0);
        assert_eq!(a.get(&Property::X), 0.0);
        assert_eq!(b.get(&Property::X), 0.0);
    }

    #[test]
    fn test_kill_targets_only_touches_matching() {
        let scheduler = Scheduler::new();
        let a = Element::new();
        let b = Element::new();

        let on_a = scheduler.animate(&Targets::from(&a), &x(10.0), TweenConfig::new(1.0));
        let on_b = scheduler.animate(&Targets::from(&b), &x(10.0), TweenConfig::new(1.0));

        let killed = scheduler.kill_targets(&Targets::from(&a));
        assert_eq!(killed, vec![on_a]);
        assert!(scheduler.is_active(on_b));
    }

    #[test]
    fn test_later_registration_wins_after_slot_reuse() {
        let scheduler = Scheduler::new();
        let other = Element::new();
        let el = Element::new();
        let linear = || TweenConfig::new(10.0).ease(Easing::LINEAR);

        scheduler.animate(&Targets::from(&other), &x(1.0), TweenConfig::new(0.1));
        scheduler.animate(&Targets::from(&el), &x(100.0), linear());
        // frees the first slot so the next tween reuses it
        scheduler.advance(0.1);

        let later = scheduler.animate(&Targets::from(&el), &x(-100.0), linear());
        scheduler.advance(5.0);
        assert!(el.get(&Property::X) < 0.0, "got {}", el.get(&Property::X));

        // still holds once the earlier tween is gone
        scheduler.kill(later);
        let last = scheduler.animate(&Targets::from(&el), &x(-50.0), linear());
        scheduler.advance(1.0);
        assert!(el.get(&Property::X) < 0.0);
        assert!(scheduler.is_active(last));
    }

    #[test]
    fn test_touches_reports_targets() {
        let scheduler = Scheduler::new();
        let a = Element::new();
        let b = Element::new();
        let id = scheduler.animate(&Targets::from(&a), &x(10.0), TweenConfig::new(1.0));

        assert!(scheduler.touches(id, &Targets::from(&a)));
        assert!(!scheduler.touches(id, &Targets::from(&b)));
        scheduler.kill(id);
        assert!(!scheduler.touches(id, &Targets::from(&a)));
    }

    #[test]
    fn test_callbacks_may_reenter_scheduler() {
        let scheduler = Scheduler::new();
        let el = Element::new();
        let chained = Arc::new(AtomicUsize::new(0));

        let config = {
            let scheduler = scheduler.clone();
            let el = el.clone();
            let chained = chained.clone();
            TweenConfig::new(0.5).on_complete(move || {
                scheduler.animate(&Targets::from(&el), &x(0.0), TweenConfig::new(0.5));
                chained.fetch_add(1, Ordering::SeqCst);
            })
        };
        scheduler.animate(&Targets::from(&el), &x(10.0), config);

        scheduler.advance(0.5);
        assert_eq!(chained.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.count(), 1);

        scheduler.advance(0.5);
        assert_eq!(el.get(&Property::X), 0.0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = Scheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());

        // Operations should safely no-op
        let el = Element::new();
        let id = handle.animate(&Targets::from(&el), &x(1.0), TweenConfig::default());
        assert!(id.is_null());
        assert_eq!(handle.kill_all(), 0);
        assert_eq!(handle.state(id), None);
    }

    #[test]
    fn test_handle_drives_live_scheduler() {
        let scheduler = Scheduler::new();
        let handle = scheduler.handle();
        let el = Element::new();

        let id = handle.animate(&Targets::from(&el), &x(1.0), TweenConfig::new(1.0));
        assert!(handle.is_alive());
        assert!(scheduler.is_active(id));

        handle.pause(id);
        assert_eq!(scheduler.state(id), Some(PlayState::Paused));
    }

    #[test]
    fn test_raw_id_round_trip() {
        let scheduler = Scheduler::new();
        let id = scheduler.create_sequence(TimelineConfig::default());
        assert_eq!(AnimationId::from_raw(id.to_raw()), id);
    }
}
