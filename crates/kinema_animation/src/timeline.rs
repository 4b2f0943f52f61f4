//! Timeline orchestration
//!
//! A `Timeline` is an ordered list of steps positioned on a shared time axis.
//! A single tween is just a timeline with one step per target, so the same
//! machinery drives one-off tweens, staggered batches, and named sequences.
//!
//! # Playhead model
//!
//! The playhead moves through *total time*, which spans every pass of the
//! timeline (`duration * (repeat + 1)`). Each pass renders the steps at a
//! local time in `0..=duration`; with `yoyo`, odd passes run backwards.
//!
//! Steps capture their start values lazily, the first time the playhead
//! reaches them. Chained steps on the same property (a shake, for example)
//! therefore pick up where the previous step left off.
//!
//! # Example
//!
//! ```rust
//! use kinema_animation::{Timeline, TimelineConfig, TweenConfig};
//! use kinema_core::{Element, Property, PropertyMap, Targets};
//!
//! let el = Element::new();
//! let targets = Targets::from(&el);
//! let mut timeline = Timeline::new(TimelineConfig::default());
//! timeline.to(&targets, &PropertyMap::new().with(Property::X, 100.0), &TweenConfig::new(1.0));
//! timeline.to(&targets, &PropertyMap::new().with(Property::X, 0.0), &TweenConfig::new(1.0));
//!
//! let mut fired = Vec::new();
//! timeline.advance(1.0, &mut fired);
//! assert_eq!(el.get(&Property::X), 100.0);
//! ```

use crate::easing::Easing;
use crate::values::Interpolate;
use indexmap::IndexMap;
use kinema_core::{Element, PropertyMap, Targets};
use std::fmt;
use std::sync::Arc;

/// Zero-argument callback invoked by the engine
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Pass-through options the engine does not model as typed fields
pub type ExtraOptions = IndexMap<String, serde_json::Value>;

/// Playback state of a timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
    /// Reached the end (or, when reversed, the start)
    Finished,
    Killed,
}

// ============================================================================
// Configuration
// ============================================================================

/// Timing and lifecycle settings for a whole timeline
#[derive(Clone, Default)]
pub struct TimelineConfig {
    /// Seconds before the first pass starts
    pub delay: f32,
    /// Additional passes after the first (-1 for infinite)
    pub repeat: i32,
    /// Run odd passes backwards
    pub yoyo: bool,
    /// Create the timeline paused
    pub paused: bool,
    /// Keep the timeline in the scheduler after it finishes
    pub persist: bool,
    pub on_start: Option<Callback>,
    pub on_complete: Option<Callback>,
    /// Uninterpreted pass-through options
    pub extra: ExtraOptions,
}

impl TimelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = count;
        self
    }

    pub fn yoyo(mut self, enabled: bool) -> Self {
        self.yoyo = enabled;
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_start = Some(Arc::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for TimelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineConfig")
            .field("delay", &self.delay)
            .field("repeat", &self.repeat)
            .field("yoyo", &self.yoyo)
            .field("paused", &self.paused)
            .field("persist", &self.persist)
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

/// Settings for one tween
///
/// When a tween is submitted on its own it becomes a timeline, and the
/// lifecycle fields (`delay`, `repeat`, `yoyo`, `paused`, callbacks) apply to
/// that timeline. When it is appended to an existing timeline, `delay` shifts
/// its position and the callbacks fire when the playhead crosses its start and
/// end; `repeat`, `yoyo` and `paused` are ignored.
#[derive(Clone)]
pub struct TweenConfig {
    /// Seconds per target
    pub duration: f32,
    pub delay: f32,
    pub ease: Easing,
    /// Seconds between successive targets' start times
    pub stagger: f32,
    pub repeat: i32,
    pub yoyo: bool,
    pub paused: bool,
    /// Treat the destination values as offsets from the captured start values
    pub relative: bool,
    pub on_start: Option<Callback>,
    pub on_complete: Option<Callback>,
    pub extra: ExtraOptions,
}

impl TweenConfig {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            ..Self::default()
        }
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = seconds.max(0.0);
        self
    }

    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = count;
        self
    }

    pub fn yoyo(mut self, enabled: bool) -> Self {
        self.yoyo = enabled;
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_start = Some(Arc::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Lifecycle settings for a timeline that wraps this tween alone
    pub fn timeline_config(&self) -> TimelineConfig {
        TimelineConfig {
            delay: self.delay,
            repeat: self.repeat,
            yoyo: self.yoyo,
            paused: self.paused,
            persist: false,
            on_start: self.on_start.clone(),
            on_complete: self.on_complete.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            duration: 0.5,
            delay: 0.0,
            ease: Easing::default(),
            stagger: 0.0,
            repeat: 0,
            yoyo: false,
            paused: false,
            relative: false,
            on_start: None,
            on_complete: None,
            extra: ExtraOptions::new(),
        }
    }
}

impl fmt::Debug for TweenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenConfig")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("ease", &self.ease.to_string())
            .field("stagger", &self.stagger)
            .field("repeat", &self.repeat)
            .field("yoyo", &self.yoyo)
            .field("paused", &self.paused)
            .field("relative", &self.relative)
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

// ============================================================================
// Steps
// ============================================================================

struct TweenStep {
    target: Element,
    to: PropertyMap,
    relative: bool,
    ease: Easing,
    /// Captured on first render: (start values, resolved end values)
    captured: Option<(PropertyMap, PropertyMap)>,
}

impl TweenStep {
    fn capture(&mut self) -> &(PropertyMap, PropertyMap) {
        self.captured.get_or_insert_with(|| {
            let from = self.target.snapshot(self.to.properties());
            let end = if self.relative {
                self.to
                    .iter()
                    .map(|(p, delta)| {
                        let start = from.get(p).unwrap_or_else(|| p.baseline());
                        (p.clone(), start + delta)
                    })
                    .collect()
            } else {
                self.to.clone()
            };
            (from, end)
        })
    }

    fn render(&mut self, progress: f32, reached: bool) {
        if self.captured.is_none() && !reached {
            return;
        }
        let eased = self.ease.apply(progress);
        let (from, end) = self.capture();
        let values = from.lerp(end, eased);
        self.target.apply(&values);
    }
}

enum StepAction {
    Tween(TweenStep),
    Call(Callback),
}

struct Step {
    start: f32,
    duration: f32,
    action: StepAction,
}

impl Step {
    fn end(&self) -> f32 {
        self.start + self.duration
    }

    fn render(&mut self, progress: f32, reached: bool) {
        if let StepAction::Tween(tween) = &mut self.action {
            tween.render(progress, reached);
        }
    }
}

// ============================================================================
// Timeline
// ============================================================================

/// An ordered composition of tweens and callbacks, controllable as one unit
pub struct Timeline {
    steps: Vec<Step>,
    config: TimelineConfig,
    /// Length of one pass in seconds
    duration: f32,
    /// Playhead across all passes
    total_time: f32,
    delay_remaining: f32,
    reversed: bool,
    state: PlayState,
    started: bool,
    rendered: bool,
}

impl Timeline {
    /// Create an empty timeline
    ///
    /// The pass-through keys `yoyo` and `paused` in `config.extra` are honoured
    /// when they hold booleans; every other extra key is kept uninterpreted.
    pub fn new(mut config: TimelineConfig) -> Self {
        if let Some(yoyo) = config.extra.get("yoyo").and_then(serde_json::Value::as_bool) {
            config.yoyo = yoyo;
        }
        if let Some(paused) = config
            .extra
            .get("paused")
            .and_then(serde_json::Value::as_bool)
        {
            config.paused = paused;
        }

        let state = if config.paused {
            PlayState::Paused
        } else {
            PlayState::Playing
        };

        Self {
            steps: Vec::new(),
            delay_remaining: config.delay.max(0.0),
            config,
            duration: 0.0,
            total_time: 0.0,
            reversed: false,
            state,
            started: false,
            rendered: false,
        }
    }

    /// Build the timeline for a standalone tween
    ///
    /// Each target gets its own step, offset by `index * stagger`.
    pub fn tween(targets: &Targets, to: &PropertyMap, config: &TweenConfig) -> Self {
        let mut timeline = Timeline::new(config.timeline_config());
        timeline.push_tween(0.0, targets, to, config);
        timeline
    }

    // =========================================================================
    // Building
    // =========================================================================

    /// Append a tween after the current end of the timeline
    pub fn to(&mut self, targets: &Targets, to: &PropertyMap, config: &TweenConfig) {
        let position = self.duration + config.delay;
        self.to_at(position, targets, to, config);
    }

    /// Insert a tween at an absolute position (seconds from the start)
    pub fn to_at(&mut self, position: f32, targets: &Targets, to: &PropertyMap, config: &TweenConfig) {
        let position = position.max(0.0);
        let end = self.push_tween(position, targets, to, config);

        if let Some(callback) = &config.on_start {
            self.push_call(position, callback.clone());
        }
        if let Some(callback) = &config.on_complete {
            self.push_call(end, callback.clone());
        }
    }

    /// Append an instant step that writes `values`
    pub fn set(&mut self, targets: &Targets, values: &PropertyMap) {
        let config = TweenConfig::new(0.0).ease(Easing::LINEAR);
        let position = self.duration;
        self.push_tween(position, targets, values, &config);
    }

    /// Append a callback after the current end of the timeline
    pub fn call(&mut self, callback: Callback) {
        let position = self.duration;
        self.push_call(position, callback);
    }

    /// Insert a callback at an absolute position
    pub fn call_at(&mut self, position: f32, callback: Callback) {
        self.push_call(position.max(0.0), callback);
    }

    fn push_tween(
        &mut self,
        position: f32,
        targets: &Targets,
        to: &PropertyMap,
        config: &TweenConfig,
    ) -> f32 {
        let mut end = position;
        for (index, target) in targets.iter().enumerate() {
            let start = position + index as f32 * config.stagger;
            let step = Step {
                start,
                duration: config.duration,
                action: StepAction::Tween(TweenStep {
                    target: target.clone(),
                    to: to.clone(),
                    relative: config.relative,
                    ease: config.ease,
                    captured: None,
                }),
            };
            end = end.max(step.end());
            self.steps.push(step);
        }
        self.extend_to(end);
        end
    }

    fn push_call(&mut self, position: f32, callback: Callback) {
        self.steps.push(Step {
            start: position,
            duration: 0.0,
            action: StepAction::Call(callback),
        });
        self.extend_to(position);
    }

    fn extend_to(&mut self, end: f32) {
        if end > self.duration {
            self.duration = end;
        }
        // Content added past a finished playhead resumes playback
        if self.state == PlayState::Finished
            && !self.reversed
            && !self.config.paused
            && self.total_time < self.total_duration()
        {
            self.state = PlayState::Playing;
        }
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Advance the playhead by `dt` seconds
    ///
    /// Callbacks that become due are pushed onto `fired` instead of being
    /// invoked, so the caller can run them after releasing any locks.
    pub fn advance(&mut self, dt: f32, fired: &mut Vec<Callback>) {
        if self.state != PlayState::Playing {
            return;
        }
        if self.steps.is_empty() {
            // A tween with no targets has nothing to run; named sequences
            // wait for content
            if !self.config.persist {
                self.state = PlayState::Finished;
            }
            return;
        }

        let mut dt = dt.max(0.0);
        if !self.reversed && self.delay_remaining > 0.0 {
            let consumed = dt.min(self.delay_remaining);
            self.delay_remaining -= consumed;
            dt -= consumed;
            if self.delay_remaining > 0.0 {
                return;
            }
        }

        if !self.started && !self.reversed {
            self.started = true;
            if let Some(callback) = &self.config.on_start {
                fired.push(callback.clone());
            }
        }

        if self.duration <= 0.0 {
            // Only instant steps: render them once and finish
            self.fire_calls(0, 0.0, 0.0, fired);
            self.render(0.0);
            self.rendered = true;
            self.complete(fired);
            return;
        }

        let total = self.total_duration();
        loop {
            if self.reversed {
                if self.total_time <= 0.0 {
                    self.total_time = 0.0;
                    self.state = PlayState::Finished;
                    break;
                }
                if dt <= 0.0 {
                    break;
                }
                let iteration = self.reverse_iteration(self.total_time);
                let boundary = iteration as f32 * self.duration;
                let step = (self.total_time - boundary).min(dt);
                let from = self.total_time;
                let to = (from - step).max(boundary);
                self.render_segment(iteration, from, to, fired);
                self.total_time = to;
                dt -= step;
            } else {
                if self.total_time >= total {
                    self.total_time = total;
                    self.complete(fired);
                    break;
                }
                if dt <= 0.0 {
                    break;
                }
                let iteration = self.forward_iteration(self.total_time);
                let boundary = ((iteration + 1) as f32 * self.duration).min(total);
                let step = (boundary - self.total_time).min(dt);
                let from = self.total_time;
                let to = (from + step).min(boundary);
                self.render_segment(iteration, from, to, fired);
                self.total_time = to;
                dt -= step;
            }
        }
    }

    fn complete(&mut self, fired: &mut Vec<Callback>) {
        self.state = PlayState::Finished;
        if let Some(callback) = &self.config.on_complete {
            fired.push(callback.clone());
        }
    }

    /// Pass index containing `total_time` when moving forward
    fn forward_iteration(&self, total_time: f32) -> u32 {
        let mut iteration = (total_time / self.duration).floor();
        if (iteration + 1.0) * self.duration <= total_time {
            iteration += 1.0;
        }
        let iteration = iteration.max(0.0) as u32;
        match self.max_iteration() {
            Some(last) => iteration.min(last),
            None => iteration,
        }
    }

    /// Pass index containing `total_time` when moving backward
    fn reverse_iteration(&self, total_time: f32) -> u32 {
        let mut iteration = (total_time / self.duration).ceil() - 1.0;
        if iteration * self.duration >= total_time {
            iteration -= 1.0;
        }
        let iteration = iteration.max(0.0) as u32;
        match self.max_iteration() {
            Some(last) => iteration.min(last),
            None => iteration,
        }
    }

    fn max_iteration(&self) -> Option<u32> {
        u32::try_from(self.config.repeat).ok()
    }

    fn local_time(&self, iteration: u32, total_time: f32) -> f32 {
        let local = (total_time - iteration as f32 * self.duration).clamp(0.0, self.duration);
        if self.config.yoyo && iteration % 2 == 1 {
            self.duration - local
        } else {
            local
        }
    }

    fn render_segment(&mut self, iteration: u32, from: f32, to: f32, fired: &mut Vec<Callback>) {
        let from_local = self.local_time(iteration, from);
        let to_local = self.local_time(iteration, to);
        self.fire_calls(iteration, from_local, to_local, fired);
        self.render(to_local);
        self.rendered = true;
    }

    /// Queue the callbacks the playhead crosses between two local times
    fn fire_calls(&self, iteration: u32, from: f32, to: f32, fired: &mut Vec<Callback>) {
        let include_start =
            !self.rendered || (from <= 0.0 && (iteration == 0 || !self.config.yoyo));
        for step in &self.steps {
            let StepAction::Call(callback) = &step.action else {
                continue;
            };
            let crossed = if to >= from {
                (step.start > from || (include_start && step.start >= from)) && step.start <= to
            } else {
                step.start >= to && step.start < from
            };
            if crossed {
                fired.push(callback.clone());
            }
        }
    }

    /// Write every tween's value for local time `t`
    ///
    /// Steps are written so that the one governing `t` is applied last:
    /// steps not yet reached are rewound first (latest first), then finished
    /// steps are settled in order, then active steps are interpolated.
    fn render(&mut self, t: f32) {
        for step in self.steps.iter_mut().rev() {
            if step.start > t {
                step.render(0.0, false);
            }
        }
        for step in self.steps.iter_mut() {
            if step.start <= t && step.end() <= t {
                step.render(1.0, true);
            }
        }
        for step in self.steps.iter_mut() {
            if step.start <= t && t < step.end() {
                let progress = (t - step.start) / step.duration;
                step.render(progress, true);
            }
        }
    }

    // =========================================================================
    // Controls
    // =========================================================================

    /// Play forward from the current position
    pub fn play(&mut self) {
        if self.state == PlayState::Killed {
            return;
        }
        self.reversed = false;
        self.config.paused = false;
        if self.total_time < self.total_duration() || !self.rendered {
            self.state = PlayState::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
        }
        self.config.paused = true;
    }

    /// Resume in the current direction
    pub fn resume(&mut self) {
        if self.state == PlayState::Paused {
            self.state = PlayState::Playing;
        }
        self.config.paused = false;
    }

    /// Play backwards towards the start
    pub fn reverse(&mut self) {
        if self.state == PlayState::Killed {
            return;
        }
        self.reversed = true;
        self.config.paused = false;
        if self.total_time > 0.0 {
            self.state = PlayState::Playing;
        }
    }

    /// Jump back to the start and play forward
    ///
    /// The initial delay is skipped. `on_start` fires again on the next advance.
    pub fn restart(&mut self) {
        if self.state == PlayState::Killed {
            return;
        }
        self.total_time = 0.0;
        self.delay_remaining = 0.0;
        self.reversed = false;
        self.started = false;
        self.config.paused = false;
        self.state = PlayState::Playing;
        if self.duration > 0.0 {
            self.render(0.0);
        }
        self.rendered = false;
    }

    /// Move the playhead to `time` seconds of total time without firing callbacks
    pub fn seek(&mut self, time: f32) {
        if self.state == PlayState::Killed {
            return;
        }
        let total = self.total_duration();
        self.total_time = time.clamp(0.0, total);
        if self.duration > 0.0 {
            let iteration = self.forward_iteration(self.total_time);
            let local = self.local_time(iteration, self.total_time);
            self.render(local);
            self.rendered = true;
        }
    }

    /// Stop permanently; no further callbacks fire
    pub fn kill(&mut self) {
        self.state = PlayState::Killed;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Length of one pass in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Length of every pass together (infinite when repeating forever)
    pub fn total_duration(&self) -> f32 {
        if self.config.repeat < 0 {
            f32::INFINITY
        } else {
            self.duration * (self.config.repeat as f32 + 1.0)
        }
    }

    /// Playhead position across all passes
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Overall progress (0.0 to 1.0); progress of the current pass when
    /// repeating forever
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.state == PlayState::Finished { 1.0 } else { 0.0 };
        }
        let total = self.total_duration();
        if total.is_infinite() {
            let iteration = self.forward_iteration(self.total_time);
            return self.local_time(iteration, self.total_time) / self.duration;
        }
        (self.total_time / total).clamp(0.0, 1.0)
    }

    pub fn repeat(&self) -> i32 {
        self.config.repeat
    }

    pub fn persists(&self) -> bool {
        self.config.persist
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn extra(&self) -> &ExtraOptions {
        &self.config.extra
    }

    /// Check whether any tween step animates one of `targets`
    pub fn touches(&self, targets: &Targets) -> bool {
        self.steps.iter().any(|step| match &step.action {
            StepAction::Tween(tween) => targets.contains(&tween.target),
            StepAction::Call(_) => false,
        })
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("steps", &self.steps.len())
            .field("duration", &self.duration)
            .field("total_time", &self.total_time)
            .field("reversed", &self.reversed)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::Property;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn x(value: f32) -> PropertyMap {
        PropertyMap::new().with(Property::X, value)
    }

    fn linear(duration: f32) -> TweenConfig {
        TweenConfig::new(duration).ease(Easing::LINEAR)
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn run(timeline: &mut Timeline, dt: f32) {
        let mut fired = Vec::new();
        timeline.advance(dt, &mut fired);
        for callback in fired {
            callback();
        }
    }

    #[test]
    fn test_tween_interpolates_linearly() {
        let el = Element::new();
        let mut timeline = Timeline::tween(&Targets::from(&el), &x(100.0), &linear(1.0));

        run(&mut timeline, 0.25);
        assert!((el.get(&Property::X) - 25.0).abs() < 1e-3);

        run(&mut timeline, 0.75);
        assert_eq!(el.get(&Property::X), 100.0);
        assert_eq!(timeline.state(), PlayState::Finished);
    }

    #[test]
    fn test_delay_holds_the_start() {
        let el = Element::new();
        let config = linear(1.0).delay(0.5);
        let mut timeline = Timeline::tween(&Targets::from(&el), &x(100.0), &config);

        run(&mut timeline, 0.4);
        assert_eq!(el.get(&Property::X), 0.0);

        run(&mut timeline, 0.6);
        assert!((el.get(&Property::X) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_callbacks_fire_once() {
        let el = Element::new();
        let (starts, on_start) = counter();
        let (completions, on_complete) = counter();
        let config = linear(0.5).on_start(on_start).on_complete(on_complete);
        let mut timeline = Timeline::tween(&Targets::from(&el), &x(10.0), &config);

        for _ in 0..20 {
            run(&mut timeline, 0.1);
        }

        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stagger_offsets_targets() {
        let a = Element::new();
        let b = Element::new();
        let c = Element::new();
        let targets = Targets::from(vec![a.clone(), b.clone(), c.clone()]);
        let mut timeline = Timeline::tween(&targets, &x(10.0), &linear(1.0).stagger(0.5));

        assert!((timeline.duration() - 2.0).abs() < 1e-6);

        run(&mut timeline, 0.5);
        assert!((a.get(&Property::X) - 5.0).abs() < 1e-3);
        assert_eq!(b.get(&Property::X), 0.0);
        assert_eq!(c.get(&Property::X), 0.0);

        run(&mut timeline, 0.5);
        assert_eq!(a.get(&Property::X), 10.0);
        assert!((b.get(&Property::X) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_sequence_chains_captured_values() {
        let el = Element::new();
        let targets = Targets::from(&el);
        let mut timeline = Timeline::new(TimelineConfig::default());
        for value in [-5.0, 5.0, -5.0, 5.0, 0.0] {
            timeline.to(&targets, &x(value), &linear(0.1));
        }

        // jump straight past three steps in one frame
        run(&mut timeline, 0.35);
        assert!((el.get(&Property::X) - 0.0).abs() < 1e-3);

        run(&mut timeline, 1.0);
        assert_eq!(el.get(&Property::X), 0.0);
        assert_eq!(timeline.state(), PlayState::Finished);
    }

    #[test]
    fn test_repeat_runs_extra_passes() {
        let el = Element::new();
        let (completions, on_complete) = counter();
        let mut timeline = Timeline::new(
            TimelineConfig::new()
                .repeat(2)
                .on_complete(on_complete),
        );
        timeline.to(&Targets::from(&el), &x(10.0), &linear(1.0));

        assert_eq!(timeline.total_duration(), 3.0);

        run(&mut timeline, 1.5);
        assert!((el.get(&Property::X) - 5.0).abs() < 1e-3);
        assert_eq!(timeline.state(), PlayState::Playing);

        run(&mut timeline, 1.0);
        assert!((el.get(&Property::X) - 5.0).abs() < 1e-3);
        assert_eq!(timeline.state(), PlayState::Playing);
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        run(&mut timeline, 0.5);
        assert_eq!(el.get(&Property::X), 10.0);
        assert_eq!(timeline.state(), PlayState::Finished);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_yoyo_runs_odd_passes_backwards() {
        let el = Element::new();
        let mut timeline = Timeline::new(TimelineConfig::new().repeat(1).yoyo(true));
        timeline.to(&Targets::from(&el), &x(10.0), &linear(1.0));

        run(&mut timeline, 1.25);
        assert!((el.get(&Property::X) - 7.5).abs() < 1e-3);

        run(&mut timeline, 0.75);
        assert_eq!(el.get(&Property::X), 0.0);
    }

    #[test]
    fn test_reverse_and_restart() {
        let el = Element::new();
        let mut timeline = Timeline::new(TimelineConfig::new().persist(true));
        timeline.to(&Targets::from(&el), &x(10.0), &linear(1.0));

        run(&mut timeline, 0.6);
        timeline.reverse();
        run(&mut timeline, 0.2);
        assert!((el.get(&Property::X) - 4.0).abs() < 1e-3);

        run(&mut timeline, 1.0);
        assert_eq!(el.get(&Property::X), 0.0);
        assert_eq!(timeline.state(), PlayState::Finished);

        timeline.restart();
        assert!(!timeline.is_reversed());
        run(&mut timeline, 0.5);
        assert!((el.get(&Property::X) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_pause_freezes_playhead() {
        let el = Element::new();
        let mut timeline = Timeline::tween(&Targets::from(&el), &x(10.0), &linear(1.0));

        run(&mut timeline, 0.5);
        timeline.pause();
        run(&mut timeline, 0.5);
        assert!((el.get(&Property::X) - 5.0).abs() < 1e-3);

        timeline.resume();
        run(&mut timeline, 0.5);
        assert_eq!(el.get(&Property::X), 10.0);
    }

    #[test]
    fn test_relative_values_add_to_start() {
        let el = Element::new();
        el.set(Property::RotationY, 90.0);
        let mut timeline = Timeline::tween(
            &Targets::from(&el),
            &PropertyMap::new().with(Property::RotationY, 360.0),
            &linear(1.0).relative(true),
        );

        run(&mut timeline, 1.0);
        assert_eq!(el.get(&Property::RotationY), 450.0);
    }

    #[test]
    fn test_call_steps_fire_when_crossed() {
        let el = Element::new();
        let (calls, callback) = counter();
        let mut timeline = Timeline::new(TimelineConfig::default());
        timeline.to(&Targets::from(&el), &x(10.0), &linear(1.0));
        timeline.call(Arc::new(callback));
        timeline.to(&Targets::from(&el), &x(0.0), &linear(1.0));

        run(&mut timeline, 0.9);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        run(&mut timeline, 0.2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        run(&mut timeline, 2.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_seek_renders_without_callbacks() {
        let el = Element::new();
        let (completions, on_complete) = counter();
        let mut timeline = Timeline::new(TimelineConfig::new().paused(true).on_complete(on_complete));
        timeline.to(&Targets::from(&el), &x(10.0), &linear(1.0));

        timeline.seek(0.3);
        assert!((el.get(&Property::X) - 3.0).abs() < 1e-3);
        assert!((timeline.progress() - 0.3).abs() < 1e-6);
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_steps_apply_instantly() {
        let el = Element::new();
        let mut timeline = Timeline::new(TimelineConfig::default());
        timeline.set(&Targets::from(&el), &PropertyMap::new().with(Property::Opacity, 0.0));

        run(&mut timeline, 0.0);
        assert_eq!(el.get(&Property::Opacity), 0.0);
        assert_eq!(timeline.state(), PlayState::Finished);
    }

    #[test]
    fn test_extra_yoyo_is_honoured() {
        let config = TimelineConfig::new().extra("yoyo", serde_json::Value::Bool(true));
        let el = Element::new();
        let mut timeline = Timeline::new(config.repeat(1));
        timeline.to(&Targets::from(&el), &x(10.0), &linear(1.0));

        run(&mut timeline, 2.0);
        assert_eq!(el.get(&Property::X), 0.0);
    }

    #[test]
    fn test_killed_timeline_ignores_controls() {
        let el = Element::new();
        let mut timeline = Timeline::tween(&Targets::from(&el), &x(10.0), &linear(1.0));
        timeline.kill();
        timeline.play();
        timeline.restart();
        run(&mut timeline, 1.0);
        assert_eq!(timeline.state(), PlayState::Killed);
        assert_eq!(el.get(&Property::X), 0.0);
        assert!(timeline.touches(&Targets::from(&el)));
    }
}
