//! Preset options
//!
//! `AnimationOptions` is what callers pass to every preset. Fields left unset
//! resolve in order: the preset's own default, then `MotionConfig`.
//! Keys the preset layer doesn't model are kept in `extra` and handed to the
//! engine untouched.

use crate::config::MotionConfig;
use kinema_animation::{
    Callback, Easing, ExtraOptions, ScrollTriggerConfig, TimelineConfig, TweenConfig,
};
use std::fmt;
use std::sync::Arc;

/// Caller-supplied settings for one animation
#[derive(Clone, Default)]
pub struct AnimationOptions {
    /// Seconds
    pub duration: Option<f32>,
    /// Seconds
    pub delay: Option<f32>,
    /// Ease name such as `"power2.out"`
    pub ease: Option<String>,
    /// Pixels, used by the slide presets
    pub distance: Option<f32>,
    /// Pixels, used by `shake`
    pub intensity: Option<f32>,
    /// Extra passes, used by `pulse` and timelines
    pub repeat: Option<i32>,
    /// Seconds between targets, used by the stagger presets
    pub stagger: Option<f32>,
    pub on_start: Option<Callback>,
    pub on_complete: Option<Callback>,
    /// Uninterpreted keys for the engine
    pub extra: ExtraOptions,
}

impl AnimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a loose JSON object
    ///
    /// Recognized keys are `duration`, `delay`, `ease`, `distance`,
    /// `intensity`, `repeat` and `stagger`. Anything else, including
    /// recognized keys holding the wrong type, lands in `extra`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut options = Self::default();
        let Some(object) = value.as_object() else {
            return options;
        };

        for (key, value) in object {
            let number = value.as_f64().map(|n| n as f32);
            let recognized = match key.as_str() {
                "duration" => number.map(|n| options.duration = Some(n)),
                "delay" => number.map(|n| options.delay = Some(n)),
                "distance" => number.map(|n| options.distance = Some(n)),
                "intensity" => number.map(|n| options.intensity = Some(n)),
                "stagger" => number.map(|n| options.stagger = Some(n)),
                "repeat" => value
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .map(|n| options.repeat = Some(n)),
                "ease" => value.as_str().map(|s| options.ease = Some(s.to_string())),
                _ => None,
            };
            if recognized.is_none() {
                options.extra.insert(key.clone(), value.clone());
            }
        }
        options
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = Some(seconds);
        self
    }

    pub fn ease(mut self, ease: impl Into<String>) -> Self {
        self.ease = Some(ease.into());
        self
    }

    pub fn distance(mut self, pixels: f32) -> Self {
        self.distance = Some(pixels);
        self
    }

    pub fn intensity(mut self, pixels: f32) -> Self {
        self.intensity = Some(pixels);
        self
    }

    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = Some(count);
        self
    }

    pub fn stagger(mut self, seconds: f32) -> Self {
        self.stagger = Some(seconds);
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

    /// Resolve the ease: explicit option, then `preset`, then the config
    ///
    /// A malformed explicit ease logs a warning and falls back to the config.
    pub(crate) fn resolve_ease(&self, preset: Option<&str>, config: &MotionConfig) -> Easing {
        let requested = self.ease.as_deref().or(preset);
        match requested.map(Easing::parse) {
            Some(Ok(ease)) => ease,
            Some(Err(err)) => {
                tracing::warn!("{err}, using the default ease");
                config.default_ease()
            }
            None => config.default_ease(),
        }
    }

    /// Settings for a standalone tween
    pub(crate) fn tween_config(&self, preset: &PresetDefaults, config: &MotionConfig) -> TweenConfig {
        TweenConfig {
            duration: self.duration.or(preset.duration).unwrap_or(config.duration).max(0.0),
            delay: self.delay.unwrap_or(config.delay).max(0.0),
            ease: self.resolve_ease(preset.ease, config),
            stagger: preset
                .stagger
                .then(|| self.stagger.unwrap_or(config.stagger).max(0.0))
                .unwrap_or(0.0),
            repeat: self.repeat.unwrap_or(0),
            yoyo: false,
            paused: false,
            relative: preset.relative,
            on_start: self.on_start.clone(),
            on_complete: self.on_complete.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Settings for a sequence; `repeat` falls back to `default_repeat`
    pub(crate) fn timeline_config(&self, default_repeat: i32, config: &MotionConfig) -> TimelineConfig {
        TimelineConfig {
            delay: self.delay.unwrap_or(config.delay).max(0.0),
            repeat: self.repeat.unwrap_or(default_repeat),
            yoyo: false,
            paused: false,
            persist: false,
            on_start: self.on_start.clone(),
            on_complete: self.on_complete.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl fmt::Debug for AnimationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationOptions")
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("ease", &self.ease)
            .field("distance", &self.distance)
            .field("intensity", &self.intensity)
            .field("repeat", &self.repeat)
            .field("stagger", &self.stagger)
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

/// Timing a preset supplies when the caller leaves a field unset
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PresetDefaults {
    pub duration: Option<f32>,
    pub ease: Option<&'static str>,
    /// Spread targets by the resolved stagger
    pub stagger: bool,
    /// Destination values are offsets from the current values
    pub relative: bool,
}

impl PresetDefaults {
    pub const NONE: PresetDefaults = PresetDefaults {
        duration: None,
        ease: None,
        stagger: false,
        relative: false,
    };

    pub const fn ease(ease: &'static str) -> Self {
        Self {
            ease: Some(ease),
            ..Self::NONE
        }
    }

    pub const fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub const fn staggered(mut self) -> Self {
        self.stagger = true;
        self
    }

    pub const fn relative(mut self) -> Self {
        self.relative = true;
        self
    }
}

/// Caller-supplied settings for a scroll trigger
///
/// Unset thresholds come from `MotionConfig::scroll`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScrollTriggerOptions {
    /// `"<element-edge> <viewport-edge>"`, e.g. `"top 80%"`
    pub start: Option<String>,
    pub end: Option<String>,
    pub once: bool,
    pub scrub: bool,
    pub markers: bool,
}

impl ScrollTriggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, position: impl Into<String>) -> Self {
        self.start = Some(position.into());
        self
    }

    pub fn end(mut self, position: impl Into<String>) -> Self {
        self.end = Some(position.into());
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn scrub(mut self, scrub: bool) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn markers(mut self, markers: bool) -> Self {
        self.markers = markers;
        self
    }

    /// Resolve against the config; malformed thresholds log a warning and
    /// use the configured default
    pub(crate) fn resolve(&self, config: &MotionConfig) -> ScrollTriggerConfig {
        let start = match self.start.as_deref().map(kinema_animation::ScrollPosition::parse) {
            Some(Ok(position)) => position,
            Some(Err(err)) => {
                tracing::warn!("{err}, using the default start");
                config.scroll.start_position()
            }
            None => config.scroll.start_position(),
        };
        let end = match self.end.as_deref().map(kinema_animation::ScrollPosition::parse) {
            Some(Ok(position)) => position,
            Some(Err(err)) => {
                tracing::warn!("{err}, using the default end");
                config.scroll.end_position()
            }
            None => config.scroll.end_position(),
        };

        ScrollTriggerConfig::new()
            .start(start)
            .end(end)
            .once(self.once)
            .scrub(self.scrub)
            .markers(self.markers)
    }
}
