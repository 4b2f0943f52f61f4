//! Motion configuration
//!
//! Defaults applied when an `AnimationOptions` field is left unset. They can
//! be loaded from a TOML file:
//!
//! ```toml
//! duration = 0.6
//! ease = "power3.out"
//! distance = 40
//! scoped_kill_all = true
//!
//! [scroll]
//! start = "top 80%"
//! ```
//!
//! Every field is optional; missing ones keep their documented defaults.

use crate::error::Result;
use kinema_animation::{Easing, ScrollPosition};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Fallback ease when the configured one can't be parsed
pub const DEFAULT_EASE: &str = "power2.out";

/// Option defaults and dispatcher behaviour
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Seconds
    pub duration: f32,
    /// Seconds
    pub delay: f32,
    pub ease: String,
    /// Pixels travelled by the slide presets
    pub distance: f32,
    /// Pixels travelled by `shake`
    pub intensity: f32,
    /// Extra passes of `pulse`
    pub repeat: i32,
    /// Seconds between targets in the stagger presets
    pub stagger: f32,
    /// Restrict `kill_all` to animations this dispatcher created
    pub scoped_kill_all: bool,
    pub scroll: ScrollDefaults,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            delay: 0.0,
            ease: DEFAULT_EASE.to_string(),
            distance: 100.0,
            intensity: 10.0,
            repeat: 2,
            stagger: 0.2,
            scoped_kill_all: false,
            scroll: ScrollDefaults::default(),
        }
    }
}

impl MotionConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: MotionConfig = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// The default ease, falling back to `power2.out` if misconfigured
    pub fn default_ease(&self) -> Easing {
        match Easing::parse(&self.ease) {
            Ok(ease) => ease,
            Err(err) => {
                tracing::warn!(ease = %self.ease, "{err}, using {DEFAULT_EASE}");
                Easing::parse(DEFAULT_EASE).unwrap_or_default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        for (name, value) in [
            ("duration", &mut self.duration),
            ("delay", &mut self.delay),
            ("stagger", &mut self.stagger),
        ] {
            if !(value.is_finite() && *value >= 0.0) {
                tracing::warn!(field = name, value = *value, "negative or non-finite time in motion config, using 0");
                *value = 0.0;
            }
        }
        self
    }
}

/// Default thresholds for scroll triggers
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollDefaults {
    pub start: String,
    pub end: String,
}

impl Default for ScrollDefaults {
    fn default() -> Self {
        Self {
            start: "top bottom".to_string(),
            end: "bottom top".to_string(),
        }
    }
}

impl ScrollDefaults {
    pub fn start_position(&self) -> ScrollPosition {
        parse_or_fallback(&self.start, "top bottom")
    }

    pub fn end_position(&self) -> ScrollPosition {
        parse_or_fallback(&self.end, "bottom top")
    }
}

fn parse_or_fallback(text: &str, fallback: &str) -> ScrollPosition {
    ScrollPosition::parse(text)
        .or_else(|err| {
            tracing::warn!("{err} in motion config, using \"{fallback}\"");
            ScrollPosition::parse(fallback)
        })
        .unwrap_or_else(|_| {
            ScrollPosition::new(kinema_animation::Edge::Top, kinema_animation::Edge::Bottom)
        })
}
