//! Kinema Animation Engine
//!
//! Tweening, sequencing, and scroll observation for `kinema_core` elements.
//!
//! # Features
//!
//! - **Easing**: Named curves (`power2.out`, `back.out(1.7)`, `elastic.out(1, 0.5)`, ...)
//! - **Timelines**: Ordered tweens and callbacks with stagger, delay, repeat and yoyo
//! - **Scheduler**: Frame-driven reference engine behind the `AnimationEngine` trait
//! - **Scroll Observation**: Viewport thresholds behind the `ScrollObserver` trait

pub mod easing;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod scroll;
pub mod timeline;
pub mod values;

pub use easing::{EaseCurve, EaseDirection, Easing};
pub use engine::AnimationEngine;
pub use error::{AnimationError, Result};
pub use scheduler::{AnimationId, Scheduler, SchedulerHandle};
pub use scroll::{
    Edge, EdgeOffset, ScrollCallback, ScrollEvent, ScrollEventKind, ScrollObserver,
    ScrollPosition, ScrollTracker, ScrollTriggerConfig, ScrollTriggerId,
};
pub use timeline::{Callback, ExtraOptions, PlayState, Timeline, TimelineConfig, TweenConfig};
pub use values::Interpolate;
