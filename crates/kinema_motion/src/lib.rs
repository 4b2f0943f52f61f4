//! Kinema Motion
//!
//! Named animation intents over a pluggable animation engine.
//!
//! # Features
//!
//! - **Presets**: fades, slides, scale, rotation, bounce, elastic, flip, shake, pulse
//! - **Stagger Variants**: the same intents spread across many targets
//! - **Timeline Registry**: build a sequence under a name, drive it from anywhere
//! - **Scroll Triggers**: pass-through to the host's scroll observer
//! - **Bulk Cancellation**: every handle the animator produces is tracked
//!
//! # Example
//!
//! ```rust
//! use kinema_animation::Scheduler;
//! use kinema_core::{Element, Property};
//! use kinema_motion::{AnimationOptions, Animator, Host};
//!
//! let scheduler = Scheduler::new();
//! let animator = Animator::with_host(Host::new().with_engine(scheduler.clone())).unwrap();
//!
//! let card = Element::labeled("card");
//! animator.fade_in(&card, &AnimationOptions::new().duration(0.5));
//! assert_eq!(card.get(&Property::Opacity), 0.0);
//!
//! scheduler.advance(0.5);
//! assert_eq!(card.get(&Property::Opacity), 1.0);
//! ```

pub mod animator;
pub mod config;
pub mod error;
pub mod host;
pub mod options;
pub mod presets;
pub mod registry;

pub use animator::Animator;
pub use config::{MotionConfig, ScrollDefaults};
pub use error::{MotionError, Result};
pub use host::{is_engine_initialized, set_global_engine, set_global_scroll_observer, Host};
pub use options::{AnimationOptions, ScrollTriggerOptions};
pub use registry::TimelineRegistry;

/// Opaque handle to one tween or sequence produced by an `Animator`
pub type AnimationHandle = kinema_animation::AnimationId;

/// Opaque handle to a named timeline
pub type TimelineHandle = kinema_animation::AnimationId;

/// Opaque handle to a scroll trigger
pub type ScrollTriggerHandle = kinema_animation::ScrollTriggerId;
