//! Animation engine capability
//!
//! `AnimationEngine` is the seam between the preset layer and whatever
//! actually moves properties over time. The crate's own [`Scheduler`] is one
//! implementation; hosts can substitute their own backend or a test double.
//!
//! [`Scheduler`]: crate::scheduler::Scheduler

use crate::scheduler::AnimationId;
use crate::timeline::{Callback, PlayState, TimelineConfig, TweenConfig};
use kinema_core::{PropertyMap, Targets};

/// Capability to tween element properties over time
///
/// Handles are opaque `AnimationId`s. Every operation on an id the engine no
/// longer knows about is a no-op.
pub trait AnimationEngine: Send + Sync {
    /// Animate `targets` from their current values to `to`
    fn animate(&self, targets: &Targets, to: &PropertyMap, config: TweenConfig) -> AnimationId;

    /// Write `values` to `targets` immediately
    fn set(&self, targets: &Targets, values: &PropertyMap);

    /// Create an empty sequence that steps can be appended to
    fn create_sequence(&self, config: TimelineConfig) -> AnimationId;

    /// Append a tween to the end of a sequence
    ///
    /// Returns `false` if the sequence doesn't exist.
    fn add_step(
        &self,
        sequence: AnimationId,
        targets: &Targets,
        to: &PropertyMap,
        config: TweenConfig,
    ) -> bool;

    /// Append a callback to the end of a sequence
    fn add_call(&self, sequence: AnimationId, callback: Callback) -> bool;

    fn play(&self, id: AnimationId);

    fn pause(&self, id: AnimationId);

    fn resume(&self, id: AnimationId);

    fn reverse(&self, id: AnimationId);

    fn restart(&self, id: AnimationId);

    /// Move the playhead to `time` seconds without firing callbacks
    fn seek(&self, id: AnimationId, time: f32);

    /// Stop and forget one animation; returns whether it existed
    fn kill(&self, id: AnimationId) -> bool;

    /// Stop and forget every animation the engine knows about
    fn kill_all(&self) -> usize;

    /// Stop and forget every animation touching any of `targets`
    fn kill_targets(&self, targets: &Targets) -> Vec<AnimationId>;

    /// Check whether a live animation drives any of `targets`
    fn touches(&self, id: AnimationId, targets: &Targets) -> bool;

    fn state(&self, id: AnimationId) -> Option<PlayState>;

    fn progress(&self, id: AnimationId) -> Option<f32>;

    /// Check if an animation exists and is currently playing
    fn is_active(&self, id: AnimationId) -> bool {
        self.state(id) == Some(PlayState::Playing)
    }
}
