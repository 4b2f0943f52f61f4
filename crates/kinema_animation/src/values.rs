//! Animatable value types
//!
//! Provides the interpolation used when a timeline step renders its targets,
//! for single floats and for whole property maps.

use kinema_core::PropertyMap;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t
    ///
    /// `t` is not clamped: eased progress may overshoot 0..1 for back and
    /// elastic curves, and the result overshoots with it.
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

// ============================================================================
// PropertyMap Implementation
// ============================================================================

impl Interpolate for PropertyMap {
    /// Interpolate every property in `other`
    ///
    /// Properties missing from `self` start from their baseline. Properties
    /// only present in `self` are dropped, so the result always has the same
    /// keys as the destination.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        other
            .iter()
            .map(|(property, to)| {
                let from = self.get(property).unwrap_or_else(|| property.baseline());
                (property.clone(), from.lerp(&to, t))
            })
            .collect()
    }
}
