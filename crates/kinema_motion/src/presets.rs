//! Named animation presets
//!
//! Each preset maps an intent onto an initial state, an end state, and
//! timing defaults, then submits it through the `Animator` primitives.
//! Callers override any default through `AnimationOptions`.

use crate::animator::Animator;
use crate::options::{AnimationOptions, PresetDefaults};
use crate::AnimationHandle;
use kinema_core::{Property, PropertyMap, Targets};

/// Length of each of the five shake steps
pub const SHAKE_STEP: f32 = 0.1;
/// Length of each half of a pulse
pub const PULSE_STEP: f32 = 0.3;
/// Peak scale of a pulse
pub const PULSE_SCALE: f32 = 1.1;

const BACK_OUT: &str = "back.out(1.7)";
const BACK_IN: &str = "back.in(1.7)";

fn visible() -> PropertyMap {
    PropertyMap::new().with(Property::Opacity, 1.0)
}

fn hidden() -> PropertyMap {
    PropertyMap::new().with(Property::Opacity, 0.0)
}

/// Sign of the starting offset for each slide direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slide {
    Up,
    Down,
    Left,
    Right,
}

impl Slide {
    fn offset(self, distance: f32) -> PropertyMap {
        match self {
            Slide::Up => hidden().with(Property::Y, distance),
            Slide::Down => hidden().with(Property::Y, -distance),
            Slide::Left => hidden().with(Property::X, distance),
            Slide::Right => hidden().with(Property::X, -distance),
        }
    }

    fn settled(self) -> PropertyMap {
        let axis = match self {
            Slide::Up | Slide::Down => Property::Y,
            Slide::Left | Slide::Right => Property::X,
        };
        visible().with(axis, 0.0)
    }
}

impl Animator {
    // =========================================================================
    // Fades
    // =========================================================================

    /// Set opacity to 0, then animate it to 1
    pub fn fade_in(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.preset_tween(
            &targets.into(),
            Some(&hidden()),
            &visible(),
            options,
            PresetDefaults::NONE,
        )
    }

    /// Animate opacity to 0 from wherever it is
    pub fn fade_out(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.preset_tween(&targets.into(), None, &hidden(), options, PresetDefaults::NONE)
    }

    // =========================================================================
    // Slides
    // =========================================================================

    /// Rise into place from `distance` pixels below
    pub fn slide_up(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.slide(&targets.into(), Slide::Up, options, PresetDefaults::NONE)
    }

    /// Drop into place from `distance` pixels above
    pub fn slide_down(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.slide(&targets.into(), Slide::Down, options, PresetDefaults::NONE)
    }

    /// Move in from `distance` pixels to the right
    pub fn slide_left(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.slide(&targets.into(), Slide::Left, options, PresetDefaults::NONE)
    }

    /// Move in from `distance` pixels to the left
    pub fn slide_right(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.slide(&targets.into(), Slide::Right, options, PresetDefaults::NONE)
    }

    fn slide(
        &self,
        targets: &Targets,
        direction: Slide,
        options: &AnimationOptions,
        preset: PresetDefaults,
    ) -> AnimationHandle {
        let distance = options.distance.unwrap_or(self.config().distance);
        self.preset_tween(
            targets,
            Some(&direction.offset(distance)),
            &direction.settled(),
            options,
            preset,
        )
    }

    // =========================================================================
    // Scale and rotation
    // =========================================================================

    /// Grow from nothing with a slight overshoot
    pub fn scale_up(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.scale_in(&targets.into(), options, PresetDefaults::ease(BACK_OUT))
    }

    fn scale_in(&self, targets: &Targets, options: &AnimationOptions, preset: PresetDefaults) -> AnimationHandle {
        self.preset_tween(
            targets,
            Some(&hidden().with(Property::Scale, 0.0)),
            &visible().with(Property::Scale, 1.0),
            options,
            preset,
        )
    }

    /// Shrink to nothing, pulling back first
    pub fn scale_down(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.preset_tween(
            &targets.into(),
            None,
            &hidden().with(Property::Scale, 0.0),
            options,
            PresetDefaults::ease(BACK_IN),
        )
    }

    /// Spin in from -180 degrees while growing
    pub fn rotate_in(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        let initial = hidden()
            .with(Property::Rotation, -180.0)
            .with(Property::Scale, 0.0);
        let settled = visible()
            .with(Property::Rotation, 0.0)
            .with(Property::Scale, 1.0);
        self.preset_tween(
            &targets.into(),
            Some(&initial),
            &settled,
            options,
            PresetDefaults::ease(BACK_OUT),
        )
    }

    /// Spin out to 180 degrees while shrinking
    pub fn rotate_out(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        let gone = hidden()
            .with(Property::Rotation, 180.0)
            .with(Property::Scale, 0.0);
        self.preset_tween(&targets.into(), None, &gone, options, PresetDefaults::ease(BACK_IN))
    }

    // =========================================================================
    // Physical
    // =========================================================================

    /// Drop in from 100 pixels above and bounce to rest
    pub fn bounce_in(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.preset_tween(
            &targets.into(),
            Some(&hidden().with(Property::Y, -100.0)),
            &visible().with(Property::Y, 0.0),
            options,
            PresetDefaults::ease("bounce.out").with_duration(1.5),
        )
    }

    /// Spring in from nothing
    pub fn elastic(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.scale_in(
            &targets.into(),
            options,
            PresetDefaults::ease("elastic.out(1, 0.5)").with_duration(1.5),
        )
    }

    /// Turn a full revolution around the Y axis from the current angle
    pub fn flip(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.preset_tween(
            &targets.into(),
            None,
            &PropertyMap::new().with(Property::RotationY, 360.0),
            options,
            PresetDefaults::NONE.with_duration(1.0).relative(),
        )
    }

    /// Jolt sideways by `intensity` pixels and settle
    ///
    /// Always five steps of `SHAKE_STEP` seconds; `duration` is ignored.
    pub fn shake(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        let i = options.intensity.unwrap_or(self.config().intensity);
        let steps: Vec<(PropertyMap, f32)> = [-i, i, -i, i, 0.0]
            .into_iter()
            .map(|x| (PropertyMap::new().with(Property::X, x), SHAKE_STEP))
            .collect();
        self.sequence(&targets.into(), &steps, options, 0)
    }

    /// Swell to `PULSE_SCALE` and back, `repeat` extra times
    pub fn pulse(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        let steps = [
            (PropertyMap::new().with(Property::Scale, PULSE_SCALE), PULSE_STEP),
            (PropertyMap::new().with(Property::Scale, 1.0), PULSE_STEP),
        ];
        self.sequence(&targets.into(), &steps, options, self.config().repeat)
    }

    // =========================================================================
    // Staggered
    // =========================================================================

    /// `fade_in` each target `stagger` seconds after the previous
    pub fn stagger_fade_in(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.preset_tween(
            &targets.into(),
            Some(&hidden()),
            &visible(),
            options,
            PresetDefaults::NONE.staggered(),
        )
    }

    /// `slide_up` each target `stagger` seconds after the previous
    pub fn stagger_slide_up(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.slide(&targets.into(), Slide::Up, options, PresetDefaults::NONE.staggered())
    }

    /// `scale_up` each target `stagger` seconds after the previous
    pub fn stagger_scale(&self, targets: impl Into<Targets>, options: &AnimationOptions) -> AnimationHandle {
        self.scale_in(
            &targets.into(),
            options,
            PresetDefaults::ease(BACK_OUT).staggered(),
        )
    }
}
