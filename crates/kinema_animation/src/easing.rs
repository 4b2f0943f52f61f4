//! Easing curves
//!
//! An `Easing` maps normalized elapsed time to normalized progress. Curves are
//! defined once as their "in" form; the "out" and "inOut" variants are derived
//! from it, so every family supports all three directions.
//!
//! Eases can be parsed from their conventional names:
//!
//! ```rust
//! use kinema_animation::Easing;
//!
//! let ease: Easing = "back.out(1.7)".parse().unwrap();
//! assert_eq!(ease.apply(0.0), 0.0);
//! assert_eq!(ease.apply(1.0), 1.0);
//! assert!(ease.apply(0.8) > 1.0); // overshoot
//! ```

use crate::error::{AnimationError, Result};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

/// Which end of the curve the shaping is applied to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EaseDirection {
    In,
    #[default]
    Out,
    InOut,
}

/// Curve family
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EaseCurve {
    Linear,
    /// Polynomial of degree `power + 1` (power1 = quad ... power4 = quint)
    Power(u8),
    Sine,
    Expo,
    Circ,
    Back { overshoot: f32 },
    Elastic { amplitude: f32, period: f32 },
    Bounce,
}

impl EaseCurve {
    fn ease_in(&self, t: f32) -> f32 {
        match *self {
            EaseCurve::Linear => t,
            EaseCurve::Power(power) => t.powi(power as i32 + 1),
            EaseCurve::Sine => 1.0 - (t * FRAC_PI_2).cos(),
            EaseCurve::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            EaseCurve::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            EaseCurve::Back { overshoot } => t * t * ((overshoot + 1.0) * t - overshoot),
            EaseCurve::Elastic { amplitude, period } => 1.0 - elastic_out(1.0 - t, amplitude, period),
            EaseCurve::Bounce => 1.0 - bounce_out(1.0 - t),
        }
    }
}

fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    let amplitude = amplitude.max(1.0);
    let period = if period > 0.0 { period } else { 0.3 };
    let shift = period / TAU * (1.0 / amplitude).asin();
    amplitude * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / period).sin() + 1.0
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// A named easing function
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Easing {
    pub curve: EaseCurve,
    pub direction: EaseDirection,
}

impl Easing {
    pub const LINEAR: Easing = Easing {
        curve: EaseCurve::Linear,
        direction: EaseDirection::Out,
    };

    pub fn new(curve: EaseCurve, direction: EaseDirection) -> Self {
        Self { curve, direction }
    }

    pub fn power(power: u8, direction: EaseDirection) -> Self {
        Self::new(EaseCurve::Power(power), direction)
    }

    pub fn back_in(overshoot: f32) -> Self {
        Self::new(EaseCurve::Back { overshoot }, EaseDirection::In)
    }

    pub fn back_out(overshoot: f32) -> Self {
        Self::new(EaseCurve::Back { overshoot }, EaseDirection::Out)
    }

    pub fn elastic_out(amplitude: f32, period: f32) -> Self {
        Self::new(EaseCurve::Elastic { amplitude, period }, EaseDirection::Out)
    }

    pub fn bounce_out() -> Self {
        Self::new(EaseCurve::Bounce, EaseDirection::Out)
    }

    /// Parse a conventional ease name such as `"power2.out"`,
    /// `"back.in(1.7)"` or `"elastic.out(1, 0.5)"`
    ///
    /// A missing direction means `out`. Parameters are only read by the
    /// `back` (overshoot) and `elastic` (amplitude, period) families.
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = || AnimationError::InvalidEase(name.to_string());
        let name = name.trim();

        let (head, args) = match name.find('(') {
            Some(open) => {
                let inner = name[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
                (&name[..open], Some(inner))
            }
            None => (name, None),
        };

        let params = match args {
            Some(inner) if !inner.trim().is_empty() => inner
                .split(',')
                .map(|p| p.trim().parse::<f32>().map_err(|_| invalid()))
                .collect::<Result<Vec<f32>>>()?,
            _ => Vec::new(),
        };

        let mut parts = head.split('.');
        let family = parts.next().unwrap_or_default().to_ascii_lowercase();
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("out") => EaseDirection::Out,
            Some("in") => EaseDirection::In,
            Some("inout") => EaseDirection::InOut,
            Some(_) => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        let curve = match family.as_str() {
            "linear" | "none" | "power0" => EaseCurve::Linear,
            "power1" | "quad" => EaseCurve::Power(1),
            "power2" | "cubic" => EaseCurve::Power(2),
            "power3" | "quart" => EaseCurve::Power(3),
            "power4" | "quint" | "strong" => EaseCurve::Power(4),
            "sine" => EaseCurve::Sine,
            "expo" => EaseCurve::Expo,
            "circ" => EaseCurve::Circ,
            "back" => EaseCurve::Back {
                overshoot: params.first().copied().unwrap_or(1.7),
            },
            "elastic" => EaseCurve::Elastic {
                amplitude: params.first().copied().unwrap_or(1.0),
                period: params.get(1).copied().unwrap_or(0.3),
            },
            "bounce" => EaseCurve::Bounce,
            _ => return Err(invalid()),
        };

        Ok(Self { curve, direction })
    }

    /// Map linear progress `t` (clamped to 0..1) to eased progress
    ///
    /// The endpoints are exact: `apply(0.0) == 0.0` and `apply(1.0) == 1.0`.
    /// In between, back and elastic curves may leave the 0..1 range.
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match self.direction {
            EaseDirection::In => self.curve.ease_in(t),
            EaseDirection::Out => 1.0 - self.curve.ease_in(1.0 - t),
            EaseDirection::InOut => {
                if t < 0.5 {
                    self.curve.ease_in(t * 2.0) * 0.5
                } else {
                    1.0 - self.curve.ease_in((1.0 - t) * 2.0) * 0.5
                }
            }
        }
    }
}

impl Default for Easing {
    /// `power1.out`
    fn default() -> Self {
        Self::power(1, EaseDirection::Out)
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        Easing::parse(s)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            EaseDirection::In => "in",
            EaseDirection::Out => "out",
            EaseDirection::InOut => "inOut",
        };
        match self.curve {
            EaseCurve::Linear => f.write_str("none"),
            EaseCurve::Power(power) => write!(f, "power{power}.{direction}"),
            EaseCurve::Sine => write!(f, "sine.{direction}"),
            EaseCurve::Expo => write!(f, "expo.{direction}"),
            EaseCurve::Circ => write!(f, "circ.{direction}"),
            EaseCurve::Back { overshoot } => write!(f, "back.{direction}({overshoot})"),
            EaseCurve::Elastic { amplitude, period } => {
                write!(f, "elastic.{direction}({amplitude}, {period})")
            }
            EaseCurve::Bounce => write!(f, "bounce.{direction}"),
        }
    }
}
