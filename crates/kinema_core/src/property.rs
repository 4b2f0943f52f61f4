//! Animatable properties
//!
//! A `Property` names one numeric channel on an element. The built-in channels
//! cover the transforms and opacity that every preset works with; anything
//! else is carried as `Custom` and animated the same way.

use indexmap::IndexMap;
use std::fmt;

/// A numeric channel that an animation can drive
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Opacity,
    /// Horizontal offset in pixels
    X,
    /// Vertical offset in pixels
    Y,
    /// Uniform scale
    Scale,
    ScaleX,
    ScaleY,
    /// 2D rotation in degrees
    Rotation,
    /// 3D rotation around the horizontal axis, in degrees
    RotationX,
    /// 3D rotation around the vertical axis, in degrees
    RotationY,
    /// Any other channel, keyed by name
    Custom(String),
}

impl Property {
    /// Value the channel has when nothing has been applied to it
    pub fn baseline(&self) -> f32 {
        match self {
            Property::Opacity | Property::Scale | Property::ScaleX | Property::ScaleY => 1.0,
            _ => 0.0,
        }
    }

    /// Canonical name of the channel
    pub fn name(&self) -> &str {
        match self {
            Property::Opacity => "opacity",
            Property::X => "x",
            Property::Y => "y",
            Property::Scale => "scale",
            Property::ScaleX => "scaleX",
            Property::ScaleY => "scaleY",
            Property::Rotation => "rotation",
            Property::RotationX => "rotationX",
            Property::RotationY => "rotationY",
            Property::Custom(name) => name,
        }
    }

    /// Resolve a channel from its name
    ///
    /// Both the camelCase and snake_case spellings are accepted. Names that
    /// don't match a built-in channel become `Custom`.
    pub fn parse(name: &str) -> Self {
        match name {
            "opacity" => Property::Opacity,
            "x" => Property::X,
            "y" => Property::Y,
            "scale" => Property::Scale,
            "scaleX" | "scale_x" => Property::ScaleX,
            "scaleY" | "scale_y" => Property::ScaleY,
            "rotation" | "rotate" => Property::Rotation,
            "rotationX" | "rotation_x" => Property::RotationX,
            "rotationY" | "rotation_y" => Property::RotationY,
            other => Property::Custom(other.to_string()),
        }
    }
}

impl From<&str> for Property {
    fn from(name: &str) -> Self {
        Property::parse(name)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered set of property values
///
/// Insertion order is preserved so that values are applied to elements in the
/// order they were specified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyMap {
    values: IndexMap<Property, f32>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder pattern)
    pub fn with(mut self, property: impl Into<Property>, value: f32) -> Self {
        self.values.insert(property.into(), value);
        self
    }

    /// Insert a value, returning the previous one if present
    pub fn insert(&mut self, property: impl Into<Property>, value: f32) -> Option<f32> {
        self.values.insert(property.into(), value)
    }

    pub fn get(&self, property: &Property) -> Option<f32> {
        self.values.get(property).copied()
    }

    /// Remove a value, keeping the order of the remaining entries
    pub fn remove(&mut self, property: &Property) -> Option<f32> {
        self.values.shift_remove(property)
    }

    pub fn contains(&self, property: &Property) -> bool {
        self.values.contains_key(property)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Property, f32)> {
        self.values.iter().map(|(p, v)| (p, *v))
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.values.keys()
    }

    /// Overlay `other` on top of this map; values in `other` win
    pub fn merge(&mut self, other: &PropertyMap) {
        for (property, value) in other.iter() {
            self.values.insert(property.clone(), value);
        }
    }

    /// Return a copy of this map overlaid with `other`
    pub fn merged(&self, other: &PropertyMap) -> PropertyMap {
        let mut out = self.clone();
        out.merge(other);
        out
    }
}

impl<P: Into<Property>> FromIterator<(P, f32)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (P, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(p, v)| (p.into(), v)).collect(),
        }
    }
}

impl<P: Into<Property>, const N: usize> From<[(P, f32); N]> for PropertyMap {
    fn from(entries: [(P, f32); N]) -> Self {
        entries.into_iter().collect()
    }
}
