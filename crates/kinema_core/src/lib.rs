//! Kinema Core
//!
//! The element model shared by the animation engine and the preset layer:
//!
//! - **Properties**: the named, numeric channels an animation can drive
//!   (opacity, offsets, scale, rotation, plus free-form custom channels)
//! - **Elements**: shared handles to an animatable thing with a property store,
//!   a layout box, and a baseline that applied values can be cleared back to
//! - **Targets**: ordered collections of elements, the unit every animation
//!   call operates on
//!
//! # Example
//!
//! ```rust
//! use kinema_core::{Element, Property, PropertyMap};
//!
//! let el = Element::labeled("card");
//! assert_eq!(el.get(&Property::Opacity), 1.0);
//!
//! el.apply(&PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Y, 40.0));
//! assert_eq!(el.get(&Property::Y), 40.0);
//!
//! el.clear_props();
//! assert_eq!(el.get(&Property::Opacity), 1.0);
//! ```

pub mod element;
pub mod property;

pub use element::{Bounds, Element, ElementId, Targets};
pub use property::{Property, PropertyMap};
