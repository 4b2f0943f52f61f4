//! Animatable elements
//!
//! An `Element` is a cheap, cloneable handle to shared element state. Every
//! clone refers to the same element, so the animation engine can hold targets
//! while the caller keeps its own handle to read values back.
//!
//! Values written by animations are kept separately from the baseline, which
//! lets `clear_props()` restore an element to its unanimated state.

use crate::property::{Property, PropertyMap};
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of an element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Vertical layout box of an element, in document pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub top: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> f32 {
        self.top + self.height * 0.5
    }
}

struct ElementState {
    applied: PropertyMap,
    bounds: Bounds,
}

/// Shared handle to an animatable element
#[derive(Clone)]
pub struct Element {
    id: ElementId,
    label: Option<Arc<str>>,
    state: Arc<Mutex<ElementState>>,
}

impl Element {
    pub fn new() -> Self {
        Self {
            id: ElementId::next(),
            label: None,
            state: Arc::new(Mutex::new(ElementState {
                applied: PropertyMap::new(),
                bounds: Bounds::default(),
            })),
        }
    }

    /// Create an element with a label (used in logs)
    pub fn labeled(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::new()
        }
    }

    /// Set the layout box (builder pattern)
    pub fn with_bounds(self, bounds: Bounds) -> Self {
        self.set_bounds(bounds);
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Current value of a property, falling back to its baseline
    pub fn get(&self, property: &Property) -> f32 {
        self.lock()
            .applied
            .get(property)
            .unwrap_or_else(|| property.baseline())
    }

    pub fn set(&self, property: impl Into<Property>, value: f32) {
        self.lock().applied.insert(property.into(), value);
    }

    /// Write every value in `values`
    pub fn apply(&self, values: &PropertyMap) {
        self.lock().applied.merge(values);
    }

    /// Snapshot of the values that have been written to this element
    pub fn applied(&self) -> PropertyMap {
        self.lock().applied.clone()
    }

    /// Read the current values of `properties`
    pub fn snapshot<'a>(&self, properties: impl IntoIterator<Item = &'a Property>) -> PropertyMap {
        let state = self.lock();
        properties
            .into_iter()
            .map(|p| {
                let value = state.applied.get(p).unwrap_or_else(|| p.baseline());
                (p.clone(), value)
            })
            .collect()
    }

    /// Drop every applied value, restoring the baseline
    pub fn clear_props(&self) {
        self.lock().applied = PropertyMap::new();
    }

    /// Drop one applied value
    pub fn clear_prop(&self, property: &Property) {
        self.lock().applied.remove(property);
    }

    pub fn bounds(&self) -> Bounds {
        self.lock().bounds
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        self.lock().bounds = bounds;
    }

    fn lock(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Element {}

impl std::hash::Hash for Element {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id.0)
            .field("label", &self.label)
            .finish()
    }
}

/// An ordered collection of elements that one animation call targets
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Targets(SmallVec<[Element; 4]>);

impl Targets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.0.push(element);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Element> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Element] {
        &self.0
    }

    pub fn contains(&self, element: &Element) -> bool {
        self.0.iter().any(|e| e == element)
    }

    /// Check whether any element is shared with `other`
    pub fn intersects(&self, other: &Targets) -> bool {
        self.0.iter().any(|e| other.contains(e))
    }

    /// Write the same values to every element
    pub fn apply(&self, values: &PropertyMap) {
        for element in &self.0 {
            element.apply(values);
        }
    }
}

impl From<Element> for Targets {
    fn from(element: Element) -> Self {
        Targets(smallvec::smallvec![element])
    }
}

impl From<&Element> for Targets {
    fn from(element: &Element) -> Self {
        Targets::from(element.clone())
    }
}

impl From<Vec<Element>> for Targets {
    fn from(elements: Vec<Element>) -> Self {
        Targets(SmallVec::from_vec(elements))
    }
}

impl From<&[Element]> for Targets {
    fn from(elements: &[Element]) -> Self {
        Targets(elements.iter().cloned().collect())
    }
}

impl From<&Vec<Element>> for Targets {
    fn from(elements: &Vec<Element>) -> Self {
        Targets::from(elements.as_slice())
    }
}

impl From<&Targets> for Targets {
    fn from(targets: &Targets) -> Self {
        targets.clone()
    }
}

impl FromIterator<Element> for Targets {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Targets(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
