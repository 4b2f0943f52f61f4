//! Scroll observation
//!
//! `ScrollObserver` is the capability that watches elements against the
//! viewport and reports when they cross configured thresholds. The reference
//! implementation, [`ScrollTracker`], is fed by the host: it records the
//! viewport height and scroll offset, and evaluates every trigger once per
//! [`ScrollTracker::update`] call, typically from the frame callback.
//!
//! # Thresholds
//!
//! A threshold such as `"top 80%"` reads "when the element's top meets the
//! point 80% down the viewport". Each half is an edge (`top`, `center`,
//! `bottom`, `N%` or `Npx`) optionally followed by a `+=N` / `-=N` pixel
//! offset. The trigger is active while the scroll offset lies between its
//! resolved `start` and `end`.

use crate::error::{AnimationError, Result};
use kinema_core::{Bounds, Targets};
use slotmap::{new_key_type, SlotMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

new_key_type! {
    /// Handle to a registered scroll trigger
    pub struct ScrollTriggerId;
}

// ============================================================================
// Thresholds
// ============================================================================

/// Reference line on an element or on the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Percentage of the height, measured from the top
    Percent(f32),
    /// Pixels from the top
    Pixels(f32),
}

/// An edge plus a pixel offset (`"top+=20"`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeOffset {
    pub edge: Edge,
    pub offset: f32,
}

impl EdgeOffset {
    pub fn new(edge: Edge) -> Self {
        Self { edge, offset: 0.0 }
    }

    /// Position of this line within a box starting at `origin` of `extent` pixels
    fn resolve(&self, origin: f32, extent: f32) -> f32 {
        let base = match self.edge {
            Edge::Top => 0.0,
            Edge::Center => extent * 0.5,
            Edge::Bottom => extent,
            Edge::Percent(p) => extent * p / 100.0,
            Edge::Pixels(px) => px,
        };
        origin + base + self.offset
    }

    fn parse(token: &str) -> Option<Self> {
        let (edge, offset) = match token.find("+=").or_else(|| token.find("-=")) {
            Some(at) => {
                let magnitude: f32 = token[at + 2..].trim().parse().ok()?;
                let sign = if token[at..].starts_with('-') { -1.0 } else { 1.0 };
                (&token[..at], sign * magnitude)
            }
            None => (token, 0.0),
        };

        let edge = match edge.trim().to_ascii_lowercase().as_str() {
            "top" => Edge::Top,
            "center" => Edge::Center,
            "bottom" => Edge::Bottom,
            other => {
                if let Some(percent) = other.strip_suffix('%') {
                    Edge::Percent(percent.trim().parse().ok()?)
                } else {
                    let pixels = other.strip_suffix("px").unwrap_or(other);
                    Edge::Pixels(pixels.trim().parse().ok()?)
                }
            }
        };

        Some(Self { edge, offset })
    }
}

impl fmt::Display for EdgeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.edge {
            Edge::Top => write!(f, "top")?,
            Edge::Center => write!(f, "center")?,
            Edge::Bottom => write!(f, "bottom")?,
            Edge::Percent(p) => write!(f, "{p}%")?,
            Edge::Pixels(px) => write!(f, "{px}px")?,
        }
        if self.offset > 0.0 {
            write!(f, "+={}", self.offset)?;
        } else if self.offset < 0.0 {
            write!(f, "-={}", -self.offset)?;
        }
        Ok(())
    }
}

/// A scroll threshold: where an element line meets a viewport line
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollPosition {
    pub element: EdgeOffset,
    pub viewport: EdgeOffset,
}

impl ScrollPosition {
    pub fn new(element: Edge, viewport: Edge) -> Self {
        Self {
            element: EdgeOffset::new(element),
            viewport: EdgeOffset::new(viewport),
        }
    }

    /// Parse `"<element-edge> <viewport-edge>"`, e.g. `"top 80%"` or
    /// `"center center+=50"`
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || AnimationError::InvalidScrollPosition(text.to_string());
        let mut tokens = text.split_whitespace();
        let (Some(element), Some(viewport), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(invalid());
        };

        Ok(Self {
            element: EdgeOffset::parse(element).ok_or_else(invalid)?,
            viewport: EdgeOffset::parse(viewport).ok_or_else(invalid)?,
        })
    }

    /// Scroll offset at which the two lines coincide
    pub fn resolve(&self, bounds: Bounds, viewport_height: f32) -> f32 {
        let element_line = self.element.resolve(bounds.top, bounds.height);
        let viewport_line = self.viewport.resolve(0.0, viewport_height);
        element_line - viewport_line
    }
}

impl FromStr for ScrollPosition {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ScrollPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

// ============================================================================
// Configuration and events
// ============================================================================

/// Settings for one scroll trigger
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollTriggerConfig {
    /// Becomes active once scrolled past this threshold (default `top bottom`)
    pub start: ScrollPosition,
    /// Stops being active past this threshold (default `bottom top`)
    pub end: ScrollPosition,
    /// Stop observing after the first `Enter`
    pub once: bool,
    /// Also report continuous progress while active
    pub scrub: bool,
    /// Log the resolved thresholds
    pub markers: bool,
}

impl ScrollTriggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: ScrollPosition) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: ScrollPosition) -> Self {
        self.end = end;
        self
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn scrub(mut self, scrub: bool) -> Self {
        self.scrub = scrub;
        self
    }

    pub fn markers(mut self, markers: bool) -> Self {
        self.markers = markers;
        self
    }
}

impl Default for ScrollTriggerConfig {
    fn default() -> Self {
        Self {
            start: ScrollPosition::new(Edge::Top, Edge::Bottom),
            end: ScrollPosition::new(Edge::Bottom, Edge::Top),
            once: false,
            scrub: false,
            markers: false,
        }
    }
}

/// What happened to a trigger during an update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollEventKind {
    /// Scrolled forward past `start`
    Enter,
    /// Scrolled forward past `end`
    Leave,
    /// Scrolled backward past `end`
    EnterBack,
    /// Scrolled backward past `start`
    LeaveBack,
    /// Progress changed while scrubbing
    Update,
}

/// Notification delivered to a scroll callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    pub kind: ScrollEventKind,
    /// Position between `start` (0.0) and `end` (1.0)
    pub progress: f32,
    /// Scroll offset at evaluation time
    pub scroll: f32,
}

/// Callback receiving scroll notifications
pub type ScrollCallback = Arc<dyn Fn(&ScrollEvent) + Send + Sync>;

// ============================================================================
// Capability
// ============================================================================

/// Capability to watch elements against the viewport
pub trait ScrollObserver: Send + Sync {
    /// Start watching the first of `targets`
    fn observe(
        &self,
        targets: &Targets,
        config: ScrollTriggerConfig,
        callback: ScrollCallback,
    ) -> ScrollTriggerId;

    /// Stop one trigger; returns whether it existed
    fn kill(&self, id: ScrollTriggerId) -> bool;

    /// Check whether a trigger is still being watched
    ///
    /// `once` triggers stop being watched after their first enter.
    fn is_observing(&self, id: ScrollTriggerId) -> bool;

    /// Stop every trigger
    fn kill_all(&self) -> usize;
}

// ============================================================================
// Reference tracker
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Before,
    Active,
    After,
}

struct Trigger {
    targets: Targets,
    config: ScrollTriggerConfig,
    callback: ScrollCallback,
    zone: Zone,
    progress: f32,
}

impl Trigger {
    fn thresholds(&self, viewport_height: f32) -> (f32, f32) {
        let bounds = self.targets.first().map(|el| el.bounds()).unwrap_or_default();
        (
            self.config.start.resolve(bounds, viewport_height),
            self.config.end.resolve(bounds, viewport_height),
        )
    }

    /// Move to the zone containing `scroll`, collecting the crossings
    fn evaluate(&mut self, scroll: f32, viewport_height: f32, events: &mut Vec<ScrollEventKind>) {
        let (start, end) = self.thresholds(viewport_height);
        let zone = if scroll < start {
            Zone::Before
        } else if scroll <= end {
            Zone::Active
        } else {
            Zone::After
        };

        match (self.zone, zone) {
            (Zone::Before, Zone::Active) => events.push(ScrollEventKind::Enter),
            (Zone::Before, Zone::After) => {
                events.extend([ScrollEventKind::Enter, ScrollEventKind::Leave])
            }
            (Zone::Active, Zone::After) => events.push(ScrollEventKind::Leave),
            (Zone::After, Zone::Active) => events.push(ScrollEventKind::EnterBack),
            (Zone::After, Zone::Before) => {
                events.extend([ScrollEventKind::EnterBack, ScrollEventKind::LeaveBack])
            }
            (Zone::Active, Zone::Before) => events.push(ScrollEventKind::LeaveBack),
            _ => {}
        }
        self.zone = zone;

        let span = end - start;
        let progress = if span > 0.0 {
            ((scroll - start) / span).clamp(0.0, 1.0)
        } else if scroll >= start {
            1.0
        } else {
            0.0
        };
        if self.config.scrub && progress != self.progress {
            events.push(ScrollEventKind::Update);
        }
        self.progress = progress;
    }
}

struct TrackerInner {
    triggers: SlotMap<ScrollTriggerId, Trigger>,
    viewport_height: f32,
    scroll: f32,
}

/// Reference `ScrollObserver` driven by host-supplied scroll state
///
/// Cloning yields another handle to the same tracker.
#[derive(Clone)]
pub struct ScrollTracker {
    inner: Arc<Mutex<TrackerInner>>,
}

impl ScrollTracker {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerInner {
                triggers: SlotMap::with_key(),
                viewport_height,
                scroll: 0.0,
            })),
        }
    }

    pub fn set_viewport(&self, height: f32) {
        self.lock().viewport_height = height.max(0.0);
    }

    /// Record the scroll offset; evaluation waits for the next `update()`
    pub fn set_scroll(&self, offset: f32) {
        self.lock().scroll = offset;
    }

    pub fn scroll(&self) -> f32 {
        self.lock().scroll
    }

    /// Number of live triggers
    pub fn count(&self) -> usize {
        self.lock().triggers.len()
    }

    /// Resolved `(start, end)` scroll offsets of a trigger
    pub fn thresholds(&self, id: ScrollTriggerId) -> Option<(f32, f32)> {
        let inner = self.lock();
        let viewport_height = inner.viewport_height;
        inner.triggers.get(id).map(|t| t.thresholds(viewport_height))
    }

    /// Evaluate every trigger against the current scroll offset
    ///
    /// Returns the number of events delivered.
    pub fn update(&self) -> usize {
        let mut deliveries: Vec<(ScrollCallback, ScrollEvent)> = Vec::new();
        {
            let mut inner = self.lock();
            let scroll = inner.scroll;
            let viewport_height = inner.viewport_height;
            let mut finished = Vec::new();
            let mut kinds = Vec::new();

            for (id, trigger) in inner.triggers.iter_mut() {
                kinds.clear();
                trigger.evaluate(scroll, viewport_height, &mut kinds);
                for kind in &kinds {
                    deliveries.push((
                        trigger.callback.clone(),
                        ScrollEvent {
                            kind: *kind,
                            progress: trigger.progress,
                            scroll,
                        },
                    ));
                    if trigger.config.once && *kind == ScrollEventKind::Enter {
                        finished.push(id);
                        break;
                    }
                }
            }

            for id in finished {
                inner.triggers.remove(id);
                tracing::trace!(?id, "scroll trigger fired once, removed");
            }
        }

        let delivered = deliveries.len();
        for (callback, event) in deliveries {
            callback(&event);
        }
        delivered
    }

    fn lock(&self) -> MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScrollObserver for ScrollTracker {
    fn observe(
        &self,
        targets: &Targets,
        config: ScrollTriggerConfig,
        callback: ScrollCallback,
    ) -> ScrollTriggerId {
        if targets.is_empty() {
            tracing::warn!("scroll trigger requested with no targets");
            return ScrollTriggerId::default();
        }

        let mut inner = self.lock();
        let trigger = Trigger {
            targets: targets.clone(),
            config,
            callback,
            zone: Zone::Before,
            progress: 0.0,
        };
        if trigger.config.markers {
            let (start, end) = trigger.thresholds(inner.viewport_height);
            tracing::debug!(
                start = %trigger.config.start,
                end = %trigger.config.end,
                start_px = start,
                end_px = end,
                "scroll trigger markers"
            );
        }
        inner.triggers.insert(trigger)
    }

    fn kill(&self, id: ScrollTriggerId) -> bool {
        self.lock().triggers.remove(id).is_some()
    }

    fn is_observing(&self, id: ScrollTriggerId) -> bool {
        self.lock().triggers.contains_key(id)
    }

    fn kill_all(&self) -> usize {
        let mut inner = self.lock();
        let count = inner.triggers.len();
        inner.triggers.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinema_core::Element;
    use slotmap::Key;

    fn recorder() -> (Arc<Mutex<Vec<ScrollEvent>>>, ScrollCallback) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ScrollCallback = Arc::new(move |event: &ScrollEvent| {
            sink.lock().unwrap().push(*event);
        });
        (events, callback)
    }

    fn kinds(events: &Arc<Mutex<Vec<ScrollEvent>>>) -> Vec<ScrollEventKind> {
        events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    fn card() -> Element {
        // 1000px down the page, 200px tall
        Element::new().with_bounds(Bounds::new(1000.0, 200.0))
    }

    #[test]
    fn test_parse_positions() {
        let pos = ScrollPosition::parse("top 80%").unwrap();
        assert_eq!(pos.element, EdgeOffset::new(Edge::Top));
        assert_eq!(pos.viewport, EdgeOffset::new(Edge::Percent(80.0)));

        let pos: ScrollPosition = "center bottom-=50".parse().unwrap();
        assert_eq!(pos.viewport.edge, Edge::Bottom);
        assert_eq!(pos.viewport.offset, -50.0);

        let pos = ScrollPosition::parse("20px top+=10").unwrap();
        assert_eq!(pos.element.edge, Edge::Pixels(20.0));
        assert_eq!(pos.viewport.offset, 10.0);
        assert_eq!(pos.to_string(), "20px top+=10");
    }

    #[test]
    fn test_parse_rejects_malformed_positions() {
        for bad in ["", "top", "top center bottom", "middle top", "top 80%%", "top+=x center"] {
            assert_eq!(
                ScrollPosition::parse(bad),
                Err(AnimationError::InvalidScrollPosition(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_resolve_thresholds() {
        let bounds = Bounds::new(1000.0, 200.0);
        let viewport = 800.0;

        // element top meets viewport bottom
        assert_eq!(ScrollPosition::parse("top bottom").unwrap().resolve(bounds, viewport), 200.0);
        // element bottom meets viewport top
        assert_eq!(ScrollPosition::parse("bottom top").unwrap().resolve(bounds, viewport), 1200.0);
        assert_eq!(ScrollPosition::parse("top 75%").unwrap().resolve(bounds, viewport), 400.0);
        assert_eq!(
            ScrollPosition::parse("center center+=100").unwrap().resolve(bounds, viewport),
            600.0
        );
    }

    #[test]
    fn test_events_follow_scroll_direction() {
        let tracker = ScrollTracker::new(800.0);
        let (events, callback) = recorder();
        tracker.observe(&Targets::from(&card()), ScrollTriggerConfig::default(), callback);

        // active between 200 and 1200
        tracker.update();
        assert!(kinds(&events).is_empty());

        tracker.set_scroll(500.0);
        tracker.update();
        tracker.set_scroll(1500.0);
        tracker.update();
        tracker.set_scroll(1000.0);
        tracker.update();
        tracker.set_scroll(0.0);
        tracker.update();

        assert_eq!(
            kinds(&events),
            vec![
                ScrollEventKind::Enter,
                ScrollEventKind::Leave,
                ScrollEventKind::EnterBack,
                ScrollEventKind::LeaveBack,
            ]
        );
    }

    #[test]
    fn test_evaluation_waits_for_update() {
        let tracker = ScrollTracker::new(800.0);
        let (events, callback) = recorder();
        tracker.observe(&Targets::from(&card()), ScrollTriggerConfig::default(), callback);

        tracker.set_scroll(300.0);
        tracker.set_scroll(100.0);
        tracker.set_scroll(400.0);
        assert!(kinds(&events).is_empty());

        assert_eq!(tracker.update(), 1);
        assert_eq!(kinds(&events), vec![ScrollEventKind::Enter]);
    }

    #[test]
    fn test_jumping_past_end_enters_then_leaves() {
        let tracker = ScrollTracker::new(800.0);
        let (events, callback) = recorder();
        tracker.observe(&Targets::from(&card()), ScrollTriggerConfig::default(), callback);

        tracker.set_scroll(5000.0);
        tracker.update();
        assert_eq!(kinds(&events), vec![ScrollEventKind::Enter, ScrollEventKind::Leave]);
    }

    #[test]
    fn test_once_removes_after_enter() {
        let tracker = ScrollTracker::new(800.0);
        let (events, callback) = recorder();
        let config = ScrollTriggerConfig::new().once(true);
        tracker.observe(&Targets::from(&card()), config, callback);

        tracker.set_scroll(5000.0);
        tracker.update();
        assert_eq!(kinds(&events), vec![ScrollEventKind::Enter]);
        assert_eq!(tracker.count(), 0);

        tracker.set_scroll(500.0);
        tracker.update();
        assert_eq!(kinds(&events).len(), 1);
    }

    #[test]
    fn test_scrub_reports_progress() {
        let tracker = ScrollTracker::new(800.0);
        let (events, callback) = recorder();
        let config = ScrollTriggerConfig::new().scrub(true);
        tracker.observe(&Targets::from(&card()), config, callback);

        tracker.set_scroll(700.0);
        tracker.update();
        tracker.update();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, ScrollEventKind::Enter);
        assert_eq!(events[1].kind, ScrollEventKind::Update);
        assert!((events[1].progress - 0.5).abs() < 1e-6);
        assert_eq!(events[1].scroll, 700.0);
    }

    #[test]
    fn test_thresholds_follow_layout_changes() {
        let tracker = ScrollTracker::new(800.0);
        let el = card();
        let (_, callback) = recorder();
        let id = tracker.observe(&Targets::from(&el), ScrollTriggerConfig::default(), callback);

        assert_eq!(tracker.thresholds(id), Some((200.0, 1200.0)));
        el.set_bounds(Bounds::new(2000.0, 100.0));
        tracker.set_viewport(1000.0);
        assert_eq!(tracker.thresholds(id), Some((1000.0, 2100.0)));
    }

    #[test]
    fn test_kill_triggers() {
        let tracker = ScrollTracker::new(800.0);
        let (events, callback) = recorder();
        let targets = Targets::from(&card());
        let first = tracker.observe(&targets, ScrollTriggerConfig::default(), callback.clone());
        tracker.observe(&targets, ScrollTriggerConfig::default(), callback);

        assert!(tracker.kill(first));
        assert!(!tracker.kill(first));
        assert_eq!(tracker.kill_all(), 1);

        tracker.set_scroll(500.0);
        tracker.update();
        assert!(kinds(&events).is_empty());
    }

    #[test]
    fn test_empty_targets_are_not_observed() {
        let tracker = ScrollTracker::new(800.0);
        let (_, callback) = recorder();
        let id = tracker.observe(&Targets::new(), ScrollTriggerConfig::default(), callback);
        assert!(id.is_null());
        assert_eq!(tracker.count(), 0);
    }
}
