//! Touch gesture interpretation.
//!
//! A small state machine over the active touch contacts:
//!
//! ```text
//!   Idle --1st contact--> Panning --2nd contact--> Pinching
//!    ^                      |  ^                      |
//!    +------ 0 contacts ----+  +------ 2 -> 1 --------+
//!    ^                                                |
//!    +------------------- 0 contacts -----------------+
//! ```
//!
//! Only the first two contacts (in arrival order) are tracked; any further
//! contacts are ignored. Whenever the tracked set changes, the movement
//! memory is cleared so the next sample seeds from absolute coordinates
//! instead of producing a jump.
//!
//! Handlers take the viewport and orientation descriptor as explicit
//! arguments and return `true` when the viewport changed and a redraw is
//! due.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::orientation::OrientationDescriptor;
use crate::viewport::Viewport;

/// Identifier of a touch contact, stable for the lifetime of the contact.
pub type TouchId = i64;

/// A single active contact in DisplayBox-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: TouchId,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(id: TouchId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    /// Euclidean distance to another contact.
    pub fn distance_to(&self, other: &TouchPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Current gesture mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureState {
    #[default]
    Idle,
    Panning,
    Pinching,
}

/// Gesture sensitivity settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GestureConfig {
    /// Pan sensitivity multiplier.
    pub scroll_speed: f64,
    /// Fraction of the current scale applied per pinch sample.
    pub zoom_speed: f64,
    /// Pinch-distance change (pixels) at or below which a sample is jitter.
    pub zoom_delay: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 1.0,
            zoom_speed: 0.035,
            zoom_delay: 1.0,
        }
    }
}

/// Turns raw contact updates into viewport pans and zooms.
#[derive(Debug, Clone, Default)]
pub struct GestureInterpreter {
    config: GestureConfig,
    state: GestureState,
    /// Tracked contacts in arrival order, at most two.
    tracked: Vec<TouchId>,
    last_touch: Option<(f64, f64)>,
    last_distance: Option<f64>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Drop all contacts and movement memory.
    pub fn reset(&mut self) {
        self.tracked.clear();
        self.clear_memory();
        self.state = GestureState::Idle;
    }

    fn clear_memory(&mut self) {
        self.last_touch = None;
        self.last_distance = None;
    }

    /// Update the tracked contacts from the full list of active contacts.
    ///
    /// Call on every touch start, end and cancel. Returns the new state.
    pub fn on_contacts_changed(&mut self, active: &[TouchPoint]) -> GestureState {
        let mut tracked: Vec<TouchId> = self
            .tracked
            .iter()
            .copied()
            .filter(|id| active.iter().any(|p| p.id == *id))
            .collect();

        for point in active {
            if tracked.len() == 2 {
                break;
            }
            if !tracked.contains(&point.id) {
                tracked.push(point.id);
            }
        }

        if tracked != self.tracked {
            let next = match tracked.len() {
                0 => GestureState::Idle,
                1 => GestureState::Panning,
                _ => GestureState::Pinching,
            };
            if next != self.state {
                debug!(from = ?self.state, to = ?next, contacts = active.len(), "Gesture transition");
            }
            self.tracked = tracked;
            self.state = next;
            self.clear_memory();
        }

        self.state
    }

    /// Route a touch-move sample to the pan or pinch handler.
    ///
    /// `active` is the full list of current contacts. Returns whether a
    /// redraw is due.
    pub fn on_move(
        &mut self,
        active: &[TouchPoint],
        viewport: &mut Viewport,
        compensation: &OrientationDescriptor,
    ) -> bool {
        self.on_contacts_changed(active);

        let points: Vec<TouchPoint> = self
            .tracked
            .iter()
            .filter_map(|id| active.iter().find(|p| p.id == *id).copied())
            .collect();

        match (self.state, points.as_slice()) {
            (GestureState::Panning, [point]) => self.on_single_move(*point, viewport, compensation),
            (GestureState::Pinching, [p0, p1]) => self.on_pinch_move(*p0, *p1, viewport),
            _ => false,
        }
    }

    /// Pan by the movement of a single contact since the previous sample.
    ///
    /// The first sample after a contact change only seeds the memory.
    pub fn on_single_move(
        &mut self,
        point: TouchPoint,
        viewport: &mut Viewport,
        compensation: &OrientationDescriptor,
    ) -> bool {
        let Some((last_x, last_y)) = self.last_touch else {
            self.last_touch = Some((point.x, point.y));
            return false;
        };

        let speed = self.config.scroll_speed;
        let dx = (last_x - point.x) * speed;
        let dy = (last_y - point.y) * speed;
        let changed = viewport.pan(dx, dy, compensation);

        self.last_touch = Some((point.x, point.y));
        changed
    }

    /// Zoom by the change of distance between two contacts.
    ///
    /// Samples whose distance differs from the previous one by no more than
    /// `zoom_delay` are dropped without updating the memory. A shrinking
    /// distance zooms out, a growing one zooms in.
    pub fn on_pinch_move(&mut self, p0: TouchPoint, p1: TouchPoint, viewport: &mut Viewport) -> bool {
        let distance = p0.distance_to(&p1);
        let mut changed = false;

        if let Some(last) = self.last_distance {
            if (distance - last).abs() <= self.config.zoom_delay {
                return false;
            }
            let factor = if last > distance { 1.0 } else { -1.0 };
            changed = viewport.zoom(factor * self.config.zoom_speed * viewport.scale());
        }

        self.last_distance = Some(distance);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::compensate;
    use crate::viewport::{DisplayBox, ImageMetrics, OutputSize};

    fn viewport() -> Viewport {
        Viewport::initialize(
            ImageMetrics::new(4000, 3000),
            DisplayBox::new(400, 300),
            OutputSize::new(800, 600),
        )
        .unwrap()
    }

    fn pt(id: TouchId, x: f64, y: f64) -> TouchPoint {
        TouchPoint::new(id, x, y)
    }

    /// Two contacts on a horizontal line, `distance` apart.
    fn pinch(distance: f64) -> [TouchPoint; 2] {
        [pt(1, 100.0, 100.0), pt(2, 100.0 + distance, 100.0)]
    }

    #[test]
    fn test_transitions() {
        let mut g = GestureInterpreter::default();
        assert_eq!(g.state(), GestureState::Idle);

        assert_eq!(g.on_contacts_changed(&[pt(1, 0.0, 0.0)]), GestureState::Panning);
        assert_eq!(
            g.on_contacts_changed(&[pt(1, 0.0, 0.0), pt(2, 5.0, 5.0)]),
            GestureState::Pinching
        );
        assert_eq!(g.on_contacts_changed(&[]), GestureState::Idle);
    }

    #[test]
    fn test_two_to_one_hands_off_to_panning() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        let id = compensate(1);
        vp.zoom(-0.1);

        g.on_contacts_changed(&[pt(1, 0.0, 0.0), pt(2, 50.0, 0.0)]);
        g.on_contacts_changed(&[pt(2, 50.0, 0.0)]);
        assert_eq!(g.state(), GestureState::Panning);

        // Remaining contact reseeds; no jump from the removed one
        assert!(!g.on_move(&[pt(2, 50.0, 0.0)], &mut vp, &id));
        assert_eq!(vp.offset(), (0.0, 0.0));
        assert!(g.on_move(&[pt(2, 40.0, 0.0)], &mut vp, &id));
        assert_eq!(vp.offset(), (50.0, 0.0));
    }

    #[test]
    fn test_third_contact_ignored() {
        let mut g = GestureInterpreter::default();
        g.on_contacts_changed(&[pt(1, 0.0, 0.0), pt(2, 10.0, 0.0)]);
        g.last_distance = Some(10.0);

        let state = g.on_contacts_changed(&[pt(1, 0.0, 0.0), pt(2, 10.0, 0.0), pt(3, 20.0, 0.0)]);
        assert_eq!(state, GestureState::Pinching);
        // No transition, so memory survives
        assert_eq!(g.last_distance, Some(10.0));
    }

    #[test]
    fn test_contact_change_clears_memory() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        g.on_contacts_changed(&[pt(1, 0.0, 0.0)]);
        g.on_single_move(pt(1, 5.0, 5.0), &mut vp, &compensate(1));
        assert!(g.last_touch.is_some());

        g.on_contacts_changed(&[]);
        assert!(g.last_touch.is_none());
        assert!(g.last_distance.is_none());
    }

    #[test]
    fn test_single_move_seeds_then_pans() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        let id = compensate(1);
        vp.zoom(-0.1); // scale 0.2

        assert!(!g.on_single_move(pt(1, 100.0, 100.0), &mut vp, &id));
        // Finger moves left/up: window moves right/down
        assert!(g.on_single_move(pt(1, 80.0, 90.0), &mut vp, &id));
        assert_eq!(vp.offset(), (100.0, 50.0));
    }

    #[test]
    fn test_single_move_scroll_speed() {
        let config = GestureConfig {
            scroll_speed: 2.0,
            ..Default::default()
        };
        let mut g = GestureInterpreter::new(config);
        let mut vp = viewport();
        vp.zoom(-0.1);

        g.on_single_move(pt(1, 100.0, 100.0), &mut vp, &compensate(1));
        g.on_single_move(pt(1, 90.0, 100.0), &mut vp, &compensate(1));
        assert_eq!(vp.offset(), (100.0, 0.0));
    }

    #[test]
    fn test_single_move_at_edge_reports_no_change() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport(); // min scale: no room to pan
        g.on_single_move(pt(1, 100.0, 100.0), &mut vp, &compensate(1));
        assert!(!g.on_single_move(pt(1, 50.0, 50.0), &mut vp, &compensate(1)));
        // Memory still advances
        assert_eq!(g.last_touch, Some((50.0, 50.0)));
    }

    #[test]
    fn test_jitter_suppressed() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        let before = vp.clone();

        for d in [100.0, 100.5, 101.0] {
            let [p0, p1] = pinch(d);
            assert!(!g.on_pinch_move(p0, p1, &mut vp));
        }
        assert_eq!(vp, before);
        assert_eq!(g.last_distance, Some(100.0));
    }

    #[test]
    fn test_pinch_out_zooms_in() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();

        for (d, expect) in [(100.0, false), (105.0, true)] {
            let [p0, p1] = pinch(d);
            assert_eq!(g.on_pinch_move(p0, p1, &mut vp), expect);
        }
        assert!((vp.scale() - 0.1 * 1.035).abs() < 1e-12);
    }

    #[test]
    fn test_pinch_in_zooms_out_clamped() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        vp.zoom(-0.001); // scale 0.101
        let start = vp.scale();

        let [p0, p1] = pinch(50.0);
        g.on_pinch_move(p0, p1, &mut vp);
        let [p0, p1] = pinch(40.0);
        assert!(g.on_pinch_move(p0, p1, &mut vp));

        // 0.101 - 0.035 * 0.101 is below min scale, so clamp
        assert!(start - 0.035 * start < vp.min_scale());
        assert_eq!(vp.scale(), vp.min_scale());
    }

    #[test]
    fn test_pinch_in_zooms_out_by_step() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        vp.zoom(-0.2); // scale 0.3
        let start = vp.scale();

        let [p0, p1] = pinch(50.0);
        g.on_pinch_move(p0, p1, &mut vp);
        let [p0, p1] = pinch(40.0);
        assert!(g.on_pinch_move(p0, p1, &mut vp));
        assert!((vp.scale() - (start - 0.035 * start)).abs() < 1e-12);
    }

    #[test]
    fn test_on_move_routes_pinch() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        let id = compensate(1);

        g.on_contacts_changed(&pinch(100.0));
        assert!(!g.on_move(&pinch(100.0), &mut vp, &id));
        assert!(g.on_move(&pinch(120.0), &mut vp, &id));
        assert!(vp.scale() > vp.min_scale());
    }

    #[test]
    fn test_on_move_idle_does_nothing() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        assert!(!g.on_move(&[], &mut vp, &compensate(1)));
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn test_release_keeps_viewport() {
        let mut g = GestureInterpreter::default();
        let mut vp = viewport();
        let id = compensate(1);
        g.on_contacts_changed(&pinch(100.0));
        g.on_move(&pinch(100.0), &mut vp, &id);
        g.on_move(&pinch(150.0), &mut vp, &id);
        let zoomed = vp.scale();

        g.on_contacts_changed(&[]);
        assert_eq!(vp.scale(), zoomed);
    }

    #[test]
    fn test_reset() {
        let mut g = GestureInterpreter::default();
        g.on_contacts_changed(&pinch(10.0));
        g.last_distance = Some(10.0);
        g.reset();
        assert_eq!(g.state(), GestureState::Idle);
        assert!(g.last_distance.is_none());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
