//! Shared numeric constants for the mapview crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Smallest allowed scale factor.
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed scale factor.
pub const MAX_SCALE: f64 = 4.0;

/// Scale increment applied by a single zoom-in / zoom-out command.
pub const ZOOM_STEP: f64 = 0.25;

/// Scale increment applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;

/// Fraction of the viewport the image may occupy after fit-to-view.
pub const FIT_MARGIN: f64 = 0.95;

/// Highest scale used when centering the view on a waypoint.
pub const CENTER_MAX_SCALE: f64 = 2.0;

// ── Gestures ────────────────────────────────────────────────────

/// Displacement in pixels beyond which a press becomes a drag.
pub const DRAG_DISTANCE_PX: f64 = 3.0;

/// Looser displacement threshold that applies once the press is older than
/// [`SLOW_DRAG_AFTER_MS`].
pub const SLOW_DRAG_DISTANCE_PX: f64 = 1.0;

/// Press age in milliseconds after which [`SLOW_DRAG_DISTANCE_PX`] applies.
pub const SLOW_DRAG_AFTER_MS: f64 = 100.0;

/// Delay before a static press is treated as a hold (drag intent).
pub const HOLD_MS: f64 = 200.0;

/// A press released within this many milliseconds may be a click.
pub const CLICK_MAX_MS: f64 = 200.0;

// ── Hit-testing / overlay ───────────────────────────────────────

/// Screen-space hit slop in pixels around a marker center.
pub const MARKER_HIT_RADIUS_PX: f64 = 8.0;

/// Marker color when the waypoint has no (known) category.
pub const DEFAULT_MARKER_COLOR: &str = "#9b87f5";

/// Number of reference grid cells along each axis.
pub const GRID_CELLS: usize = 10;
