//! Coordinate spaces and the conversions between them.
//!
//! Three representations of a position are kept as distinct types so they can
//! never be mixed silently:
//!
//! - [`NormalizedPoint`]: fraction of the image's natural size, `[0, 1]` inside the image.
//! - [`PercentPoint`]: normalized × 100, the representation stored on waypoints.
//! - [`ScreenPoint`]: viewport pixels for one [`Transform`] snapshot; never persisted.
//!
//! Every function here is pure. Callers must hold loaded [`Dimensions`] and a
//! transform with a positive scale before converting.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use serde::{Deserialize, Serialize};

use crate::consts::GRID_CELLS;

/// A position relative to the viewport's top-left corner, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A position as a fraction of the image's natural width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the point lies on the image, edges included.
    #[must_use]
    pub fn is_within_image(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// A position in percent of the image size; the persisted waypoint representation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both components into `[0, 100]`. `NaN` components become 0.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self { x: clamp_percent(self.x), y: clamp_percent(self.y) }
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) }
}

/// Natural pixel size of the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and strictly positive.
    #[must_use]
    pub fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Screen-space center of a viewport of this size.
    #[must_use]
    pub fn center(self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Pan offset and zoom applied to the image inside the viewport.
///
/// `position` is the screen location of the image's top-left corner; the image
/// is drawn at `natural size × scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub position: ScreenPoint,
}

impl Default for Transform {
    fn default() -> Self {
        Self { scale: 1.0, position: ScreenPoint::default() }
    }
}

/// Convert a viewport point to image-relative normalized coordinates.
///
/// The result falls outside `[0, 1]` when the point is off the image; check
/// [`NormalizedPoint::is_within_image`] before treating it as a placement.
#[must_use]
pub fn screen_to_normalized(screen: ScreenPoint, transform: &Transform, image: Dimensions) -> NormalizedPoint {
    NormalizedPoint {
        x: (screen.x - transform.position.x) / (image.width * transform.scale),
        y: (screen.y - transform.position.y) / (image.height * transform.scale),
    }
}

/// Convert normalized image coordinates to a viewport point. Inverse of [`screen_to_normalized`].
#[must_use]
pub fn normalized_to_screen(normalized: NormalizedPoint, transform: &Transform, image: Dimensions) -> ScreenPoint {
    ScreenPoint {
        x: transform.position.x + normalized.x * image.width * transform.scale,
        y: transform.position.y + normalized.y * image.height * transform.scale,
    }
}

#[must_use]
pub fn percent_to_normalized(percent: PercentPoint) -> NormalizedPoint {
    NormalizedPoint { x: percent.x / 100.0, y: percent.y / 100.0 }
}

/// Convert to percent, choosing the shortest decimal value that maps back to
/// the same normalized value, so stored percents survive a round trip.
#[must_use]
pub fn normalized_to_percent(normalized: NormalizedPoint) -> PercentPoint {
    PercentPoint { x: to_percent(normalized.x), y: to_percent(normalized.y) }
}

const DECIMAL_SCALES: [f64; 13] = [1.0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12];

#[allow(clippy::float_cmp)]
fn to_percent(n: f64) -> f64 {
    let raw = n * 100.0;
    if !raw.is_finite() {
        return raw;
    }
    DECIMAL_SCALES
        .iter()
        .map(|f| (raw * f).round() / f)
        .find(|candidate| candidate / 100.0 == n)
        .unwrap_or(raw)
}

/// Screen point of a stored percent position under `transform`.
#[must_use]
pub fn percent_to_screen(percent: PercentPoint, transform: &Transform, image: Dimensions) -> ScreenPoint {
    normalized_to_screen(percent_to_normalized(percent), transform, image)
}

/// Reference grid cell containing `normalized`, e.g. `"C7"`.
///
/// Columns run `A`–`J` left to right, rows `1`–`10` top to bottom. Returns
/// `None` for points off the image.
#[must_use]
pub fn grid_cell_label(normalized: NormalizedPoint) -> Option<String> {
    if !normalized.is_within_image() {
        return None;
    }
    let col = grid_index(normalized.x);
    let row = grid_index(normalized.y);
    let letter = char::from(b'A' + u8::try_from(col).unwrap_or(0));
    Some(format!("{letter}{}", row + 1))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn grid_index(v: f64) -> usize {
    ((v * GRID_CELLS as f64).floor() as usize).min(GRID_CELLS - 1)
}
