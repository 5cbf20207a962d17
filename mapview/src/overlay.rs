//! Screen-space layout of everything drawn over the transformed image.
//!
//! Markers are laid out from any collection implementing [`MarkerSource`],
//! so the overlay reads the workspace's waypoints without owning them. Each
//! layout is recomputed from the current [`Transform`] on every change; since
//! positions go through [`percent_to_screen`], markers stay pinned to the same
//! image pixel at every zoom level.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::collections::HashMap;

use crate::consts::{DEFAULT_MARKER_COLOR, GRID_CELLS};
use crate::coords::{Dimensions, NormalizedPoint, PercentPoint, ScreenPoint, Transform, normalized_to_screen, percent_to_screen};

/// Something that can be drawn as a marker: a waypoint, as seen by the overlay.
pub trait MarkerSource {
    /// Stable identity, also used to hit-test by element.
    fn marker_id(&self) -> &str;
    /// Stored position in percent space.
    fn marker_position(&self) -> PercentPoint;
    /// Tooltip text.
    fn marker_label(&self) -> &str;
    /// Category name; may be blank.
    fn marker_category(&self) -> &str;
}

/// Color lookup by category name.
pub trait CategoryColors {
    /// CSS color for `category`, or `None` if no such category exists.
    fn color_of(&self, category: &str) -> Option<&str>;
}

impl CategoryColors for HashMap<String, String> {
    fn color_of(&self, category: &str) -> Option<&str> {
        self.get(category).map(String::as_str)
    }
}

/// A marker positioned for the current transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayout {
    pub id: String,
    /// Viewport point the marker is centered on.
    pub screen: ScreenPoint,
    pub color: String,
    pub label: String,
}

/// Lay out one marker per source, in iteration order (later entries draw on top).
///
/// Blank categories and categories missing from `colors` fall back to
/// [`DEFAULT_MARKER_COLOR`].
pub fn layout_markers<'a, M, I, C>(sources: I, colors: &C, transform: &Transform, image: Dimensions) -> Vec<MarkerLayout>
where
    M: MarkerSource + 'a,
    I: IntoIterator<Item = &'a M>,
    C: CategoryColors + ?Sized,
{
    sources
        .into_iter()
        .map(|source| {
            let category = source.marker_category();
            let color = if category.trim().is_empty() { None } else { colors.color_of(category) };
            MarkerLayout {
                id: source.marker_id().to_owned(),
                screen: percent_to_screen(source.marker_position(), transform, image),
                color: color.unwrap_or(DEFAULT_MARKER_COLOR).to_owned(),
                label: source.marker_label().to_owned(),
            }
        })
        .collect()
}

/// A reference-grid label anchored in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    pub text: String,
    pub screen: ScreenPoint,
}

/// The 10×10 reference grid for the current transform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    /// Screen x of each vertical line, left to right, excluding the image's left edge.
    pub vertical: Vec<f64>,
    /// Screen y of each horizontal line, top to bottom, excluding the image's top edge.
    pub horizontal: Vec<f64>,
    /// Column letters along the top edge, then row numbers along the left edge.
    pub labels: Vec<GridLabel>,
}

/// Lay out grid lines at every tenth of the image and a label per row/column.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout_grid(transform: &Transform, image: Dimensions) -> GridLayout {
    let cells = GRID_CELLS as f64;
    let mut grid = GridLayout::default();
    for i in 1..=GRID_CELLS {
        let at = normalized_to_screen(NormalizedPoint::new(i as f64 / cells, i as f64 / cells), transform, image);
        grid.vertical.push(at.x);
        grid.horizontal.push(at.y);
    }
    for (i, letter) in ('A'..='J').enumerate().take(GRID_CELLS) {
        let mid = (i as f64 + 0.5) / cells;
        grid.labels.push(GridLabel {
            text: letter.to_string(),
            screen: normalized_to_screen(NormalizedPoint::new(mid, 0.0), transform, image),
        });
    }
    for i in 0..GRID_CELLS {
        let mid = (i as f64 + 0.5) / cells;
        grid.labels.push(GridLabel {
            text: (i + 1).to_string(),
            screen: normalized_to_screen(NormalizedPoint::new(0.0, mid), transform, image),
        });
    }
    grid
}
