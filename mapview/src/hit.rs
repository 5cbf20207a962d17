//! Marker hit-testing: which waypoint marker, if any, a release landed on.
//!
//! The host's DOM target wins when it names a laid-out marker. Otherwise the
//! release point is tested against marker centers in screen space.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::coords::ScreenPoint;
use crate::overlay::MarkerLayout;

/// How a marker was identified under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    /// The host reported the DOM element carrying the waypoint id.
    Element,
    /// The release point fell within the hit radius of a laid-out marker.
    Geometry,
}

/// Result of a marker hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHit {
    pub id: String,
    pub source: HitSource,
}

/// Resolve the marker under `at`.
///
/// A `target` id reported by the host wins if it names a laid-out marker.
/// Otherwise the topmost marker (last in draw order) whose center lies within
/// `radius` pixels of `at` is returned.
#[must_use]
pub fn marker_at(at: ScreenPoint, target: Option<&str>, markers: &[MarkerLayout], radius: f64) -> Option<MarkerHit> {
    if let Some(id) = target
        && markers.iter().any(|m| m.id == id)
    {
        return Some(MarkerHit { id: id.to_owned(), source: HitSource::Element });
    }
    markers
        .iter()
        .rev()
        .find(|m| m.screen.distance_to(at) <= radius)
        .map(|m| MarkerHit { id: m.id.clone(), source: HitSource::Geometry })
}
