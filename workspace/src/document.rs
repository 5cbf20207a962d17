//! The `workspace.json` document: wire types, import sanitizing, export building.
//!
//! Field names are camelCase to stay compatible with files written by earlier
//! versions of the editor. Import is lenient about individual waypoint and
//! category fields (they are clamped or filled in) but strict about the
//! version and the required sections.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::collections::{BTreeMap, HashSet};

use mapview::coords::PercentPoint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::WorkspaceError;
use crate::model::{Category, Waypoint, palette_color};
use crate::store::WorkspaceState;

/// The only document version this editor reads and writes.
pub const FORMAT_VERSION: &str = "1.0";

/// Name substituted for waypoints imported without one.
pub const UNNAMED_WAYPOINT: &str = "Unnamed Waypoint";

/// Category given to waypoints imported without one. Files written before
/// categories existed carry no category, and older editors grouped those
/// waypoints under this name.
pub const DEFAULT_IMPORT_CATEGORY: &str = "Default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDocument {
    pub version: String,
    pub metadata: Metadata,
    pub waypoints: Vec<WaypointRecord>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub export_date: String,
    #[serde(default)]
    pub last_modified: String,
    pub image_metadata: ImageMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Name of the image entry inside the package.
    pub filename: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// MIME type.
    #[serde(rename = "type", default)]
    pub mime: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
}

/// A waypoint as written to disk. Every field is optional on read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaypointRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub sequence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_waypoints: usize,
    pub total_categories: usize,
    pub category_counts: BTreeMap<String, usize>,
}

/// Parse `workspace.json`, checking the version before the shape.
///
/// # Errors
///
/// [`WorkspaceError::InvalidFile`] for malformed JSON or missing sections,
/// [`WorkspaceError::UnsupportedVersion`] for any version other than `"1.0"`.
pub fn parse_document(raw: &str) -> Result<WorkspaceDocument, WorkspaceError> {
    let value: Value = serde_json::from_str(raw)?;
    match value.get("version").and_then(Value::as_str) {
        Some(FORMAT_VERSION) => {}
        Some(other) => return Err(WorkspaceError::UnsupportedVersion(other.to_owned())),
        None => return Err(WorkspaceError::UnsupportedVersion(String::new())),
    }
    Ok(serde_json::from_value(value)?)
}

/// Turn imported records into valid waypoints, ordered by sequence.
///
/// - ids not matching `[A-Za-z0-9_]+` (or repeated) become `wp_<now>_<index+1>`
/// - positions are clamped into `[0, 100]`
/// - blank names become [`UNNAMED_WAYPOINT`]
/// - blank categories become [`DEFAULT_IMPORT_CATEGORY`]
/// - missing or zero timestamps become `now_ms`
/// - missing or zero sequences become `index + 1`
#[must_use]
pub fn sanitize_waypoints(records: &[WaypointRecord], now_ms: i64) -> Vec<Waypoint> {
    let mut seen = HashSet::new();
    let mut waypoints: Vec<Waypoint> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let fallback_seq = u64::try_from(index).map_or(u64::MAX, |i| i.saturating_add(1));
            let id = match record.id.as_deref() {
                Some(id) if is_valid_id(id) && !seen.contains(id) => id.to_owned(),
                other => {
                    tracing::warn!(index, id = ?other, "replacing invalid waypoint id");
                    Waypoint::make_id(now_ms, fallback_seq)
                }
            };
            seen.insert(id.clone());
            let at = PercentPoint::new(record.x.unwrap_or(0.0), record.y.unwrap_or(0.0));
            let clamped = at.clamped();
            if clamped != at {
                tracing::warn!(%id, x = at.x, y = at.y, "clamping imported waypoint position");
            }
            let name = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty()).unwrap_or(UNNAMED_WAYPOINT);
            let category =
                record.category.as_deref().map(str::trim).filter(|c| !c.is_empty()).unwrap_or(DEFAULT_IMPORT_CATEGORY);
            Waypoint {
                id,
                x: clamped.x,
                y: clamped.y,
                name: name.to_owned(),
                category: category.to_owned(),
                timestamp: positive_integer(record.timestamp).unwrap_or(now_ms),
                sequence: positive_integer(record.sequence).map_or(fallback_seq, i64::unsigned_abs),
            }
        })
        .collect();
    waypoints.sort_by_key(|w| w.sequence);
    waypoints
}

/// Turn imported category records into categories, dropping blank and
/// case-insensitively duplicated names and filling in ids and colors.
#[must_use]
pub fn sanitize_categories(records: &[CategoryRecord]) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::with_capacity(records.len());
    for record in records {
        let name = record.name.trim();
        if name.is_empty() {
            tracing::warn!("dropping imported category without a name");
            continue;
        }
        if categories.iter().any(|c| c.is_named(name)) {
            tracing::warn!(name, "dropping duplicate imported category");
            continue;
        }
        let color = record
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| palette_color(categories.len()));
        let mut category = Category::new(name, color);
        if let Some(id) = record.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            id.clone_into(&mut category.id);
        }
        category.created_at.clone_from(&record.created_at);
        categories.push(category);
    }
    categories
}

/// Build the document describing `state` at `now`.
///
/// # Errors
///
/// [`WorkspaceError::NoImage`] before an image was uploaded, or a timestamp
/// formatting failure.
pub fn build_document(state: &WorkspaceState, now: OffsetDateTime) -> Result<WorkspaceDocument, WorkspaceError> {
    let image = state.image().ok_or(WorkspaceError::NoImage)?;
    let stamp = now.format(&Rfc3339)?;
    Ok(WorkspaceDocument {
        version: FORMAT_VERSION.to_owned(),
        metadata: Metadata {
            project_name: state.project_name().to_owned(),
            export_date: stamp.clone(),
            last_modified: stamp.clone(),
            image_metadata: ImageMetadata {
                filename: crate::package::image_entry_name(&image.mime),
                width: image.width,
                height: image.height,
                mime: image.mime.clone(),
                size: image.size(),
            },
        },
        waypoints: state.waypoints().iter().map(waypoint_record).collect(),
        categories: state
            .categories()
            .iter()
            .map(|c| CategoryRecord {
                id: Some(c.id.clone()),
                name: c.name.clone(),
                color: Some(c.color.clone()),
                created_at: Some(c.created_at.clone().unwrap_or_else(|| stamp.clone())),
            })
            .collect(),
        statistics: Statistics {
            total_waypoints: state.waypoints().len(),
            total_categories: state.categories().len(),
            category_counts: state.category_counts(),
        },
    })
}

#[allow(clippy::cast_precision_loss)]
fn waypoint_record(w: &Waypoint) -> WaypointRecord {
    WaypointRecord {
        id: Some(w.id.clone()),
        x: Some(w.x),
        y: Some(w.y),
        name: Some(w.name.clone()),
        category: Some(w.category.clone()),
        timestamp: Some(w.timestamp as f64),
        sequence: Some(w.sequence as f64),
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whole, positive, representable values only; anything else counts as missing.
#[allow(clippy::cast_possible_truncation)]
fn positive_integer(value: Option<f64>) -> Option<i64> {
    let v = value?;
    if !v.is_finite() || v < 1.0 || v > 9_007_199_254_740_991.0 {
        return None;
    }
    Some(v.trunc() as i64)
}
