//! Waypoints, categories and the map image they annotate.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use mapview::coords::PercentPoint;
use mapview::overlay::MarkerSource;
use serde::{Deserialize, Serialize};

/// Colors handed to auto-created categories, picked by `palette[count % 10]`.
pub const PALETTE: [&str; 10] = [
    "#9b87f5", "#F97316", "#0EA5E9", "#D946EF", "#33C3F0", "#FEC6A1", "#E5DEFF", "#D3E4FD", "#8B5CF6", "#1EAEDB",
];

/// Project name used until the user picks one.
pub const DEFAULT_PROJECT_NAME: &str = "My Project";

/// Palette color for the `index`-th category.
#[must_use]
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// A named point annotation on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// `wp_<timestamp>_<sequence>` for waypoints created here.
    pub id: String,
    /// Horizontal position, percent of image width, always in `[0, 100]`.
    pub x: f64,
    /// Vertical position, percent of image height, always in `[0, 100]`.
    pub y: f64,
    pub name: String,
    /// Category name; blank when uncategorized.
    pub category: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Creation order, starting at 1.
    pub sequence: u64,
}

impl Waypoint {
    #[must_use]
    pub fn position(&self) -> PercentPoint {
        PercentPoint::new(self.x, self.y)
    }

    #[must_use]
    pub fn make_id(timestamp: i64, sequence: u64) -> String {
        format!("wp_{timestamp}_{sequence}")
    }
}

impl MarkerSource for Waypoint {
    fn marker_id(&self) -> &str {
        &self.id
    }

    fn marker_position(&self) -> PercentPoint {
        self.position()
    }

    fn marker_label(&self) -> &str {
        &self.name
    }

    fn marker_category(&self) -> &str {
        &self.category
    }
}

/// A named, colored group of waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// CSS color.
    pub color: String,
    /// RFC 3339 creation time carried over from an imported file, if any.
    pub created_at: Option<String>,
}

impl Category {
    /// A new category with a random id.
    #[must_use]
    pub fn new(name: &str, color: &str) -> Self {
        Self { id: uuid::Uuid::new_v4().to_string(), name: name.to_owned(), color: color.to_owned(), created_at: None }
    }

    /// Case-insensitive name comparison used for uniqueness and lookup.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// The uploaded map image.
#[derive(Debug, Clone, PartialEq)]
pub struct MapImage {
    pub filename: String,
    /// MIME type, always `image/*`.
    pub mime: String,
    pub bytes: Vec<u8>,
    /// Natural pixel size, known once the browser has decoded the image.
    pub width: u32,
    pub height: u32,
}

impl MapImage {
    /// Wrap an uploaded file, rejecting anything that is not `image/*`.
    ///
    /// # Errors
    ///
    /// [`crate::WorkspaceError::NotAnImage`] when `mime` is not an image type.
    pub fn new(filename: &str, mime: &str, bytes: Vec<u8>) -> Result<Self, crate::WorkspaceError> {
        if !is_image_mime(mime) {
            return Err(crate::WorkspaceError::NotAnImage(mime.to_owned()));
        }
        Ok(Self { filename: filename.to_owned(), mime: mime.to_owned(), bytes, width: 0, height: 0 })
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

/// Whether `mime` names a raster or vector image type (`image/*`).
#[must_use]
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().strip_prefix("image/").is_some_and(|sub| !sub.is_empty())
}
