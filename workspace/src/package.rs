//! Workspace packages: the map image plus `workspace.json`, as named entries.
//!
//! Archiving the entries (zip in the browser) is left to the host; this module
//! decides what goes in, what it is called, and how it is read back.

#[cfg(test)]
#[path = "package_test.rs"]
mod package_test;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::WorkspaceError;
use crate::document::{self, WorkspaceDocument};
use crate::model::MapImage;
use crate::store::{WorkspaceSnapshot, WorkspaceState};

/// Entry holding the serialized [`WorkspaceDocument`].
pub const DOCUMENT_ENTRY: &str = "workspace.json";

/// One named file inside a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PackageEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }
}

/// An exported workspace ready to be archived.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspacePackage {
    /// Suggested archive name, `<project>_<YYYY-MM-DDTHH-MM-SS>.zip`.
    pub file_name: String,
    pub document: WorkspaceDocument,
    pub entries: Vec<PackageEntry>,
}

/// File extension for an image MIME type; `.png` when unrecognized.
#[must_use]
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        _ => ".png",
    }
}

/// Name the map image is stored under: `map` plus the MIME extension.
#[must_use]
pub fn image_entry_name(mime: &str) -> String {
    format!("map{}", extension_for_mime(mime))
}

/// Archive file name: the project name with every non-alphanumeric character
/// replaced by `_`, lowercased, then the export time.
///
/// # Errors
///
/// Fails only if `now` cannot be formatted.
pub fn archive_file_name(project_name: &str, now: OffsetDateTime) -> Result<String, WorkspaceError> {
    let slug: String = project_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let stamp = now.format(format_description!("[year]-[month]-[day]T[hour]-[minute]-[second]"))?;
    Ok(format!("{slug}_{stamp}.zip"))
}

/// Package the current workspace.
///
/// # Errors
///
/// [`WorkspaceError::NoImage`] when no map image was uploaded.
pub fn export_workspace(state: &WorkspaceState, now: OffsetDateTime) -> Result<WorkspacePackage, WorkspaceError> {
    let image = state.image().ok_or(WorkspaceError::NoImage)?;
    let document = document::build_document(state, now)?;
    let json = serde_json::to_vec_pretty(&document)?;
    let file_name = archive_file_name(state.project_name(), now)?;
    let entries = vec![
        PackageEntry::new(document.metadata.image_metadata.filename.clone(), image.bytes.clone()),
        PackageEntry::new(DOCUMENT_ENTRY, json),
    ];
    tracing::info!(
        %file_name,
        waypoints = document.statistics.total_waypoints,
        categories = document.statistics.total_categories,
        "workspace exported"
    );
    Ok(WorkspacePackage { file_name, document, entries })
}

/// Read a package back into a workspace snapshot.
///
/// # Errors
///
/// - [`WorkspaceError::MissingDocument`] without a `workspace.json` entry
/// - [`WorkspaceError::UnsupportedVersion`] for a version other than `1.0`
/// - [`WorkspaceError::MissingImage`] when the named image entry is absent
/// - [`WorkspaceError::InvalidFile`] when the document is not valid JSON
pub fn import_workspace(entries: &[PackageEntry], now_ms: i64) -> Result<WorkspaceSnapshot, WorkspaceError> {
    let doc_entry = find_entry(entries, DOCUMENT_ENTRY).ok_or(WorkspaceError::MissingDocument)?;
    let raw = String::from_utf8_lossy(&doc_entry.bytes);
    let doc = document::parse_document(&raw)?;

    let meta = &doc.metadata.image_metadata;
    let image_entry = find_entry(entries, &meta.filename).ok_or_else(|| WorkspaceError::MissingImage(meta.filename.clone()))?;
    let mime = if meta.mime.trim().is_empty() { mime_for_name(&meta.filename) } else { meta.mime.trim() };
    let mut image = MapImage::new(&meta.filename, mime, image_entry.bytes.clone())?;
    image.width = meta.width;
    image.height = meta.height;

    let waypoints = document::sanitize_waypoints(&doc.waypoints, now_ms);
    let categories = document::sanitize_categories(&doc.categories);
    tracing::info!(waypoints = waypoints.len(), categories = categories.len(), "workspace imported");
    Ok(WorkspaceSnapshot { project_name: doc.metadata.project_name, image, waypoints, categories })
}

fn find_entry<'a>(entries: &'a [PackageEntry], name: &str) -> Option<&'a PackageEntry> {
    entries.iter().find(|e| e.name == name)
}

/// Inverse of [`extension_for_mime`] for documents that omit the type.
fn mime_for_name(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    let ext = lower.rsplit_once('.').map_or("", |(_, ext)| ext);
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/png",
    }
}
