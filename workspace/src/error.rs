/// Error returned by workspace mutations and by import/export.
///
/// Every variant leaves the workspace exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// A category with this name exists already (names compare case-insensitively).
    #[error("category already exists: {0}")]
    DuplicateCategory(String),
    /// Category names must contain something other than whitespace.
    #[error("category name is empty")]
    EmptyCategoryName,
    #[error("no waypoint with id {0}")]
    UnknownWaypoint(String),
    #[error("no category with id {0}")]
    UnknownCategory(String),
    /// Upload or import of something that is not a raster image.
    #[error("not an image: {0}")]
    NotAnImage(String),
    /// Export was requested before a map image was uploaded.
    #[error("no map image to export")]
    NoImage,
    /// The package has no `workspace.json` entry.
    #[error("missing workspace data")]
    MissingDocument,
    #[error("unsupported export file version: {0}")]
    UnsupportedVersion(String),
    /// The image named by the document is not in the package.
    #[error("package is missing map image {0}")]
    MissingImage(String),
    /// The document is not valid JSON or lacks a required section.
    #[error("invalid file format: {0}")]
    InvalidFile(#[from] serde_json::Error),
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}
