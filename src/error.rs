use mapview::config::ConfigError;
use workspace::WorkspaceError;

/// Error returned by [`crate::session::EditorSession`] operations.
///
/// A failed operation leaves both the viewer and the workspace untouched and
/// queues an error notice with the same message.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    /// Submit or delete from the dialog while no dialog is open.
    #[error("no waypoint dialog is open")]
    NoDialog,
    /// A clock value outside the range the calendar can represent.
    #[error("invalid timestamp: {0}")]
    Clock(#[from] time::error::ComponentRange),
    #[error("failed to save preferences: {0}")]
    Preferences(#[from] serde_json::Error),
}
