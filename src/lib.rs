//! Waypoint editing session for the map annotation editor.
//!
//! DESIGN
//! ======
//! The viewer ([`mapview`]) turns pointer input into point-level events and
//! never touches waypoint data. The workspace ([`workspace`]) owns waypoints,
//! categories and the image and knows nothing about the screen.
//! [`session::EditorSession`] sits between the two: it feeds viewer events
//! into the waypoint dialog, applies submitted dialogs to the workspace, and
//! queues [`session::Notice`]s for the host to show as toasts.
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Dialog flow, workspace mutations, import / export, notices |
//! | [`prefs`] | Persisted list preferences and the sorted / grouped waypoint listing |

mod error;

pub mod prefs;
pub mod session;

pub use error::SessionError;

/// Install a `tracing-subscriber` fmt subscriber.
///
/// Returns `false` when a subscriber was already installed, e.g. by a browser
/// host or a second call.
pub fn init_logging() -> bool {
    tracing_subscriber::fmt().try_init().is_ok()
}
