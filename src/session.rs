//! The editing session: viewer events in, workspace mutations and notices out.
//!
//! DESIGN
//! ======
//! `EditorSession` owns one [`ViewerCore`] and one [`WorkspaceState`]. The
//! host forwards DOM input to the viewer (directly, or through
//! [`EditorSession::pointer_up`] which also hit-tests the current markers),
//! then passes the resulting events to [`EditorSession::handle_events`]:
//!
//! - `CoordinateSelected` opens a create dialog at that point
//! - `WaypointClicked` centers the view on the waypoint and opens an edit dialog
//!
//! The dialog stores its waypoint's percent position, never a screen point,
//! so [`EditorSession::dialog_anchor`] follows every pan and zoom. Every user
//! operation queues a [`Notice`] for the toast layer, success or failure.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::VecDeque;

use mapview::config::ViewerConfig;
use mapview::coords::{Dimensions, PercentPoint, ScreenPoint, normalized_to_percent, percent_to_normalized};
use mapview::engine::ViewerCore;
use mapview::events::Event;
use mapview::input::Button;
use mapview::overlay::MarkerLayout;
use mapview::transform::ViewCommand;
use time::OffsetDateTime;
use workspace::model::{Category, MapImage, Waypoint};
use workspace::package::{self, PackageEntry, WorkspacePackage};
use workspace::store::WorkspaceState;

use crate::SessionError;
use crate::prefs::{self, PreferenceStore, SortField, UiPreferences, WaypointGroup};

// =============================================================================
// NOTICES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A transient message for the toast layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

// =============================================================================
// DIALOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit { id: String },
}

/// The open waypoint dialog and its prefilled fields.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointDialog {
    pub mode: DialogMode,
    /// Where the waypoint is (or will be). Fixed for the dialog's lifetime.
    pub position: PercentPoint,
    pub name: String,
    pub category: String,
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone)]
pub struct EditorSession {
    viewer: ViewerCore,
    workspace: WorkspaceState,
    dialog: Option<WaypointDialog>,
    notices: VecDeque<Notice>,
    prefs: UiPreferences,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl EditorSession {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            viewer: ViewerCore::new(config),
            workspace: WorkspaceState::new(),
            dialog: None,
            notices: VecDeque::new(),
            prefs: UiPreferences::default(),
        }
    }

    /// A session with viewer settings read from JSON.
    ///
    /// # Errors
    ///
    /// [`SessionError::Config`] when the JSON is malformed or out of range.
    pub fn from_config_json(raw: &str) -> Result<Self, SessionError> {
        Ok(Self::new(ViewerConfig::from_json(raw)?))
    }

    // --- Accessors ---

    #[must_use]
    pub fn viewer(&self) -> &ViewerCore {
        &self.viewer
    }

    /// Direct viewer access for input that needs no workspace data
    /// (pointer down / move / leave, wheel, keys, tool changes).
    pub fn viewer_mut(&mut self) -> &mut ViewerCore {
        &mut self.viewer
    }

    #[must_use]
    pub fn workspace(&self) -> &WorkspaceState {
        &self.workspace
    }

    #[must_use]
    pub fn dialog(&self) -> Option<&WaypointDialog> {
        self.dialog.as_ref()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // --- Viewer events ---

    /// React to viewer events. Returns follow-up events (view changes) in order.
    pub fn handle_events(&mut self, events: &[Event]) -> Vec<Event> {
        let mut follow_up = Vec::new();
        for event in events {
            match event {
                Event::CoordinateSelected { point, .. } => self.open_create(normalized_to_percent(*point)),
                Event::WaypointClicked { id, .. } => follow_up.extend(self.open_edit(id)),
                _ => {}
            }
        }
        follow_up
    }

    /// Pointer release, hit-tested against the markers currently on screen.
    ///
    /// Returns the viewer's events followed by any follow-ups from handling them.
    pub fn pointer_up(&mut self, at: ScreenPoint, button: Button, target: Option<&str>, now_ms: f64) -> Vec<Event> {
        let markers = self.markers();
        let mut events = self.viewer.on_pointer_up(at, button, target, &markers, now_ms);
        let follow_up = self.handle_events(&events);
        events.extend(follow_up);
        events
    }

    /// Marker layout for every waypoint under the live transform.
    #[must_use]
    pub fn markers(&self) -> Vec<MarkerLayout> {
        self.viewer.layout_markers(self.workspace.waypoints(), &self.workspace)
    }

    // --- Dialog ---

    /// Screen anchor of the open dialog under the current transform.
    #[must_use]
    pub fn dialog_anchor(&self) -> Option<ScreenPoint> {
        self.viewer.anchor_for(self.dialog.as_ref()?.position)
    }

    /// Apply the open dialog: create a waypoint or update the edited one.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoDialog`] when nothing is open, or the workspace error
    /// when the edited waypoint has disappeared. The dialog closes either way.
    pub fn submit_dialog(&mut self, name: &str, category: &str, now_ms: i64) -> Result<Waypoint, SessionError> {
        let Some(dialog) = self.dialog.take() else {
            return self.fail(SessionError::NoDialog);
        };
        let change = match dialog.mode {
            DialogMode::Create => {
                let change = self.workspace.add_waypoint(dialog.position, name, category, now_ms);
                if let Some(entry) = self.viewer.record_waypoint(change.waypoint.position(), millis(now_ms)) {
                    tracing::debug!(id = entry.id, "waypoint recorded in debug history");
                }
                self.notify(NoticeLevel::Success, "Waypoint added successfully");
                change
            }
            DialogMode::Edit { id } => match self.workspace.edit_waypoint(&id, name, category) {
                Ok(change) => {
                    self.notify(NoticeLevel::Success, "Waypoint updated successfully");
                    change
                }
                Err(err) => return self.fail(err.into()),
            },
        };
        if let Some(created) = &change.created_category {
            self.notify(NoticeLevel::Info, format!("Category \"{}\" created", created.name));
        }
        Ok(change.waypoint)
    }

    /// Close the dialog without changes. Returns whether one was open.
    pub fn cancel_dialog(&mut self) -> bool {
        self.dialog.take().is_some()
    }

    fn open_create(&mut self, position: PercentPoint) {
        tracing::debug!(x = position.x, y = position.y, "create dialog opened");
        self.dialog =
            Some(WaypointDialog { mode: DialogMode::Create, position, name: String::new(), category: String::new() });
    }

    fn open_edit(&mut self, id: &str) -> Vec<Event> {
        let Some(waypoint) = self.workspace.waypoint(id) else {
            tracing::warn!(id, "clicked marker has no waypoint");
            return Vec::new();
        };
        let position = waypoint.position();
        self.dialog = Some(WaypointDialog {
            mode: DialogMode::Edit { id: id.to_owned() },
            position,
            name: waypoint.name.clone(),
            category: waypoint.category.clone(),
        });
        tracing::debug!(id, "edit dialog opened");
        self.viewer.command(ViewCommand::CenterOn(percent_to_normalized(position)))
    }

    // --- Map image ---

    /// Accept an uploaded file as the map image. Waypoints are kept.
    ///
    /// # Errors
    ///
    /// [`SessionError::Workspace`] when the file is not an image.
    pub fn upload_image(&mut self, filename: &str, mime: &str, bytes: Vec<u8>) -> Result<(), SessionError> {
        match MapImage::new(filename, mime, bytes) {
            Ok(image) => {
                self.workspace.set_image(image);
                self.notify(NoticeLevel::Success, "Map uploaded successfully");
                Ok(())
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// The browser decoded the map image at its natural size.
    pub fn image_loaded(&mut self, width: u32, height: u32) -> Vec<Event> {
        self.workspace.set_image_size(width, height);
        self.viewer.on_image_load(Dimensions::new(f64::from(width), f64::from(height)))
    }

    pub fn delete_image(&mut self) -> Vec<Event> {
        if self.workspace.delete_image().is_none() {
            return Vec::new();
        }
        self.dialog = None;
        self.notify(NoticeLevel::Success, "Map deleted successfully");
        self.viewer.clear_image()
    }

    // --- Workspace ---

    pub fn set_project_name(&mut self, name: &str) {
        self.workspace.set_project_name(name);
    }

    /// # Errors
    ///
    /// [`SessionError::Workspace`] when no waypoint has `id`.
    pub fn delete_waypoint(&mut self, id: &str) -> Result<Waypoint, SessionError> {
        match self.workspace.delete_waypoint(id) {
            Ok(removed) => {
                if self.dialog.as_ref().is_some_and(|d| matches!(&d.mode, DialogMode::Edit { id: open } if open == id)) {
                    self.dialog = None;
                }
                self.notify(NoticeLevel::Success, "Waypoint deleted successfully");
                Ok(removed)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    pub fn clear_waypoints(&mut self) -> usize {
        let removed = self.workspace.clear_waypoints();
        if self.dialog.as_ref().is_some_and(|d| matches!(d.mode, DialogMode::Edit { .. })) {
            self.dialog = None;
        }
        self.notify(NoticeLevel::Success, "All waypoints cleared");
        removed
    }

    /// # Errors
    ///
    /// [`SessionError::Workspace`] for a blank or already used name.
    pub fn add_category(&mut self, name: &str, color: Option<&str>) -> Result<Category, SessionError> {
        match self.workspace.add_category(name, color).map(Category::clone) {
            Ok(category) => {
                self.notify(NoticeLevel::Success, "Category added successfully");
                Ok(category)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// # Errors
    ///
    /// [`SessionError::Workspace`] when no category has `id`.
    pub fn delete_category(&mut self, id: &str) -> Result<Category, SessionError> {
        match self.workspace.delete_category(id) {
            Ok(removed) => {
                self.notify(NoticeLevel::Success, "Category deleted successfully");
                Ok(removed)
            }
            Err(err) => self.fail(err.into()),
        }
    }

    pub fn clear_categories(&mut self) -> usize {
        let removed = self.workspace.clear_categories();
        self.notify(NoticeLevel::Success, "All categories cleared");
        removed
    }

    // --- Import / export ---

    /// Package the workspace for download.
    ///
    /// # Errors
    ///
    /// [`SessionError::Workspace`] without a map image.
    pub fn export(&mut self, now_ms: i64) -> Result<WorkspacePackage, SessionError> {
        let result = clock(now_ms)
            .and_then(|now| package::export_workspace(&self.workspace, now).map_err(SessionError::from));
        match result {
            Ok(package) => {
                self.notify(NoticeLevel::Success, "Workspace exported successfully");
                Ok(package)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Replace the workspace with an imported package.
    ///
    /// The viewer drops the old image; the host loads the imported one and
    /// reports its size through [`Self::image_loaded`].
    ///
    /// # Errors
    ///
    /// [`SessionError::Workspace`] when the package is unusable. Nothing changes then.
    pub fn import(&mut self, entries: &[PackageEntry], now_ms: i64) -> Result<Vec<Event>, SessionError> {
        match package::import_workspace(entries, now_ms) {
            Ok(snapshot) => {
                self.workspace.load(snapshot);
                self.dialog = None;
                self.notify(NoticeLevel::Success, "Workspace imported successfully");
                Ok(self.viewer.clear_image())
            }
            Err(err) => self.fail(err.into()),
        }
    }

    // --- Listing ---

    #[must_use]
    pub fn preferences(&self) -> UiPreferences {
        self.prefs
    }

    pub fn load_preferences(&mut self, store: &dyn PreferenceStore) {
        self.prefs = UiPreferences::load(store);
    }

    /// # Errors
    ///
    /// Fails only if the preferences cannot be serialized.
    pub fn save_preferences(&self, store: &mut dyn PreferenceStore) -> Result<(), SessionError> {
        self.prefs.save(store)
    }

    pub fn sort_by(&mut self, field: SortField) {
        self.prefs.sort_by(field);
    }

    pub fn set_group_by_category(&mut self, enabled: bool) {
        self.prefs.group_by_category = enabled;
    }

    /// Waypoints in list order under the current preferences.
    #[must_use]
    pub fn waypoint_groups(&self) -> Vec<WaypointGroup<'_>> {
        prefs::arrange(self.workspace.waypoints(), &self.prefs)
    }

    // --- Internals ---

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push_back(Notice { level, message: message.into() });
    }

    fn fail<T>(&mut self, err: SessionError) -> Result<T, SessionError> {
        tracing::warn!(%err, "operation failed");
        self.notify(NoticeLevel::Error, err.to_string());
        Err(err)
    }
}

#[allow(clippy::cast_precision_loss)]
fn millis(ms: i64) -> f64 {
    ms as f64
}

fn clock(now_ms: i64) -> Result<OffsetDateTime, SessionError> {
    Ok(OffsetDateTime::from_unix_timestamp_nanos(i128::from(now_ms) * 1_000_000)?)
}
