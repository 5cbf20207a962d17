//! In-memory workspace: the single owner of waypoints, categories and the map image.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;

use mapview::coords::PercentPoint;
use mapview::overlay::CategoryColors;

use crate::WorkspaceError;
use crate::model::{Category, DEFAULT_PROJECT_NAME, MapImage, Waypoint, palette_color};

/// Result of adding or editing a waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointChange {
    pub waypoint: Waypoint,
    /// Category auto-created because the waypoint named an unknown one.
    pub created_category: Option<Category>,
}

/// A complete replacement workspace, produced by import.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceSnapshot {
    pub project_name: String,
    pub image: MapImage,
    /// Ordered by sequence.
    pub waypoints: Vec<Waypoint>,
    pub categories: Vec<Category>,
}

/// Waypoint and category lists plus the map image.
///
/// Waypoints are always kept ordered by `sequence`. Category names are unique
/// ignoring case.
#[derive(Debug, Clone)]
pub struct WorkspaceState {
    project_name: String,
    image: Option<MapImage>,
    waypoints: Vec<Waypoint>,
    categories: Vec<Category>,
    counter: u64,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_owned(),
            image: None,
            waypoints: Vec::new(),
            categories: Vec::new(),
            counter: 0,
        }
    }
}

impl WorkspaceState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Project / image ---

    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Rename the project. Blank names are ignored.
    pub fn set_project_name(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.project_name = name.to_owned();
        }
    }

    #[must_use]
    pub fn image(&self) -> Option<&MapImage> {
        self.image.as_ref()
    }

    /// Replace the map image. Waypoints keep their percent positions.
    pub fn set_image(&mut self, image: MapImage) {
        tracing::info!(filename = %image.filename, mime = %image.mime, size = image.size(), "map image set");
        self.image = Some(image);
    }

    /// Record the natural size reported once the browser decoded the image.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        if let Some(image) = self.image.as_mut() {
            image.width = width;
            image.height = height;
        }
    }

    pub fn delete_image(&mut self) -> Option<MapImage> {
        self.image.take()
    }

    // --- Waypoints ---

    /// Waypoints ordered by creation sequence.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    #[must_use]
    pub fn waypoint(&self, id: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == id)
    }

    /// Sequence number the next waypoint will get.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.counter + 1
    }

    /// Create a waypoint at `position` (clamped into `[0, 100]`).
    ///
    /// An unknown, non-blank `category` creates a new category with the next
    /// palette color.
    pub fn add_waypoint(&mut self, position: PercentPoint, name: &str, category: &str, now_ms: i64) -> WaypointChange {
        let sequence = self.next_sequence();
        self.counter = sequence;
        let at = position.clamped();
        let waypoint = Waypoint {
            id: Waypoint::make_id(now_ms, sequence),
            x: at.x,
            y: at.y,
            name: name.trim().to_owned(),
            category: category.trim().to_owned(),
            timestamp: now_ms,
            sequence,
        };
        self.waypoints.push(waypoint.clone());
        self.waypoints.sort_by_key(|w| w.sequence);
        tracing::info!(id = %waypoint.id, x = waypoint.x, y = waypoint.y, "waypoint added");
        let created_category = self.ensure_category(&waypoint.category);
        WaypointChange { waypoint, created_category }
    }

    /// Change a waypoint's name and category. Its position never changes.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::UnknownWaypoint`] if no waypoint has `id`.
    pub fn edit_waypoint(&mut self, id: &str, name: &str, category: &str) -> Result<WaypointChange, WorkspaceError> {
        let waypoint = self
            .waypoints
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| WorkspaceError::UnknownWaypoint(id.to_owned()))?;
        waypoint.name = name.trim().to_owned();
        waypoint.category = category.trim().to_owned();
        let waypoint = waypoint.clone();
        tracing::info!(id, "waypoint edited");
        let created_category = self.ensure_category(&waypoint.category);
        Ok(WaypointChange { waypoint, created_category })
    }

    /// # Errors
    ///
    /// [`WorkspaceError::UnknownWaypoint`] if no waypoint has `id`.
    pub fn delete_waypoint(&mut self, id: &str) -> Result<Waypoint, WorkspaceError> {
        let index = self
            .waypoints
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| WorkspaceError::UnknownWaypoint(id.to_owned()))?;
        tracing::info!(id, "waypoint deleted");
        Ok(self.waypoints.remove(index))
    }

    /// Remove every waypoint and restart sequence numbering. Returns how many were removed.
    pub fn clear_waypoints(&mut self) -> usize {
        let removed = self.waypoints.len();
        self.waypoints.clear();
        self.counter = 0;
        tracing::info!(removed, "waypoints cleared");
        removed
    }

    // --- Categories ---

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn category_named(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.is_named(name))
    }

    /// Create a category. `color` defaults to the next palette color.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::EmptyCategoryName`] for a blank name,
    /// [`WorkspaceError::DuplicateCategory`] if the name is taken (ignoring case).
    pub fn add_category(&mut self, name: &str, color: Option<&str>) -> Result<&Category, WorkspaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyCategoryName);
        }
        if self.category_named(name).is_some() {
            return Err(WorkspaceError::DuplicateCategory(name.to_owned()));
        }
        let color = color.map_or_else(|| palette_color(self.categories.len()), str::trim);
        Ok(self.push_category(Category::new(name, color)))
    }

    /// Delete a category. Waypoints keep the name and fall back to the default marker color.
    ///
    /// # Errors
    ///
    /// [`WorkspaceError::UnknownCategory`] if no category has `id`.
    pub fn delete_category(&mut self, id: &str) -> Result<Category, WorkspaceError> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| WorkspaceError::UnknownCategory(id.to_owned()))?;
        let removed = self.categories.remove(index);
        tracing::info!(id, name = %removed.name, "category deleted");
        Ok(removed)
    }

    /// Remove every category; all waypoints become uncategorized.
    pub fn clear_categories(&mut self) -> usize {
        let removed = self.categories.len();
        self.categories.clear();
        for waypoint in &mut self.waypoints {
            waypoint.category.clear();
        }
        tracing::info!(removed, "categories cleared");
        removed
    }

    /// Waypoint count per category name (exact match), including empty categories.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        self.categories
            .iter()
            .map(|c| (c.name.clone(), self.waypoints.iter().filter(|w| w.category == c.name).count()))
            .collect()
    }

    // --- Import ---

    /// Replace the whole workspace with an imported one.
    pub fn load(&mut self, snapshot: WorkspaceSnapshot) {
        let WorkspaceSnapshot { project_name, image, mut waypoints, categories } = snapshot;
        waypoints.sort_by_key(|w| w.sequence);
        self.counter = waypoints.iter().map(|w| w.sequence).max().unwrap_or(0);
        self.set_project_name(&project_name);
        self.image = Some(image);
        self.waypoints = waypoints;
        self.categories = categories;
        tracing::info!(
            waypoints = self.waypoints.len(),
            categories = self.categories.len(),
            counter = self.counter,
            "workspace loaded"
        );
    }

    // --- Internals ---

    fn ensure_category(&mut self, name: &str) -> Option<Category> {
        if name.is_empty() || self.category_named(name).is_some() {
            return None;
        }
        let color = palette_color(self.categories.len());
        Some(self.push_category(Category::new(name, color)).clone())
    }

    fn push_category(&mut self, category: Category) -> &Category {
        tracing::info!(id = %category.id, name = %category.name, color = %category.color, "category added");
        self.categories.push(category);
        &self.categories[self.categories.len() - 1]
    }
}

impl CategoryColors for WorkspaceState {
    fn color_of(&self, category: &str) -> Option<&str> {
        self.category_named(category).map(|c| c.color.as_str())
    }
}
