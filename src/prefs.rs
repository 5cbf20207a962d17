//! Waypoint list preferences and the listing they drive.
//!
//! Preferences are stored as one JSON value under [`PREFERENCES_KEY`] in a
//! [`PreferenceStore`]. Browser hosts back the store with `localStorage`;
//! tests and native hosts use [`MemoryPreferenceStore`].

#[cfg(test)]
#[path = "prefs_test.rs"]
mod prefs_test;

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use workspace::model::Waypoint;

use crate::SessionError;

pub const PREFERENCES_KEY: &str = "waymark.preferences";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Creation order.
    #[default]
    Time,
    /// Waypoint name, ignoring case.
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub group_by_category: bool,
}

/// String key/value persistence.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }
}

impl UiPreferences {
    /// Read preferences from `store`. Missing or unreadable values give the defaults.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let Some(raw) = store.get(PREFERENCES_KEY) else {
            return Self::default();
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable preferences");
                Self::default()
            }
        }
    }

    /// # Errors
    ///
    /// Fails only if the preferences cannot be serialized.
    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<(), SessionError> {
        store.set(PREFERENCES_KEY, serde_json::to_string(self)?);
        Ok(())
    }

    /// Pick a sort field. Picking the active field again flips the direction.
    pub fn sort_by(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Ascending;
        }
    }
}

/// Waypoints sharing one category, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointGroup<'a> {
    /// Category name; empty for uncategorized waypoints and for the single
    /// group produced when grouping is off.
    pub category: &'a str,
    pub waypoints: Vec<&'a Waypoint>,
}

/// Sort `waypoints` by the preferred field and direction, then optionally
/// split them into per-category groups ordered by name, uncategorized last.
#[must_use]
pub fn arrange<'a>(waypoints: &'a [Waypoint], prefs: &UiPreferences) -> Vec<WaypointGroup<'a>> {
    let mut sorted: Vec<&Waypoint> = waypoints.iter().collect();
    sorted.sort_by(|a, b| {
        let order = compare(a, b, prefs.sort_field);
        match prefs.sort_direction {
            SortDirection::Ascending => order,
            SortDirection::Descending => order.reverse(),
        }
    });
    if !prefs.group_by_category {
        return vec![WaypointGroup { category: "", waypoints: sorted }];
    }

    let mut groups: Vec<WaypointGroup<'a>> = Vec::new();
    for waypoint in sorted {
        let key = waypoint.category.to_lowercase();
        match groups.iter_mut().find(|g| g.category.to_lowercase() == key) {
            Some(group) => group.waypoints.push(waypoint),
            None => groups.push(WaypointGroup { category: &waypoint.category, waypoints: vec![waypoint] }),
        }
    }
    groups.sort_by(|a, b| match (a.category.is_empty(), b.category.is_empty()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
    });
    groups
}

fn compare(a: &Waypoint, b: &Waypoint, field: SortField) -> Ordering {
    match field {
        SortField::Time => a.sequence.cmp(&b.sequence),
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()).then(a.sequence.cmp(&b.sequence)),
    }
}
