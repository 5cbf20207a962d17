//! Click and waypoint history for on-screen debugging.
//!
//! The log only observes: the engine records into it after deciding what a
//! click means, and nothing here feeds back into that decision.

#[cfg(test)]
#[path = "debug_test.rs"]
mod debug_test;

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::coords::{PercentPoint, ScreenPoint, Transform};

/// Which log an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Click,
    Waypoint,
}

impl HistoryKind {
    fn title(self) -> &'static str {
        match self {
            Self::Click => "Click",
            Self::Waypoint => "Waypoint",
        }
    }
}

/// One recorded click or waypoint creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// 1-based position within its own log.
    pub id: u32,
    pub pixels: ScreenPoint,
    pub percent: PercentPoint,
    pub scale: f64,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
}

/// Live pointer readout shown while debugging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorReadout {
    pub screen: ScreenPoint,
    pub percent: PercentPoint,
    pub scale: f64,
    pub pan: ScreenPoint,
}

impl CursorReadout {
    /// Readout for `screen` under `transform`; `percent` is computed by the caller.
    #[must_use]
    pub fn new(screen: ScreenPoint, percent: PercentPoint, transform: &Transform) -> Self {
        Self { screen, percent, scale: transform.scale, pan: transform.position }
    }

    /// Rounded single-line summary, e.g. `px (120, 80) | % (12, 16) | pan (0, 0) | 1.00x`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "px ({}, {}) | % ({}, {}) | pan ({}, {}) | {:.2}x",
            self.screen.x.round(),
            self.screen.y.round(),
            self.percent.x.round(),
            self.percent.y.round(),
            self.pan.x.round(),
            self.pan.y.round(),
            self.scale
        )
    }
}

/// Two append-only logs plus the latest cursor readout.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    clicks: Vec<HistoryEntry>,
    waypoints: Vec<HistoryEntry>,
    cursor: Option<CursorReadout>,
}

impl DebugLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a classified click.
    pub fn record_click(&mut self, pixels: ScreenPoint, percent: PercentPoint, scale: f64, now_ms: f64) -> HistoryEntry {
        push_entry(&mut self.clicks, HistoryKind::Click, pixels, percent, scale, now_ms)
    }

    /// Append a created waypoint.
    pub fn record_waypoint(&mut self, pixels: ScreenPoint, percent: PercentPoint, scale: f64, now_ms: f64) -> HistoryEntry {
        push_entry(&mut self.waypoints, HistoryKind::Waypoint, pixels, percent, scale, now_ms)
    }

    pub fn set_cursor(&mut self, readout: CursorReadout) {
        self.cursor = Some(readout);
    }

    #[must_use]
    pub fn cursor(&self) -> Option<&CursorReadout> {
        self.cursor.as_ref()
    }

    #[must_use]
    pub fn clicks(&self) -> &[HistoryEntry] {
        &self.clicks
    }

    #[must_use]
    pub fn waypoints(&self) -> &[HistoryEntry] {
        &self.waypoints
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty() && self.waypoints.is_empty()
    }

    /// Both logs merged into one timestamp-ordered view. Equal timestamps keep
    /// clicks ahead of waypoints.
    #[must_use]
    pub fn merged(&self) -> Vec<&HistoryEntry> {
        let mut all: Vec<&HistoryEntry> = self.clicks.iter().chain(&self.waypoints).collect();
        all.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        all
    }

    /// Clear both logs and the cursor readout.
    pub fn reset(&mut self) {
        self.clicks.clear();
        self.waypoints.clear();
        self.cursor = None;
        tracing::debug!("debug history reset");
    }

    /// Plain-text dump of the merged history for the clipboard.
    #[must_use]
    pub fn export_text(&self) -> String {
        let blocks: Vec<String> = self.merged().into_iter().map(format_entry).collect();
        format!("History:\n{}", blocks.join("\n"))
    }

    /// Merged history as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if an entry holds a value JSON cannot represent.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.merged())
    }
}

fn push_entry(
    log: &mut Vec<HistoryEntry>,
    kind: HistoryKind,
    pixels: ScreenPoint,
    percent: PercentPoint,
    scale: f64,
    now_ms: f64,
) -> HistoryEntry {
    let id = u32::try_from(log.len()).map_or(u32::MAX, |n| n.saturating_add(1));
    let entry = HistoryEntry { id, pixels, percent, scale, timestamp: now_ms, kind };
    log.push(entry);
    tracing::debug!(kind = kind.title(), id, x = percent.x, y = percent.y, scale, "debug history entry");
    entry
}

fn format_entry(entry: &HistoryEntry) -> String {
    format!(
        "\n{} {}:\n  px: ({}, {})\n  %: ({}, {})\n  scale: {:.2}x\n  time: {}",
        entry.kind.title(),
        entry.id,
        entry.pixels.x.round(),
        entry.pixels.y.round(),
        entry.percent.x.round(),
        entry.percent.y.round(),
        entry.scale,
        clock_time(entry.timestamp)
    )
}

/// `HH:MM:SS` (UTC) for a millisecond timestamp; `--:--:--` if out of range.
#[allow(clippy::cast_possible_truncation)]
fn clock_time(ms: f64) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    OffsetDateTime::from_unix_timestamp_nanos((ms * 1_000_000.0) as i128)
        .map_err(|e| e.to_string())
        .and_then(|t| t.format(format).map_err(|e| e.to_string()))
        .unwrap_or_else(|_| "--:--:--".to_owned())
}
