//! Input model: tools, buttons, keys, modifier state and UI context.
//!
//! These are the plain values the host translates DOM events into before
//! handing them to [`crate::engine::ViewerCore`]. `UiState` carries the
//! session-scoped context (active tool, debug flag) explicitly instead of
//! reading it from ambient globals.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Drag to pan, click markers to edit them (default).
    #[default]
    Pan,
    /// Clicks on the image place a new waypoint.
    AddWaypoint,
}

/// Chord modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether a chord modifier (Ctrl / Meta / Alt) is held, which reserves
    /// the key for the browser or OS.
    #[must_use]
    pub fn has_chord(self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    Middle,
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key as reported by the browser's `KeyboardEvent.key` (e.g. `"+"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where keyboard focus is when a key event arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusContext {
    /// Focus is inside a text input, textarea or content-editable element.
    pub in_text_input: bool,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount. A mostly-sideways scroll does not zoom.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// CSS cursor the viewport should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Grab,
    Grabbing,
    Crosshair,
}

impl CursorStyle {
    /// CSS `cursor` property value.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Crosshair => "crosshair",
        }
    }

    /// Resting cursor for `tool` when no drag is in progress.
    #[must_use]
    pub fn for_tool(tool: Tool) -> Self {
        match tool {
            Tool::Pan => Self::Grab,
            Tool::AddWaypoint => Self::Crosshair,
        }
    }
}

/// Session-scoped UI context visible to the engine and overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub tool: Tool,
    /// Record clicks and waypoint creation in the debug log.
    pub debug: bool,
}
