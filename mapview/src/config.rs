//! Viewer configuration: zoom limits, gesture thresholds and hit slop.
//!
//! Every field has a `DEFAULT_*`-style constant in [`crate::consts`]. Hosts
//! may override any subset from JSON; missing fields keep their defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    CENTER_MAX_SCALE, CLICK_MAX_MS, DRAG_DISTANCE_PX, FIT_MARGIN, HOLD_MS, MARKER_HIT_RADIUS_PX, MAX_SCALE, MIN_SCALE,
    SLOW_DRAG_AFTER_MS, SLOW_DRAG_DISTANCE_PX, WHEEL_ZOOM_STEP, ZOOM_STEP,
};

/// Error returned by [`ViewerConfig::from_json`] and [`ViewerConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input was not valid JSON for a viewer config.
    #[error("failed to parse viewer config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value outside its allowed range.
    #[error("invalid viewer config: {field} {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Thresholds used by the click-vs-drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Displacement (px) that turns a press into a drag at any time.
    pub drag_distance_px: f64,
    /// Smaller displacement (px) that turns a press into a drag once it is older than `slow_drag_after_ms`.
    pub slow_drag_distance_px: f64,
    pub slow_drag_after_ms: f64,
    /// Hold timer delay; a press still down after this long is a drag intent.
    pub hold_ms: f64,
    /// Presses released within this window may classify as clicks.
    pub click_max_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_distance_px: DRAG_DISTANCE_PX,
            slow_drag_distance_px: SLOW_DRAG_DISTANCE_PX,
            slow_drag_after_ms: SLOW_DRAG_AFTER_MS,
            hold_ms: HOLD_MS,
            click_max_ms: CLICK_MAX_MS,
        }
    }
}

/// Tunable settings for the map viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale increment for zoom-in / zoom-out commands.
    pub zoom_step: f64,
    /// Scale increment per wheel notch.
    pub wheel_zoom_step: f64,
    /// Fraction of the viewport the image fills after fit-to-view.
    pub fit_margin: f64,
    /// Upper bound on the scale used when centering on a waypoint.
    pub center_max_scale: f64,
    /// Keep the image from being panned out of the viewport.
    pub limit_to_bounds: bool,
    pub marker_hit_radius_px: f64,
    pub gesture: GestureConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step: ZOOM_STEP,
            wheel_zoom_step: WHEEL_ZOOM_STEP,
            fit_margin: FIT_MARGIN,
            center_max_scale: CENTER_MAX_SCALE,
            limit_to_bounds: false,
            marker_hit_radius_px: MARKER_HIT_RADIUS_PX,
            gesture: GestureConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is finite and in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid { field: "min_scale", reason: "must not exceed max_scale" });
        }
        positive("zoom_step", self.zoom_step)?;
        positive("wheel_zoom_step", self.wheel_zoom_step)?;
        positive("fit_margin", self.fit_margin)?;
        if self.fit_margin > 1.0 {
            return Err(ConfigError::Invalid { field: "fit_margin", reason: "must be at most 1" });
        }
        positive("center_max_scale", self.center_max_scale)?;
        non_negative("marker_hit_radius_px", self.marker_hit_radius_px)?;

        let g = &self.gesture;
        non_negative("gesture.drag_distance_px", g.drag_distance_px)?;
        non_negative("gesture.slow_drag_distance_px", g.slow_drag_distance_px)?;
        non_negative("gesture.slow_drag_after_ms", g.slow_drag_after_ms)?;
        non_negative("gesture.hold_ms", g.hold_ms)?;
        non_negative("gesture.click_max_ms", g.click_max_ms)?;
        Ok(())
    }

    /// Clamp `scale` into the configured range.
    #[must_use]
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: "must be a positive finite number" })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: "must be a non-negative finite number" })
    }
}
