//! Live pan/zoom state of the viewport and the commands that mutate it.
//!
//! [`TransformState`] is the only owner of the current [`Transform`]. Every
//! mutation is synchronous and returns the new snapshot so callers can re-anchor
//! overlays against it immediately. Scale always stays inside the configured
//! range and position always stays finite.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::config::ViewerConfig;
use crate::coords::{Dimensions, NormalizedPoint, ScreenPoint, Transform};

/// A view change requested from outside the viewport (toolbar buttons,
/// keyboard shortcuts, "show on map" from a list).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    ZoomIn,
    ZoomOut,
    /// Scale 1, image centered.
    Reset,
    /// Largest scale that shows the whole image, centered.
    Fit,
    /// Put this image point at the viewport center.
    CenterOn(NormalizedPoint),
    PanBy(ScreenPoint),
}

/// Pan/zoom state plus the viewport and image sizes it is derived from.
#[derive(Debug, Clone)]
pub struct TransformState {
    transform: Transform,
    viewport: Dimensions,
    image: Option<Dimensions>,
    config: ViewerConfig,
}

impl TransformState {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            transform: Transform { scale: config.clamp_scale(1.0), position: ScreenPoint::default() },
            viewport: Dimensions::new(0.0, 0.0),
            image: None,
            config,
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Natural size of the loaded image, or `None` before an image has loaded.
    #[must_use]
    pub fn image(&self) -> Option<Dimensions> {
        self.image
    }

    #[must_use]
    pub fn viewport(&self) -> Dimensions {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Record the viewport's CSS size. Non-usable sizes are ignored.
    pub fn set_viewport(&mut self, size: Dimensions) {
        if size.is_usable() {
            self.viewport = size;
        }
    }

    /// Record a newly loaded image and reset the view onto it.
    pub fn set_image(&mut self, image: Dimensions) -> Transform {
        if !image.is_usable() {
            tracing::warn!(width = image.width, height = image.height, "ignoring image with unusable dimensions");
            return self.transform;
        }
        self.image = Some(image);
        self.reset_view()
    }

    /// Forget the image; the transform returns to its defaults.
    pub fn clear_image(&mut self) {
        self.image = None;
        self.transform = Transform { scale: self.config.clamp_scale(1.0), position: ScreenPoint::default() };
    }

    /// Apply a [`ViewCommand`] using the configured zoom step.
    pub fn apply(&mut self, command: ViewCommand) -> Transform {
        tracing::debug!(?command, "view command");
        match command {
            ViewCommand::ZoomIn => self.zoom_in(self.config.zoom_step),
            ViewCommand::ZoomOut => self.zoom_out(self.config.zoom_step),
            ViewCommand::Reset => self.reset_view(),
            ViewCommand::Fit => self.fit_to_view(),
            ViewCommand::CenterOn(point) => self.center_on_point(point),
            ViewCommand::PanBy(delta) => self.pan_by(delta),
        }
    }

    /// Increase scale by `step`, keeping the viewport center fixed.
    pub fn zoom_in(&mut self, step: f64) -> Transform {
        let anchor = self.viewport.center();
        self.zoom_about(anchor, self.transform.scale + step)
    }

    /// Decrease scale by `step`, keeping the viewport center fixed.
    pub fn zoom_out(&mut self, step: f64) -> Transform {
        let anchor = self.viewport.center();
        self.zoom_about(anchor, self.transform.scale - step)
    }

    /// Change scale by `step` (negative zooms out) keeping `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: ScreenPoint, step: f64) -> Transform {
        self.zoom_about(anchor, self.transform.scale + step)
    }

    fn zoom_about(&mut self, anchor: ScreenPoint, target_scale: f64) -> Transform {
        if !anchor.is_finite() || !target_scale.is_finite() {
            return self.transform;
        }
        let old = self.transform.scale;
        let new = self.config.clamp_scale(target_scale);
        if (new - old).abs() < f64::EPSILON {
            return self.transform;
        }
        let ratio = new / old;
        let p = self.transform.position;
        self.transform = Transform {
            scale: new,
            position: ScreenPoint::new(anchor.x - (anchor.x - p.x) * ratio, anchor.y - (anchor.y - p.y) * ratio),
        };
        self.transform
    }

    /// Scale 1 (clamped to the configured range) with the image centered.
    pub fn reset_view(&mut self) -> Transform {
        let scale = self.config.clamp_scale(1.0);
        self.transform = Transform { scale, position: self.centered_position(scale) };
        self.transform
    }

    /// Show the whole image: scale to the tighter axis times the fit margin, then center.
    ///
    /// No-op before an image has loaded or the viewport has been measured.
    pub fn fit_to_view(&mut self) -> Transform {
        let Some(image) = self.image else {
            return self.transform;
        };
        if !self.viewport.is_usable() {
            return self.transform;
        }
        let raw = (self.viewport.width / image.width).min(self.viewport.height / image.height) * self.config.fit_margin;
        let scale = self.config.clamp_scale(raw);
        self.transform = Transform { scale, position: self.centered_position(scale) };
        self.transform
    }

    /// Move `point` to the viewport center at `min(center_max_scale, current scale)`.
    pub fn center_on_point(&mut self, point: NormalizedPoint) -> Transform {
        let Some(image) = self.image else {
            return self.transform;
        };
        if !point.x.is_finite() || !point.y.is_finite() {
            return self.transform;
        }
        let scale = self.config.clamp_scale(self.config.center_max_scale.min(self.transform.scale));
        let center = self.viewport.center();
        self.transform = Transform {
            scale,
            position: ScreenPoint::new(
                center.x - point.x * image.width * scale,
                center.y - point.y * image.height * scale,
            ),
        };
        self.transform
    }

    /// Translate by `delta`, clamped to keep the image in view when bounds are limited.
    pub fn pan_by(&mut self, delta: ScreenPoint) -> Transform {
        if !delta.is_finite() {
            return self.transform;
        }
        let p = self.transform.position;
        let moved = ScreenPoint::new(p.x + delta.x, p.y + delta.y);
        self.transform.position = if self.config.limit_to_bounds { self.bounded(moved) } else { moved };
        self.transform
    }

    fn centered_position(&self, scale: f64) -> ScreenPoint {
        let Some(image) = self.image else {
            return ScreenPoint::default();
        };
        ScreenPoint::new(
            (self.viewport.width - image.width * scale) / 2.0,
            (self.viewport.height - image.height * scale) / 2.0,
        )
    }

    fn bounded(&self, position: ScreenPoint) -> ScreenPoint {
        let Some(image) = self.image else {
            return position;
        };
        let scale = self.transform.scale;
        ScreenPoint::new(
            clamp_axis(position.x, image.width * scale, self.viewport.width),
            clamp_axis(position.y, image.height * scale, self.viewport.height),
        )
    }
}

/// Keep a span of `size` starting at `pos` inside `[0, view]`, or covering it when larger.
fn clamp_axis(pos: f64, size: f64, view: f64) -> f64 {
    let (lo, hi) = if size <= view { (0.0, view - size) } else { (view - size, 0.0) };
    pos.clamp(lo, hi)
}

impl Default for TransformState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
