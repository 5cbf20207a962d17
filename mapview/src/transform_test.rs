#![allow(clippy::float_cmp)]

use super::*;
use crate::coords::{normalized_to_screen, screen_to_normalized};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn transform_approx_eq(a: Transform, b: Transform) -> bool {
    approx_eq(a.scale, b.scale) && approx_eq(a.position.x, b.position.x) && approx_eq(a.position.y, b.position.y)
}

fn state_with(viewport: (f64, f64), image: (f64, f64)) -> TransformState {
    let mut state = TransformState::default();
    state.set_viewport(Dimensions::new(viewport.0, viewport.1));
    state.set_image(Dimensions::new(image.0, image.1));
    state
}

fn state_at(scale: f64, x: f64, y: f64) -> TransformState {
    let mut state = state_with((800.0, 600.0), (1000.0, 500.0));
    state.transform = Transform { scale, position: ScreenPoint::new(x, y) };
    state
}

// --- defaults ---

#[test]
fn default_transform_is_identity() {
    let state = TransformState::default();
    assert_eq!(state.transform(), Transform::default());
    assert!(state.image().is_none());
}

#[test]
fn set_image_ignores_unusable_dimensions() {
    let mut state = TransformState::default();
    state.set_image(Dimensions::new(0.0, 100.0));
    assert!(state.image().is_none());
}

#[test]
fn set_viewport_ignores_zero_size() {
    let mut state = TransformState::default();
    state.set_viewport(Dimensions::new(800.0, 600.0));
    state.set_viewport(Dimensions::new(0.0, 0.0));
    assert_eq!(state.viewport(), Dimensions::new(800.0, 600.0));
}

// --- zoom ---

#[test]
fn zoom_in_adds_step() {
    let mut state = state_at(1.0, 0.0, 0.0);
    let t = state.zoom_in(0.25);
    assert!(approx_eq(t.scale, 1.25));
}

#[test]
fn zoom_in_keeps_viewport_center_fixed() {
    let mut state = state_at(1.0, -100.0, 50.0);
    let image = Dimensions::new(1000.0, 500.0);
    let center = ScreenPoint::new(400.0, 300.0);
    let before = screen_to_normalized(center, &state.transform(), image);
    state.zoom_in(0.25);
    let after = screen_to_normalized(center, &state.transform(), image);
    assert!(approx_eq(before.x, after.x));
    assert!(approx_eq(before.y, after.y));
}

#[test]
fn zoom_in_from_identity_matches_center_offset_formula() {
    // From scale 1 at the origin: position' = position - center * (scale' - scale).
    let mut state = state_at(1.0, 0.0, 0.0);
    let t = state.zoom_in(0.25);
    assert!(approx_eq(t.position.x, -400.0 * 0.25));
    assert!(approx_eq(t.position.y, -300.0 * 0.25));
}

#[test]
fn zoom_in_then_out_restores_transform() {
    let starts = [(1.0, 0.0, 0.0), (1.0, -100.0, 50.0), (2.0, 37.5, -410.0), (0.75, 12.0, 99.0), (3.5, -1500.0, -800.0)];
    for (scale, x, y) in starts {
        let mut state = state_at(scale, x, y);
        let original = state.transform();
        state.zoom_in(0.25);
        let restored = state.zoom_out(0.25);
        assert!(transform_approx_eq(original, restored), "{original:?} became {restored:?}");
    }
}

#[test]
fn zoom_out_then_in_restores_transform() {
    let mut state = state_at(2.0, 120.0, -60.0);
    let original = state.transform();
    state.zoom_out(0.25);
    let restored = state.zoom_in(0.25);
    assert!(transform_approx_eq(original, restored));
}

#[test]
fn repeated_zoom_in_never_exceeds_max() {
    let mut state = state_at(1.0, 0.0, 0.0);
    for _ in 0..50 {
        let t = state.zoom_in(0.25);
        assert!(t.scale <= 4.0);
    }
    assert_eq!(state.transform().scale, 4.0);
}

#[test]
fn repeated_zoom_out_never_below_min() {
    let mut state = state_at(1.0, 0.0, 0.0);
    for _ in 0..50 {
        let t = state.zoom_out(0.25);
        assert!(t.scale >= 0.5);
    }
    assert_eq!(state.transform().scale, 0.5);
}

#[test]
fn zoom_in_at_max_leaves_position_unchanged() {
    let mut state = state_at(4.0, -30.0, 10.0);
    let t = state.zoom_in(0.25);
    assert_eq!(t, Transform { scale: 4.0, position: ScreenPoint::new(-30.0, 10.0) });
}

#[test]
fn zoom_at_keeps_anchor_fixed() {
    let mut state = state_at(1.5, 20.0, 40.0);
    let image = Dimensions::new(1000.0, 500.0);
    let anchor = ScreenPoint::new(123.0, 456.0);
    let before = screen_to_normalized(anchor, &state.transform(), image);
    state.zoom_at(anchor, 0.1);
    let after = screen_to_normalized(anchor, &state.transform(), image);
    assert!(approx_eq(before.x, after.x));
    assert!(approx_eq(before.y, after.y));
    assert!(approx_eq(state.transform().scale, 1.6));
}

#[test]
fn zoom_rejects_non_finite_step() {
    let mut state = state_at(1.0, 0.0, 0.0);
    let t = state.zoom_in(f64::NAN);
    assert_eq!(t.scale, 1.0);
}

// --- reset / fit ---

#[test]
fn set_image_centers_at_scale_one() {
    let state = state_with((800.0, 600.0), (1000.0, 500.0));
    let t = state.transform();
    assert_eq!(t.scale, 1.0);
    assert!(approx_eq(t.position.x, -100.0));
    assert!(approx_eq(t.position.y, 50.0));
}

#[test]
fn reset_view_recenters_after_zoom_and_pan() {
    let mut state = state_with((800.0, 600.0), (400.0, 200.0));
    state.zoom_in(1.0);
    state.pan_by(ScreenPoint::new(55.0, -70.0));
    let t = state.reset_view();
    assert_eq!(t.scale, 1.0);
    assert!(approx_eq(t.position.x, 200.0));
    assert!(approx_eq(t.position.y, 200.0));
}

#[test]
fn fit_to_view_uses_tighter_axis_with_margin() {
    let mut state = state_with((800.0, 600.0), (1000.0, 500.0));
    let t = state.fit_to_view();
    assert!(approx_eq(t.scale, 0.8 * 0.95));
    assert!(approx_eq(t.position.x, (800.0 - 1000.0 * 0.76) / 2.0));
    assert!(approx_eq(t.position.y, (600.0 - 500.0 * 0.76) / 2.0));
}

#[test]
fn fit_to_view_shows_whole_image() {
    let mut state = state_with((1024.0, 768.0), (1600.0, 900.0));
    let t = state.fit_to_view();
    let image = Dimensions::new(1600.0, 900.0);
    let top_left = normalized_to_screen(NormalizedPoint::new(0.0, 0.0), &t, image);
    let bottom_right = normalized_to_screen(NormalizedPoint::new(1.0, 1.0), &t, image);
    assert!(top_left.x >= 0.0 && top_left.y >= 0.0);
    assert!(bottom_right.x <= 1024.0 && bottom_right.y <= 768.0);
}

#[test]
fn fit_to_view_clamps_to_scale_range() {
    let mut state = state_with((800.0, 600.0), (100.0, 50.0));
    let t = state.fit_to_view();
    assert_eq!(t.scale, 4.0);
}

#[test]
fn fit_to_view_without_image_is_noop() {
    let mut state = TransformState::default();
    state.set_viewport(Dimensions::new(800.0, 600.0));
    assert_eq!(state.fit_to_view(), Transform::default());
}

// --- center on point ---

#[test]
fn center_on_point_puts_point_at_viewport_center() {
    let mut state = state_at(1.25, 0.0, 0.0);
    let point = NormalizedPoint::new(0.3, 0.7);
    let t = state.center_on_point(point);
    let screen = normalized_to_screen(point, &t, Dimensions::new(1000.0, 500.0));
    assert!(approx_eq(screen.x, 400.0));
    assert!(approx_eq(screen.y, 300.0));
    assert_eq!(t.scale, 1.25);
}

#[test]
fn center_on_point_caps_scale() {
    let mut state = state_at(3.5, 0.0, 0.0);
    let t = state.center_on_point(NormalizedPoint::new(0.5, 0.5));
    assert_eq!(t.scale, 2.0);
}

#[test]
fn center_on_point_without_image_is_noop() {
    let mut state = TransformState::default();
    let t = state.center_on_point(NormalizedPoint::new(0.5, 0.5));
    assert_eq!(t, Transform::default());
}

// --- pan ---

#[test]
fn pan_by_translates_position() {
    let mut state = state_at(1.0, 10.0, 20.0);
    let t = state.pan_by(ScreenPoint::new(5.0, -7.0));
    assert_eq!(t.position, ScreenPoint::new(15.0, 13.0));
}

#[test]
fn pan_by_ignores_non_finite_delta() {
    let mut state = state_at(1.0, 10.0, 20.0);
    let t = state.pan_by(ScreenPoint::new(f64::INFINITY, 0.0));
    assert_eq!(t.position, ScreenPoint::new(10.0, 20.0));
}

#[test]
fn pan_by_limited_to_bounds_keeps_small_image_inside() {
    let config = ViewerConfig { limit_to_bounds: true, ..ViewerConfig::default() };
    let mut state = TransformState::new(config);
    state.set_viewport(Dimensions::new(800.0, 600.0));
    state.set_image(Dimensions::new(400.0, 200.0));
    let t = state.pan_by(ScreenPoint::new(-1000.0, 1000.0));
    assert_eq!(t.position, ScreenPoint::new(0.0, 400.0));
}

#[test]
fn pan_by_limited_to_bounds_keeps_large_image_covering() {
    let config = ViewerConfig { limit_to_bounds: true, ..ViewerConfig::default() };
    let mut state = TransformState::new(config);
    state.set_viewport(Dimensions::new(800.0, 600.0));
    state.set_image(Dimensions::new(1600.0, 1200.0));
    let t = state.pan_by(ScreenPoint::new(5000.0, -5000.0));
    assert_eq!(t.position, ScreenPoint::new(0.0, -600.0));
}

// --- commands ---

#[test]
fn apply_dispatches_commands() {
    let mut state = state_at(1.0, 0.0, 0.0);
    assert!(approx_eq(state.apply(ViewCommand::ZoomIn).scale, 1.25));
    assert!(approx_eq(state.apply(ViewCommand::ZoomOut).scale, 1.0));
    assert_eq!(state.apply(ViewCommand::PanBy(ScreenPoint::new(3.0, 4.0))).position, ScreenPoint::new(3.0, 4.0));
    assert_eq!(state.apply(ViewCommand::Reset).scale, 1.0);
    assert!(approx_eq(state.apply(ViewCommand::Fit).scale, 0.76));
}

#[test]
fn scale_stays_positive_and_position_finite_through_mixed_commands() {
    let mut state = state_with((640.0, 480.0), (3000.0, 2000.0));
    let commands = [
        ViewCommand::ZoomOut,
        ViewCommand::ZoomOut,
        ViewCommand::Fit,
        ViewCommand::ZoomIn,
        ViewCommand::CenterOn(NormalizedPoint::new(0.9, 0.1)),
        ViewCommand::PanBy(ScreenPoint::new(-33.0, 21.0)),
        ViewCommand::Reset,
    ];
    for command in commands {
        let t = state.apply(command);
        assert!(t.scale > 0.0);
        assert!(t.position.is_finite());
    }
}
