#![allow(clippy::float_cmp)]

use std::collections::HashMap;

use super::*;
use crate::coords::Transform;

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> ScreenPoint {
    ScreenPoint::new(x, y)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// 1000×500 viewport showing a 1000×500 image at scale 1, origin (0, 0).
fn loaded() -> ViewerCore {
    let mut core = ViewerCore::new(ViewerConfig::default());
    core.set_viewport(Dimensions::new(1000.0, 500.0));
    core.on_image_load(Dimensions::new(1000.0, 500.0));
    core
}

fn adding() -> ViewerCore {
    let mut core = loaded();
    core.set_tool(Tool::AddWaypoint);
    core
}

fn click(core: &mut ViewerCore, at: ScreenPoint) -> Vec<Event> {
    click_on(core, at, None, &[])
}

fn click_on(core: &mut ViewerCore, at: ScreenPoint, target: Option<&str>, markers: &[MarkerLayout]) -> Vec<Event> {
    core.on_pointer_down(at, Button::Primary, 1_000.0);
    core.on_pointer_up(at, Button::Primary, target, markers, 1_050.0)
}

fn marker(id: &str, at: ScreenPoint) -> MarkerLayout {
    MarkerLayout { id: id.to_owned(), screen: at, color: "#9b87f5".to_owned(), label: id.to_owned() }
}

fn selected(events: &[Event]) -> Vec<NormalizedPoint> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::CoordinateSelected { point, .. } => Some(*point),
            _ => None,
        })
        .collect()
}

fn key(k: &str) -> Key {
    Key(k.to_owned())
}

// =============================================================
// Image load
// =============================================================

#[test]
fn image_load_resets_view_to_centered_scale_one() {
    let mut core = ViewerCore::new(ViewerConfig::default());
    core.set_viewport(Dimensions::new(1200.0, 700.0));
    let events = core.on_image_load(Dimensions::new(1000.0, 500.0));
    let expected = Transform { scale: 1.0, position: pt(100.0, 100.0) };
    assert_eq!(events, vec![Event::TransformChanged(expected)]);
    assert_eq!(core.view.transform(), expected);
}

#[test]
fn unusable_image_is_ignored() {
    let mut core = ViewerCore::new(ViewerConfig::default());
    assert!(core.on_image_load(Dimensions::new(0.0, 500.0)).is_empty());
    assert!(core.view.image().is_none());
}

#[test]
fn clear_image_drops_gesture_and_restores_cursor() {
    let mut core = loaded();
    core.on_pointer_down(pt(10.0, 10.0), Button::Primary, 0.0);
    core.on_pointer_move(pt(40.0, 10.0), 10.0);
    let events = core.clear_image();
    assert!(events.contains(&Event::CursorChanged(CursorStyle::Grab)));
    assert_eq!(core.gesture.phase(), GesturePhase::Idle);
    assert!(core.view.image().is_none());
}

// =============================================================
// Clicks
// =============================================================

#[test]
fn click_in_add_mode_selects_coordinate() {
    let mut core = adding();
    let events = click(&mut core, pt(500.0, 250.0));
    assert_eq!(events, vec![Event::CoordinateSelected { point: NormalizedPoint::new(0.5, 0.5), screen: pt(500.0, 250.0) }]);
}

#[test]
fn click_in_pan_mode_without_marker_is_noop() {
    let mut core = loaded();
    assert!(click(&mut core, pt(500.0, 250.0)).is_empty());
}

#[test]
fn click_outside_image_is_noop() {
    let mut core = adding();
    core.command(ViewCommand::ZoomOut);
    // Image now spans (125, 62.5)..(875, 437.5).
    assert!(click(&mut core, pt(10.0, 10.0)).is_empty());
    assert!(click(&mut core, pt(900.0, 250.0)).is_empty());
    assert_eq!(selected(&click(&mut core, pt(125.0, 62.5))), vec![NormalizedPoint::new(0.0, 0.0)]);
}

#[test]
fn click_before_image_loads_is_noop() {
    let mut core = ViewerCore::new(ViewerConfig::default());
    core.set_tool(Tool::AddWaypoint);
    assert!(click(&mut core, pt(10.0, 10.0)).is_empty());
}

#[test]
fn click_on_marker_element_reports_waypoint() {
    let mut core = adding();
    let markers = [marker("wp_1", pt(200.0, 100.0))];
    let events = click_on(&mut core, pt(204.0, 96.0), Some("wp_1"), &markers);
    assert_eq!(events, vec![Event::WaypointClicked { id: "wp_1".into(), screen: pt(204.0, 96.0) }]);
}

#[test]
fn click_near_marker_hits_geometrically_in_pan_mode() {
    let mut core = loaded();
    let markers = [marker("wp_1", pt(200.0, 100.0))];
    let events = click_on(&mut core, pt(203.0, 100.0), None, &markers);
    assert_eq!(events, vec![Event::WaypointClicked { id: "wp_1".into(), screen: pt(203.0, 100.0) }]);
}

#[test]
fn secondary_button_never_clicks() {
    let mut core = adding();
    assert!(core.on_pointer_down(pt(500.0, 250.0), Button::Secondary, 0.0).is_empty());
    assert!(core.on_pointer_up(pt(500.0, 250.0), Button::Secondary, None, &[], 10.0).is_empty());
}

// =============================================================
// Drags
// =============================================================

#[test]
fn drag_pans_and_never_selects() {
    let mut core = adding();
    core.on_pointer_down(pt(100.0, 100.0), Button::Primary, 0.0);
    let moved = core.on_pointer_move(pt(110.0, 100.0), 10.0);
    assert_eq!(
        moved,
        vec![
            Event::CursorChanged(CursorStyle::Grabbing),
            Event::TransformChanged(Transform { scale: 1.0, position: pt(10.0, 0.0) }),
        ]
    );
    let up = core.on_pointer_up(pt(110.0, 100.0), Button::Primary, None, &[], 20.0);
    assert_eq!(up, vec![Event::CursorChanged(CursorStyle::Crosshair)]);
}

#[test]
fn slow_press_then_release_is_not_a_click() {
    let mut core = adding();
    core.on_pointer_down(pt(500.0, 250.0), Button::Primary, 0.0);
    let events = core.on_pointer_up(pt(500.0, 250.0), Button::Primary, None, &[], 250.0);
    assert!(selected(&events).is_empty());
}

#[test]
fn hold_timer_marks_drag_intent() {
    let mut core = adding();
    let events = core.on_pointer_down(pt(500.0, 250.0), Button::Primary, 0.0);
    let [Event::HoldTimerRequested(timer)] = events.as_slice() else {
        panic!("expected a hold timer request, got {events:?}");
    };
    assert_eq!(core.on_hold_timeout(*timer), vec![Event::CursorChanged(CursorStyle::Grabbing)]);
    let up = core.on_pointer_up(pt(500.0, 250.0), Button::Primary, None, &[], 150.0);
    assert_eq!(up, vec![Event::CursorChanged(CursorStyle::Crosshair)]);
}

#[test]
fn stale_hold_timer_is_ignored() {
    let mut core = adding();
    let events = core.on_pointer_down(pt(500.0, 250.0), Button::Primary, 0.0);
    let [Event::HoldTimerRequested(timer)] = events.as_slice() else {
        panic!("expected a hold timer request, got {events:?}");
    };
    core.on_pointer_up(pt(500.0, 250.0), Button::Primary, None, &[], 50.0);
    assert!(core.on_hold_timeout(*timer).is_empty());
    assert_eq!(selected(&click(&mut core, pt(500.0, 250.0))).len(), 1);
}

#[test]
fn fired_hold_is_published_once() {
    let core = RefCell::new(adding());
    let events = core.borrow_mut().on_pointer_down(pt(500.0, 250.0), Button::Primary, 0.0);
    let [Event::HoldTimerRequested(timer)] = events.as_slice() else {
        panic!("expected a hold timer request, got {events:?}");
    };
    let bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    let fired = fire_hold(&core, &bus, *timer);
    assert_eq!(fired, vec![Event::CursorChanged(CursorStyle::Grabbing)]);
    assert_eq!(*seen.borrow(), fired);
}

#[test]
fn hold_firing_while_core_is_busy_is_dropped() {
    let core = RefCell::new(adding());
    let events = core.borrow_mut().on_pointer_down(pt(500.0, 250.0), Button::Primary, 0.0);
    let [Event::HoldTimerRequested(timer)] = events.as_slice() else {
        panic!("expected a hold timer request, got {events:?}");
    };
    let bus = EventBus::new();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    bus.subscribe(move |_| *sink.borrow_mut() += 1);

    let busy = core.borrow_mut();
    assert!(fire_hold(&core, &bus, *timer).is_empty());
    drop(busy);
    assert_eq!(*count.borrow(), 0);
}

#[test]
fn leave_during_drag_restores_cursor() {
    let mut core = loaded();
    core.on_pointer_down(pt(0.0, 0.0), Button::Primary, 0.0);
    core.on_pointer_move(pt(20.0, 0.0), 10.0);
    assert_eq!(core.on_pointer_leave(), vec![Event::CursorChanged(CursorStyle::Grab)]);
    assert!(core.on_pointer_up(pt(20.0, 0.0), Button::Primary, None, &[], 20.0).is_empty());
}

// =============================================================
// Scenarios
// =============================================================

#[test]
fn click_at_center_yields_fifty_percent() {
    let mut core = adding();
    let points = selected(&click(&mut core, pt(500.0, 250.0)));
    assert_eq!(normalized_to_percent(points[0]), PercentPoint::new(50.0, 50.0));
}

#[test]
fn zoom_three_times_then_click_keeps_percent_exact() {
    let mut core = adding();
    for _ in 0..3 {
        core.command(ViewCommand::ZoomIn);
    }
    let transform = core.view.transform();
    assert_eq!(transform.scale, 1.75);
    let target = crate::coords::normalized_to_screen(NormalizedPoint::new(0.3, 0.7), &transform, Dimensions::new(1000.0, 500.0));
    let points = selected(&click(&mut core, target));
    assert_eq!(normalized_to_percent(points[0]), PercentPoint::new(30.0, 70.0));
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn wheel_up_zooms_in_about_pointer() {
    let mut core = loaded();
    let events = core.on_wheel(pt(500.0, 250.0), WheelDelta { dx: 0.0, dy: -120.0 });
    let [Event::TransformChanged(t)] = events.as_slice() else {
        panic!("expected a transform change, got {events:?}");
    };
    assert!(approx(t.scale, 1.1));
    assert!(approx(t.position.x, -50.0) && approx(t.position.y, -25.0));
}

#[test]
fn wheel_without_vertical_delta_is_ignored() {
    let mut core = loaded();
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 30.0, dy: 0.0 }).is_empty());
}

#[test]
fn mostly_horizontal_wheel_is_ignored() {
    let mut core = loaded();
    assert!(core.on_wheel(pt(500.0, 250.0), WheelDelta { dx: 40.0, dy: -5.0 }).is_empty());
    assert_eq!(core.view.transform().scale, 1.0);
}

#[test]
fn wheel_at_min_scale_emits_nothing() {
    let mut core = loaded();
    for _ in 0..20 {
        core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: 100.0 });
    }
    assert_eq!(core.view.transform().scale, 0.5);
    assert!(core.on_wheel(pt(0.0, 0.0), WheelDelta { dx: 0.0, dy: 100.0 }).is_empty());
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn zoom_keys() {
    let mut core = loaded();
    let events = core.on_key_down(&key("+"), Modifiers::default(), FocusContext::default());
    assert!(matches!(events.as_deref(), Some([Event::TransformChanged(t)]) if t.scale == 1.25));
    core.on_key_down(&key("_"), Modifiers::default(), FocusContext::default());
    assert_eq!(core.view.transform().scale, 1.0);
}

#[test]
fn reset_and_fit_keys() {
    let mut core = loaded();
    core.command(ViewCommand::PanBy(pt(40.0, 40.0)));
    core.on_key_down(&key("0"), Modifiers::default(), FocusContext::default());
    assert_eq!(core.view.transform(), Transform::default());
    core.on_key_down(&key("1"), Modifiers::default(), FocusContext::default());
    assert!(approx(core.view.transform().scale, 0.95));
}

#[test]
fn keys_ignored_while_typing() {
    let mut core = loaded();
    let typing = FocusContext { in_text_input: true };
    assert_eq!(core.on_key_down(&key("+"), Modifiers::default(), typing), None);
    assert_eq!(core.on_key_down(&key("a"), Modifiers::default(), typing), None);
    assert_eq!(core.view.transform().scale, 1.0);
    assert_eq!(core.ui.tool, Tool::Pan);
}

#[test]
fn keys_ignored_with_chord_modifier() {
    let mut core = loaded();
    let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
    assert_eq!(core.on_key_down(&key("="), ctrl, FocusContext::default()), None);
}

#[test]
fn unknown_key_is_not_handled() {
    let mut core = loaded();
    assert_eq!(core.on_key_down(&key("x"), Modifiers::default(), FocusContext::default()), None);
}

#[test]
fn zoom_key_before_image_is_handled_but_inert() {
    let mut core = ViewerCore::new(ViewerConfig::default());
    assert_eq!(core.on_key_down(&key("+"), Modifiers::default(), FocusContext::default()), Some(Vec::new()));
}

#[test]
fn tool_keys() {
    let mut core = loaded();
    let events = core.on_key_down(&key("a"), Modifiers::default(), FocusContext::default());
    assert_eq!(
        events,
        Some(vec![Event::ToolChanged(Tool::AddWaypoint), Event::CursorChanged(CursorStyle::Crosshair)])
    );
    core.on_key_down(&key("Escape"), Modifiers::default(), FocusContext::default());
    assert_eq!(core.ui.tool, Tool::Pan);
    assert_eq!(core.on_key_down(&key("v"), Modifiers::default(), FocusContext::default()), Some(Vec::new()));
}

#[test]
fn debug_key_toggles() {
    let mut core = loaded();
    assert_eq!(
        core.on_key_down(&key("d"), Modifiers::default(), FocusContext::default()),
        Some(vec![Event::DebugToggled(true)])
    );
    assert!(core.ui.debug);
}

// =============================================================
// Debug instrumentation
// =============================================================

#[test]
fn clicks_are_recorded_only_while_debugging() {
    let mut core = adding();
    click(&mut core, pt(500.0, 250.0));
    assert!(core.debug.is_empty());
    core.set_debug(true);
    let events = click(&mut core, pt(500.0, 250.0));
    assert_eq!(selected(&events).len(), 1);
    let entry = core.debug.clicks()[0];
    assert_eq!(entry.percent, PercentPoint::new(50.0, 50.0));
    assert_eq!(entry.scale, 1.0);
}

#[test]
fn recording_does_not_change_click_outcome() {
    let mut plain = adding();
    let mut traced = adding();
    traced.set_debug(true);
    for at in [pt(500.0, 250.0), pt(-5.0, 3.0), pt(999.0, 499.0)] {
        assert_eq!(click(&mut plain, at), click(&mut traced, at));
    }
    assert_eq!(traced.debug.clicks().len(), 3);
}

#[test]
fn waypoint_creation_recorded_at_current_screen_position() {
    let mut core = loaded();
    assert!(core.record_waypoint(PercentPoint::new(50.0, 50.0), 5.0).is_none());
    core.set_debug(true);
    core.command(ViewCommand::PanBy(pt(10.0, 20.0)));
    let entry = core.record_waypoint(PercentPoint::new(50.0, 50.0), 5.0);
    assert_eq!(entry.map(|e| e.pixels), Some(pt(510.0, 270.0)));
}

#[test]
fn pointer_move_updates_cursor_readout_when_debugging() {
    let mut core = loaded();
    core.on_pointer_move(pt(250.0, 125.0), 0.0);
    assert!(core.debug.cursor().is_none());
    core.set_debug(true);
    core.on_pointer_move(pt(250.0, 125.0), 0.0);
    assert_eq!(core.debug.cursor().map(|c| c.percent), Some(PercentPoint::new(25.0, 25.0)));
}

// =============================================================
// Queries
// =============================================================

#[test]
fn anchor_follows_transform() {
    let mut core = loaded();
    assert_eq!(core.anchor_for(PercentPoint::new(50.0, 50.0)), Some(pt(500.0, 250.0)));
    core.command(ViewCommand::PanBy(pt(10.0, 0.0)));
    assert_eq!(core.anchor_for(PercentPoint::new(50.0, 50.0)), Some(pt(510.0, 250.0)));
    assert_eq!(ViewerCore::default().anchor_for(PercentPoint::new(50.0, 50.0)), None);
}

#[test]
fn percent_at_inside_and_outside() {
    let core = loaded();
    assert_eq!(core.percent_at(pt(250.0, 125.0)), Some(PercentPoint::new(25.0, 25.0)));
    assert_eq!(core.percent_at(pt(-1.0, 125.0)), None);
}

#[test]
fn layouts_require_an_image() {
    let core = ViewerCore::default();
    let colors: HashMap<String, String> = HashMap::new();
    let pins = [Pin];
    assert!(core.layout_grid().is_none());
    assert!(core.layout_markers(&pins, &colors).is_empty());
    let core = loaded();
    assert!(core.layout_grid().is_some());
    assert_eq!(core.layout_markers(&pins, &colors)[0].screen, pt(0.0, 0.0));
}

struct Pin;

impl MarkerSource for Pin {
    fn marker_id(&self) -> &str {
        "wp"
    }

    fn marker_position(&self) -> PercentPoint {
        PercentPoint::new(0.0, 0.0)
    }

    fn marker_label(&self) -> &str {
        ""
    }

    fn marker_category(&self) -> &str {
        ""
    }
}

#[test]
fn tool_change_is_idempotent() {
    let mut core = loaded();
    assert!(core.set_tool(Tool::Pan).is_empty());
    assert_eq!(core.cursor(), CursorStyle::Grab);
}
