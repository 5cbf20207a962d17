//! Interaction handler: [`ViewerCore`] turns input into [`Event`]s, and
//! [`Viewer`] binds it to a DOM element.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

use crate::config::ViewerConfig;
use crate::coords::{
    Dimensions, NormalizedPoint, PercentPoint, ScreenPoint, normalized_to_percent, percent_to_screen,
    screen_to_normalized,
};
use crate::debug::{CursorReadout, DebugLog, HistoryEntry};
use crate::events::{Event, EventBus};
use crate::gesture::{Gesture, GesturePhase, GestureTracker, HoldTimer};
use crate::hit::marker_at;
use crate::input::{Button, CursorStyle, FocusContext, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::overlay::{CategoryColors, GridLayout, MarkerLayout, MarkerSource, layout_grid, layout_markers};
use crate::transform::{TransformState, ViewCommand};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Viewer state and input handling that doesn't depend on the DOM.
///
/// Separated from [`Viewer`] so it can be tested without WASM/browser dependencies.
/// Every handler takes the event time explicitly and returns the [`Event`]s
/// the host should act on, in order.
#[derive(Debug, Clone, Default)]
pub struct ViewerCore {
    pub view: TransformState,
    pub gesture: GestureTracker,
    pub ui: UiState,
    pub debug: DebugLog,
}

impl ViewerCore {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            view: TransformState::new(config),
            gesture: GestureTracker::new(config.gesture),
            ui: UiState::default(),
            debug: DebugLog::new(),
        }
    }

    // --- Viewport / image ---

    /// Record the viewport's CSS size.
    pub fn set_viewport(&mut self, size: Dimensions) {
        self.view.set_viewport(size);
    }

    /// The image finished loading with natural size `image`. Resets the view onto it.
    pub fn on_image_load(&mut self, image: Dimensions) -> Vec<Event> {
        let before = self.view.transform();
        let after = self.view.set_image(image);
        if self.view.image().is_none() {
            return Vec::new();
        }
        tracing::info!(width = image.width, height = image.height, "image loaded");
        if after == before { Vec::new() } else { vec![Event::TransformChanged(after)] }
    }

    /// The image was removed. Any gesture in progress is abandoned.
    pub fn clear_image(&mut self) -> Vec<Event> {
        self.gesture.pointer_leave();
        self.view.clear_image();
        vec![Event::TransformChanged(self.view.transform()), Event::CursorChanged(self.cursor())]
    }

    // --- Tool / debug ---

    /// Switch tools. Returns nothing when `tool` is already active.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Event> {
        if self.ui.tool == tool {
            return Vec::new();
        }
        self.ui.tool = tool;
        tracing::debug!(?tool, "tool changed");
        let mut events = vec![Event::ToolChanged(tool)];
        if !self.gesture.is_dragging() {
            events.push(Event::CursorChanged(CursorStyle::for_tool(tool)));
        }
        events
    }

    pub fn set_debug(&mut self, enabled: bool) -> Vec<Event> {
        if self.ui.debug == enabled {
            return Vec::new();
        }
        self.ui.debug = enabled;
        vec![Event::DebugToggled(enabled)]
    }

    pub fn toggle_debug(&mut self) -> Vec<Event> {
        self.set_debug(!self.ui.debug)
    }

    // --- Commands ---

    /// Apply a view command. Ignored before an image has loaded.
    pub fn command(&mut self, command: ViewCommand) -> Vec<Event> {
        if self.view.image().is_none() {
            tracing::debug!(?command, "view command ignored without image");
            return Vec::new();
        }
        let before = self.view.transform();
        let after = self.view.apply(command);
        if after == before { Vec::new() } else { vec![Event::TransformChanged(after)] }
    }

    /// Record a created waypoint in the debug log (when debugging) at its current screen position.
    pub fn record_waypoint(&mut self, percent: PercentPoint, now_ms: f64) -> Option<HistoryEntry> {
        if !self.ui.debug {
            return None;
        }
        let image = self.view.image()?;
        let transform = self.view.transform();
        let pixels = percent_to_screen(percent, &transform, image);
        Some(self.debug.record_waypoint(pixels, percent, transform.scale, now_ms))
    }

    // --- Input events ---

    /// Start an interaction. Only the primary button starts a gesture.
    pub fn on_pointer_down(&mut self, at: ScreenPoint, button: Button, now_ms: f64) -> Vec<Event> {
        if button != Button::Primary || !at.is_finite() {
            return Vec::new();
        }
        let timer = self.gesture.pointer_down(at, now_ms);
        vec![Event::HoldTimerRequested(timer)]
    }

    /// The hold timer requested by [`Self::on_pointer_down`] fired.
    pub fn on_hold_timeout(&mut self, timer: HoldTimer) -> Vec<Event> {
        if self.gesture.hold_elapsed(timer) {
            vec![Event::CursorChanged(CursorStyle::Grabbing)]
        } else {
            Vec::new()
        }
    }

    pub fn on_pointer_move(&mut self, at: ScreenPoint, now_ms: f64) -> Vec<Event> {
        if !at.is_finite() {
            return Vec::new();
        }
        if self.ui.debug {
            self.update_cursor_readout(at);
        }
        let was_pending = matches!(self.gesture.phase(), GesturePhase::Pending { .. });
        let Some(Gesture::Drag { delta }) = self.gesture.pointer_move(at, now_ms) else {
            return Vec::new();
        };
        let mut events = Vec::new();
        if was_pending {
            events.push(Event::CursorChanged(CursorStyle::Grabbing));
        }
        events.extend(self.pan(delta));
        events
    }

    /// Finish an interaction.
    ///
    /// `target` is the waypoint id carried by the DOM element under the
    /// pointer, if any; `markers` is the layout currently on screen, used for
    /// geometric hit-testing when no element was reported.
    pub fn on_pointer_up(
        &mut self,
        at: ScreenPoint,
        button: Button,
        target: Option<&str>,
        markers: &[MarkerLayout],
        now_ms: f64,
    ) -> Vec<Event> {
        if button != Button::Primary {
            return Vec::new();
        }
        let was_dragging = self.gesture.is_dragging();
        match self.gesture.pointer_up(at, now_ms) {
            Some(Gesture::Click { at }) => self.click(at, target, markers, now_ms),
            Some(Gesture::DragEnd) if was_dragging => vec![Event::CursorChanged(self.cursor())],
            Some(Gesture::DragEnd | Gesture::Drag { .. }) | None => Vec::new(),
        }
    }

    /// The pointer left the viewport: ends a drag, drops a pending click.
    pub fn on_pointer_leave(&mut self) -> Vec<Event> {
        match self.gesture.pointer_leave() {
            Some(Gesture::DragEnd) => vec![Event::CursorChanged(self.cursor())],
            _ => Vec::new(),
        }
    }

    /// Wheel zoom about the pointer.
    pub fn on_wheel(&mut self, at: ScreenPoint, delta: WheelDelta) -> Vec<Event> {
        if self.view.image().is_none() {
            return Vec::new();
        }
        let step = self.view.config().wheel_zoom_step;
        if delta.dx.abs() > delta.dy.abs() {
            return Vec::new();
        }
        let step = match delta.dy.partial_cmp(&0.0) {
            Some(Ordering::Less) => step,
            Some(Ordering::Greater) => -step,
            Some(Ordering::Equal) | None => return Vec::new(),
        };
        let before = self.view.transform();
        let after = self.view.zoom_at(at, step);
        if after == before { Vec::new() } else { vec![Event::TransformChanged(after)] }
    }

    /// Viewport keyboard shortcuts.
    ///
    /// Returns `None` when the key is not a shortcut here (including while a
    /// text input has focus or a chord modifier is held), so the host leaves
    /// the browser's default behavior alone.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, focus: FocusContext) -> Option<Vec<Event>> {
        if focus.in_text_input || modifiers.has_chord() {
            return None;
        }
        let events = match key.as_str() {
            "+" | "=" => self.command(ViewCommand::ZoomIn),
            "-" | "_" => self.command(ViewCommand::ZoomOut),
            "0" => self.command(ViewCommand::Reset),
            "1" => self.command(ViewCommand::Fit),
            "a" | "A" => self.set_tool(Tool::AddWaypoint),
            "v" | "V" | "h" | "H" | "Escape" => self.set_tool(Tool::Pan),
            "d" | "D" => self.toggle_debug(),
            _ => return None,
        };
        Some(events)
    }

    // --- Queries ---

    /// Resting or active cursor for the current tool and gesture.
    #[must_use]
    pub fn cursor(&self) -> CursorStyle {
        if self.gesture.is_dragging() { CursorStyle::Grabbing } else { CursorStyle::for_tool(self.ui.tool) }
    }

    /// Screen anchor for a dialog attached to `percent`, under the live transform.
    #[must_use]
    pub fn anchor_for(&self, percent: PercentPoint) -> Option<ScreenPoint> {
        let image = self.view.image()?;
        Some(percent_to_screen(percent, &self.view.transform(), image))
    }

    /// Percent position under `screen`, or `None` off the image or before it loads.
    #[must_use]
    pub fn percent_at(&self, screen: ScreenPoint) -> Option<PercentPoint> {
        let normalized = self.normalized_at(screen)?;
        normalized.is_within_image().then(|| normalized_to_percent(normalized))
    }

    /// Marker layout for `sources` under the live transform; empty before an image loads.
    pub fn layout_markers<'a, M, I, C>(&self, sources: I, colors: &C) -> Vec<MarkerLayout>
    where
        M: MarkerSource + 'a,
        I: IntoIterator<Item = &'a M>,
        C: CategoryColors + ?Sized,
    {
        let Some(image) = self.view.image() else {
            return Vec::new();
        };
        layout_markers(sources, colors, &self.view.transform(), image)
    }

    #[must_use]
    pub fn layout_grid(&self) -> Option<GridLayout> {
        let image = self.view.image()?;
        Some(layout_grid(&self.view.transform(), image))
    }

    // --- Internals ---

    fn normalized_at(&self, screen: ScreenPoint) -> Option<NormalizedPoint> {
        let image = self.view.image()?;
        Some(screen_to_normalized(screen, &self.view.transform(), image))
    }

    fn pan(&mut self, delta: ScreenPoint) -> Vec<Event> {
        if self.view.image().is_none() {
            return Vec::new();
        }
        let before = self.view.transform();
        let after = self.view.pan_by(delta);
        if after == before { Vec::new() } else { vec![Event::TransformChanged(after)] }
    }

    fn click(&mut self, at: ScreenPoint, target: Option<&str>, markers: &[MarkerLayout], now_ms: f64) -> Vec<Event> {
        let normalized = self.normalized_at(at);
        if self.ui.debug
            && let Some(normalized) = normalized
        {
            let scale = self.view.transform().scale;
            self.debug.record_click(at, normalized_to_percent(normalized), scale, now_ms);
        }

        if let Some(hit) = marker_at(at, target, markers, self.view.config().marker_hit_radius_px) {
            tracing::debug!(id = %hit.id, source = ?hit.source, "marker clicked");
            return vec![Event::WaypointClicked { id: hit.id, screen: at }];
        }
        if self.ui.tool != Tool::AddWaypoint {
            return Vec::new();
        }
        match normalized {
            Some(point) if point.is_within_image() => vec![Event::CoordinateSelected { point, screen: at }],
            Some(point) => {
                tracing::debug!(x = point.x, y = point.y, "click outside image ignored");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn update_cursor_readout(&mut self, at: ScreenPoint) {
        if let Some(normalized) = self.normalized_at(at) {
            let readout = CursorReadout::new(at, normalized_to_percent(normalized), &self.view.transform());
            self.debug.set_cursor(readout);
        }
    }
}

/// The browser-bound viewer. Wraps [`ViewerCore`], owns the viewport element
/// and the pending hold timer.
///
/// Methods take raw DOM event values (client coordinates, `MouseEvent.button`,
/// `KeyboardEvent.key`), convert them, and return the events the host should
/// handle. Cursor changes are applied to the element directly and hold timers
/// are scheduled here, so neither [`Event::CursorChanged`] handling nor
/// [`Event::HoldTimerRequested`] is required of the host.
///
/// Every event handed to the host is also published on [`Viewer::events`].
/// Events produced later by a fired hold timer are delivered on the bus only,
/// so hosts that react to timer-driven cursor changes must subscribe.
pub struct Viewer {
    element: HtmlElement,
    core: Rc<RefCell<ViewerCore>>,
    bus: Rc<EventBus>,
    hold: Rc<RefCell<Option<Timeout>>>,
}

impl Viewer {
    /// Bind a viewer to the viewport container element.
    #[must_use]
    pub fn new(element: HtmlElement, config: ViewerConfig) -> Self {
        let viewer = Self {
            element,
            core: Rc::new(RefCell::new(ViewerCore::new(config))),
            bus: Rc::new(EventBus::new()),
            hold: Rc::new(RefCell::new(None)),
        };
        viewer.measure();
        apply_cursor(&viewer.element, CursorStyle::for_tool(Tool::Pan));
        viewer
    }

    /// Shared handle to the core, for queries and non-input operations.
    #[must_use]
    pub fn core(&self) -> Rc<RefCell<ViewerCore>> {
        Rc::clone(&self.core)
    }

    /// Bus carrying every event this viewer produces, including timer-driven ones.
    #[must_use]
    pub fn events(&self) -> Rc<EventBus> {
        Rc::clone(&self.bus)
    }

    /// Re-read the element's size, e.g. after a resize.
    pub fn measure(&self) {
        let size = Dimensions::new(f64::from(self.element.client_width()), f64::from(self.element.client_height()));
        self.core.borrow_mut().set_viewport(size);
    }

    pub fn image_loaded(&self, natural_width: u32, natural_height: u32) -> Vec<Event> {
        self.measure();
        let events =
            self.core.borrow_mut().on_image_load(Dimensions::new(f64::from(natural_width), f64::from(natural_height)));
        self.finish(events)
    }

    pub fn pointer_down(&self, client_x: f64, client_y: f64, button: i16) -> Vec<Event> {
        let at = self.local_point(client_x, client_y);
        let events = self.core.borrow_mut().on_pointer_down(at, Button::from_dom(button), js_sys::Date::now());
        self.finish(events)
    }

    pub fn pointer_move(&self, client_x: f64, client_y: f64) -> Vec<Event> {
        let at = self.local_point(client_x, client_y);
        let events = self.core.borrow_mut().on_pointer_move(at, js_sys::Date::now());
        self.finish(events)
    }

    /// `target_id` is the waypoint id read from the event target's data attribute, if any.
    pub fn pointer_up(
        &self,
        client_x: f64,
        client_y: f64,
        button: i16,
        target_id: Option<&str>,
        markers: &[MarkerLayout],
    ) -> Vec<Event> {
        self.hold.borrow_mut().take();
        let at = self.local_point(client_x, client_y);
        let events =
            self.core.borrow_mut().on_pointer_up(at, Button::from_dom(button), target_id, markers, js_sys::Date::now());
        self.finish(events)
    }

    pub fn pointer_leave(&self) -> Vec<Event> {
        self.hold.borrow_mut().take();
        let events = self.core.borrow_mut().on_pointer_leave();
        self.finish(events)
    }

    pub fn wheel(&self, client_x: f64, client_y: f64, delta_x: f64, delta_y: f64) -> Vec<Event> {
        let at = self.local_point(client_x, client_y);
        let events = self.core.borrow_mut().on_wheel(at, WheelDelta { dx: delta_x, dy: delta_y });
        self.finish(events)
    }

    /// Returns `None` when the key is not handled and the browser default should proceed.
    pub fn key_down(&self, key: &str, modifiers: Modifiers) -> Option<Vec<Event>> {
        let events = self.core.borrow_mut().on_key_down(&Key(key.to_owned()), modifiers, focus_context())?;
        Some(self.finish(events))
    }

    pub fn command(&self, command: ViewCommand) -> Vec<Event> {
        let events = self.core.borrow_mut().command(command);
        self.finish(events)
    }

    pub fn set_tool(&self, tool: Tool) -> Vec<Event> {
        let events = self.core.borrow_mut().set_tool(tool);
        self.finish(events)
    }

    /// Convert client coordinates to viewport-local coordinates.
    fn local_point(&self, client_x: f64, client_y: f64) -> ScreenPoint {
        let rect = self.element.get_bounding_client_rect();
        ScreenPoint::new(client_x - rect.left(), client_y - rect.top())
    }

    /// Apply cursor changes, schedule hold timers, and pass the rest through.
    fn finish(&self, events: Vec<Event>) -> Vec<Event> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            match event {
                Event::HoldTimerRequested(timer) => self.schedule_hold(timer),
                Event::CursorChanged(style) => {
                    apply_cursor(&self.element, style);
                    out.push(event);
                }
                other => out.push(other),
            }
        }
        self.bus.publish_all(&out);
        out
    }

    /// Arm the hold timer; replacing or taking the stored `Timeout` cancels it.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn schedule_hold(&self, timer: HoldTimer) {
        let core = Rc::clone(&self.core);
        let bus = Rc::clone(&self.bus);
        let element = self.element.clone();
        let timeout = Timeout::new(timer.delay_ms.max(0.0) as u32, move || {
            for event in fire_hold(&core, &bus, timer) {
                if let Event::CursorChanged(style) = event {
                    apply_cursor(&element, style);
                }
            }
        });
        *self.hold.borrow_mut() = Some(timeout);
    }
}

/// Run a fired hold timer against the core and publish what it produced.
///
/// Returns the published events so the caller can apply cursor changes. A core
/// that is already borrowed (the timer fired mid-handler) drops the timer.
fn fire_hold(core: &RefCell<ViewerCore>, bus: &EventBus, timer: HoldTimer) -> Vec<Event> {
    let Ok(mut core) = core.try_borrow_mut() else {
        tracing::warn!(generation = timer.generation, "viewer busy; hold timer dropped");
        return Vec::new();
    };
    let events = core.on_hold_timeout(timer);
    drop(core);
    bus.publish_all(&events);
    events
}

fn apply_cursor(element: &HtmlElement, style: CursorStyle) {
    if let Err(err) = set_cursor(element, style) {
        tracing::warn!(?err, cursor = style.css(), "failed to set viewport cursor");
    }
}

fn set_cursor(element: &HtmlElement, style: CursorStyle) -> Result<(), JsValue> {
    element.style().set_property("cursor", style.css())
}

/// Whether keyboard focus is inside something that accepts typing.
fn focus_context() -> FocusContext {
    let active = web_sys::window().and_then(|w| w.document()).and_then(|d| d.active_element());
    let in_text_input = active.is_some_and(|el| {
        let tag = el.tag_name();
        ["INPUT", "TEXTAREA", "SELECT"].iter().any(|t| tag.eq_ignore_ascii_case(t))
            || el.get_attribute("contenteditable").is_some_and(|v| v != "false")
    });
    FocusContext { in_text_input }
}
