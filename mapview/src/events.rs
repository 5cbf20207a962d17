//! Named events emitted by the viewer and a small bus to fan them out.
//!
//! Handlers on [`crate::engine::ViewerCore`] return `Vec<Event>`. The browser
//! [`crate::engine::Viewer`] also publishes them on an [`EventBus`], so the
//! dialog layer and the debug panel can each subscribe on their own.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::coords::{NormalizedPoint, ScreenPoint, Transform};
use crate::gesture::HoldTimer;
use crate::input::{CursorStyle, Tool};

/// Something the viewer wants its host to know or do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A click on the image in add-waypoint mode. Open a create dialog at `screen`.
    CoordinateSelected { point: NormalizedPoint, screen: ScreenPoint },
    /// A click on an existing marker. Open its edit dialog anchored at `screen`.
    WaypointClicked { id: String, screen: ScreenPoint },
    /// Pan or zoom changed; anchored overlays must be re-laid out.
    TransformChanged(Transform),
    CursorChanged(CursorStyle),
    ToolChanged(Tool),
    DebugToggled(bool),
    /// Schedule [`crate::engine::ViewerCore::on_hold_timeout`] after the timer's delay.
    HoldTimerRequested(HoldTimer),
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&Event)>;

/// Single-threaded publish/subscribe fan-out for [`Event`]s.
///
/// Listeners may subscribe or unsubscribe from inside a callback; such changes
/// take effect from the next published event.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&Event) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver `event` to every listener in subscription order.
    pub fn publish(&self, event: &Event) {
        let snapshot: Vec<Listener> = self.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Publish a batch of handler output in order.
    pub fn publish_all(&self, events: &[Event]) {
        for event in events {
            self.publish(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("listeners", &self.listener_count()).finish()
    }
}
