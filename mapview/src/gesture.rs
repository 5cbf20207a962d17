//! Click-vs-drag disambiguation for a single pointer interaction.
//!
//! A press starts in [`GesturePhase::Pending`]. It becomes a drag when the
//! pointer travels past the distance threshold (or past the looser one once
//! the press is a little older), or becomes [`GesturePhase::Holding`] when the
//! hold timer fires first. Only a press that stays pending and is released
//! inside the click window classifies as a [`Gesture::Click`]; everything else
//! ends with [`Gesture::DragEnd`] and never selects a coordinate.
//!
//! The tracker never reads a clock or owns a timer. Callers pass event
//! timestamps in and schedule the [`HoldTimer`] returned by
//! [`GestureTracker::pointer_down`]; a timer that fires after its interaction
//! has ended carries a stale generation and is ignored.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::config::GestureConfig;
use crate::coords::ScreenPoint;

/// Request to call [`GestureTracker::hold_elapsed`] after `delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTimer {
    /// Identifies the interaction that armed the timer.
    pub generation: u64,
    pub delay_ms: f64,
}

/// Where the current interaction stands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GesturePhase {
    /// No pointer is down.
    #[default]
    Idle,
    /// Pointer is down and has not yet crossed any threshold.
    Pending {
        /// Press location.
        start: ScreenPoint,
        /// Press timestamp in milliseconds.
        started_at: f64,
        /// Generation of the armed hold timer.
        generation: u64,
    },
    /// The hold timer fired before release: drag intent without movement.
    Holding {
        /// Pointer location at the last event.
        last: ScreenPoint,
    },
    /// The pointer is panning the view.
    Dragging {
        /// Pointer location at the previous move, used to compute deltas.
        last: ScreenPoint,
    },
}

/// Classified output of the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// The pointer moved during a drag; pan by `delta`.
    Drag { delta: ScreenPoint },
    /// A quick, still press and release at `at`.
    Click { at: ScreenPoint },
    /// A drag or hold finished. Carries no coordinate.
    DragEnd,
}

/// Per-interaction state machine. Resets after every pointer-up or pointer-leave.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    phase: GesturePhase,
    config: GestureConfig,
    generation: u64,
}

impl GestureTracker {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self { phase: GesturePhase::Idle, config, generation: 0 }
    }

    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Whether the current interaction has become a drag or hold.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging { .. } | GesturePhase::Holding { .. })
    }

    /// Start a new interaction and arm its hold timer.
    ///
    /// Any interaction still in progress is abandoned without output.
    pub fn pointer_down(&mut self, at: ScreenPoint, now_ms: f64) -> HoldTimer {
        self.generation = self.generation.wrapping_add(1);
        self.phase = GesturePhase::Pending { start: at, started_at: now_ms, generation: self.generation };
        tracing::trace!(generation = self.generation, x = at.x, y = at.y, "gesture pending");
        HoldTimer { generation: self.generation, delay_ms: self.config.hold_ms }
    }

    /// The hold timer fired. Returns `true` if it moved the press into
    /// [`GesturePhase::Holding`]; stale or superseded timers return `false`.
    pub fn hold_elapsed(&mut self, timer: HoldTimer) -> bool {
        match self.phase {
            GesturePhase::Pending { start, generation, .. } if generation == timer.generation => {
                self.phase = GesturePhase::Holding { last: start };
                tracing::trace!(generation, "gesture holding");
                true
            }
            _ => {
                tracing::trace!(generation = timer.generation, "stale hold timer ignored");
                false
            }
        }
    }

    /// Feed a pointer move. Returns a [`Gesture::Drag`] once the interaction is a drag.
    pub fn pointer_move(&mut self, at: ScreenPoint, now_ms: f64) -> Option<Gesture> {
        match self.phase {
            GesturePhase::Idle => None,
            GesturePhase::Pending { start, started_at, .. } => {
                if !self.exceeds_drag_threshold(start, at, now_ms - started_at) {
                    return None;
                }
                self.phase = GesturePhase::Dragging { last: at };
                tracing::trace!(x = at.x, y = at.y, "gesture dragging");
                Some(Gesture::Drag { delta: at.delta_from(start) })
            }
            GesturePhase::Holding { last } => {
                if at == last {
                    return None;
                }
                self.phase = GesturePhase::Dragging { last: at };
                Some(Gesture::Drag { delta: at.delta_from(last) })
            }
            GesturePhase::Dragging { last } => {
                self.phase = GesturePhase::Dragging { last: at };
                Some(Gesture::Drag { delta: at.delta_from(last) })
            }
        }
    }

    /// Finish the interaction at `at`.
    pub fn pointer_up(&mut self, at: ScreenPoint, now_ms: f64) -> Option<Gesture> {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            GesturePhase::Idle => None,
            GesturePhase::Pending { start, started_at, .. } => {
                let elapsed = (now_ms - started_at).max(0.0);
                let still = !self.exceeds_drag_threshold(start, at, elapsed);
                if still && elapsed < self.config.click_max_ms {
                    Some(Gesture::Click { at })
                } else {
                    Some(Gesture::DragEnd)
                }
            }
            GesturePhase::Holding { .. } | GesturePhase::Dragging { .. } => Some(Gesture::DragEnd),
        }
    }

    /// The pointer left the viewport. Ends any drag; a pending press is dropped without a click.
    pub fn pointer_leave(&mut self) -> Option<Gesture> {
        match std::mem::take(&mut self.phase) {
            GesturePhase::Holding { .. } | GesturePhase::Dragging { .. } => Some(Gesture::DragEnd),
            GesturePhase::Idle | GesturePhase::Pending { .. } => None,
        }
    }

    fn exceeds_drag_threshold(&self, start: ScreenPoint, at: ScreenPoint, elapsed_ms: f64) -> bool {
        let moved = start.distance_to(at);
        moved > self.config.drag_distance_px
            || (moved > self.config.slow_drag_distance_px && elapsed_ms > self.config.slow_drag_after_ms)
    }
}
