//! Map viewport and pointer-interaction engine for the waypoint editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! pipeline between raw DOM pointer events and stable, resolution-independent
//! waypoint coordinates: coordinate-space conversion, pan/zoom state, click vs
//! drag disambiguation, marker placement over the transformed image, and a
//! debug log of every click. Waypoints and categories themselves are owned by
//! the workspace layer; this crate only reads them to lay out markers and
//! emits point-level [`events::Event`]s for the host to apply.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`coords`] | Normalized / percent / screen point types and conversions |
//! | [`transform`] | Pan/zoom state and view commands (zoom, reset, fit, center) |
//! | [`gesture`] | Click-vs-drag state machine with a cancellable hold timer |
//! | [`engine`] | Interaction handler: the testable [`engine::ViewerCore`] and its browser wrapper [`engine::Viewer`] |
//! | [`input`] | Tools, buttons, keys and UI state consumed by the engine |
//! | [`hit`] | Marker hit-testing |
//! | [`overlay`] | Marker and reference-grid layout in screen space |
//! | [`debug`] | Click / waypoint history for inspection and export |
//! | [`events`] | Subscription bus for engine events |
//! | [`config`] | Tunable viewer settings |
//! | [`consts`] | Shared numeric constants |

pub mod config;
pub mod consts;
pub mod coords;
pub mod debug;
pub mod engine;
pub mod events;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod overlay;
pub mod transform;
