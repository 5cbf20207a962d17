//! Waypoints, categories and the map image, plus the workspace file format.
//!
//! [`store::WorkspaceState`] is the single owner of the data the map viewer
//! annotates. It implements the viewer's marker traits so `mapview` can lay
//! out markers straight from it, without depending on this crate.
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | `Waypoint`, `Category`, `MapImage` and the category palette |
//! | [`store`] | In-memory workspace with add / edit / delete / clear |
//! | [`document`] | `workspace.json` wire types and import sanitizing |
//! | [`package`] | Export to and import from named package entries |

mod error;

pub mod document;
pub mod model;
pub mod package;
pub mod store;

pub use error::WorkspaceError;
