//! Desktop collaborators: cursor position and screen geometry.
//!
//! Only queries the desktop; placement decisions live in the positioner.

mod dry_run;
mod xdotool;
mod r#trait;

pub use self::r#trait::{create_desktop, CursorSource, GeometrySource};
