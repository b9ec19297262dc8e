//! Lensmaker view - JSON scenes for optical sequence viewers.
//!
//! Converts the recorded steps of a traced sequence into groups of points,
//! surfaces and ray segments. No physics happens here.

mod render;
mod scene;
mod theme;

pub use render::{render_sequence, SURFACE_SAMPLES};
pub use scene::{ExportError, Group, Scene, SceneMode, SurfaceEntry};
pub use theme::Theme;
