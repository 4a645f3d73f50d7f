//! Rendering adapter: turns session state into colored primitives and a camera view.
//!
//! # Invariants
//! - Renderers read a composed [`Scene`]; they never touch the session state.
//! - Sub-mesh offsets (trunk height, head offset, ...) live here and nowhere else.

mod camera;
mod renderer;
mod scene;

pub use camera::FollowCamera;
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{Color, GridSpec, MeshKind, Primitive, Scene, avatar_primitives, plant_primitives, rgb};
