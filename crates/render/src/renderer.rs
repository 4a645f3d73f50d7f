use std::fmt::Write;

use glam::Vec3;

use crate::scene::{Color, Scene};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

/// Renderer-agnostic interface.
///
/// A renderer reads a composed scene and a view and produces output. It has
/// no access to the session state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Human-readable listing of a scene, for the CLI and for tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn hex(color: &Color) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", byte(color[0]), byte(color[1]), byte(color[2]))
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let grid = if scene.show_grid {
            format!("{}/{}", scene.grid.size, scene.grid.divisions)
        } else {
            "off".to_string()
        };
        let _ = writeln!(
            out,
            "=== Scene (primitives={}, grid={grid}) ===",
            scene.primitives.len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );
        for p in &scene.primitives {
            let _ = writeln!(
                out,
                "  {:<6} {:<8} pos=({:.2}, {:.2}, {:.2}) color={}",
                p.label,
                p.mesh.name(),
                p.translation.x,
                p.translation.y,
                p.translation.z,
                hex(&p.color)
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FollowCamera, GridSpec};
    use meadow_kernel::{PlacedObject, PlantKind, SessionState};

    #[test]
    fn empty_world_lists_ground_and_avatar() {
        let scene = Scene::compose(&SessionState::fresh(Vec::new()), true);
        let output = DebugTextRenderer::new().render(&scene, &FollowCamera::default().render_view());

        assert!(output.contains("primitives=5"));
        assert!(output.contains("grid=200/200"));
        assert!(output.contains("ground"));
        assert!(output.contains("body"));
        assert!(output.contains("#ff0000"));
    }

    #[test]
    fn plants_are_listed_with_colors() {
        let state = SessionState::fresh(vec![PlacedObject::on_ground(PlantKind::Flower, 1.0, 2.0)]);
        let scene = Scene::compose(&state, false);
        let output = DebugTextRenderer::new().render(&scene, &FollowCamera::default().render_view());

        assert!(output.contains("bloom"));
        assert!(output.contains("#ff69b4"));
        assert!(output.contains("pos=(1.00, 1.30, 2.00)"));
        assert!(output.contains("fov=75"));
        assert!(output.contains("grid=off"));
    }

    #[test]
    fn custom_grid_is_reported() {
        let mut scene = Scene::compose(&SessionState::fresh(Vec::new()), true);
        scene.grid = GridSpec {
            size: 50.0,
            divisions: 10,
        };
        let output = DebugTextRenderer::new().render(&scene, &FollowCamera::default().render_view());
        assert!(output.contains("grid=50/10"));
    }
}
