use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};

use crate::renderer::RenderView;

const DEFAULT_DISTANCE: f32 = 15.0;
const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 30.0;
/// Distance change per unit of wheel delta.
const ZOOM_SPEED: f32 = 0.5;
/// Elevation of the camera above the ground plane.
const ELEVATION: f32 = FRAC_PI_4;

/// Isometric camera that trails the avatar at a fixed angle.
///
/// Camera motion is a view concern; it is never persisted.
#[derive(Debug, Clone)]
pub struct FollowCamera {
    pub target: Vec3,
    pub distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: DEFAULT_DISTANCE,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl FollowCamera {
    /// Look at `target` from the current distance.
    pub fn follow(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Change the distance by `delta_y * 0.5`. A step that would leave the
    /// `[5, 30]` range is dropped whole rather than clamped. Returns whether
    /// the distance changed.
    pub fn zoom(&mut self, delta_y: f32) -> bool {
        let candidate = self.distance + delta_y * ZOOM_SPEED;
        if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&candidate) {
            return false;
        }
        self.distance = candidate;
        true
    }

    pub fn eye(&self) -> Vec3 {
        let (sin, cos) = ELEVATION.sin_cos();
        self.target + Vec3::new(self.distance * cos, self.distance * sin, self.distance * cos)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_sits_on_the_diagonal() {
        let cam = FollowCamera::default();
        let eye = cam.eye();
        assert!((eye.x - eye.z).abs() < 1e-6);
        assert!((eye.x - 15.0 * FRAC_PI_4.cos()).abs() < 1e-4);
        assert!((eye.y - 15.0 * FRAC_PI_4.sin()).abs() < 1e-4);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn eye_tracks_target() {
        let mut cam = FollowCamera::default();
        let at_origin = cam.eye();
        cam.follow(Vec3::new(-0.2, 1.0, -0.2));
        let offset = cam.eye() - cam.target;
        assert!((offset - at_origin).length() < 1e-5);
    }

    #[test]
    fn zoom_within_range_applies() {
        let mut cam = FollowCamera::default();
        assert!(cam.zoom(10.0));
        assert_eq!(cam.distance, 20.0);
        assert!(cam.zoom(-20.0));
        assert_eq!(cam.distance, 10.0);
    }

    #[test]
    fn zoom_out_of_range_is_ignored_not_clamped() {
        let mut cam = FollowCamera::default();
        assert!(!cam.zoom(40.0)); // 15 + 20 = 35
        assert_eq!(cam.distance, 15.0);
        assert!(!cam.zoom(-22.0)); // 15 - 11 = 4
        assert_eq!(cam.distance, 15.0);
    }

    #[test]
    fn zoom_accepts_range_edges() {
        let mut cam = FollowCamera::default();
        assert!(cam.zoom(30.0));
        assert_eq!(cam.distance, 30.0);
        assert!(cam.zoom(-50.0));
        assert_eq!(cam.distance, 5.0);
    }

    #[test]
    fn render_view_reports_degrees() {
        let view = FollowCamera::default().render_view();
        assert!((view.fov_degrees - 75.0).abs() < 1e-3);
    }
}
