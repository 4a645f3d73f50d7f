use std::ops::{Add, AddAssign, Sub};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Euclidean coordinates in world space.
///
/// Stored as `f64` so snapshot values survive a JSON round trip bit for bit.
/// Renderers convert to `glam::Vec3` at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same point projected onto the ground plane.
    pub fn on_ground(self) -> Self {
        Self { y: 0.0, ..self }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component-wise comparison within `epsilon`.
    pub fn abs_diff_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        Vec3::new(v.x as f32, v.y as f32, v.z as f32)
    }
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x as f64, v.y as f64, v.z as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assign_accumulates() {
        let mut p = Vector3::new(0.0, 1.0, 0.0);
        p += Vector3::new(2.0, 0.0, -1.0);
        assert_eq!(p, Vector3::new(2.0, 1.0, -1.0));
    }

    #[test]
    fn on_ground_zeroes_height() {
        let p = Vector3::new(3.0, 7.5, -2.0).on_ground();
        assert_eq!(p, Vector3::new(3.0, 0.0, -2.0));
    }

    #[test]
    fn serializes_as_named_fields() {
        let json = serde_json::to_string(&Vector3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"z":3.0}"#);
    }

    #[test]
    fn converts_to_glam() {
        let v: Vec3 = Vector3::new(1.5, -2.0, 0.25).into();
        assert_eq!(v, Vec3::new(1.5, -2.0, 0.25));
    }

    #[test]
    fn non_finite_detected() {
        assert!(Vector3::ZERO.is_finite());
        assert!(!Vector3::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}
