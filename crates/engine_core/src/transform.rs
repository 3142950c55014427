//! Transform component and utilities for spatial positioning.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Serialize;

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform from a position and XYZ Euler angles in radians.
    pub fn from_position_euler(position: Vec3, euler: Vec3) -> Self {
        Self::from_position_rotation(position, euler_to_quat(euler))
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Orient the transform so its forward axis points at `target`.
    /// Leaves the rotation untouched when the target coincides with the position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if (target - self.position).length_squared() > 0.0001 {
            self.rotation = Quat::from_mat4(&Mat4::look_at_rh(self.position, target, up)).inverse();
        }
    }
}

/// Convert XYZ Euler angles (radians) to a quaternion, matching the usual scene-graph convention.
pub fn euler_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z)
}
