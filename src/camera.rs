//! Free-fly camera.
//!
//! The camera's world transform is `T(position) * Ry(yaw) * Rx(pitch)`; the
//! view matrix is its inverse. Movement is applied along the columns of the
//! world transform, so "forward" always follows where the camera looks.

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::math::{Mat4, Vec3};

/// Distance moved per frame for each held movement key.
pub const CAMERA_SPEED: f32 = 0.2;

/// Radians of rotation per pixel of mouse motion.
pub const LOOK_SENSITIVITY: f32 = 0.001 * TAU;

/// Vertical field of view in radians.
pub const FOV_Y: f32 = FRAC_PI_2;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation around world Y in radians.
    pub yaw: f32,
    /// Rotation around the camera's X axis in radians. Not clamped.
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::translation(self.position)
            * Mat4::axis_angle(Vec3::Y, self.yaw)
            * Mat4::axis_angle(Vec3::X, self.pitch)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    pub fn projection_matrix(aspect: f32) -> Mat4 {
        Mat4::perspective(FOV_Y, aspect, Z_NEAR, Z_FAR)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        Self::projection_matrix(aspect) * self.view_matrix()
    }

    /// Moves the camera along its own axes. `axes.x` is right, `axes.y` is
    /// up and `axes.z` is forward; each is scaled by [`CAMERA_SPEED`].
    pub fn translate_relative(&mut self, axes: Vec3) {
        let world = self.world_matrix();
        self.position += world.forward() * (axes.z * CAMERA_SPEED)
            + world.right() * (axes.x * CAMERA_SPEED)
            + world.up() * (axes.y * CAMERA_SPEED);
    }

    /// Applies a mouse delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * LOOK_SENSITIVITY;
        self.pitch += dy * LOOK_SENSITIVITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_pure_translation_view() {
        let p = Vec3::new(3.0, -1.0, 7.5);
        let camera = Camera::new(p);
        for q in [Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), Vec3::new(-8.0, 0.5, 4.0)] {
            assert_vec3_eq(camera.view_matrix().transform_point(q), q - p);
        }
    }

    #[test]
    fn test_view_is_inverse_of_world() {
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, -5.0));
        camera.rotate(120.0, -45.0);
        let product = camera.world_matrix() * camera.view_matrix();
        assert!(product.abs_diff_eq(&Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn test_forward_follows_yaw() {
        let mut camera = Camera::default();
        camera.translate_relative(Vec3::new(0.0, 0.0, 1.0));
        assert_vec3_eq(camera.position, Vec3::new(0.0, 0.0, CAMERA_SPEED));

        let mut camera = Camera::default();
        camera.yaw = FRAC_PI_2;
        camera.translate_relative(Vec3::new(0.0, 0.0, 1.0));
        assert_vec3_eq(camera.position, Vec3::new(CAMERA_SPEED, 0.0, 0.0));
    }

    #[test]
    fn test_strafe_and_lift() {
        let mut camera = Camera::default();
        camera.translate_relative(Vec3::new(-1.0, 1.0, 0.0));
        assert_vec3_eq(camera.position, Vec3::new(-CAMERA_SPEED, CAMERA_SPEED, 0.0));
    }

    #[test]
    fn test_pitch_is_not_clamped() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 10_000.0);
        assert!((camera.pitch - 10_000.0 * LOOK_SENSITIVITY).abs() < 1e-3);
    }

    #[test]
    fn test_point_ahead_projects_to_screen_center() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, -10.0));
        let screen = camera.view_projection(16.0 / 9.0).project(Vec3::ZERO);
        assert!((screen.x - 0.5).abs() < 1e-4);
        assert!((screen.y - 0.5).abs() < 1e-4);
        assert!(screen.z > 0.0 && screen.z < 1.0);
    }
}
