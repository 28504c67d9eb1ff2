// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! A first-person camera with a lazily rebuilt view matrix.

use selenium_core::math::{Mat4, Quaternion, Vec3};
use std::f32::consts::PI;

/// A camera described by a position and an orthonormal right/up/look basis.
///
/// Movement and rotation only mark the view as stale; call
/// [`update_view_matrix`](Self::update_view_matrix) once per frame before
/// reading [`view`](Self::view).
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    right: Vec3,
    up: Vec3,
    look: Vec3,

    near_z: f32,
    far_z: f32,
    aspect: f32,
    fov_y: f32,
    near_window_height: f32,
    far_window_height: f32,

    view_dirty: bool,
    view: Mat4,
    proj: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// A camera at the origin looking down +Z with a 45 degree lens.
    pub fn new() -> Self {
        let look = Vec3::Z;
        let up = Vec3::Y;
        let mut camera = Self {
            position: Vec3::ZERO,
            right: look.cross(up),
            up,
            look,
            near_z: 0.0,
            far_z: 0.0,
            aspect: 0.0,
            fov_y: 0.0,
            near_window_height: 0.0,
            far_window_height: 0.0,
            view_dirty: true,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        };
        camera.set_lens(0.25 * PI, 1.0, 1.0, 1000.0);
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view_dirty = true;
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn look(&self) -> Vec3 {
        self.look
    }

    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    /// Horizontal field of view, derived from the near window.
    pub fn fov_x(&self) -> f32 {
        let half_width = 0.5 * self.near_window_width();
        2.0 * (half_width / self.near_z).atan()
    }

    pub fn near_window_width(&self) -> f32 {
        self.aspect * self.near_window_height
    }

    pub fn near_window_height(&self) -> f32 {
        self.near_window_height
    }

    pub fn far_window_height(&self) -> f32 {
        self.far_window_height
    }

    /// Sets the frustum and rebuilds the projection matrix.
    pub fn set_lens(&mut self, fov_y: f32, aspect: f32, near_z: f32, far_z: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near_z = near_z;
        self.far_z = far_z;

        let half_tan = (0.5 * fov_y).tan();
        self.near_window_height = 2.0 * near_z * half_tan;
        self.far_window_height = 2.0 * far_z * half_tan;

        self.proj = Mat4::perspective_rh_zo(fov_y, aspect, near_z, far_z);
    }

    /// Places the camera at `position` looking at `target`.
    pub fn look_at(&mut self, position: Vec3, target: Vec3, world_up: Vec3) {
        let look = (target - position).normalize();
        let right = look.cross(world_up).normalize();
        let up = right.cross(look);

        self.position = position;
        self.look = look;
        self.right = right;
        self.up = up;
        self.view_dirty = true;
    }

    /// Moves along the look vector.
    pub fn walk(&mut self, distance: f32) {
        self.position = self.position + self.look * distance;
        self.view_dirty = true;
    }

    /// Moves along the right vector.
    pub fn strafe(&mut self, distance: f32) {
        self.position = self.position + self.right * distance;
        self.view_dirty = true;
    }

    /// Rotates the up and look vectors about the right vector.
    pub fn pitch(&mut self, angle: f32) {
        let rotation = Quaternion::from_axis_angle(self.right, angle);
        self.up = rotation.rotate_vec3(self.up);
        self.look = rotation.rotate_vec3(self.look);
        self.view_dirty = true;
    }

    /// Rotates the whole basis about the world Y axis.
    pub fn rotate_y(&mut self, angle: f32) {
        let rotation = Quaternion::from_axis_angle(Vec3::Y, angle);
        self.right = rotation.rotate_vec3(self.right);
        self.up = rotation.rotate_vec3(self.up);
        self.look = rotation.rotate_vec3(self.look);
        self.view_dirty = true;
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    /// Re-orthonormalizes the basis and rebuilds the view matrix if it is stale.
    pub fn update_view_matrix(&mut self) {
        if !self.view_dirty {
            return;
        }

        // Rounding errors accumulate over many rotations.
        let look = self.look.normalize();
        let right = look.cross(self.up).normalize();
        let up = right.cross(look);

        self.look = look;
        self.right = right;
        self.up = up;
        self.view = Mat4::look_to_rh(self.position, look, up);
        self.view_dirty = false;
    }

    /// The view matrix as of the last [`update_view_matrix`](Self::update_view_matrix).
    pub fn view(&self) -> Mat4 {
        debug_assert!(!self.view_dirty, "view read before update_view_matrix");
        self.view
    }

    pub fn proj(&self) -> Mat4 {
        self.proj
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use selenium_core::math::Vec4;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn test_default_lens_matches_demo_settings() {
        let camera = Camera::new();
        assert_relative_eq!(camera.fov_y(), 0.25 * PI);
        assert_relative_eq!(camera.near_z(), 1.0);
        assert_relative_eq!(camera.far_z(), 1000.0);
        assert_relative_eq!(camera.aspect(), 1.0);
        assert!(camera.is_view_dirty());
    }

    #[test]
    fn test_movement_marks_view_dirty_until_rebuilt() {
        let mut camera = Camera::new();
        camera.update_view_matrix();
        assert!(!camera.is_view_dirty());

        camera.walk(2.0);
        assert!(camera.is_view_dirty());
        assert_vec3_eq(camera.position(), Vec3::new(0.0, 0.0, 2.0));

        camera.update_view_matrix();
        assert!(!camera.is_view_dirty());
    }

    #[test]
    fn test_view_maps_the_position_to_the_origin() {
        let mut camera = Camera::new();
        camera.set_position(Vec3::new(0.0, 2.0, -15.0));
        camera.update_view_matrix();

        let eye = camera.view() * Vec4::new(0.0, 2.0, -15.0, 1.0);
        assert_vec3_eq(eye.truncate(), Vec3::ZERO);

        // A point ahead of the camera ends up on the -Z axis of view space.
        let ahead = camera.view() * Vec4::new(0.0, 2.0, -5.0, 1.0);
        assert_vec3_eq(ahead.truncate(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_rotations_keep_the_basis_orthonormal() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            camera.pitch(0.013);
            camera.rotate_y(0.029);
        }
        camera.update_view_matrix();

        assert_relative_eq!(camera.look().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.up().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.look().dot(camera.right()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.look().dot(camera.up()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotate_y_turns_look_towards_x() {
        let mut camera = Camera::new();
        camera.rotate_y(0.5 * PI);
        assert_vec3_eq(camera.look(), Vec3::X);
    }

    #[test]
    fn test_strafe_moves_along_right() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y);
        camera.strafe(3.0);
        assert_vec3_eq(camera.position(), Vec3::new(3.0, 0.0, 0.0));
    }
}
