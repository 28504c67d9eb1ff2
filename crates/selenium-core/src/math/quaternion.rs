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

//! Provides a Quaternion type for representing bone rotations.

use serde::{Deserialize, Serialize};

use super::{Vec3, EPSILON};
use std::ops::{Add, Mul, Neg};

/// Represents a rotation as a quaternion stored `(x, y, z, w)`.
///
/// `[x, y, z]` is the vector part and `w` the scalar part. Keyframe rotations are
/// expected to be unit quaternions; [`Quaternion::slerp`] keeps results on the
/// unit sphere.
#[derive(
    Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct Quaternion {
    /// The x component of the vector part.
    pub x: f32,
    /// The y component of the vector part.
    pub y: f32,
    /// The z component of the vector part.
    pub z: f32,
    /// The scalar (real) part.
    pub w: f32,
}

impl Quaternion {
    /// The identity quaternion, representing no rotation.
    pub const IDENTITY: Quaternion = Quaternion::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new quaternion from its raw components.
    ///
    /// This does not normalize. Prefer [`Quaternion::from_axis_angle`] for rotations.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Creates a quaternion rotating `angle_radians` around `axis`.
    ///
    /// The axis is normalized first.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle_radians * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Calculates the squared length of the quaternion.
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.dot(*self)
    }

    /// Calculates the length of the quaternion.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Returns a unit-length copy.
    /// If the quaternion has a near-zero magnitude, it returns the identity quaternion.
    pub fn normalize(&self) -> Self {
        let mag_sq = self.magnitude_squared();
        if mag_sq > EPSILON {
            *self * (1.0 / mag_sq.sqrt())
        } else {
            Self::IDENTITY
        }
    }

    /// Computes the conjugate of the quaternion, which negates the vector part.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Computes the dot product of two quaternions.
    #[inline]
    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Rotates a 3D vector by this (unit) quaternion.
    pub fn rotate_vec3(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let s = self.w;
        2.0 * u.dot(v) * u + (s * s - u.dot(u)) * v + 2.0 * s * u.cross(v)
    }

    /// Spherical linear interpolation along the shortest arc.
    ///
    /// `t` is clamped to `[0.0, 1.0]`. When the two rotations are nearly
    /// parallel the result falls back to a normalized linear blend.
    pub fn slerp(start: Self, end: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mut cos_theta = start.dot(end);
        let mut end = end;

        // q and -q encode the same rotation; flip to stay on the short arc.
        if cos_theta < 0.0 {
            cos_theta = -cos_theta;
            end = -end;
        }

        if cos_theta > 1.0 - EPSILON {
            return (start * (1.0 - t) + end * t).normalize();
        }

        let theta = cos_theta.acos();
        let inv_sin = 1.0 / theta.sin();
        let scale_start = ((1.0 - t) * theta).sin() * inv_sin;
        let scale_end = (t * theta).sin() * inv_sin;
        start * scale_start + end * scale_end
    }
}

impl Default for Quaternion {
    /// Returns the identity quaternion, representing no rotation.
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Quaternion {
    #[inline]
    fn from(q: [f32; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Self;
    /// Hamilton product. `a * b` applies `b` first, then `a`.
    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        }
    }
}

impl Mul<f32> for Quaternion {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self::Output {
        Self::new(
            self.x * scalar,
            self.y * scalar,
            self.z * scalar,
            self.w * scalar,
        )
    }
}

impl Add<Quaternion> for Quaternion {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Neg for Quaternion {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::FRAC_PI_2;
    use approx::assert_relative_eq;

    fn assert_same_rotation(a: Quaternion, b: Quaternion) {
        assert_relative_eq!(a.dot(b).abs(), 1.0, epsilon = EPSILON * 10.0);
    }

    #[test]
    fn test_rotate_vec3_quarter_turn_about_y() {
        let q = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        let v = q.rotate_vec3(Vec3::X);
        assert_relative_eq!(v.x, 0.0, epsilon = EPSILON);
        assert_relative_eq!(v.y, 0.0, epsilon = EPSILON);
        assert_relative_eq!(v.z, -1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let start = Quaternion::IDENTITY;
        let end = Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2);

        assert_same_rotation(Quaternion::slerp(start, end, 0.0), start);
        assert_same_rotation(Quaternion::slerp(start, end, 1.0), end);

        let mid = Quaternion::slerp(start, end, 0.5);
        assert_same_rotation(mid, Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2 * 0.5));
        assert_relative_eq!(mid.magnitude(), 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_slerp_takes_shortest_arc() {
        let start = Quaternion::from_axis_angle(Vec3::Y, (-30.0f32).to_radians());
        let end = Quaternion::from_axis_angle(Vec3::Y, 170.0f32.to_radians());
        assert!(start.dot(end) < 0.0);

        let mid = Quaternion::slerp(start, end, 0.5);
        assert_same_rotation(
            mid,
            Quaternion::from_axis_angle(Vec3::Y, (-110.0f32).to_radians()),
        );
    }

    #[test]
    fn test_slerp_of_identical_rotations_is_stable() {
        let q = Quaternion::from_axis_angle(Vec3::X, 0.3);
        let r = Quaternion::slerp(q, q, 0.5);
        assert!(!r.x.is_nan() && !r.w.is_nan());
        assert_same_rotation(r, q);
    }

    #[test]
    fn test_normalize_zero_quaternion_is_identity() {
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(q.normalize(), Quaternion::IDENTITY);
    }

    #[test]
    fn test_product_with_conjugate_is_identity() {
        let q = Quaternion::from_axis_angle(Vec3::new(1.0, -2.0, 0.5), 1.2);
        let r = q * q.conjugate();
        assert_same_rotation(r, Quaternion::IDENTITY);
    }
}
