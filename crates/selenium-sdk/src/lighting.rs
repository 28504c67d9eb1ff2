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


//! Directional key lights and the shadow frustum fitted around the scene.

use crate::scene::BoundingSphere;
use selenium_core::math::{Mat4, Quaternion, Vec3, Vec4};
use selenium_core::renderer::{Light, MAX_LIGHTS};

/// Number of directional lights in the demo.
pub const DIRECTIONAL_LIGHTS: usize = 3;

/// Maps clip space `[-1, 1]` to texture space `[0, 1]` with Y pointing down.
pub fn ndc_to_texture() -> Mat4 {
    Mat4::from_cols(
        Vec4::new(0.5, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -0.5, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.5, 0.5, 0.0, 1.0),
    )
}

/// Three directional lights slowly orbiting the world Y axis.
///
/// The first light is the key light and the only one casting shadows.
#[derive(Debug, Clone)]
pub struct SceneLighting {
    pub base_directions: [Vec3; DIRECTIONAL_LIGHTS],
    pub strengths: [Vec3; DIRECTIONAL_LIGHTS],
    pub ambient: [f32; 4],
    /// Radians per second.
    pub rotation_speed: f32,
    rotation_angle: f32,
    directions: [Vec3; DIRECTIONAL_LIGHTS],
}

impl Default for SceneLighting {
    fn default() -> Self {
        let base_directions = [
            Vec3::new(0.57735, -0.57735, 0.57735),
            Vec3::new(-0.57735, -0.57735, 0.57735),
            Vec3::new(0.0, -0.707, -0.707),
        ];
        Self {
            base_directions,
            strengths: [
                Vec3::new(0.9, 0.8, 0.7),
                Vec3::new(0.4, 0.4, 0.4),
                Vec3::new(0.2, 0.2, 0.2),
            ],
            ambient: [0.25, 0.25, 0.35, 1.0],
            rotation_speed: 0.1,
            rotation_angle: 0.0,
            directions: base_directions,
        }
    }
}

impl SceneLighting {
    /// Rotates the lights by `rotation_speed * dt`.
    pub fn animate(&mut self, dt: f32) {
        self.rotation_angle += self.rotation_speed * dt;
        let rotation = Quaternion::from_axis_angle(Vec3::Y, self.rotation_angle);
        for (rotated, base) in self.directions.iter_mut().zip(self.base_directions) {
            *rotated = rotation.rotate_vec3(base);
        }
    }

    pub fn rotation_angle(&self) -> f32 {
        self.rotation_angle
    }

    pub fn directions(&self) -> &[Vec3; DIRECTIONAL_LIGHTS] {
        &self.directions
    }

    /// Direction of the shadow-casting light.
    pub fn key_direction(&self) -> Vec3 {
        self.directions[0]
    }

    /// The pass light array: the directional lights first, the rest zeroed.
    pub fn pass_lights(&self) -> [Light; MAX_LIGHTS] {
        let mut lights = [UNUSED_LIGHT; MAX_LIGHTS];
        for (light, (direction, strength)) in lights
            .iter_mut()
            .zip(self.directions.iter().zip(self.strengths.iter()))
        {
            *light = Light {
                strength: *strength,
                direction: *direction,
                ..Light::default()
            };
        }
        lights
    }
}

const UNUSED_LIGHT: Light = Light {
    strength: Vec3::ZERO,
    falloff_start: 0.0,
    direction: Vec3::ZERO,
    falloff_end: 0.0,
    position: Vec3::ZERO,
    spot_power: 0.0,
};

/// An orthographic light frustum enclosing a bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCaster {
    pub light_pos_w: Vec3,
    pub light_view: Mat4,
    pub light_proj: Mat4,
    pub near_z: f32,
    pub far_z: f32,
    /// World space to shadow map texture space.
    pub shadow_transform: Mat4,
}

impl ShadowCaster {
    /// Places the light two radii away from the scene along `-light_dir` and
    /// fits a box tightly around the bounding sphere.
    pub fn fit(bounds: BoundingSphere, light_dir: Vec3) -> Self {
        let radius = bounds.radius;
        let light_pos_w = bounds.center + light_dir.normalize() * (-2.0 * radius);
        let light_view = Mat4::look_at_rh(light_pos_w, bounds.center, Vec3::Y);

        // The view looks down -Z, so the sphere's depth is the negated z.
        let center_ls = light_view.transform_point3(bounds.center);
        let depth = -center_ls.z;
        let near_z = depth - radius;
        let far_z = depth + radius;

        let light_proj = Mat4::orthographic_rh_zo(
            center_ls.x - radius,
            center_ls.x + radius,
            center_ls.y - radius,
            center_ls.y + radius,
            near_z,
            far_z,
        );

        Self {
            light_pos_w,
            light_view,
            light_proj,
            near_z,
            far_z,
            shadow_transform: ndc_to_texture() * light_proj * light_view,
        }
    }
}
