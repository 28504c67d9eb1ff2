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

//! CPU-side images of the constant and structured buffer elements read by the shaders.
//!
//! Every type here is `#[repr(C)]` and `Pod` so it can be copied byte for byte
//! into an [`UploadBuffer`](super::UploadBuffer). Matrices are column-major.

use crate::math::{Mat4, Vec3};
use bytemuck::{Pod, Zeroable};

/// Maximum number of bones in one skinned palette.
pub const MAX_BONES: usize = 96;

/// Maximum number of lights in a pass.
pub const MAX_LIGHTS: usize = 16;

/// Per-object constants.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ObjectConstants {
    /// Object to world transform.
    pub world: Mat4,
    /// Transform applied to texture coordinates.
    pub tex_transform: Mat4,
    /// Index of the object's material in the material buffer.
    pub material_index: u32,
    /// Padding to a 16-byte boundary.
    pub _pad: [u32; 3],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            tex_transform: Mat4::IDENTITY,
            material_index: 0,
            _pad: [0; 3],
        }
    }
}

/// The bone palette of one skinned instance.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SkinnedConstants {
    /// Final bone transforms. Entries past the bone count stay identity.
    pub bone_transforms: [Mat4; MAX_BONES],
}

impl SkinnedConstants {
    /// Builds a palette from a controller's final transforms, truncated to [`MAX_BONES`].
    pub fn from_palette(palette: &[Mat4]) -> Self {
        let mut constants = Self::default();
        for (dst, src) in constants.bone_transforms.iter_mut().zip(palette) {
            *dst = *src;
        }
        constants
    }
}

impl Default for SkinnedConstants {
    fn default() -> Self {
        Self {
            bone_transforms: [Mat4::IDENTITY; MAX_BONES],
        }
    }
}

/// One element of the material structured buffer.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct MaterialData {
    /// Diffuse albedo (RGBA).
    pub diffuse_albedo: [f32; 4],
    /// Reflectance at normal incidence.
    pub fresnel_r0: Vec3,
    /// Surface roughness in [0, 1].
    pub roughness: f32,
    /// Transform applied to texture coordinates.
    pub mat_transform: Mat4,
    /// Index of the diffuse map in the texture table.
    pub diffuse_map_index: u32,
    /// Index of the normal map in the texture table.
    pub normal_map_index: u32,
    /// Padding to a 16-byte boundary.
    pub _pad: [u32; 2],
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            diffuse_albedo: [1.0; 4],
            fresnel_r0: Vec3::new(0.01, 0.01, 0.01),
            roughness: 0.25,
            mat_transform: Mat4::IDENTITY,
            diffuse_map_index: 0,
            normal_map_index: 0,
            _pad: [0; 2],
        }
    }
}

/// A light as laid out in the pass constants.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Light {
    /// Light color times intensity.
    pub strength: Vec3,
    /// Point/spot only.
    pub falloff_start: f32,
    /// Directional/spot only.
    pub direction: Vec3,
    /// Point/spot only.
    pub falloff_end: f32,
    /// Point/spot only.
    pub position: Vec3,
    /// Spot only.
    pub spot_power: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            strength: Vec3::new(0.5, 0.5, 0.5),
            falloff_start: 1.0,
            direction: Vec3::new(0.0, -1.0, 0.0),
            falloff_end: 10.0,
            position: Vec3::ZERO,
            spot_power: 64.0,
        }
    }
}

/// Per-pass constants, written once per pass and frame.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PassConstants {
    /// World to view.
    pub view: Mat4,
    /// View to world.
    pub inv_view: Mat4,
    /// View to clip.
    pub proj: Mat4,
    /// Clip to view.
    pub inv_proj: Mat4,
    /// World to clip.
    pub view_proj: Mat4,
    /// Clip to world.
    pub inv_view_proj: Mat4,
    /// World to texture space of the screen (used by ambient occlusion).
    pub view_proj_tex: Mat4,
    /// World to shadow map texture space.
    pub shadow_transform: Mat4,
    /// Eye position in world space.
    pub eye_pos_w: Vec3,
    /// Padding.
    pub _pad0: f32,
    /// Render target size in pixels.
    pub render_target_size: [f32; 2],
    /// Reciprocal of the render target size.
    pub inv_render_target_size: [f32; 2],
    /// Near plane distance.
    pub near_z: f32,
    /// Far plane distance.
    pub far_z: f32,
    /// Seconds since the timer was reset, excluding pauses.
    pub total_time: f32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// Ambient light color.
    pub ambient_light: [f32; 4],
    /// Lights of the pass. Unused entries are zeroed.
    pub lights: [Light; MAX_LIGHTS],
}

impl Default for PassConstants {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            inv_view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            inv_proj: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            inv_view_proj: Mat4::IDENTITY,
            view_proj_tex: Mat4::IDENTITY,
            shadow_transform: Mat4::IDENTITY,
            eye_pos_w: Vec3::ZERO,
            _pad0: 0.0,
            render_target_size: [0.0; 2],
            inv_render_target_size: [0.0; 2],
            near_z: 0.0,
            far_z: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: [0.0, 0.0, 0.0, 1.0],
            lights: [Light::zeroed(); MAX_LIGHTS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_layouts_have_no_implicit_padding() {
        assert_eq!(size_of::<ObjectConstants>(), 2 * 64 + 16);
        assert_eq!(size_of::<MaterialData>(), 16 + 16 + 64 + 16);
        assert_eq!(size_of::<Light>(), 48);
        assert_eq!(size_of::<SkinnedConstants>(), MAX_BONES * 64);
        assert_eq!(size_of::<PassConstants>(), 8 * 64 + 4 * 16 + MAX_LIGHTS * 48);
    }

    #[test]
    fn test_palette_is_truncated_and_padded_with_identity() {
        let palette = vec![Mat4::from_scale(Vec3::ONE * 2.0); MAX_BONES + 4];
        let constants = SkinnedConstants::from_palette(&palette);
        assert_eq!(constants.bone_transforms[MAX_BONES - 1], palette[0]);

        let short = SkinnedConstants::from_palette(&palette[..2]);
        assert_eq!(short.bone_transforms[1], palette[0]);
        assert_eq!(short.bone_transforms[2], Mat4::IDENTITY);
    }
}
