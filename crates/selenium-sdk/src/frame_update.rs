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

//! Per-frame routines that refresh the current frame resource from the scene.
//!
//! Each `update_*` function writes into the buffers of one [`FrameResource`]
//! and returns how many elements it copied. Objects and materials are only
//! copied while their frames-dirty counter is non-zero; bone palettes and
//! pass constants change every frame and are always copied.

use crate::camera::Camera;
use crate::lighting::{ndc_to_texture, SceneLighting, ShadowCaster};
use crate::scene::Scene;
use selenium_core::math::Mat4;
use selenium_core::renderer::{
    FrameResource, GraphicsDevice, ObjectConstants, PassConstants, ResourceError,
    SkinnedConstants,
};
use selenium_core::time::GameTimer;
use selenium_core::AnimationError;

/// Pass constant slot of the main (camera) pass.
pub const MAIN_PASS: usize = 0;
/// Pass constant slot of the shadow pass.
pub const SHADOW_PASS: usize = 1;
/// Number of pass constant slots per frame resource.
pub const PASS_COUNT: usize = 2;

/// Copies the constants of every dirty render item into `frame`.
pub fn update_object_constants(
    device: &dyn GraphicsDevice,
    frame: &FrameResource,
    scene: &mut Scene,
) -> Result<usize, ResourceError> {
    let materials = &scene.materials;
    let mut copies = 0;

    for item in scene.items.iter_mut() {
        if !item.frames_dirty.is_dirty() {
            continue;
        }
        let material = materials.get(item.material).ok_or(ResourceError::NotFound)?;
        let constants = ObjectConstants {
            world: item.world,
            tex_transform: item.tex_transform,
            material_index: material.mat_cb_index as u32,
            _pad: [0; 3],
        };
        frame
            .object_cb
            .copy_data(device, item.obj_cb_index, &constants)?;
        item.frames_dirty.consume();
        copies += 1;
    }
    Ok(copies)
}

/// Copies every dirty material into the material buffer of `frame`.
pub fn update_material_buffer(
    device: &dyn GraphicsDevice,
    frame: &FrameResource,
    scene: &mut Scene,
) -> Result<usize, ResourceError> {
    let mut copies = 0;
    for material in scene.materials.iter_mut() {
        if !material.frames_dirty.is_dirty() {
            continue;
        }
        frame.material_buffer.copy_data(
            device,
            material.mat_cb_index,
            &material.to_material_data(),
        )?;
        material.frames_dirty.consume();
        copies += 1;
    }
    Ok(copies)
}

/// Advances every animation by `dt` seconds.
pub fn tick_skinned_instances(scene: &mut Scene, dt: f32) -> Result<(), AnimationError> {
    for instance in scene.skinned.iter_mut() {
        instance.controller.tick(dt)?;
    }
    Ok(())
}

/// Copies the bone palette of every skinned instance into `frame`.
pub fn update_skinned_constants(
    device: &dyn GraphicsDevice,
    frame: &FrameResource,
    scene: &Scene,
) -> Result<usize, ResourceError> {
    for instance in &scene.skinned {
        let constants = SkinnedConstants::from_palette(instance.controller.final_transforms());
        frame
            .skinned_cb
            .copy_data(device, instance.cb_index, &constants)?;
    }
    Ok(scene.skinned.len())
}

/// Everything the main pass constants are built from.
#[derive(Debug, Clone, Copy)]
pub struct MainPassInputs<'a> {
    pub camera: &'a Camera,
    pub timer: &'a GameTimer,
    pub lighting: &'a SceneLighting,
    pub shadow: &'a ShadowCaster,
    /// Client area in pixels.
    pub client_size: (u32, u32),
}

fn inverse_or_identity(m: Mat4) -> Mat4 {
    m.inverse().unwrap_or_else(|| {
        log::debug!("Singular pass matrix, using identity for its inverse");
        Mat4::IDENTITY
    })
}

fn target_size(width: u32, height: u32) -> ([f32; 2], [f32; 2]) {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    ([w, h], [1.0 / w, 1.0 / h])
}

/// Builds the constants of the camera pass.
///
/// The camera's view matrix must be up to date.
pub fn main_pass_constants(inputs: &MainPassInputs<'_>) -> PassConstants {
    let camera = inputs.camera;
    let view = camera.view();
    let proj = camera.proj();
    let view_proj = proj * view;
    let (size, inv_size) = target_size(inputs.client_size.0, inputs.client_size.1);

    PassConstants {
        view,
        inv_view: inverse_or_identity(view),
        proj,
        inv_proj: inverse_or_identity(proj),
        view_proj,
        inv_view_proj: inverse_or_identity(view_proj),
        view_proj_tex: ndc_to_texture() * view_proj,
        shadow_transform: inputs.shadow.shadow_transform,
        eye_pos_w: camera.position(),
        _pad0: 0.0,
        render_target_size: size,
        inv_render_target_size: inv_size,
        near_z: camera.near_z(),
        far_z: camera.far_z(),
        total_time: inputs.timer.total_time(),
        delta_time: inputs.timer.delta_time(),
        ambient_light: inputs.lighting.ambient,
        lights: inputs.lighting.pass_lights(),
    }
}

/// Writes the camera pass into [`MAIN_PASS`].
pub fn update_main_pass(
    device: &dyn GraphicsDevice,
    frame: &FrameResource,
    inputs: &MainPassInputs<'_>,
) -> Result<usize, ResourceError> {
    frame
        .pass_cb
        .copy_data(device, MAIN_PASS, &main_pass_constants(inputs))?;
    Ok(1)
}

/// Builds the constants of the shadow map pass, seen from the key light.
pub fn shadow_pass_constants(shadow: &ShadowCaster, shadow_map_size: u32) -> PassConstants {
    let view = shadow.light_view;
    let proj = shadow.light_proj;
    let view_proj = proj * view;
    let (size, inv_size) = target_size(shadow_map_size, shadow_map_size);

    PassConstants {
        view,
        inv_view: inverse_or_identity(view),
        proj,
        inv_proj: inverse_or_identity(proj),
        view_proj,
        inv_view_proj: inverse_or_identity(view_proj),
        eye_pos_w: shadow.light_pos_w,
        render_target_size: size,
        inv_render_target_size: inv_size,
        near_z: shadow.near_z,
        far_z: shadow.far_z,
        ..PassConstants::default()
    }
}

/// Writes the shadow pass into [`SHADOW_PASS`].
pub fn update_shadow_pass(
    device: &dyn GraphicsDevice,
    frame: &FrameResource,
    shadow: &ShadowCaster,
    shadow_map_size: u32,
) -> Result<usize, ResourceError> {
    frame.pass_cb.copy_data(
        device,
        SHADOW_PASS,
        &shadow_pass_constants(shadow, shadow_map_size),
    )?;
    Ok(1)
}
