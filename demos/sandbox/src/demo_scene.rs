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


//! The fixed demo scene: primitive shapes around one skinned character.

use anyhow::{Context, Result};
use selenium_core::animation::{AnimationClip, BoneAnimation, Keyframe};
use selenium_core::math::{Mat4, Quaternion, Vec3};
use selenium_core::renderer::MAX_BONES;
use selenium_core::{SkinnedController, SkinnedData};
use selenium_io::{load_m3d, M3dMaterial, Subset};
use selenium_sdk::config::ModelConfig;
use selenium_sdk::{
    BoundingSphere, MaterialDesc, RenderItemDesc, RenderLayer, Scene, Submesh,
};
use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

/// Draw ranges of the shapes inside the shared static mesh buffers.
///
/// The meshes themselves come from the shape generator; only their ranges
/// matter to the frame resources.
mod shapes {
    use super::Submesh;

    pub const BOX: Submesh = Submesh {
        index_count: 2304,
        start_index: 0,
        base_vertex: 0,
    };
    pub const GRID: Submesh = Submesh {
        index_count: 13806,
        start_index: 2304,
        base_vertex: 1152,
    };
    pub const SPHERE: Submesh = Submesh {
        index_count: 2280,
        start_index: 16110,
        base_vertex: 3552,
    };
    pub const CYLINDER: Submesh = Submesh {
        index_count: 2520,
        start_index: 18390,
        base_vertex: 3953,
    };
    pub const QUAD: Submesh = Submesh {
        index_count: 6,
        start_index: 20910,
        base_vertex: 4438,
    };
}

/// Texture table slots used before the character's own maps.
const STATIC_TEXTURE_SLOTS: u32 = 8;

/// The bounding sphere of the scene. The grid (20 x 30) is the widest object.
pub fn scene_bounds() -> BoundingSphere {
    BoundingSphere {
        center: Vec3::ZERO,
        radius: (10.0f32 * 10.0 + 15.0 * 15.0).sqrt(),
    }
}

/// The skinned character: its rig, its subsets and their materials.
#[derive(Debug, Clone)]
pub struct Character {
    pub skinned: Arc<SkinnedData>,
    pub subsets: Vec<Subset>,
    pub materials: Vec<M3dMaterial>,
}

impl Character {
    /// Loads the configured model, or builds the built-in rig when none is set.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let character = match &config.path {
            Some(path) => {
                let model = load_m3d(path)
                    .with_context(|| format!("Failed to load skinned model {}", path.display()))?;
                Self {
                    skinned: Arc::new(model.skinned_data),
                    subsets: model.subsets,
                    materials: model.materials,
                }
            }
            None => {
                log::info!("No model configured, using the built-in rig");
                Self::builtin()?
            }
        };

        if character.skinned.bone_count() > MAX_BONES {
            log::warn!(
                "Model has {} bones, only the first {} are uploaded",
                character.skinned.bone_count(),
                MAX_BONES
            );
        }
        Ok(character)
    }

    /// A three-bone arm waving back and forth in a two second "Take1" clip.
    pub fn builtin() -> Result<Self> {
        let wave = |angle: f32, offset: Vec3| {
            BoneAnimation::new(vec![
                Keyframe::new(0.0, offset, Vec3::ONE, Quaternion::IDENTITY),
                Keyframe::new(
                    1.0,
                    offset,
                    Vec3::ONE,
                    Quaternion::from_axis_angle(Vec3::Z, angle),
                ),
                Keyframe::new(2.0, offset, Vec3::ONE, Quaternion::IDENTITY),
            ])
        };
        let root = BoneAnimation::new(vec![Keyframe::default()]);
        let clip = AnimationClip::new(vec![
            root,
            wave(0.6, Vec3::new(0.0, 2.0, 0.0)),
            wave(0.9, Vec3::new(0.0, 2.0, 0.0)),
        ]);

        let offsets = vec![
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, -4.0, 0.0)),
        ];
        let skinned = SkinnedData::new(
            vec![-1, 0, 1],
            offsets,
            HashMap::from([("Take1".to_string(), clip)]),
        )?;

        Ok(Self {
            skinned: Arc::new(skinned),
            subsets: vec![Subset {
                id: 0,
                vertex_start: 0,
                vertex_count: 24,
                face_start: 0,
                face_count: 12,
            }],
            materials: vec![M3dMaterial {
                name: "arm".to_string(),
                ..M3dMaterial::default()
            }],
        })
    }
}

fn material(
    name: &str,
    textures: (u32, u32),
    albedo: [f32; 4],
    fresnel: f32,
    roughness: f32,
) -> MaterialDesc {
    MaterialDesc {
        name: name.to_string(),
        diffuse_srv_index: textures.0,
        normal_srv_index: textures.1,
        diffuse_albedo: albedo,
        fresnel_r0: Vec3::new(fresnel, fresnel, fresnel),
        roughness,
        mat_transform: Mat4::IDENTITY,
    }
}

/// Builds the demo scene around `character` playing `clip_name`.
pub fn build_scene(ring_size: usize, character: &Character, clip_name: &str) -> Result<Scene> {
    let mut scene = Scene::new(ring_size, scene_bounds());

    let bricks = scene.add_material(material("bricks0", (0, 1), [1.0; 4], 0.1, 0.3));
    let tile = scene.add_material(material("tile0", (2, 3), [0.9, 0.9, 0.9, 1.0], 0.2, 0.1));
    let mirror = scene.add_material(MaterialDesc {
        fresnel_r0: Vec3::new(0.98, 0.97, 0.95),
        ..material("mirror0", (4, 5), [0.0, 0.0, 0.0, 1.0], 0.0, 0.1)
    });
    let sky = scene.add_material(material("sky", (6, 7), [1.0; 4], 0.1, 1.0));

    let character_materials: Vec<usize> = character
        .materials
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let slot = STATIC_TEXTURE_SLOTS + 2 * i as u32;
            scene.add_material(MaterialDesc {
                name: m.name.clone(),
                diffuse_srv_index: slot,
                normal_srv_index: slot + 1,
                diffuse_albedo: m.diffuse_albedo,
                fresnel_r0: m.fresnel_r0,
                roughness: m.roughness,
                mat_transform: Mat4::IDENTITY,
            })
        })
        .collect();

    scene.add_item(RenderItemDesc {
        world: Mat4::from_scale(Vec3::ONE * 5000.0),
        material: sky,
        layer: RenderLayer::Sky,
        submesh: shapes::SPHERE,
        ..RenderItemDesc::default()
    })?;
    scene.add_item(RenderItemDesc {
        material: bricks,
        layer: RenderLayer::Debug,
        submesh: shapes::QUAD,
        ..RenderItemDesc::default()
    })?;
    scene.add_item(RenderItemDesc {
        world: Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0))
            * Mat4::from_scale(Vec3::new(2.0, 1.0, 2.0)),
        tex_transform: Mat4::from_scale(Vec3::new(1.0, 0.5, 1.0)),
        material: bricks,
        submesh: shapes::BOX,
        ..RenderItemDesc::default()
    })?;
    scene.add_item(RenderItemDesc {
        tex_transform: Mat4::from_scale(Vec3::new(8.0, 8.0, 1.0)),
        material: tile,
        submesh: shapes::GRID,
        ..RenderItemDesc::default()
    })?;

    let column_tex = Mat4::from_scale(Vec3::new(1.5, 2.0, 1.0));
    for row in 0..5 {
        let z = -10.0 + row as f32 * 5.0;
        for x in [-5.0, 5.0] {
            scene.add_item(RenderItemDesc {
                world: Mat4::from_translation(Vec3::new(x, 1.5, z)),
                tex_transform: column_tex,
                material: bricks,
                submesh: shapes::CYLINDER,
                ..RenderItemDesc::default()
            })?;
            scene.add_item(RenderItemDesc {
                world: Mat4::from_translation(Vec3::new(x, 3.5, z)),
                material: mirror,
                submesh: shapes::SPHERE,
                ..RenderItemDesc::default()
            })?;
        }
    }

    let controller = SkinnedController::new(Arc::clone(&character.skinned), clip_name)
        .with_context(|| format!("Character has no clip named '{clip_name}'"))?;
    let instance = scene.add_skinned_instance(controller);
    let character_world = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))
        * Mat4::from_rotation_y(PI)
        * Mat4::from_scale(Vec3::ONE * 0.05);

    for subset in &character.subsets {
        let material = character_materials
            .get(subset.id as usize)
            .copied()
            .unwrap_or(bricks);
        scene.add_item(RenderItemDesc {
            world: character_world,
            material,
            layer: RenderLayer::SkinnedOpaque,
            submesh: Submesh::from_subset(subset),
            skinned_instance: Some(instance),
            ..RenderItemDesc::default()
        })?;
    }

    log::info!(
        "Demo scene built: {} render items, {} materials, {} skinned instance(s)",
        scene.items().len(),
        scene.materials().len(),
        scene.skinned_instances().len()
    );
    Ok(scene)
}
