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

//! The M3D text format.
//!
//! An M3D file is a sequence of whitespace-separated tokens: a header with
//! the element counts, then the materials, the subset table, the skinned
//! vertices, the triangles, the bone offsets, the bone hierarchy and the
//! animation clips. Every value is preceded by a label (`Position:`,
//! `Roughness:` and so on) and every section by a banner; both are skipped.
//!
//! Bone offsets are stored as 16 floats per bone. The file lists the rows of
//! a row-vector matrix, which are the columns of the equivalent column-vector
//! matrix, so the floats are read in order into column-major storage.

mod error;
mod tokens;

pub use self::error::M3dError;

use self::tokens::Tokens;
use bytemuck::{Pod, Zeroable};
use selenium_core::animation::{AnimationClip, BoneAnimation, Keyframe, SkinnedData};
use selenium_core::math::{Mat4, Vec3};
use std::collections::HashMap;
use std::path::Path;

/// A vertex influenced by up to four bones.
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct SkinnedVertex {
    /// Bind-pose position.
    pub pos: Vec3,
    /// Bind-pose normal.
    pub normal: Vec3,
    /// Texture coordinates.
    pub tex_c: [f32; 2],
    /// Tangent along the u texture axis.
    pub tangent_u: Vec3,
    /// Blend weights of the influencing bones.
    pub bone_weights: [f32; 4],
    /// Indices of the influencing bones.
    pub bone_indices: [u8; 4],
}

/// A range of vertices and triangles drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subset {
    /// Subset identifier, equal to its material index.
    pub id: u32,
    /// First vertex of the subset.
    pub vertex_start: u32,
    /// Number of vertices.
    pub vertex_count: u32,
    /// First triangle of the subset.
    pub face_start: u32,
    /// Number of triangles.
    pub face_count: u32,
}

/// A material as described in an M3D file.
#[derive(Debug, Clone, PartialEq)]
pub struct M3dMaterial {
    /// Material name.
    pub name: String,
    /// Diffuse albedo. The file stores RGB; alpha is 1.
    pub diffuse_albedo: [f32; 4],
    /// Reflectance at normal incidence.
    pub fresnel_r0: Vec3,
    /// Surface roughness.
    pub roughness: f32,
    /// Whether pixels are clipped on alpha.
    pub alpha_clip: bool,
    /// Name of the shading model.
    pub material_type_name: String,
    /// File name of the diffuse map.
    pub diffuse_map_name: String,
    /// File name of the normal map.
    pub normal_map_name: String,
}

impl Default for M3dMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse_albedo: [1.0; 4],
            fresnel_r0: Vec3::new(0.01, 0.01, 0.01),
            roughness: 0.8,
            alpha_clip: false,
            material_type_name: String::new(),
            diffuse_map_name: String::new(),
            normal_map_name: String::new(),
        }
    }
}

/// Everything an M3D file describes.
#[derive(Debug, Clone, Default)]
pub struct M3dModel {
    /// The vertices of all subsets.
    pub vertices: Vec<SkinnedVertex>,
    /// Triangle list indices.
    pub indices: Vec<u16>,
    /// One subset per material.
    pub subsets: Vec<Subset>,
    /// The materials.
    pub materials: Vec<M3dMaterial>,
    /// Skeleton and clips.
    pub skinned_data: SkinnedData,
}

/// Reads and parses the M3D file at `path`.
pub fn load_m3d(path: impl AsRef<Path>) -> Result<M3dModel, M3dError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| M3dError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model = parse_m3d(&text)?;

    log::info!(
        "Loaded M3D '{}': {} vertices, {} triangles, {} materials, {} bones, {} clips",
        path.display(),
        model.vertices.len(),
        model.indices.len() / 3,
        model.materials.len(),
        model.skinned_data.bone_count(),
        model.skinned_data.clip_names().len()
    );
    Ok(model)
}

/// Parses the text of an M3D file.
pub fn parse_m3d(text: &str) -> Result<M3dModel, M3dError> {
    let mut tokens = Tokens::new(text);

    tokens.skip("file header")?;
    let num_materials: usize = tokens.labeled("material count")?;
    let num_vertices: usize = tokens.labeled("vertex count")?;
    let num_triangles: usize = tokens.labeled("triangle count")?;
    let num_bones: usize = tokens.labeled("bone count")?;
    let num_clips: usize = tokens.labeled("animation clip count")?;

    let materials = read_materials(&mut tokens, num_materials)?;
    let subsets = read_subset_table(&mut tokens, num_materials)?;
    let vertices = read_skinned_vertices(&mut tokens, num_vertices)?;
    let indices = read_triangles(&mut tokens, num_triangles, num_vertices)?;
    let bone_offsets = read_bone_offsets(&mut tokens, num_bones)?;
    let bone_hierarchy = read_bone_hierarchy(&mut tokens, num_bones)?;
    let animations = read_animation_clips(&mut tokens, num_bones, num_clips)?;

    let skinned_data = SkinnedData::new(bone_hierarchy, bone_offsets, animations)?;

    Ok(M3dModel {
        vertices,
        indices,
        subsets,
        materials,
        skinned_data,
    })
}

/// Skips a section banner. Empty trailing sections may omit it.
fn section(tokens: &mut Tokens<'_>, count: usize, name: &'static str) -> Result<(), M3dError> {
    if count == 0 && !tokens.peek().is_some_and(|t| t.starts_with('*')) {
        return Ok(());
    }
    tokens.skip(name)
}

fn read_materials(tokens: &mut Tokens<'_>, count: usize) -> Result<Vec<M3dMaterial>, M3dError> {
    section(tokens, count, "materials header")?;
    (0..count)
        .map(|_| -> Result<M3dMaterial, M3dError> {
            let name = tokens.labeled::<String>("material name")?;
            let diffuse = tokens.labeled_vec3("diffuse albedo")?;
            let fresnel_r0 = tokens.labeled_vec3("fresnel R0")?;
            let roughness = tokens.labeled("roughness")?;
            let alpha_clip = tokens.labeled::<i32>("alpha clip flag")? != 0;
            Ok(M3dMaterial {
                name,
                diffuse_albedo: [diffuse.x, diffuse.y, diffuse.z, 1.0],
                fresnel_r0,
                roughness,
                alpha_clip,
                material_type_name: tokens.labeled("material type name")?,
                diffuse_map_name: tokens.labeled("diffuse map name")?,
                normal_map_name: tokens.labeled("normal map name")?,
            })
        })
        .collect()
}

fn read_subset_table(tokens: &mut Tokens<'_>, count: usize) -> Result<Vec<Subset>, M3dError> {
    section(tokens, count, "subset table header")?;
    (0..count)
        .map(|_| -> Result<Subset, M3dError> {
            Ok(Subset {
                id: tokens.labeled("subset id")?,
                vertex_start: tokens.labeled("subset vertex start")?,
                vertex_count: tokens.labeled("subset vertex count")?,
                face_start: tokens.labeled("subset face start")?,
                face_count: tokens.labeled("subset face count")?,
            })
        })
        .collect()
}

fn read_skinned_vertices(
    tokens: &mut Tokens<'_>,
    count: usize,
) -> Result<Vec<SkinnedVertex>, M3dError> {
    section(tokens, count, "vertices header")?;
    (0..count)
        .map(|_| -> Result<SkinnedVertex, M3dError> {
            let pos = tokens.labeled_vec3("vertex position")?;
            tokens.skip("tangent")?;
            let [tx, ty, tz, _] = tokens.floats::<4>("vertex tangent")?;
            let normal = tokens.labeled_vec3("vertex normal")?;
            tokens.skip("tex-coords")?;
            let tex_c = tokens.floats::<2>("vertex texture coordinates")?;
            tokens.skip("blend weights")?;
            let bone_weights = tokens.floats::<4>("vertex blend weights")?;
            tokens.skip("blend indices")?;
            let mut bone_indices = [0u8; 4];
            for index in bone_indices.iter_mut() {
                *index = tokens.parse("vertex blend index")?;
            }
            Ok(SkinnedVertex {
                pos,
                normal,
                tex_c,
                tangent_u: Vec3::new(tx, ty, tz),
                bone_weights,
                bone_indices,
            })
        })
        .collect()
}

fn read_triangles(
    tokens: &mut Tokens<'_>,
    count: usize,
    vertex_count: usize,
) -> Result<Vec<u16>, M3dError> {
    let index_count = count.checked_mul(3).ok_or(M3dError::CountTooLarge {
        section: "triangles",
        count,
    })?;
    section(tokens, count, "triangles header")?;
    (0..index_count)
        .map(|_| -> Result<u16, M3dError> {
            let index: u16 = tokens.parse("triangle index")?;
            if usize::from(index) >= vertex_count {
                return Err(M3dError::IndexOutOfRange {
                    index,
                    vertex_count,
                });
            }
            Ok(index)
        })
        .collect()
}

fn read_bone_offsets(tokens: &mut Tokens<'_>, count: usize) -> Result<Vec<Mat4>, M3dError> {
    section(tokens, count, "bone offsets header")?;
    (0..count)
        .map(|_| -> Result<Mat4, M3dError> {
            tokens.skip("bone offset label")?;
            Ok(Mat4::from_cols_array(&tokens.floats::<16>("bone offset")?))
        })
        .collect()
}

fn read_bone_hierarchy(tokens: &mut Tokens<'_>, count: usize) -> Result<Vec<i32>, M3dError> {
    section(tokens, count, "bone hierarchy header")?;
    (0..count)
        .map(|_| tokens.labeled("parent bone index"))
        .collect()
}

fn read_animation_clips(
    tokens: &mut Tokens<'_>,
    num_bones: usize,
    count: usize,
) -> Result<HashMap<String, AnimationClip>, M3dError> {
    section(tokens, count, "animation clips header")?;
    let mut clips = HashMap::new();
    for _ in 0..count {
        let name: String = tokens.labeled("clip name")?;
        tokens.skip("'{'")?;
        let bone_animations = (0..num_bones)
            .map(|_| read_bone_animation(tokens))
            .collect::<Result<Vec<_>, _>>()?;
        tokens.skip("'}'")?;

        if clips
            .insert(name.clone(), AnimationClip::new(bone_animations))
            .is_some()
        {
            log::warn!("Duplicate animation clip '{name}', keeping the last one");
        }
    }
    Ok(clips)
}

fn read_bone_animation(tokens: &mut Tokens<'_>) -> Result<BoneAnimation, M3dError> {
    tokens.skip("bone label")?;
    let num_keyframes: usize = tokens.labeled("keyframe count")?;
    tokens.skip("'{'")?;
    let keyframes = (0..num_keyframes)
        .map(|_| {
            Ok(Keyframe {
                time_pos: tokens.labeled("keyframe time")?,
                translation: tokens.labeled_vec3("keyframe position")?,
                scale: tokens.labeled_vec3("keyframe scale")?,
                rotation: tokens.labeled_quat("keyframe rotation")?,
            })
        })
        .collect::<Result<Vec<_>, M3dError>>()?;
    tokens.skip("'}'")?;
    Ok(BoneAnimation::new(keyframes))
}
