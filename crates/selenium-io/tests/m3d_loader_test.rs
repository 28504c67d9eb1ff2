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

use anyhow::Result;
use approx::assert_relative_eq;
use selenium_core::math::{Mat4, Vec3, Vec4};
use selenium_core::AnimationError;
use selenium_io::{load_m3d, parse_m3d, M3dError};
use std::fs;
use tempfile::tempdir;

/// Two bones, one triangle, one clip. Bone 1 hangs one unit above bone 0 and
/// slides along +X over two seconds.
const TWO_BONE_RIG: &str = "\
***************m3d-File-Header***************
#Materials 1
#Vertices 3
#Triangles 1
#Bones 2
#AnimationClips 1

***************Materials*********************
Name: skin
Diffuse: 1 0.9 0.8
Fresnel0: 0.05 0.05 0.05
Roughness: 0.6
AlphaClip: 0
MaterialTypeName: Skinned
DiffuseMap: skin.dds
NormalMap: skin_nmap.dds

***************SubsetTable*******************
SubsetID: 0 VertexStart: 0 VertexCount: 3 FaceStart: 0 FaceCount: 1

***************Vertices**********************
Position: 0 0 0
Tangent: 1 0 0 1
Normal: 0 0 -1
Tex-Coords: 0 0
BlendWeights: 1 0 0 0
BlendIndices: 0 0 0 0

Position: 0 1 0
Tangent: 1 0 0 1
Normal: 0 0 -1
Tex-Coords: 0 1
BlendWeights: 0.25 0.75 0 0
BlendIndices: 0 1 0 0

Position: 1 1 0
Tangent: 1 0 0 1
Normal: 0 0 -1
Tex-Coords: 1 1
BlendWeights: 0 1 0 0
BlendIndices: 1 0 0 0

***************Triangles*********************
0 1 2

***************BoneOffsets*******************
BoneOffset0 1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1
BoneOffset1 1 0 0 0 0 1 0 0 0 0 1 0 0 -1 0 1

***************BoneHierarchy*****************
ParentIndexOfBone0: -1
ParentIndexOfBone1: 0

***************AnimationClips****************
AnimationClip Take1
{
	Bone0 #Keyframes: 1
	{
		Time: 0 Pos: 0 0 0 Scale: 1 1 1 Quat: 0 0 0 1
	}
	Bone1 #Keyframes: 2
	{
		Time: 0 Pos: 0 1 0 Scale: 1 1 1 Quat: 0 0 0 1
		Time: 2 Pos: 2 1 0 Scale: 1 1 1 Quat: 0 0 0 1
	}
}
";

#[test]
fn test_load_two_bone_rig_from_disk() -> Result<()> {
    // --- ARRANGE ---
    let dir = tempdir()?;
    let path = dir.path().join("rig.m3d");
    fs::write(&path, TWO_BONE_RIG)?;

    // --- ACT ---
    let model = load_m3d(&path)?;

    // --- ASSERT ---
    let skinned = &model.skinned_data;
    assert_eq!(skinned.bone_count(), 2);
    assert_eq!(skinned.bone_hierarchy(), &[-1, 0]);
    assert_eq!(skinned.clip_names(), vec!["Take1"]);
    assert_eq!(skinned.clip_end_time("Take1")?, 2.0);

    assert_eq!(model.vertices.len(), 3);
    assert_eq!(model.vertices[1].bone_weights, [0.25, 0.75, 0.0, 0.0]);
    assert_eq!(model.vertices[1].bone_indices, [0, 1, 0, 0]);
    assert_eq!(model.indices, vec![0, 1, 2]);
    assert_eq!(model.materials[0].material_type_name, "Skinned");
    assert_eq!(model.subsets[0].face_count, 1);
    Ok(())
}

#[test]
fn test_bone_offsets_are_read_as_columns() -> Result<()> {
    let model = parse_m3d(TWO_BONE_RIG)?;

    // The last four floats of an offset are its translation.
    let offset = model.skinned_data.bone_offsets()[1];
    assert_eq!(offset, Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)));
    Ok(())
}

#[test]
fn test_loaded_clip_poses_the_skeleton() -> Result<()> {
    let model = parse_m3d(TWO_BONE_RIG)?;
    let mut palette = Vec::new();

    // In the bind pose, every vertex stays where it is.
    model
        .skinned_data
        .final_transforms("Take1", 0.0, &mut palette)?;
    let tip = palette[1] * Vec4::new(1.0, 1.0, 0.0, 1.0);
    assert_eq!(tip, Vec4::new(1.0, 1.0, 0.0, 1.0));

    // Halfway through, bone 1 has moved one unit along +X.
    model
        .skinned_data
        .final_transforms("Take1", 1.0, &mut palette)?;
    let tip = palette[1] * Vec4::new(1.0, 1.0, 0.0, 1.0);
    assert_relative_eq!(tip.x, 2.0, epsilon = 1e-5);
    assert_relative_eq!(tip.y, 1.0, epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_forward_parent_is_rejected_at_load_time() {
    let text = TWO_BONE_RIG
        .replace("ParentIndexOfBone0: -1", "ParentIndexOfBone0: 1")
        .replace("ParentIndexOfBone1: 0", "ParentIndexOfBone1: -1");

    match parse_m3d(&text) {
        Err(M3dError::Skinned(AnimationError::InvalidParent { bone, parent })) => {
            assert_eq!(bone, 0);
            assert_eq!(parent, 1);
        }
        other => panic!("expected an invalid parent error, got {other:?}"),
    }
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.m3d");

    let err = load_m3d(&path).unwrap_err();
    assert!(matches!(err, M3dError::Io { .. }));
    assert!(err.to_string().contains("missing.m3d"));
}

/// A header with the given counts followed by every section banner and no data.
fn empty_sections(triangles: &str, clips: &str) -> String {
    format!(
        "***************m3d-File-Header***************
#Materials 0
#Vertices 0
#Triangles {triangles}
#Bones 0
#AnimationClips {clips}
***************Materials*********************
***************SubsetTable*******************
***************Vertices**********************
***************Triangles*********************
***************BoneOffsets*******************
***************BoneHierarchy*****************
***************AnimationClips****************
"
    )
}

#[test]
fn test_oversized_triangle_count_is_an_error() {
    // --- ARRANGE ---
    let text = empty_sections("9223372036854775807", "0");

    // --- ACT ---
    let result = parse_m3d(&text);

    // --- ASSERT ---
    match result {
        Err(M3dError::CountTooLarge { section, count }) => {
            assert_eq!(section, "triangles");
            assert_eq!(count, 9_223_372_036_854_775_807);
        }
        other => panic!("expected a count error, got {other:?}"),
    }
}

#[test]
fn test_oversized_clip_count_runs_out_of_tokens() {
    // --- ARRANGE ---
    let text = empty_sections("0", "1152921504606846976");

    // --- ACT ---
    let result = parse_m3d(&text);

    // --- ASSERT ---
    assert!(matches!(result, Err(M3dError::UnexpectedEof { .. })));
}
