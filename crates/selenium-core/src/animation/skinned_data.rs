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

//! Immutable skeleton data: hierarchy, bind offsets, and named clips.

use super::{AnimationClip, AnimationError};
use crate::math::Mat4;
use std::collections::HashMap;

/// The bind data of a skinned model and its animation clips.
///
/// Bones are stored in topological order: every bone's parent has a smaller
/// index, so a single forward pass resolves the whole hierarchy. The root is
/// bone 0 and has the parent index `-1`.
#[derive(Debug, Clone, Default)]
pub struct SkinnedData {
    bone_hierarchy: Vec<i32>,
    bone_offsets: Vec<Mat4>,
    animations: HashMap<String, AnimationClip>,
}

impl SkinnedData {
    /// Builds skinned data, checking the hierarchy and clip preconditions.
    pub fn new(
        bone_hierarchy: Vec<i32>,
        bone_offsets: Vec<Mat4>,
        animations: HashMap<String, AnimationClip>,
    ) -> Result<Self, AnimationError> {
        let mut data = Self::default();
        data.set(bone_hierarchy, bone_offsets, animations)?;
        Ok(data)
    }

    /// Replaces the hierarchy, the bind offsets and the clips.
    ///
    /// On error, `self` is left unchanged.
    pub fn set(
        &mut self,
        bone_hierarchy: Vec<i32>,
        bone_offsets: Vec<Mat4>,
        animations: HashMap<String, AnimationClip>,
    ) -> Result<(), AnimationError> {
        validate(&bone_hierarchy, &bone_offsets, &animations)?;

        log::debug!(
            "Skinned data set: {} bones, {} clips",
            bone_hierarchy.len(),
            animations.len()
        );
        self.bone_hierarchy = bone_hierarchy;
        self.bone_offsets = bone_offsets;
        self.animations = animations;
        Ok(())
    }

    /// The number of bones in the skeleton.
    pub fn bone_count(&self) -> usize {
        self.bone_hierarchy.len()
    }

    /// Parent index of every bone, `-1` for the root.
    pub fn bone_hierarchy(&self) -> &[i32] {
        &self.bone_hierarchy
    }

    /// Bind-pose offsets mapping mesh space into each bone's space.
    pub fn bone_offsets(&self) -> &[Mat4] {
        &self.bone_offsets
    }

    /// Returns the named clip.
    pub fn clip(&self, clip_name: &str) -> Result<&AnimationClip, AnimationError> {
        self.animations
            .get(clip_name)
            .ok_or_else(|| AnimationError::ClipNotFound(clip_name.to_owned()))
    }

    /// Returns `true` if a clip with this name exists.
    pub fn has_clip(&self, clip_name: &str) -> bool {
        self.animations.contains_key(clip_name)
    }

    /// Names of all clips, sorted.
    pub fn clip_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.animations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Start time of the named clip.
    pub fn clip_start_time(&self, clip_name: &str) -> Result<f32, AnimationError> {
        Ok(self.clip(clip_name)?.start_time())
    }

    /// End time of the named clip: the latest last-keyframe time over its tracks.
    pub fn clip_end_time(&self, clip_name: &str) -> Result<f32, AnimationError> {
        Ok(self.clip(clip_name)?.end_time())
    }

    /// Evaluates the named clip at `time_pos` and writes the final bone palette.
    ///
    /// `final_transforms` is resized to the bone count. Entry `i` maps a vertex
    /// from bind space to its animated position under bone `i`:
    /// `to_root[i] * offset[i]`, where `to_root[i] = to_root[parent] * to_parent[i]`.
    pub fn final_transforms(
        &self,
        clip_name: &str,
        time_pos: f32,
        final_transforms: &mut Vec<Mat4>,
    ) -> Result<(), AnimationError> {
        let clip = self.clip(clip_name)?;
        let bone_count = self.bone_count();

        let mut to_parent = vec![Mat4::IDENTITY; bone_count];
        clip.interpolate(time_pos, &mut to_parent);

        let mut to_root = Vec::with_capacity(bone_count);
        for (i, local) in to_parent.iter().enumerate() {
            let world = match usize::try_from(self.bone_hierarchy[i]) {
                Ok(parent) if i > 0 => to_root[parent] * *local,
                _ => *local,
            };
            to_root.push(world);
        }

        final_transforms.clear();
        final_transforms.extend(
            to_root
                .iter()
                .zip(&self.bone_offsets)
                .map(|(root, offset)| *root * *offset),
        );
        Ok(())
    }
}

fn validate(
    bone_hierarchy: &[i32],
    bone_offsets: &[Mat4],
    animations: &HashMap<String, AnimationClip>,
) -> Result<(), AnimationError> {
    if bone_hierarchy.len() != bone_offsets.len() {
        return Err(AnimationError::BoneCountMismatch {
            hierarchy: bone_hierarchy.len(),
            offsets: bone_offsets.len(),
        });
    }

    for (bone, &parent) in bone_hierarchy.iter().enumerate() {
        let valid = if bone == 0 {
            parent < 0
        } else {
            parent >= 0 && (parent as usize) < bone
        };
        if !valid {
            return Err(AnimationError::InvalidParent { bone, parent });
        }
    }

    for (name, clip) in animations {
        if clip.bone_animations.len() != bone_hierarchy.len() {
            return Err(AnimationError::TrackCountMismatch {
                clip: name.clone(),
                expected: bone_hierarchy.len(),
                found: clip.bone_animations.len(),
            });
        }
        if let Some(bone) = clip
            .bone_animations
            .iter()
            .position(|track| track.keyframes.is_empty())
        {
            return Err(AnimationError::EmptyTrack {
                clip: name.clone(),
                bone,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{BoneAnimation, Keyframe};
    use crate::math::{Quaternion, Vec3, Vec4, FRAC_PI_2};
    use approx::assert_relative_eq;

    fn still_track(translation: Vec3) -> BoneAnimation {
        BoneAnimation::new(vec![Keyframe {
            translation,
            ..Keyframe::default()
        }])
    }

    fn two_bone_idle() -> SkinnedData {
        let mut clips = HashMap::new();
        clips.insert(
            "Idle".to_owned(),
            AnimationClip::new(vec![
                still_track(Vec3::ZERO),
                still_track(Vec3::new(1.0, 0.0, 0.0)),
            ]),
        );
        SkinnedData::new(vec![-1, 0], vec![Mat4::IDENTITY; 2], clips).expect("valid rig")
    }

    #[test]
    fn test_two_bone_final_transforms() {
        let data = two_bone_idle();
        let mut out = Vec::new();
        data.final_transforms("Idle", 0.0, &mut out).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Mat4::IDENTITY);
        assert_eq!(out[1], Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_child_inherits_parent_rotation() {
        // Root rotates a quarter turn about Z; the child sits one unit along the root's X.
        let mut clips = HashMap::new();
        clips.insert(
            "Bend".to_owned(),
            AnimationClip::new(vec![
                BoneAnimation::new(vec![Keyframe {
                    rotation: Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2),
                    ..Keyframe::default()
                }]),
                still_track(Vec3::X),
                still_track(Vec3::X),
            ]),
        );
        let data = SkinnedData::new(vec![-1, 0, 1], vec![Mat4::IDENTITY; 3], clips).unwrap();

        let mut out = Vec::new();
        data.final_transforms("Bend", 0.0, &mut out).unwrap();

        let child = out[1].transform_point3(Vec3::ZERO);
        assert_relative_eq!(child.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(child.y, 1.0, epsilon = 1e-5);
        let grandchild = out[2].transform_point3(Vec3::ZERO);
        assert_relative_eq!(grandchild.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(grandchild.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_bind_offset_is_applied_first() {
        let mut clips = HashMap::new();
        clips.insert(
            "Idle".to_owned(),
            AnimationClip::new(vec![still_track(Vec3::new(0.0, 5.0, 0.0))]),
        );
        let offset = Mat4::from_translation(Vec3::new(0.0, -5.0, 0.0));
        let data = SkinnedData::new(vec![-1], vec![offset], clips).unwrap();

        let mut out = Vec::new();
        data.final_transforms("Idle", 0.0, &mut out).unwrap();
        // A vertex at the bone's bind position stays where it is when the pose equals the bind pose.
        assert_eq!(out[0] * Vec4::new(0.0, 5.0, 0.0, 1.0), Vec4::new(0.0, 5.0, 0.0, 1.0));
    }

    #[test]
    fn test_missing_clip_is_reported() {
        let data = two_bone_idle();
        let mut out = Vec::new();
        assert_eq!(
            data.final_transforms("Run", 0.0, &mut out),
            Err(AnimationError::ClipNotFound("Run".to_owned()))
        );
        assert!(data.clip_end_time("Run").is_err());
        assert_eq!(data.clip_names(), vec!["Idle"]);
    }

    #[test]
    fn test_set_rejects_forward_parent() {
        let result = SkinnedData::new(vec![-1, 2, 0], vec![Mat4::IDENTITY; 3], HashMap::new());
        assert_eq!(
            result.err(),
            Some(AnimationError::InvalidParent { bone: 1, parent: 2 })
        );
    }

    #[test]
    fn test_set_rejects_track_count_mismatch() {
        let mut clips = HashMap::new();
        clips.insert("Idle".to_owned(), AnimationClip::new(vec![still_track(Vec3::ZERO)]));
        let result = SkinnedData::new(vec![-1, 0], vec![Mat4::IDENTITY; 2], clips);
        assert_eq!(
            result.err(),
            Some(AnimationError::TrackCountMismatch {
                clip: "Idle".to_owned(),
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_set_rejects_offset_count_mismatch_and_keeps_previous_data() {
        let mut data = two_bone_idle();
        let err = data.set(vec![-1, 0], vec![Mat4::IDENTITY], HashMap::new());
        assert_eq!(
            err,
            Err(AnimationError::BoneCountMismatch {
                hierarchy: 2,
                offsets: 1
            })
        );
        assert_eq!(data.bone_count(), 2);
        assert!(data.has_clip("Idle"));
    }

    #[test]
    fn test_set_rejects_empty_track() {
        let mut clips = HashMap::new();
        clips.insert("Idle".to_owned(), AnimationClip::new(vec![BoneAnimation::default()]));
        let result = SkinnedData::new(vec![-1], vec![Mat4::IDENTITY], clips);
        assert_eq!(
            result.err(),
            Some(AnimationError::EmptyTrack {
                clip: "Idle".to_owned(),
                bone: 0
            })
        );
    }
}
