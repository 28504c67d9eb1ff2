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

//! Named animation clips made of one track per bone.

use super::keyframe::BoneAnimation;
use crate::math::Mat4;

/// A playable animation: one [`BoneAnimation`] per bone, indexed like the hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClip {
    /// The per-bone tracks. `bone_animations[i]` animates bone `i`.
    pub bone_animations: Vec<BoneAnimation>,
}

impl AnimationClip {
    /// Creates a clip from its per-bone tracks.
    pub fn new(bone_animations: Vec<BoneAnimation>) -> Self {
        Self { bone_animations }
    }

    /// The smallest first-keyframe time over all tracks.
    pub fn start_time(&self) -> f32 {
        self.bone_animations
            .iter()
            .map(BoneAnimation::start_time)
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// The largest last-keyframe time over all tracks.
    pub fn end_time(&self) -> f32 {
        self.bone_animations
            .iter()
            .map(BoneAnimation::end_time)
            .fold(0.0, f32::max)
    }

    /// Samples every track at `t`, writing the to-parent transforms into `to_parent`.
    ///
    /// `to_parent` must hold one entry per track; extra entries are left untouched.
    pub fn interpolate(&self, t: f32, to_parent: &mut [Mat4]) {
        for (out, track) in to_parent.iter_mut().zip(&self.bone_animations) {
            *out = track.interpolate(t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Keyframe;

    fn track_ending_at(end: f32) -> BoneAnimation {
        BoneAnimation::new(vec![
            Keyframe::default(),
            Keyframe {
                time_pos: end,
                ..Keyframe::default()
            },
        ])
    }

    #[test]
    fn test_end_time_is_max_over_tracks() {
        let clip = AnimationClip::new(vec![
            track_ending_at(2.0),
            track_ending_at(3.5),
            track_ending_at(1.0),
        ]);
        assert_eq!(clip.end_time(), 3.5);
        assert_eq!(clip.start_time(), 0.0);
    }

    #[test]
    fn test_empty_clip_has_zero_length() {
        let clip = AnimationClip::default();
        assert_eq!(clip.end_time(), 0.0);
        assert_eq!(clip.start_time(), 0.0);
    }

    #[test]
    fn test_interpolate_fills_one_transform_per_track() {
        let clip = AnimationClip::new(vec![track_ending_at(1.0), track_ending_at(1.0)]);
        let mut out = vec![Mat4::ZERO; 2];
        clip.interpolate(0.5, &mut out);
        assert!(out.iter().all(|m| *m == Mat4::IDENTITY));
    }
}
