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

//! Keyframes and per-bone animation tracks.

use crate::math::{Mat4, Quaternion, Vec3};

/// A sampled bone pose at a point in time, relative to the bone's parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Time of the sample, in seconds.
    pub time_pos: f32,
    /// Translation relative to the parent bone.
    pub translation: Vec3,
    /// Non-uniform scale.
    pub scale: Vec3,
    /// Rotation, expected to be a unit quaternion.
    pub rotation: Quaternion,
}

impl Keyframe {
    /// Creates a keyframe at `time_pos` from its three pose components.
    pub fn new(time_pos: f32, translation: Vec3, scale: Vec3, rotation: Quaternion) -> Self {
        Self {
            time_pos,
            translation,
            scale,
            rotation,
        }
    }

    /// Builds the scale, rotate, translate transform of this keyframe.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Keyframe {
    /// A keyframe at time zero holding the rest pose.
    fn default() -> Self {
        Self {
            time_pos: 0.0,
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Quaternion::IDENTITY,
        }
    }
}

/// The keyframes of a single bone, sorted by ascending time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneAnimation {
    /// The samples of this track.
    pub keyframes: Vec<Keyframe>,
}

impl BoneAnimation {
    /// Creates a track from keyframes already sorted by time.
    pub fn new(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }

    /// Time of the first keyframe, or zero for an empty track.
    pub fn start_time(&self) -> f32 {
        self.keyframes.first().map_or(0.0, |k| k.time_pos)
    }

    /// Time of the last keyframe, or zero for an empty track.
    pub fn end_time(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time_pos)
    }

    /// Samples the track at `t`, returning the interpolated keyframe.
    ///
    /// Times outside the track clamp to the first or last keyframe. Between two
    /// keyframes, translation and scale are interpolated linearly and rotation
    /// with a shortest-arc slerp. An empty track samples to the rest pose.
    pub fn sample(&self, t: f32) -> Keyframe {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Keyframe { time_pos: t, ..Keyframe::default() },
        };

        if t <= first.time_pos {
            return Keyframe { time_pos: t, ..*first };
        }
        if t >= last.time_pos {
            return Keyframe { time_pos: t, ..*last };
        }

        for pair in self.keyframes.windows(2) {
            let (k0, k1) = (&pair[0], &pair[1]);
            if t >= k0.time_pos && t <= k1.time_pos {
                let span = k1.time_pos - k0.time_pos;
                // Coincident keyframes act as a step to the later sample.
                if span <= 0.0 {
                    return Keyframe { time_pos: t, ..*k1 };
                }
                let u = (t - k0.time_pos) / span;
                return Keyframe {
                    time_pos: t,
                    translation: Vec3::lerp(k0.translation, k1.translation, u),
                    scale: Vec3::lerp(k0.scale, k1.scale, u),
                    rotation: Quaternion::slerp(k0.rotation, k1.rotation, u),
                };
            }
        }

        // Only reachable if the keyframes are not sorted.
        Keyframe { time_pos: t, ..*last }
    }

    /// Samples the track at `t` and composes the result into a to-parent transform.
    pub fn interpolate(&self, t: f32) -> Mat4 {
        self.sample(t).to_matrix()
    }
}
