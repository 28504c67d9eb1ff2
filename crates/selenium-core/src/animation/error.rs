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

//! Error types reported by the skinned animation engine.

use std::fmt;

/// An error raised when skinned data violates one of its preconditions, or when
/// a caller asks for a clip that does not exist.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// No clip with the given name was registered.
    ClipNotFound(String),
    /// The number of bind offsets differs from the number of bones in the hierarchy.
    BoneCountMismatch {
        /// Length of the bone hierarchy.
        hierarchy: usize,
        /// Number of bind-pose offsets supplied.
        offsets: usize,
    },
    /// A clip does not carry exactly one track per bone.
    TrackCountMismatch {
        /// The name of the offending clip.
        clip: String,
        /// The number of bones in the hierarchy.
        expected: usize,
        /// The number of tracks found in the clip.
        found: usize,
    },
    /// A bone references a parent that is not resolved before it.
    InvalidParent {
        /// Index of the bone.
        bone: usize,
        /// The parent index read for that bone.
        parent: i32,
    },
    /// A bone track contains no keyframes.
    EmptyTrack {
        /// The name of the clip.
        clip: String,
        /// Index of the bone whose track is empty.
        bone: usize,
    },
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationError::ClipNotFound(name) => write!(f, "Animation clip '{name}' not found"),
            AnimationError::BoneCountMismatch { hierarchy, offsets } => write!(
                f,
                "Bone hierarchy has {hierarchy} entries but {offsets} bind offsets were supplied"
            ),
            AnimationError::TrackCountMismatch {
                clip,
                expected,
                found,
            } => write!(
                f,
                "Clip '{clip}' has {found} bone tracks, expected {expected}"
            ),
            AnimationError::InvalidParent { bone, parent } => write!(
                f,
                "Bone {bone} has parent index {parent}, which is not a preceding bone"
            ),
            AnimationError::EmptyTrack { clip, bone } => {
                write!(f, "Track for bone {bone} in clip '{clip}' has no keyframes")
            }
        }
    }
}

impl std::error::Error for AnimationError {}
