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

//! Skeletal animation: keyframed clips evaluated over a bone hierarchy.
//!
//! [`SkinnedData`] is immutable once built and is shared between any number of
//! [`SkinnedController`]s through an `Arc`. Each controller owns its own
//! playback position and the final bone palette it produced.

mod clip;
mod controller;
mod error;
mod keyframe;
mod skinned_data;

pub use self::clip::AnimationClip;
pub use self::controller::SkinnedController;
pub use self::error::AnimationError;
pub use self::keyframe::{BoneAnimation, Keyframe};
pub use self::skinned_data::SkinnedData;
