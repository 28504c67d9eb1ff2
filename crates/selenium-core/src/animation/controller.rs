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

//! Per-instance playback state of a skinned model.

use super::{AnimationError, SkinnedData};
use crate::math::Mat4;
use std::sync::Arc;

/// Plays one clip of a shared [`SkinnedData`] and holds the resulting bone palette.
///
/// A controller has a single owner. Several render items that draw the
/// submeshes of one model share the same controller so they are posed
/// identically.
#[derive(Debug, Clone)]
pub struct SkinnedController {
    data: Arc<SkinnedData>,
    clip_name: String,
    time_pos: f32,
    final_transforms: Vec<Mat4>,
}

impl SkinnedController {
    /// Creates a controller playing `clip_name` from time zero.
    ///
    /// The palette is evaluated immediately, so it is valid before the first tick.
    pub fn new(data: Arc<SkinnedData>, clip_name: impl Into<String>) -> Result<Self, AnimationError> {
        let clip_name = clip_name.into();
        let mut final_transforms = vec![Mat4::IDENTITY; data.bone_count()];
        data.final_transforms(&clip_name, 0.0, &mut final_transforms)?;

        log::debug!(
            "Skinned controller created for clip '{}' ({} bones)",
            clip_name,
            final_transforms.len()
        );
        Ok(Self {
            data,
            clip_name,
            time_pos: 0.0,
            final_transforms,
        })
    }

    /// Advances playback by `dt` seconds and refreshes the palette.
    ///
    /// Once the position passes the end of the clip it restarts at exactly zero;
    /// a tick longer than the clip does not play the skipped loops.
    pub fn tick(&mut self, dt: f32) -> Result<(), AnimationError> {
        self.time_pos += dt;
        if self.time_pos > self.data.clip_end_time(&self.clip_name)? {
            self.time_pos = 0.0;
        }
        self.data
            .final_transforms(&self.clip_name, self.time_pos, &mut self.final_transforms)
    }

    /// Switches to another clip and rewinds to its start.
    pub fn set_clip(&mut self, clip_name: impl Into<String>) -> Result<(), AnimationError> {
        let clip_name = clip_name.into();
        self.data
            .final_transforms(&clip_name, 0.0, &mut self.final_transforms)?;
        self.clip_name = clip_name;
        self.time_pos = 0.0;
        Ok(())
    }

    /// The skeleton driven by this controller.
    pub fn data(&self) -> &Arc<SkinnedData> {
        &self.data
    }

    /// The name of the clip being played.
    pub fn clip_name(&self) -> &str {
        &self.clip_name
    }

    /// The current playback position, in seconds.
    pub fn time_pos(&self) -> f32 {
        self.time_pos
    }

    /// The bone palette of the last evaluation, one matrix per bone.
    pub fn final_transforms(&self) -> &[Mat4] {
        &self.final_transforms
    }
}
