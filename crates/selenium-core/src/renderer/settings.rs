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

//! Global settings for the frame resource layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The number of frame resources cycled by default.
pub const MAX_FRAMES_IN_FLIGHT: usize = 3;

/// Minimum alignment of a constant buffer element, in bytes.
pub const CONSTANT_BUFFER_ALIGNMENT: u64 = 256;

/// Settings that shape the frame ring and the shadow pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// The number of frame resources in the ring.
    pub frames_in_flight: usize,
    /// Diagnostic bound on a single fence wait, in milliseconds.
    ///
    /// `None` waits forever.
    pub fence_wait_timeout_ms: Option<u64>,
    /// Width and height of the square shadow map.
    pub shadow_map_size: u32,
    /// Alignment of constant buffer elements.
    pub constant_buffer_alignment: u64,
}

impl RenderSettings {
    /// The fence wait timeout as a `Duration`.
    pub fn fence_wait_timeout(&self) -> Option<Duration> {
        self.fence_wait_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frames_in_flight: MAX_FRAMES_IN_FLIGHT,
            fence_wait_timeout_ms: Some(10_000),
            shadow_map_size: 2048,
            constant_buffer_alignment: CONSTANT_BUFFER_ALIGNMENT,
        }
    }
}
