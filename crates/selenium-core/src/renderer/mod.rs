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

//! Backend-agnostic contracts of the frame resource layer.
//!
//! This module defines what the CPU side of a frame needs from a GPU: buffer
//! allocation through [`GraphicsDevice`], a fence through [`GpuTimeline`], and
//! the [`FrameResourceRing`] that combines them so the CPU can fill frame
//! `K + 1` while the GPU still reads frame `K`. Concrete devices live in
//! `selenium-infra`.

pub mod buffer;
pub mod constants;
pub mod device;
pub mod dirty;
pub mod error;
pub mod frame_resource;
pub mod frame_ring;
pub mod settings;
pub mod timeline;
pub mod upload_buffer;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::buffer::{align_to, BufferDescriptor, BufferId, BufferUsage, CommandAllocatorId};
pub use self::constants::{
    Light, MaterialData, ObjectConstants, PassConstants, SkinnedConstants, MAX_BONES, MAX_LIGHTS,
};
pub use self::device::GraphicsDevice;
pub use self::dirty::FramesDirty;
pub use self::error::{RenderError, ResourceError};
pub use self::frame_resource::{FrameResource, FrameResourceDescriptor};
pub use self::frame_ring::FrameResourceRing;
pub use self::settings::{RenderSettings, CONSTANT_BUFFER_ALIGNMENT, MAX_FRAMES_IN_FLIGHT};
pub use self::timeline::GpuTimeline;
pub use self::upload_buffer::{UploadBuffer, UploadLayout};
