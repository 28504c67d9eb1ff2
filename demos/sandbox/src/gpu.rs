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


//! Command recording and its execution on the simulated GPU.
//!
//! A frame is recorded as a list of passes, each holding draw calls that
//! point into the buffers of one frame resource. Executing a recording reads
//! those buffers back the way shaders would and checks that every object
//! still carries the material it was recorded with. A mismatch means the CPU
//! overwrote a slot the GPU was still reading.

use bytemuck::Pod;
use selenium_core::renderer::{
    BufferId, FrameResource, GraphicsDevice, ObjectConstants, PassConstants, ResourceError,
    SkinnedConstants,
};
use selenium_infra::HostDevice;
use selenium_sdk::frame_update::{MAIN_PASS, SHADOW_PASS};
use selenium_sdk::{RenderLayer, Scene, Submesh};
use std::mem::size_of;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub object_offset: u64,
    pub skinned_offset: Option<u64>,
    pub material_index: u32,
    pub submesh: Submesh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassRecording {
    pub pass_offset: u64,
    pub draws: Vec<DrawCall>,
}

/// Everything the GPU needs to execute one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecording {
    pub pass_buffer: BufferId,
    pub object_buffer: BufferId,
    pub skinned_buffer: BufferId,
    pub passes: Vec<PassRecording>,
}

fn record_layers(frame: &FrameResource, scene: &Scene, layers: &[RenderLayer]) -> Vec<DrawCall> {
    let mut draws = Vec::new();
    for &layer in layers {
        for &index in scene.layer(layer) {
            let item = &scene.items()[index];
            draws.push(DrawCall {
                object_offset: frame.object_cb.offset_of(item.obj_cb_index),
                skinned_offset: item
                    .skinned_cb_index
                    .map(|slot| frame.skinned_cb.offset_of(slot)),
                material_index: item.material as u32,
                submesh: item.submesh,
            });
        }
    }
    draws
}

/// Records the shadow pass followed by the main pass.
pub fn record_frame(frame: &FrameResource, scene: &Scene) -> FrameRecording {
    let casters: Vec<RenderLayer> = RenderLayer::ALL
        .into_iter()
        .filter(|layer| layer.casts_shadows())
        .collect();

    FrameRecording {
        pass_buffer: frame.pass_cb.buffer(),
        object_buffer: frame.object_cb.buffer(),
        skinned_buffer: frame.skinned_cb.buffer(),
        passes: vec![
            PassRecording {
                pass_offset: frame.pass_cb.offset_of(SHADOW_PASS),
                draws: record_layers(frame, scene, &casters),
            },
            PassRecording {
                pass_offset: frame.pass_cb.offset_of(MAIN_PASS),
                draws: record_layers(frame, scene, &RenderLayer::ALL),
            },
        ],
    }
}

/// Counters accumulated by the simulated GPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuStats {
    pub frames: u64,
    pub passes: u64,
    pub draws: u64,
    pub triangles: u64,
    /// Draws whose object constants did not match the recording.
    pub stale_reads: u64,
}

/// Shared handle to the GPU counters.
#[derive(Debug, Clone, Default)]
pub struct GpuStatsHandle(Arc<Mutex<GpuStats>>);

impl GpuStatsHandle {
    pub fn snapshot(&self) -> GpuStats {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, frame: GpuStats) {
        let mut stats = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        stats.frames += frame.frames;
        stats.passes += frame.passes;
        stats.draws += frame.draws;
        stats.triangles += frame.triangles;
        stats.stale_reads += frame.stale_reads;
    }
}

fn read<T: Pod>(device: &HostDevice, buffer: BufferId, offset: u64) -> Result<T, ResourceError> {
    let bytes = device.read_buffer(buffer, offset, size_of::<T>() as u64)?;
    Ok(bytemuck::pod_read_unaligned(&bytes))
}

/// Executes `recording` against the buffers of `device`.
pub fn execute(device: &HostDevice, recording: &FrameRecording) -> Result<GpuStats, ResourceError> {
    let mut stats = GpuStats {
        frames: 1,
        ..GpuStats::default()
    };

    for pass in &recording.passes {
        let _constants: PassConstants = read(device, recording.pass_buffer, pass.pass_offset)?;
        stats.passes += 1;

        for draw in &pass.draws {
            let object: ObjectConstants =
                read(device, recording.object_buffer, draw.object_offset)?;
            if object.material_index != draw.material_index {
                stats.stale_reads += 1;
            }
            if let Some(offset) = draw.skinned_offset {
                let _bones: SkinnedConstants = read(device, recording.skinned_buffer, offset)?;
            }
            stats.draws += 1;
            stats.triangles += u64::from(draw.submesh.index_count / 3);
        }
    }
    Ok(stats)
}

/// Builds the work item handed to the GPU queue.
pub fn gpu_work(
    device: HostDevice,
    recording: FrameRecording,
    stats: GpuStatsHandle,
) -> impl FnOnce() + Send + 'static {
    move || match execute(&device, &recording) {
        Ok(frame) => stats.add(frame),
        Err(e) => log::error!("GPU frame failed to read its resources: {e}"),
    }
}
