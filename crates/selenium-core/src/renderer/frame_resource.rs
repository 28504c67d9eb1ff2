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

//! One slot of the frame ring: the buffers the CPU fills for a single frame.

use super::buffer::{BufferId, CommandAllocatorId};
use super::constants::{MaterialData, ObjectConstants, PassConstants, SkinnedConstants};
use super::device::GraphicsDevice;
use super::error::ResourceError;
use super::upload_buffer::{UploadBuffer, UploadLayout};
use std::borrow::Cow;

/// Element counts of the buffers in every frame resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameResourceDescriptor {
    /// Pass constant slots (main pass and shadow pass).
    pub pass_count: usize,
    /// One object constant slot per render item.
    pub object_count: usize,
    /// One bone palette per skinned instance.
    pub skinned_count: usize,
    /// One material element per material.
    pub material_count: usize,
}

/// The command allocator and upload buffers owned by one ring slot.
#[derive(Debug)]
pub struct FrameResource {
    /// Memory backing the commands recorded for this slot.
    pub cmd_list_alloc: CommandAllocatorId,
    /// Pass constants.
    pub pass_cb: UploadBuffer<PassConstants>,
    /// Per-object constants.
    pub object_cb: UploadBuffer<ObjectConstants>,
    /// Bone palettes.
    pub skinned_cb: UploadBuffer<SkinnedConstants>,
    /// Material structured buffer.
    pub material_buffer: UploadBuffer<MaterialData>,
    /// Fence value marking completion of the commands that read this slot.
    /// Zero until the slot is first submitted.
    pub fence: u64,
}

impl FrameResource {
    /// Allocates the buffers of slot `slot` on `device`.
    pub fn new(
        device: &dyn GraphicsDevice,
        slot: usize,
        desc: &FrameResourceDescriptor,
        constant_alignment: u64,
    ) -> Result<Self, ResourceError> {
        let label = |name: &str| -> Cow<'static, str> { Cow::Owned(format!("{name} [slot {slot}]")) };
        let constant = UploadLayout::Constant {
            alignment: constant_alignment,
        };

        let cmd_list_alloc =
            device.create_command_allocator(&format!("CommandAllocator [slot {slot}]"))?;

        // Buffers created so far, released if a later allocation fails.
        let mut created: Vec<BufferId> = Vec::with_capacity(4);
        let buffers: Result<_, ResourceError> = (|| {
            let pass_cb = UploadBuffer::new(device, label("PassCB"), desc.pass_count, constant)?;
            created.push(pass_cb.buffer());
            let object_cb =
                UploadBuffer::new(device, label("ObjectCB"), desc.object_count, constant)?;
            created.push(object_cb.buffer());
            let skinned_cb =
                UploadBuffer::new(device, label("SkinnedCB"), desc.skinned_count, constant)?;
            created.push(skinned_cb.buffer());
            let material_buffer = UploadBuffer::new(
                device,
                label("MaterialBuffer"),
                desc.material_count,
                UploadLayout::Structured,
            )?;
            Ok((pass_cb, object_cb, skinned_cb, material_buffer))
        })();

        match buffers {
            Ok((pass_cb, object_cb, skinned_cb, material_buffer)) => Ok(Self {
                cmd_list_alloc,
                pass_cb,
                object_cb,
                skinned_cb,
                material_buffer,
                fence: 0,
            }),
            Err(err) => {
                for id in created {
                    if let Err(e) = device.destroy_buffer(id) {
                        log::warn!("Leaked buffer of slot {slot} while unwinding: {e}");
                    }
                }
                if let Err(e) = device.destroy_command_allocator(cmd_list_alloc) {
                    log::warn!("Leaked command allocator of slot {slot} while unwinding: {e}");
                }
                Err(err)
            }
        }
    }

    /// Total bytes of upload memory held by this slot.
    pub fn byte_size(&self) -> u64 {
        self.pass_cb.byte_size()
            + self.object_cb.byte_size()
            + self.skinned_cb.byte_size()
            + self.material_buffer.byte_size()
    }

    /// Releases the buffers and the command allocator.
    pub fn destroy(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        self.pass_cb.destroy(device)?;
        self.object_cb.destroy(device)?;
        self.skinned_cb.destroy(device)?;
        self.material_buffer.destroy(device)?;
        device.destroy_command_allocator(self.cmd_list_alloc)
    }
}
