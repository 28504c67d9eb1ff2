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

//! Typed views over CPU-mapped upload buffers.

use super::buffer::{align_to, BufferDescriptor, BufferId, BufferUsage};
use super::device::GraphicsDevice;
use super::error::ResourceError;
use bytemuck::Pod;
use std::borrow::Cow;
use std::marker::PhantomData;

/// How elements of an [`UploadBuffer`] are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadLayout {
    /// Each element starts on a multiple of the given alignment (constant buffers).
    Constant {
        /// The element alignment in bytes.
        alignment: u64,
    },
    /// Elements are tightly packed (structured buffers).
    Structured,
}

/// A fixed-capacity array of `T` in upload memory.
///
/// Element `i` lives at byte `i * stride`. Writes are plain copies with no
/// synchronization: the caller guarantees the GPU is not reading the region,
/// which the frame ring does by waiting on the slot's fence before reuse.
#[derive(Debug)]
pub struct UploadBuffer<T> {
    buffer: BufferId,
    element_count: usize,
    stride: u64,
    _marker: PhantomData<T>,
}

impl<T: Pod> UploadBuffer<T> {
    /// Allocates room for `element_count` elements.
    ///
    /// # Errors
    ///
    /// Returns the device's [`ResourceError`] if allocation fails.
    pub fn new(
        device: &dyn GraphicsDevice,
        label: Cow<'_, str>,
        element_count: usize,
        layout: UploadLayout,
    ) -> Result<Self, ResourceError> {
        let element_size = std::mem::size_of::<T>() as u64;
        let (stride, usage) = match layout {
            UploadLayout::Constant { alignment } => (
                align_to(element_size, alignment),
                BufferUsage::UPLOAD | BufferUsage::CONSTANT,
            ),
            UploadLayout::Structured => {
                (element_size, BufferUsage::UPLOAD | BufferUsage::STRUCTURED)
            }
        };

        let buffer = device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: stride * element_count as u64,
            usage,
        })?;

        Ok(Self {
            buffer,
            element_count,
            stride,
            _marker: PhantomData,
        })
    }

    /// Copies `data` into element `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::OutOfBounds`] if `index` is past the capacity.
    pub fn copy_data(
        &self,
        device: &dyn GraphicsDevice,
        index: usize,
        data: &T,
    ) -> Result<(), ResourceError> {
        if index >= self.element_count {
            return Err(ResourceError::OutOfBounds);
        }
        device.write_buffer(self.buffer, self.offset_of(index), bytemuck::bytes_of(data))
    }

    /// Reads element `index` back from the buffer.
    pub fn read_element(
        &self,
        device: &dyn GraphicsDevice,
        index: usize,
    ) -> Result<T, ResourceError> {
        if index >= self.element_count {
            return Err(ResourceError::OutOfBounds);
        }
        let bytes = device.read_buffer(
            self.buffer,
            self.offset_of(index),
            std::mem::size_of::<T>() as u64,
        )?;
        bytemuck::try_pod_read_unaligned(&bytes)
            .map_err(|e| ResourceError::BackendError(format!("Invalid read-back: {e}")))
    }

    /// Byte offset of element `index`.
    pub fn offset_of(&self, index: usize) -> u64 {
        index as u64 * self.stride
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Number of elements the buffer holds.
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Distance in bytes between two consecutive elements.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Total size of the buffer in bytes.
    pub fn byte_size(&self) -> u64 {
        self.stride * self.element_count as u64
    }

    /// Releases the underlying buffer.
    pub fn destroy(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        device.destroy_buffer(self.buffer)
    }
}
