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

//! Defines data structures related to GPU buffer resources.

use bitflags::bitflags;
use std::borrow::Cow;

bitflags! {
    /// A set of flags describing how a buffer will be used.
    ///
    /// Devices use them to pick a memory heap. Every buffer of the frame ring is
    /// an `UPLOAD` buffer: persistently mapped, written by the CPU and read by
    /// the GPU.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// CPU-writable, GPU-readable memory.
        const UPLOAD = 1 << 0;
        /// The buffer is bound as a constant buffer (elements padded to the constant alignment).
        const CONSTANT = 1 << 1;
        /// The buffer is bound as a structured buffer (elements tightly packed).
        const STRUCTURED = 1 << 2;
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// A bitmask of [`BufferUsage`] flags describing how the buffer will be used.
    pub usage: BufferUsage,
}

/// An opaque handle to a GPU buffer resource.
///
/// This ID is returned by [`GraphicsDevice::create_buffer`](super::GraphicsDevice::create_buffer)
/// and is used to reference the buffer in all subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// An opaque handle to the memory backing recorded GPU commands.
///
/// Each frame resource owns one, reset only once the fence of its slot has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandAllocatorId(pub usize);

/// Rounds `size` up to the next multiple of `alignment`, which must be a power of two.
///
/// # Examples
///
/// ```
/// use selenium_core::renderer::align_to;
/// assert_eq!(align_to(144, 256), 256);
/// assert_eq!(align_to(300, 256), 512);
/// assert_eq!(align_to(512, 256), 512);
/// ```
#[inline]
pub fn align_to(size: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (size + alignment - 1) & !(alignment - 1)
}
