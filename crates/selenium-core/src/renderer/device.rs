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

//! Defines the `GraphicsDevice` trait, the allocation seam of the frame ring.

use super::buffer::{BufferDescriptor, BufferId, CommandAllocatorId};
use super::error::ResourceError;

/// Allocates CPU-mapped, GPU-readable memory and command allocators.
///
/// Implementations must be thread-safe: the simulated GPU reads buffers from
/// its own thread while the CPU writes into other ring slots.
pub trait GraphicsDevice: Send + Sync {
    /// Creates a zero-initialized buffer.
    ///
    /// ## Errors
    /// * `ResourceError::AllocationFailed` - If the device cannot provide the memory.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Destroys a buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Writes `data` into the buffer at byte `offset`.
    ///
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If the write does not fit in the buffer.
    /// * `ResourceError::NotFound` - If `id` is not a live buffer.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Reads `len` bytes from the buffer at byte `offset`.
    ///
    /// This is how a GPU consumer observes what the CPU wrote.
    fn read_buffer(&self, id: BufferId, offset: u64, len: u64) -> Result<Vec<u8>, ResourceError>;

    /// Creates a command allocator.
    fn create_command_allocator(&self, label: &str) -> Result<CommandAllocatorId, ResourceError>;

    /// Resets a command allocator so its memory can be reused for new commands.
    ///
    /// Callers must only reset an allocator once the GPU finished the commands
    /// recorded with it.
    fn reset_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError>;

    /// Destroys a command allocator.
    fn destroy_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError>;
}
