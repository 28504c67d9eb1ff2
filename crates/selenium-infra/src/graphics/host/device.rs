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

use selenium_core::renderer::{
    BufferDescriptor, BufferId, CommandAllocatorId, GraphicsDevice, ResourceError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug)]
struct HostBufferEntry {
    data: Vec<u8>,
    label: String,
}

#[derive(Debug)]
struct HostAllocatorEntry {
    label: String,
    resets: u64,
}

#[derive(Debug)]
struct HostDeviceInternal {
    buffers: Mutex<HashMap<BufferId, HostBufferEntry>>,
    allocators: Mutex<HashMap<CommandAllocatorId, HostAllocatorEntry>>,
    next_buffer_id: AtomicUsize,
    next_allocator_id: AtomicUsize,
    budget: Option<u64>,
    allocated_bytes: AtomicU64,
    peak_bytes: AtomicU64,
}

/// A [`GraphicsDevice`] whose buffers live in host memory.
///
/// Cloning is cheap and yields a handle to the same device, so the simulated
/// GPU thread can read what the CPU thread wrote.
#[derive(Debug, Clone)]
pub struct HostDevice {
    internal: Arc<HostDeviceInternal>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ResourceError> {
    mutex
        .lock()
        .map_err(|_| ResourceError::BackendError("host device lock poisoned".to_string()))
}

impl HostDevice {
    /// Creates a device with unlimited memory.
    pub fn new() -> Self {
        Self::with_budget(None)
    }

    /// Creates a device that refuses allocations beyond `budget` bytes.
    pub fn with_budget(budget: Option<u64>) -> Self {
        Self {
            internal: Arc::new(HostDeviceInternal {
                buffers: Mutex::new(HashMap::new()),
                allocators: Mutex::new(HashMap::new()),
                next_buffer_id: AtomicUsize::new(0),
                next_allocator_id: AtomicUsize::new(0),
                budget,
                allocated_bytes: AtomicU64::new(0),
                peak_bytes: AtomicU64::new(0),
            }),
        }
    }

    /// Bytes currently allocated.
    pub fn allocated_bytes(&self) -> u64 {
        self.internal.allocated_bytes.load(Ordering::Relaxed)
    }

    /// Highest number of bytes allocated at once.
    pub fn peak_bytes(&self) -> u64 {
        self.internal.peak_bytes.load(Ordering::Relaxed)
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        lock(&self.internal.buffers).map_or(0, |b| b.len())
    }

    /// Number of live command allocators.
    pub fn command_allocator_count(&self) -> usize {
        lock(&self.internal.allocators).map_or(0, |a| a.len())
    }

    /// How many times the allocator was reset, if it exists.
    pub fn command_allocator_resets(&self, id: CommandAllocatorId) -> Option<u64> {
        lock(&self.internal.allocators)
            .ok()?
            .get(&id)
            .map(|entry| entry.resets)
    }
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HostDevice {
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let label = descriptor.label.as_deref().unwrap_or_default().to_owned();
        let mut buffers = lock(&self.internal.buffers)?;

        let allocated = self.internal.allocated_bytes.load(Ordering::Relaxed);
        if let Some(budget) = self.internal.budget {
            if allocated + descriptor.size > budget {
                log::error!(
                    "HostDevice: Out of memory creating '{}' ({} bytes, {} of {} in use)",
                    label,
                    descriptor.size,
                    allocated,
                    budget
                );
                return Err(ResourceError::AllocationFailed {
                    label,
                    size: descriptor.size,
                });
            }
        }
        let size = usize::try_from(descriptor.size).map_err(|_| ResourceError::AllocationFailed {
            label: label.clone(),
            size: descriptor.size,
        })?;

        let id = BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        let current = self
            .internal
            .allocated_bytes
            .fetch_add(descriptor.size, Ordering::Relaxed)
            + descriptor.size;
        self.internal.peak_bytes.fetch_max(current, Ordering::Relaxed);

        log::debug!(
            "HostDevice: Created buffer '{}' with ID: {:?}, size: {} bytes, usage: {:?}",
            label,
            id,
            descriptor.size,
            descriptor.usage
        );
        buffers.insert(
            id,
            HostBufferEntry {
                data: vec![0; size],
                label,
            },
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let entry = lock(&self.internal.buffers)?
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        self.internal
            .allocated_bytes
            .fetch_sub(entry.data.len() as u64, Ordering::Relaxed);
        log::trace!("HostDevice: Destroyed buffer '{}' ({:?})", entry.label, id);
        Ok(())
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut buffers = lock(&self.internal.buffers)?;
        let entry = buffers.get_mut(&id).ok_or(ResourceError::NotFound)?;
        let range = byte_range(offset, data.len() as u64, entry.data.len())?;
        entry.data[range].copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&self, id: BufferId, offset: u64, len: u64) -> Result<Vec<u8>, ResourceError> {
        let buffers = lock(&self.internal.buffers)?;
        let entry = buffers.get(&id).ok_or(ResourceError::NotFound)?;
        let range = byte_range(offset, len, entry.data.len())?;
        Ok(entry.data[range].to_vec())
    }

    fn create_command_allocator(&self, label: &str) -> Result<CommandAllocatorId, ResourceError> {
        let id = CommandAllocatorId(
            self.internal
                .next_allocator_id
                .fetch_add(1, Ordering::Relaxed),
        );
        lock(&self.internal.allocators)?.insert(
            id,
            HostAllocatorEntry {
                label: label.to_owned(),
                resets: 0,
            },
        );
        Ok(id)
    }

    fn reset_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError> {
        let mut allocators = lock(&self.internal.allocators)?;
        let entry = allocators.get_mut(&id).ok_or(ResourceError::NotFound)?;
        entry.resets += 1;
        log::trace!("HostDevice: Reset allocator '{}'", entry.label);
        Ok(())
    }

    fn destroy_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError> {
        lock(&self.internal.allocators)?
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }
}

fn byte_range(
    offset: u64,
    len: u64,
    buffer_len: usize,
) -> Result<std::ops::Range<usize>, ResourceError> {
    let end = offset.checked_add(len).ok_or(ResourceError::OutOfBounds)?;
    if end > buffer_len as u64 {
        return Err(ResourceError::OutOfBounds);
    }
    Ok(offset as usize..end as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use selenium_core::renderer::BufferUsage;
    use std::borrow::Cow;

    fn desc(size: u64) -> BufferDescriptor<'static> {
        BufferDescriptor {
            label: Some(Cow::Borrowed("test")),
            size,
            usage: BufferUsage::UPLOAD,
        }
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let device = HostDevice::new();
        let id = device.create_buffer(&desc(16)).unwrap();
        device.write_buffer(id, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(
            device.read_buffer(id, 0, 8).unwrap(),
            vec![0, 0, 0, 0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_out_of_bounds_access_is_rejected() {
        let device = HostDevice::new();
        let id = device.create_buffer(&desc(8)).unwrap();
        assert_eq!(
            device.write_buffer(id, 6, &[0; 4]),
            Err(ResourceError::OutOfBounds)
        );
        assert_eq!(
            device.read_buffer(id, u64::MAX, 2),
            Err(ResourceError::OutOfBounds)
        );
    }

    #[test]
    fn test_budget_is_enforced_and_tracked() {
        let device = HostDevice::with_budget(Some(100));
        let a = device.create_buffer(&desc(60)).unwrap();
        assert!(matches!(
            device.create_buffer(&desc(60)),
            Err(ResourceError::AllocationFailed { size: 60, .. })
        ));
        device.destroy_buffer(a).unwrap();
        device.create_buffer(&desc(60)).unwrap();
        assert_eq!(device.allocated_bytes(), 60);
        assert_eq!(device.peak_bytes(), 60);
    }

    #[test]
    fn test_destroyed_buffer_is_gone() {
        let device = HostDevice::new();
        let id = device.create_buffer(&desc(8)).unwrap();
        device.destroy_buffer(id).unwrap();
        assert_eq!(device.destroy_buffer(id), Err(ResourceError::NotFound));
        assert_eq!(device.buffer_count(), 0);
    }

    #[test]
    fn test_allocator_resets_are_counted() {
        let device = HostDevice::new();
        let id = device.create_command_allocator("frame").unwrap();
        device.reset_command_allocator(id).unwrap();
        device.reset_command_allocator(id).unwrap();
        assert_eq!(device.command_allocator_resets(id), Some(2));
        device.destroy_command_allocator(id).unwrap();
        assert_eq!(device.command_allocator_count(), 0);
    }
}
