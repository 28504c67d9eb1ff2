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

//! In-memory doubles of the device and the GPU timeline for unit tests.

use super::buffer::{BufferDescriptor, BufferId, CommandAllocatorId};
use super::device::GraphicsDevice;
use super::error::{RenderError, ResourceError};
use super::timeline::GpuTimeline;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A device backed by plain vectors, with an optional byte budget.
#[derive(Debug, Default)]
pub(crate) struct MockGraphicsDevice {
    next_id: AtomicUsize,
    buffers: Mutex<HashMap<usize, Vec<u8>>>,
    allocators: Mutex<Vec<usize>>,
    budget: Option<u64>,
    writes: AtomicUsize,
}

impl MockGraphicsDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_budget(bytes: u64) -> Self {
        Self {
            budget: Some(bytes),
            ..Self::default()
        }
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }

    pub(crate) fn live_allocators(&self) -> usize {
        self.allocators.lock().unwrap().len()
    }

    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        let mut buffers = self.buffers.lock().unwrap();
        let used: u64 = buffers.values().map(|b| b.len() as u64).sum();
        if let Some(budget) = self.budget {
            if used + descriptor.size > budget {
                return Err(ResourceError::AllocationFailed {
                    label: descriptor.label.as_deref().unwrap_or("").to_owned(),
                    size: descriptor.size,
                });
            }
        }
        let id = self.next();
        buffers.insert(id, vec![0; descriptor.size as usize]);
        Ok(BufferId(id))
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.buffers
            .lock()
            .unwrap()
            .remove(&id.0)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut buffers = self.buffers.lock().unwrap();
        let buffer = buffers.get_mut(&id.0).ok_or(ResourceError::NotFound)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > buffer.len() {
            return Err(ResourceError::OutOfBounds);
        }
        buffer[start..end].copy_from_slice(data);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn read_buffer(&self, id: BufferId, offset: u64, len: u64) -> Result<Vec<u8>, ResourceError> {
        let buffers = self.buffers.lock().unwrap();
        let buffer = buffers.get(&id.0).ok_or(ResourceError::NotFound)?;
        let start = offset as usize;
        let end = start + len as usize;
        buffer
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or(ResourceError::OutOfBounds)
    }

    fn create_command_allocator(&self, _label: &str) -> Result<CommandAllocatorId, ResourceError> {
        let id = self.next();
        self.allocators.lock().unwrap().push(id);
        Ok(CommandAllocatorId(id))
    }

    fn reset_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError> {
        if self.allocators.lock().unwrap().contains(&id.0) {
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }

    fn destroy_command_allocator(&self, id: CommandAllocatorId) -> Result<(), ResourceError> {
        let mut allocators = self.allocators.lock().unwrap();
        let index = allocators
            .iter()
            .position(|&a| a == id.0)
            .ok_or(ResourceError::NotFound)?;
        allocators.remove(index);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TimelineState {
    completed: u64,
    signalled: Vec<u64>,
    waits: Vec<u64>,
}

/// A timeline the test advances by hand.
///
/// With `complete_on_wait`, a wait finishes the GPU work it waits for, as a
/// real GPU eventually would. Without it, the GPU is stalled and every wait
/// that is not already satisfied times out.
#[derive(Debug, Default)]
pub(crate) struct ManualTimeline {
    state: Mutex<TimelineState>,
    complete_on_wait: bool,
}

impl ManualTimeline {
    pub(crate) fn completing() -> Self {
        Self {
            complete_on_wait: true,
            ..Self::default()
        }
    }

    pub(crate) fn stalled() -> Self {
        Self::default()
    }

    pub(crate) fn complete_up_to(&self, value: u64) {
        let mut state = self.state.lock().unwrap();
        state.completed = state.completed.max(value);
    }

    pub(crate) fn signalled(&self) -> Vec<u64> {
        self.state.lock().unwrap().signalled.clone()
    }

    pub(crate) fn waits(&self) -> Vec<u64> {
        self.state.lock().unwrap().waits.clone()
    }
}

impl GpuTimeline for ManualTimeline {
    fn signal(&self, value: u64) -> Result<(), RenderError> {
        self.state.lock().unwrap().signalled.push(value);
        Ok(())
    }

    fn completed_value(&self) -> u64 {
        self.state.lock().unwrap().completed
    }

    fn wait_for_value(&self, value: u64, _timeout: Option<Duration>) -> Result<bool, RenderError> {
        let mut state = self.state.lock().unwrap();
        state.waits.push(value);
        if self.complete_on_wait {
            state.completed = state.completed.max(value);
        }
        Ok(state.completed >= value)
    }
}
