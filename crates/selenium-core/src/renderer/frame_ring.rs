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

//! The ring of frame resources and its fence-based throttling.
//!
//! ```text
//! advance:  current = (current + 1) % N
//!           slot.fence != 0 && completed < slot.fence  ->  block on the timeline
//! update:   copy_data into the current slot's buffers
//! submit:   fence_counter += 1, timeline.signal(fence_counter), slot.fence = fence_counter
//! ```
//!
//! The wait in [`FrameResourceRing::advance`] is the only point where the CPU
//! blocks on the GPU. It lets the CPU run at most `N - 1` frames ahead.

use super::device::GraphicsDevice;
use super::error::{RenderError, ResourceError};
use super::frame_resource::{FrameResource, FrameResourceDescriptor};
use super::settings::RenderSettings;
use super::timeline::GpuTimeline;
use std::time::{Duration, Instant};

/// Waits longer than this are reported as warnings.
const SLOW_FENCE_WAIT: Duration = Duration::from_millis(100);

/// A fixed set of [`FrameResource`]s cycled round-robin.
#[derive(Debug)]
pub struct FrameResourceRing {
    frames: Vec<FrameResource>,
    current: usize,
    fence_counter: u64,
    fence_wait_timeout: Option<Duration>,
    wait_count: u64,
}

impl FrameResourceRing {
    /// Allocates `settings.frames_in_flight` frame resources up front.
    ///
    /// # Errors
    ///
    /// An allocation failure is returned as is. Slots created before the failure
    /// are released first.
    pub fn new(
        device: &dyn GraphicsDevice,
        settings: &RenderSettings,
        desc: &FrameResourceDescriptor,
    ) -> Result<Self, RenderError> {
        if settings.frames_in_flight == 0 {
            return Err(RenderError::Internal(
                "A frame ring needs at least one slot".to_string(),
            ));
        }
        if !settings.constant_buffer_alignment.is_power_of_two() {
            return Err(RenderError::Internal(format!(
                "Constant buffer alignment must be a power of two, got {}",
                settings.constant_buffer_alignment
            )));
        }

        let mut frames = Vec::with_capacity(settings.frames_in_flight);
        for slot in 0..settings.frames_in_flight {
            match FrameResource::new(device, slot, desc, settings.constant_buffer_alignment) {
                Ok(frame) => frames.push(frame),
                Err(err) => {
                    log::error!("Failed to allocate frame resource {slot}: {err}");
                    for frame in frames {
                        if let Err(e) = frame.destroy(device) {
                            log::warn!("Leaked frame resource while unwinding: {e}");
                        }
                    }
                    return Err(err.into());
                }
            }
        }

        log::info!(
            "Frame resource ring created: {} slots, {} bytes per slot ({desc:?})",
            frames.len(),
            frames[0].byte_size()
        );

        Ok(Self {
            frames,
            current: 0,
            fence_counter: 0,
            fence_wait_timeout: settings.fence_wait_timeout(),
            wait_count: 0,
        })
    }

    /// Moves to the next slot and waits until the GPU has finished with it.
    ///
    /// Returns the index of the new current slot.
    ///
    /// # Errors
    ///
    /// [`RenderError::FenceTimeout`] if a diagnostic timeout is configured and
    /// the GPU does not reach the slot's fence in time.
    pub fn advance(&mut self, timeline: &dyn GpuTimeline) -> Result<usize, RenderError> {
        self.current = (self.current + 1) % self.frames.len();

        let fence = self.frames[self.current].fence;
        if fence != 0 && timeline.completed_value() < fence {
            self.wait_for(timeline, fence)?;
        }
        Ok(self.current)
    }

    /// Records the fence value that marks completion of the current slot's commands.
    pub fn mark_submitted(&mut self, fence_value: u64) {
        self.frames[self.current].fence = fence_value;
    }

    /// Signals the next fence value after all submitted work and assigns it to
    /// the current slot.
    pub fn submit(&mut self, timeline: &dyn GpuTimeline) -> Result<u64, RenderError> {
        self.fence_counter += 1;
        timeline.signal(self.fence_counter)?;
        self.mark_submitted(self.fence_counter);
        log::trace!(
            "Slot {} submitted with fence {}",
            self.current,
            self.fence_counter
        );
        Ok(self.fence_counter)
    }

    /// Waits until the GPU has completed everything submitted so far.
    pub fn flush(&mut self, timeline: &dyn GpuTimeline) -> Result<(), RenderError> {
        if self.fence_counter != 0 && timeline.completed_value() < self.fence_counter {
            self.wait_for(timeline, self.fence_counter)?;
        }
        Ok(())
    }

    fn wait_for(&mut self, timeline: &dyn GpuTimeline, fence_value: u64) -> Result<(), RenderError> {
        log::debug!(
            "Slot {} waiting for fence {} (GPU at {})",
            self.current,
            fence_value,
            timeline.completed_value()
        );
        self.wait_count += 1;

        let start = Instant::now();
        if !timeline.wait_for_value(fence_value, self.fence_wait_timeout)? {
            let err = RenderError::FenceTimeout {
                fence_value,
                completed_value: timeline.completed_value(),
                waited: start.elapsed(),
            };
            log::error!("{err}");
            return Err(err);
        }

        let waited = start.elapsed();
        if waited > SLOW_FENCE_WAIT {
            log::warn!("Fence {fence_value} took {waited:?} to complete");
        }
        Ok(())
    }

    /// The slot the CPU may write into.
    pub fn current(&self) -> &FrameResource {
        &self.frames[self.current]
    }

    /// Mutable access to the current slot.
    pub fn current_mut(&mut self) -> &mut FrameResource {
        &mut self.frames[self.current]
    }

    /// Index of the current slot.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The slot at `index`, if any.
    pub fn frame(&self, index: usize) -> Option<&FrameResource> {
        self.frames.get(index)
    }

    /// Number of slots in the ring.
    pub fn slot_count(&self) -> usize {
        self.frames.len()
    }

    /// The last fence value handed to the timeline.
    pub fn fence_counter(&self) -> u64 {
        self.fence_counter
    }

    /// How many times the CPU had to block on the GPU.
    pub fn wait_count(&self) -> u64 {
        self.wait_count
    }

    /// Releases every slot. Call [`flush`](Self::flush) first.
    pub fn destroy(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        self.frames
            .into_iter()
            .try_for_each(|frame| frame.destroy(device))
    }
}
