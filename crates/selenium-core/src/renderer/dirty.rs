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

//! Frames-dirty counters: propagating one change to every ring slot.

/// Counts how many ring slots still have to receive the latest value of a record.
///
/// Marking the record sets the count to the ring size. Every frame the record
/// is uploaded into the current slot and the count drops by one, so after
/// `ring_size` consecutive frames each physically distinct slot holds the new
/// value and uploads stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramesDirty {
    remaining: usize,
    ring_size: usize,
}

impl FramesDirty {
    /// A counter for a freshly created record, dirty in every slot.
    pub fn new(ring_size: usize) -> Self {
        Self {
            remaining: ring_size,
            ring_size,
        }
    }

    /// Records a change: every slot must be refreshed again.
    pub fn mark(&mut self) {
        self.remaining = self.ring_size;
    }

    /// Whether the current slot still needs an upload.
    pub fn is_dirty(&self) -> bool {
        self.remaining > 0
    }

    /// Slots still waiting for the latest value.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Consumes one pending upload. Returns `false` once the record is clean.
    pub fn consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
