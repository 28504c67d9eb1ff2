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

//! Defines the `GpuTimeline` trait: the fence the CPU uses to track GPU progress.

use super::error::RenderError;
use std::time::Duration;

/// A monotonically increasing counter advanced by the GPU.
///
/// The value `0` is never signalled and means "no work submitted yet".
pub trait GpuTimeline: Send + Sync {
    /// Asks the GPU to set the counter to `value` once all previously
    /// submitted work has completed.
    fn signal(&self, value: u64) -> Result<(), RenderError>;

    /// The last value the GPU has reached.
    fn completed_value(&self) -> u64;

    /// Blocks until the counter is at least `value`.
    ///
    /// Returns `Ok(false)` if `timeout` elapsed first. A `None` timeout waits forever.
    fn wait_for_value(&self, value: u64, timeout: Option<Duration>) -> Result<bool, RenderError>;
}
