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

//! Defines the error types of the frame resource layer.

use std::fmt;
use std::time::Duration;

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The handle used to reference a resource does not name a live resource.
    NotFound,
    /// An access fell outside the bounds of a buffer.
    OutOfBounds,
    /// The device could not provide the memory for a new resource.
    AllocationFailed {
        /// The debug label of the resource being created.
        label: String,
        /// The requested size in bytes.
        size: u64,
    },
    /// An error originating from the specific device implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::OutOfBounds => write!(f, "Resource access out of bounds."),
            ResourceError::AllocationFailed { label, size } => {
                write!(f, "Failed to allocate {size} bytes for '{label}'")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error raised while preparing or synchronizing frames.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// A fence wait did not complete within the configured diagnostic timeout.
    FenceTimeout {
        /// The fence value that was waited on.
        fence_value: u64,
        /// The last value the GPU had completed when the wait gave up.
        completed_value: u64,
        /// How long the wait lasted.
        waited: Duration,
    },
    /// The graphics device was lost. Nothing submitted afterwards will complete.
    DeviceLost,
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::FenceTimeout {
                fence_value,
                completed_value,
                waited,
            } => write!(
                f,
                "Timed out after {waited:?} waiting for fence {fence_value} (GPU completed {completed_value})"
            ),
            RenderError::DeviceLost => write!(f, "The graphics device was lost."),
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}
