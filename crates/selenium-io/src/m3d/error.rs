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

use selenium_core::AnimationError;
use std::path::PathBuf;
use thiserror::Error;

/// An error raised while loading an M3D file.
#[derive(Debug, Error)]
pub enum M3dError {
    /// The file could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        /// The path that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text ended in the middle of a section.
    #[error("Unexpected end of file while reading {expected}")]
    UnexpectedEof {
        /// What the parser was about to read.
        expected: &'static str,
    },

    /// A token could not be parsed as the expected value.
    #[error("Expected {expected}, found '{found}' (token {position})")]
    BadToken {
        /// What the parser was about to read.
        expected: &'static str,
        /// The offending token.
        found: String,
        /// Zero-based index of the token in the file.
        position: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("Triangle index {index} exceeds the vertex count {vertex_count}")]
    IndexOutOfRange {
        /// The index read from the triangle list.
        index: u16,
        /// Number of vertices declared in the header.
        vertex_count: usize,
    },

    /// A header count is too large to describe a real model.
    #[error("The {section} count {count} is too large")]
    CountTooLarge {
        /// The section the count belongs to.
        section: &'static str,
        /// The count read from the header.
        count: usize,
    },

    /// The skeleton or its clips break the animation engine's preconditions.
    #[error("Invalid skinned data: {0}")]
    Skinned(#[from] AnimationError),
}
