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

//! # Selenium IO
//!
//! Loads the assets of the Selenium demo. The only format is M3D, the text
//! format carrying a skinned mesh, its materials, skeleton, and clips.

#![warn(missing_docs)]

pub mod m3d;

pub use m3d::{load_m3d, parse_m3d, M3dError, M3dMaterial, M3dModel, SkinnedVertex, Subset};
