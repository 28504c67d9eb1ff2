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

//! # Selenium Core
//!
//! Foundational crate for the Selenium demo: math primitives, the skinned
//! animation engine, and the backend-agnostic contracts of the frame resource
//! ring (buffers, devices, fences) together with the GPU constant layouts.
//!
//! Nothing in this crate performs I/O or spawns threads. Concrete devices and
//! GPU timelines are provided by `selenium-infra`.

#![warn(missing_docs)]

pub mod animation;
pub mod math;
pub mod renderer;
pub mod time;

pub use animation::{
    AnimationClip, AnimationError, BoneAnimation, Keyframe, SkinnedController, SkinnedData,
};
pub use time::GameTimer;
