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

//! # Selenium Infra
//!
//! Concrete implementations of the contracts defined in `selenium-core`.
//!
//! The host backend keeps every buffer in CPU memory and runs a simulated GPU
//! queue on its own thread, so the frame ring's fence throttling is exercised
//! against real asynchronous completion.

pub mod graphics;
pub mod logging;

pub use graphics::host::{HostDevice, HostQueue};
