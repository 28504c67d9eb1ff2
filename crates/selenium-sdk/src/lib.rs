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


//! The Selenium SDK: the layer an application is written against.
//!
//! An application implements [`Application`] and hands itself to an
//! [`Engine`] runner. The runner owns the clock and drives the lifecycle
//! hooks; the application owns its device, queue, frame ring and scene and
//! uses the routines in [`frame_update`] to refresh the current ring slot.

pub mod camera;
pub mod cli;
pub mod config;
pub mod frame_update;
pub mod lighting;
pub mod scene;

use anyhow::{Context, Result};
use selenium_core::time::GameTimer;
use std::time::{Duration, Instant};

pub use camera::Camera;
pub use cli::CliOverrides;
pub use config::AppConfig;
pub use lighting::{SceneLighting, ShadowCaster};
pub use scene::{
    BoundingSphere, Material, MaterialDesc, RenderItem, RenderItemDesc, RenderLayer, Scene,
    SkinnedInstance, Submesh,
};

pub mod prelude {
    pub use crate::{Application, Engine, MouseButton};
    pub use selenium_core::math::{Mat4, Quaternion, Vec3, Vec4};
    pub use selenium_core::renderer::{
        FrameResourceDescriptor, FrameResourceRing, GpuTimeline, GraphicsDevice, RenderSettings,
    };
    pub use selenium_core::time::GameTimer;
    pub use selenium_core::{SkinnedController, SkinnedData};
}

/// Mouse buttons reported to the input hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// The lifecycle hooks an application customises.
///
/// Input and resize hooks have empty defaults; `update` and `draw` are called
/// once per frame, in that order.
pub trait Application {
    /// Called when the client area changes size, and once before the first frame.
    fn on_resize(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    fn on_mouse_down(&mut self, _button: MouseButton, _x: i32, _y: i32) {}

    fn on_mouse_up(&mut self, _button: MouseButton, _x: i32, _y: i32) {}

    /// `held` is the button pressed while moving, if any.
    fn on_mouse_move(&mut self, _held: Option<MouseButton>, _x: i32, _y: i32) {}

    /// Advances the simulation and fills the current frame resource.
    fn update(&mut self, timer: &GameTimer) -> Result<()>;

    /// Records and submits the GPU work of the frame.
    fn draw(&mut self, timer: &GameTimer) -> Result<()>;

    /// Called once after the last frame. Wait for the GPU here.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    /// Frames that went through both `update` and `draw`.
    pub frames: u64,
    /// Simulated seconds at the last frame.
    pub total_time: f32,
}

/// Drives an [`Application`] through its lifecycle.
pub struct Engine;

impl Engine {
    /// Runs `frames` frames without a window, advancing the clock by exactly
    /// `timestep` per frame.
    ///
    /// The application is handed back together with the run summary so callers
    /// can inspect it. `shutdown` is called even if a frame fails; the frame
    /// error wins over a shutdown error.
    pub fn run_headless<A: Application>(
        mut app: A,
        frames: u64,
        timestep: Duration,
    ) -> Result<(A, RunStats)> {
        log::info!(
            "Starting headless run: {} frames at {:.2} ms per frame",
            frames,
            timestep.as_secs_f64() * 1000.0
        );

        let run = Self::drive(&mut app, frames, timestep);
        let shutdown = app.shutdown();

        let stats = run?;
        shutdown.context("application shutdown failed")?;

        log::info!(
            "Headless run finished: {} frames, {:.3} s simulated",
            stats.frames,
            stats.total_time
        );
        Ok((app, stats))
    }

    fn drive<A: Application>(app: &mut A, frames: u64, timestep: Duration) -> Result<RunStats> {
        let mut now = Instant::now();
        let mut timer = GameTimer::new_at(now);
        let mut stats = RunStats {
            frames: 0,
            total_time: 0.0,
        };

        for frame in 0..frames {
            now += timestep;
            timer.tick_at(now);

            app.update(&timer)
                .with_context(|| format!("update failed on frame {frame}"))?;
            app.draw(&timer)
                .with_context(|| format!("draw failed on frame {frame}"))?;

            stats.frames += 1;
            stats.total_time = timer.total_time();
            if frame % 60 == 0 {
                log::trace!("Frame {} done at t = {:.3} s", frame, stats.total_time);
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        deltas: Vec<f32>,
        fail_on_draw: Option<usize>,
        draws: usize,
        shut_down: bool,
    }

    impl Application for Recorder {
        fn update(&mut self, timer: &GameTimer) -> Result<()> {
            self.calls.push("update");
            self.deltas.push(timer.delta_time());
            Ok(())
        }

        fn draw(&mut self, _timer: &GameTimer) -> Result<()> {
            self.calls.push("draw");
            self.draws += 1;
            if self.fail_on_draw == Some(self.draws) {
                bail!("device removed");
            }
            Ok(())
        }

        fn shutdown(&mut self) -> Result<()> {
            self.shut_down = true;
            Ok(())
        }
    }

    #[test]
    fn test_update_runs_before_draw_every_frame() {
        let (app, stats) =
            Engine::run_headless(Recorder::default(), 3, Duration::from_millis(16)).unwrap();

        assert_eq!(
            app.calls,
            vec!["update", "draw", "update", "draw", "update", "draw"]
        );
        assert_eq!(stats.frames, 3);
        assert!(app.shut_down);
    }

    #[test]
    fn test_fixed_timestep_drives_the_clock() {
        let (app, stats) =
            Engine::run_headless(Recorder::default(), 4, Duration::from_millis(250)).unwrap();

        for dt in &app.deltas {
            assert!((dt - 0.25).abs() < 1e-6);
        }
        assert!((stats.total_time - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_frame_error_is_reported_with_its_frame() {
        let app = Recorder {
            fail_on_draw: Some(2),
            ..Recorder::default()
        };

        let err = Engine::run_headless(app, 5, Duration::from_millis(16))
            .err()
            .expect("second draw fails");

        assert!(format!("{err:#}").contains("draw failed on frame 1"));
        assert!(format!("{err:#}").contains("device removed"));
    }
}
