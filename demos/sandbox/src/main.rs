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


// Selenium sandbox
// Runs the demo scene headless: CPU frames are prepared in a ring of frame
// resources while a simulated GPU consumes them on its own thread.

mod app;
mod demo_scene;
mod gpu;

use anyhow::Result;
use app::SeleniumApp;
use selenium_sdk::{AppConfig, Application, CliOverrides, Engine};

fn main() -> Result<()> {
    selenium_infra::logging::init();

    let cli = CliOverrides::parse_from_env()?;
    let mut config = match &cli.config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.apply_overrides(&cli.into_config_overrides());

    let frames = config.run.frame_count;
    let timestep = config.run.timestep();
    let (width, height) = (config.window.width, config.window.height);

    let mut app = SeleniumApp::new(config)?;
    app.on_resize(width, height)?;
    let (app, stats) = Engine::run_headless(app, frames, timestep)?;

    let gpu = app.gpu_stats();
    log::info!("--- {} Summary ---", app.config().window.title);
    log::info!("  Frames: {} ({:.2} s simulated)", stats.frames, stats.total_time);
    log::info!(
        "  GPU: {} passes, {} draws, {} triangles",
        gpu.passes,
        gpu.draws,
        gpu.triangles
    );
    log::info!("  CPU waits on fences: {}", app.fence_waits());
    if gpu.stale_reads > 0 {
        log::warn!("  Stale reads detected: {}", gpu.stale_reads);
    }
    Ok(())
}
