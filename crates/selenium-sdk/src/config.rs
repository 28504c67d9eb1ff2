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


//! Application configuration loaded from JSON.

use anyhow::{Context, Result};
use selenium_core::renderer::RenderSettings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Selenium".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl WindowConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Settings of the skinned character.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path of an `.m3d` file. The built-in rig is used when absent.
    pub path: Option<PathBuf>,
    /// Clip played by the character's controller.
    pub clip_name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            clip_name: "Take1".to_string(),
        }
    }
}

/// Settings of the headless run loop and the simulated GPU.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub frame_count: u64,
    /// Fixed simulation step, in milliseconds.
    pub timestep_ms: f64,
    /// Time the simulated GPU spends on each submission, in milliseconds.
    pub gpu_latency_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frame_count: 600,
            timestep_ms: 1000.0 / 60.0,
            gpu_latency_ms: 4,
        }
    }
}

impl RunConfig {
    pub fn timestep(&self) -> Duration {
        Duration::from_secs_f64(self.timestep_ms.max(0.0) / 1000.0)
    }

    pub fn gpu_latency(&self) -> Duration {
        Duration::from_millis(self.gpu_latency_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub model: ModelConfig,
    pub run: RunConfig,
    pub render: RenderSettings,
}

/// Values that take precedence over the loaded file.
#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub frames: Option<u64>,
    pub model_path: Option<PathBuf>,
}

impl AppConfig {
    /// Reads a configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(frames) = overrides.frames {
            self.run.frame_count = frames;
        }
        if let Some(path) = &overrides.model_path {
            self.model.path = Some(path.clone());
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.render.frames_in_flight > 0,
            "render.frames_in_flight must be at least 1"
        );
        anyhow::ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window size must be non-zero, got {}x{}",
            self.window.width,
            self.window.height
        );
        anyhow::ensure!(self.run.timestep_ms > 0.0, "run.timestep_ms must be positive");
        anyhow::ensure!(
            self.render.constant_buffer_alignment.is_power_of_two(),
            "render.constant_buffer_alignment must be a power of two, got {}",
            self.render.constant_buffer_alignment
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_yields_defaults() {
        let config = AppConfig::from_json("{}").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model.clip_name, "Take1");
        assert_eq!(config.render.frames_in_flight, 3);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = AppConfig::from_json(
            r#"{ "window": { "width": 1280 }, "render": { "fence_wait_timeout_ms": null } }"#,
        )
        .expect("parse");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.render.fence_wait_timeout_ms, None);
        assert_eq!(config.render.shadow_map_size, 2048);
    }

    #[test]
    fn test_zero_frames_in_flight_is_rejected() {
        let err = AppConfig::from_json(r#"{ "render": { "frames_in_flight": 0 } }"#).unwrap_err();
        assert!(err.to_string().contains("frames_in_flight"));
    }

    #[test]
    fn test_constant_buffer_alignment_must_be_a_power_of_two() {
        for alignment in [0, 100] {
            let json = format!(r#"{{ "render": {{ "constant_buffer_alignment": {alignment} }} }}"#);
            let err = AppConfig::from_json(&json).unwrap_err();
            assert!(err.to_string().contains("constant_buffer_alignment"));
        }
        let config =
            AppConfig::from_json(r#"{ "render": { "constant_buffer_alignment": 512 } }"#).expect("parse");
        assert_eq!(config.render.constant_buffer_alignment, 512);
    }

    #[test]
    fn test_overrides_replace_loaded_values() {
        let mut config = AppConfig::default();
        config.apply_overrides(&AppConfigOverrides {
            frames: Some(12),
            model_path: Some(PathBuf::from("soldier.m3d")),
        });
        assert_eq!(config.run.frame_count, 12);
        assert_eq!(config.model.path, Some(PathBuf::from("soldier.m3d")));
    }

    #[test]
    fn test_load_reads_a_file_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("selenium.json");
        fs::write(&path, r#"{ "run": { "frame_count": 5, "gpu_latency_ms": 0 } }"#).expect("write");

        let config = AppConfig::load(&path).expect("load");

        assert_eq!(config.run.frame_count, 5);
        assert_eq!(config.run.gpu_latency(), Duration::ZERO);
    }

    #[test]
    fn test_load_reports_the_missing_path() {
        let err = AppConfig::load("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }
}
