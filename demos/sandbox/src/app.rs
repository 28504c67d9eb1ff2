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


//! The demo application: one frame resource ring feeding a simulated GPU.

use crate::demo_scene::{build_scene, Character};
use crate::gpu::{self, GpuStats, GpuStatsHandle};
use anyhow::{Context, Result};
use selenium_core::math::Vec3;
use selenium_core::renderer::{FrameResourceRing, GpuTimeline, GraphicsDevice};
use selenium_core::time::GameTimer;
use selenium_infra::{HostDevice, HostQueue};
use selenium_sdk::config::AppConfig;
use selenium_sdk::frame_update::{self, MainPassInputs, PASS_COUNT};
use selenium_sdk::{Application, Camera, MouseButton, Scene, SceneLighting, ShadowCaster};
use std::f32::consts::PI;

pub struct SeleniumApp {
    config: AppConfig,
    device: HostDevice,
    queue: HostQueue,
    ring: FrameResourceRing,
    scene: Scene,
    camera: Camera,
    lighting: SceneLighting,
    shadow: ShadowCaster,
    client_size: (u32, u32),
    last_mouse: (i32, i32),
    gpu_stats: GpuStatsHandle,
}

impl SeleniumApp {
    pub fn new(config: AppConfig) -> Result<Self> {
        let device = HostDevice::new();
        let queue = HostQueue::new(config.run.gpu_latency());

        let character = Character::load(&config.model)?;
        let scene = build_scene(
            config.render.frames_in_flight,
            &character,
            &config.model.clip_name,
        )?;
        let ring = FrameResourceRing::new(
            &device,
            &config.render,
            &scene.frame_resource_descriptor(PASS_COUNT),
        )
        .context("Failed to allocate frame resources")?;
        scene.check_slot_count(ring.slot_count())?;

        let mut camera = Camera::new();
        camera.set_position(Vec3::new(0.0, 2.0, -15.0));

        let lighting = SceneLighting::default();
        let shadow = ShadowCaster::fit(scene.bounds(), lighting.key_direction());
        let client_size = (config.window.width, config.window.height);

        Ok(Self {
            config,
            device,
            queue,
            ring,
            scene,
            camera,
            lighting,
            shadow,
            client_size,
            last_mouse: (0, 0),
            gpu_stats: GpuStatsHandle::default(),
        })
    }

    pub fn gpu_stats(&self) -> GpuStats {
        self.gpu_stats.snapshot()
    }

    pub fn fence_waits(&self) -> u64 {
        self.ring.wait_count()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl Application for SeleniumApp {
    fn on_resize(&mut self, width: u32, height: u32) -> Result<()> {
        // Nothing may be in flight while size-dependent resources change.
        self.ring.flush(&self.queue)?;
        self.client_size = (width, height);
        let aspect = width as f32 / height.max(1) as f32;
        self.camera.set_lens(0.25 * PI, aspect, 1.0, 1000.0);
        log::debug!("Resized to {width}x{height}");
        Ok(())
    }

    fn on_mouse_down(&mut self, _button: MouseButton, x: i32, y: i32) {
        self.last_mouse = (x, y);
    }

    fn on_mouse_move(&mut self, held: Option<MouseButton>, x: i32, y: i32) {
        if held == Some(MouseButton::Left) {
            // A quarter of a degree per pixel.
            let dx = (0.25 * (x - self.last_mouse.0) as f32).to_radians();
            let dy = (0.25 * (y - self.last_mouse.1) as f32).to_radians();
            self.camera.pitch(-dy);
            self.camera.rotate_y(dx);
        }
        self.last_mouse = (x, y);
    }

    fn update(&mut self, timer: &GameTimer) -> Result<()> {
        // Blocks until the GPU is done with the slot we are about to fill.
        self.ring.advance(&self.queue)?;
        let dt = timer.delta_time();

        self.camera.update_view_matrix();
        self.lighting.animate(dt);
        self.shadow = ShadowCaster::fit(self.scene.bounds(), self.lighting.key_direction());
        frame_update::tick_skinned_instances(&mut self.scene, dt)?;

        let device = &self.device;
        let frame = self.ring.current();
        frame_update::update_object_constants(device, frame, &mut self.scene)?;
        frame_update::update_material_buffer(device, frame, &mut self.scene)?;
        frame_update::update_skinned_constants(device, frame, &self.scene)?;
        frame_update::update_shadow_pass(
            device,
            frame,
            &self.shadow,
            self.config.render.shadow_map_size,
        )?;
        frame_update::update_main_pass(
            device,
            frame,
            &MainPassInputs {
                camera: &self.camera,
                timer,
                lighting: &self.lighting,
                shadow: &self.shadow,
                client_size: self.client_size,
            },
        )?;
        Ok(())
    }

    fn draw(&mut self, _timer: &GameTimer) -> Result<()> {
        let frame = self.ring.current();
        // Safe to reuse: advance() waited for this slot's fence.
        self.device.reset_command_allocator(frame.cmd_list_alloc)?;

        let recording = gpu::record_frame(frame, &self.scene);
        self.queue.submit(gpu::gpu_work(
            self.device.clone(),
            recording,
            self.gpu_stats.clone(),
        ))?;
        self.ring.submit(&self.queue)?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.ring.flush(&self.queue)?;
        log::info!(
            "GPU idle at fence {} after {} CPU waits",
            self.queue.completed_value(),
            self.ring.wait_count()
        );
        Ok(())
    }
}
