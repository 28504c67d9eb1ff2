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

use selenium_core::math::{Mat4, Vec3};
use selenium_core::renderer::{
    FrameResourceDescriptor, FrameResourceRing, GpuTimeline, GraphicsDevice, ObjectConstants,
    RenderError, RenderSettings,
};
use selenium_infra::{HostDevice, HostQueue};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn descriptor() -> FrameResourceDescriptor {
    FrameResourceDescriptor {
        pass_count: 2,
        object_count: 8,
        skinned_count: 1,
        material_count: 4,
    }
}

fn object_at(x: f32) -> ObjectConstants {
    ObjectConstants {
        world: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
        ..ObjectConstants::default()
    }
}

#[test]
fn test_gpu_reads_exactly_what_the_cpu_wrote() {
    // --- ARRANGE ---
    let device = HostDevice::new();
    let queue = HostQueue::new(Duration::from_millis(2));
    let mut ring = FrameResourceRing::new(&device, &RenderSettings::default(), &descriptor())
        .expect("ring allocation");
    let observed = Arc::new(Mutex::new(Vec::new()));

    // --- ACT ---
    // Each frame writes a distinct value into object slot 5 of its ring slot
    // and submits GPU work that reads it back.
    for frame in 0..9 {
        ring.advance(&queue).unwrap();
        let object_cb = &ring.current().object_cb;
        let written = object_at(frame as f32);
        object_cb.copy_data(&device, 5, &written).unwrap();

        let gpu_device = device.clone();
        let (buffer, offset) = (object_cb.buffer(), object_cb.offset_of(5));
        let observed = Arc::clone(&observed);
        queue
            .submit(move || {
                let bytes = gpu_device
                    .read_buffer(buffer, offset, std::mem::size_of::<ObjectConstants>() as u64)
                    .unwrap();
                observed.lock().unwrap().push(bytes);
            })
            .unwrap();
        ring.submit(&queue).unwrap();
    }
    ring.flush(&queue).unwrap();

    // --- ASSERT ---
    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 9);
    for (frame, bytes) in observed.iter().enumerate() {
        let expected = object_at(frame as f32);
        assert_eq!(bytes.as_slice(), bytemuck::bytes_of(&expected), "frame {frame}");
    }
    assert_eq!(queue.completed_value(), 9);
    // With two milliseconds of GPU latency the CPU runs ahead and must block.
    assert!(ring.wait_count() > 0);
}

#[test]
fn test_ring_never_writes_a_slot_the_gpu_is_reading() {
    let device = HostDevice::new();
    let queue = HostQueue::new(Duration::from_millis(1));
    let mut ring = FrameResourceRing::new(&device, &RenderSettings::default(), &descriptor())
        .expect("ring allocation");

    for _ in 0..12 {
        ring.advance(&queue).unwrap();
        let slot_fence = ring.current().fence;
        // Either never submitted, or the GPU is done with it.
        assert!(slot_fence == 0 || queue.completed_value() >= slot_fence);
        queue.submit(|| {}).unwrap();
        ring.submit(&queue).unwrap();
    }
    ring.flush(&queue).unwrap();
    ring.destroy(&device).unwrap();
    assert_eq!(device.buffer_count(), 0);
    assert_eq!(device.allocated_bytes(), 0);
}

#[test]
fn test_stalled_gpu_surfaces_fence_timeout() {
    let device = HostDevice::new();
    let queue = HostQueue::new(Duration::ZERO);
    let settings = RenderSettings {
        fence_wait_timeout_ms: Some(30),
        ..RenderSettings::default()
    };
    let mut ring = FrameResourceRing::new(&device, &settings, &descriptor()).unwrap();

    queue.pause();
    for _ in 0..settings.frames_in_flight {
        ring.advance(&queue).unwrap();
        ring.submit(&queue).unwrap();
    }

    match ring.advance(&queue) {
        Err(RenderError::FenceTimeout {
            fence_value,
            completed_value,
            waited,
        }) => {
            assert_eq!(fence_value, 1);
            assert_eq!(completed_value, 0);
            assert!(waited >= Duration::from_millis(30));
        }
        other => panic!("expected a fence timeout, got {other:?}"),
    }
    queue.resume();
}

#[test]
fn test_allocation_failure_is_fatal_to_construction() {
    let device = HostDevice::with_budget(Some(1024));
    let err = FrameResourceRing::new(&device, &RenderSettings::default(), &descriptor()).unwrap_err();
    assert!(matches!(err, RenderError::ResourceError(_)));
    assert_eq!(device.buffer_count(), 0);
    assert_eq!(device.command_allocator_count(), 0);
}
