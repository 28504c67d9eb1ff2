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


use anyhow::Result;
use selenium_core::animation::{AnimationClip, BoneAnimation, Keyframe};
use selenium_core::math::{Mat4, Quaternion, Vec3};
use selenium_core::renderer::{FrameResourceRing, GpuTimeline, RenderSettings};
use selenium_core::{SkinnedController, SkinnedData};
use selenium_infra::{HostDevice, HostQueue};
use selenium_sdk::frame_update::{
    tick_skinned_instances, update_material_buffer, update_object_constants,
    update_skinned_constants, PASS_COUNT,
};
use selenium_sdk::{BoundingSphere, MaterialDesc, RenderItemDesc, RenderLayer, Scene};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn bounds() -> BoundingSphere {
    BoundingSphere {
        center: Vec3::ZERO,
        radius: 18.0,
    }
}

/// One bone sliding from x = 0 to x = 4 over four seconds.
fn slide_rig() -> Arc<SkinnedData> {
    let track = BoneAnimation::new(vec![
        Keyframe::new(0.0, Vec3::ZERO, Vec3::ONE, Quaternion::IDENTITY),
        Keyframe::new(4.0, Vec3::new(4.0, 0.0, 0.0), Vec3::ONE, Quaternion::IDENTITY),
    ]);
    let clips = HashMap::from([("Take1".to_string(), AnimationClip::new(vec![track]))]);
    Arc::new(SkinnedData::new(vec![-1], vec![Mat4::IDENTITY], clips).expect("valid rig"))
}

/// Runs one frame: waits for the slot, lets `fill` write it, then submits.
fn frame<F>(ring: &mut FrameResourceRing, queue: &HostQueue, fill: F) -> Result<usize>
where
    F: FnOnce(&FrameResourceRing) -> Result<usize>,
{
    ring.advance(queue)?;
    let copies = fill(ring)?;
    queue.submit(|| {})?;
    ring.submit(queue)?;
    Ok(copies)
}

#[test]
fn test_object_change_reaches_every_slot_exactly_once() -> Result<()> {
    // --- ARRANGE ---
    let device = HostDevice::new();
    let queue = HostQueue::new(Duration::ZERO);
    let mut scene = Scene::new(3, bounds());
    scene.add_material(MaterialDesc::default());
    let item = scene.add_item(RenderItemDesc::default())?;
    let mut ring = FrameResourceRing::new(
        &device,
        &RenderSettings::default(),
        &scene.frame_resource_descriptor(PASS_COUNT),
    )?;

    // --- ACT ---
    // Drain the initial upload, then move the item.
    for _ in 0..3 {
        frame(&mut ring, &queue, |ring| {
            Ok(update_object_constants(&device, ring.current(), &mut scene)?)
        })?;
    }
    let moved = Mat4::from_translation(Vec3::new(0.0, 0.0, 7.0));
    scene.set_item_world(item, moved)?;

    let mut copies = Vec::new();
    for _ in 0..4 {
        copies.push(frame(&mut ring, &queue, |ring| {
            Ok(update_object_constants(&device, ring.current(), &mut scene)?)
        })?);
    }
    ring.flush(&queue)?;

    // --- ASSERT ---
    assert_eq!(copies, vec![1, 1, 1, 0]);
    assert_eq!(scene.items()[item].frames_dirty.remaining(), 0);
    for slot in 0..ring.slot_count() {
        let frame = ring.frame(slot).expect("slot exists");
        let written = frame.object_cb.read_element(&device, item)?;
        assert_eq!(written.world, moved, "slot {slot}");
    }
    Ok(())
}

#[test]
fn test_material_change_converges_like_objects() -> Result<()> {
    // --- ARRANGE ---
    let device = HostDevice::new();
    let queue = HostQueue::new(Duration::ZERO);
    let mut scene = Scene::new(3, bounds());
    let brick = scene.add_material(MaterialDesc {
        name: "bricks".to_string(),
        ..MaterialDesc::default()
    });
    let mut ring = FrameResourceRing::new(
        &device,
        &RenderSettings::default(),
        &scene.frame_resource_descriptor(PASS_COUNT),
    )?;
    for _ in 0..3 {
        frame(&mut ring, &queue, |ring| {
            Ok(update_material_buffer(&device, ring.current(), &mut scene)?)
        })?;
    }

    // --- ACT ---
    scene.update_material(brick, |m| m.diffuse_albedo = [0.2, 0.3, 0.4, 1.0])?;
    let mut copies = Vec::new();
    for _ in 0..4 {
        copies.push(frame(&mut ring, &queue, |ring| {
            Ok(update_material_buffer(&device, ring.current(), &mut scene)?)
        })?);
    }
    ring.flush(&queue)?;

    // --- ASSERT ---
    assert_eq!(copies, vec![1, 1, 1, 0]);
    for slot in 0..ring.slot_count() {
        let frame = ring.frame(slot).expect("slot exists");
        let data = frame.material_buffer.read_element(&device, brick)?;
        assert_eq!(data.diffuse_albedo, [0.2, 0.3, 0.4, 1.0], "slot {slot}");
    }
    Ok(())
}

#[test]
fn test_instances_sharing_skinned_data_animate_independently() -> Result<()> {
    // --- ARRANGE ---
    let device = HostDevice::new();
    let queue = HostQueue::new(Duration::ZERO);
    let rig = slide_rig();
    let mut scene = Scene::new(3, bounds());
    scene.add_material(MaterialDesc::default());

    let first = scene.add_skinned_instance(SkinnedController::new(Arc::clone(&rig), "Take1")?);
    let mut late = SkinnedController::new(Arc::clone(&rig), "Take1")?;
    late.tick(2.0)?;
    let second = scene.add_skinned_instance(late);
    for instance in [first, second] {
        scene.add_item(RenderItemDesc {
            layer: RenderLayer::SkinnedOpaque,
            skinned_instance: Some(instance),
            ..RenderItemDesc::default()
        })?;
    }
    let mut ring = FrameResourceRing::new(
        &device,
        &RenderSettings::default(),
        &scene.frame_resource_descriptor(PASS_COUNT),
    )?;

    // --- ACT ---
    tick_skinned_instances(&mut scene, 1.0)?;
    let copies = frame(&mut ring, &queue, |ring| {
        Ok(update_skinned_constants(&device, ring.current(), &scene)?)
    })?;
    ring.flush(&queue)?;

    // --- ASSERT ---
    assert_eq!(copies, 2);
    assert_eq!(Arc::strong_count(&rig), 3);
    let skinned_cb = &ring.current().skinned_cb;
    let a = skinned_cb.read_element(&device, 0)?;
    let b = skinned_cb.read_element(&device, 1)?;
    assert_eq!(a.bone_transforms[0].translation(), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(b.bone_transforms[0].translation(), Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(queue.completed_value(), ring.fence_counter());
    Ok(())
}
