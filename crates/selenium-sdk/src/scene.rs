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


//! The fixed scene: materials, render items and skinned instances.
//!
//! Every record that feeds a GPU buffer carries a [`FramesDirty`] counter.
//! Mutating it through the scene marks the counter so the change reaches
//! every slot of the frame ring.

use anyhow::{ensure, Result};
use selenium_core::math::{Mat4, Vec3};
use selenium_core::renderer::{FrameResourceDescriptor, FramesDirty, MaterialData};
use selenium_core::SkinnedController;
use selenium_io::Subset;

/// Draw buckets, drawn in declaration order by the main pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderLayer {
    Opaque,
    SkinnedOpaque,
    Debug,
    Sky,
}

impl RenderLayer {
    pub const COUNT: usize = 4;

    pub const ALL: [RenderLayer; Self::COUNT] = [
        RenderLayer::Opaque,
        RenderLayer::SkinnedOpaque,
        RenderLayer::Debug,
        RenderLayer::Sky,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Whether items of this layer are drawn into the shadow map.
    pub fn casts_shadows(self) -> bool {
        matches!(self, RenderLayer::Opaque | RenderLayer::SkinnedOpaque)
    }
}

/// Index range of one mesh inside a shared vertex/index buffer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Submesh {
    pub index_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
}

impl Submesh {
    /// The draw range of an M3D subset. Subsets count triangles.
    pub fn from_subset(subset: &Subset) -> Self {
        Self {
            index_count: subset.face_count * 3,
            start_index: subset.face_start * 3,
            base_vertex: 0,
        }
    }
}

/// A sphere enclosing the whole scene, used to fit the shadow frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    pub diffuse_srv_index: u32,
    pub normal_srv_index: u32,
    pub diffuse_albedo: [f32; 4],
    pub fresnel_r0: Vec3,
    pub roughness: f32,
    pub mat_transform: Mat4,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse_srv_index: 0,
            normal_srv_index: 0,
            diffuse_albedo: [1.0; 4],
            fresnel_r0: Vec3::new(0.01, 0.01, 0.01),
            roughness: 0.25,
            mat_transform: Mat4::IDENTITY,
        }
    }
}

/// A material and its slot in the per-frame material buffer.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub mat_cb_index: usize,
    pub diffuse_srv_index: u32,
    pub normal_srv_index: u32,
    pub diffuse_albedo: [f32; 4],
    pub fresnel_r0: Vec3,
    pub roughness: f32,
    pub mat_transform: Mat4,
    pub frames_dirty: FramesDirty,
}

impl Material {
    /// The GPU image of this material.
    pub fn to_material_data(&self) -> MaterialData {
        MaterialData {
            diffuse_albedo: self.diffuse_albedo,
            fresnel_r0: self.fresnel_r0,
            roughness: self.roughness,
            mat_transform: self.mat_transform,
            diffuse_map_index: self.diffuse_srv_index,
            normal_map_index: self.normal_srv_index,
            _pad: [0; 2],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderItemDesc {
    pub world: Mat4,
    pub tex_transform: Mat4,
    pub material: usize,
    pub layer: RenderLayer,
    pub submesh: Submesh,
    /// Index of the [`SkinnedInstance`] animating this item.
    pub skinned_instance: Option<usize>,
}

impl Default for RenderItemDesc {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            tex_transform: Mat4::IDENTITY,
            material: 0,
            layer: RenderLayer::Opaque,
            submesh: Submesh::default(),
            skinned_instance: None,
        }
    }
}

/// One drawable: a submesh, its material and its per-object constants.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub world: Mat4,
    pub tex_transform: Mat4,
    pub frames_dirty: FramesDirty,
    /// Slot in the per-object constant buffer.
    pub obj_cb_index: usize,
    pub material: usize,
    pub layer: RenderLayer,
    pub submesh: Submesh,
    /// Slot in the bone transform buffer, for skinned items.
    pub skinned_cb_index: Option<usize>,
    pub skinned_instance: Option<usize>,
}

/// A playing animation and its slot in the bone transform buffer.
///
/// Several render items (one per subset of a model) point at the same instance.
#[derive(Debug)]
pub struct SkinnedInstance {
    pub controller: SkinnedController,
    pub cb_index: usize,
}

#[derive(Debug)]
pub struct Scene {
    ring_size: usize,
    pub(crate) materials: Vec<Material>,
    pub(crate) items: Vec<RenderItem>,
    pub(crate) skinned: Vec<SkinnedInstance>,
    layers: [Vec<usize>; RenderLayer::COUNT],
    bounds: BoundingSphere,
}

impl Scene {
    /// An empty scene whose records are propagated to `ring_size` frame resources.
    pub fn new(ring_size: usize, bounds: BoundingSphere) -> Self {
        Self {
            ring_size,
            materials: Vec::new(),
            items: Vec::new(),
            skinned: Vec::new(),
            layers: Default::default(),
            bounds,
        }
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size
    }

    /// Fails unless the scene propagates its changes to exactly `slot_count` frame resources.
    pub fn check_slot_count(&self, slot_count: usize) -> Result<()> {
        ensure!(
            self.ring_size == slot_count,
            "scene propagates changes to {} frame resources but the ring has {slot_count}",
            self.ring_size
        );
        Ok(())
    }

    pub fn bounds(&self) -> BoundingSphere {
        self.bounds
    }

    /// Adds a material and returns its index, which is also its buffer slot.
    pub fn add_material(&mut self, desc: MaterialDesc) -> usize {
        let index = self.materials.len();
        self.materials.push(Material {
            name: desc.name,
            mat_cb_index: index,
            diffuse_srv_index: desc.diffuse_srv_index,
            normal_srv_index: desc.normal_srv_index,
            diffuse_albedo: desc.diffuse_albedo,
            fresnel_r0: desc.fresnel_r0,
            roughness: desc.roughness,
            mat_transform: desc.mat_transform,
            frames_dirty: FramesDirty::new(self.ring_size),
        });
        index
    }

    /// Adds a playing animation and returns its index.
    pub fn add_skinned_instance(&mut self, controller: SkinnedController) -> usize {
        let index = self.skinned.len();
        self.skinned.push(SkinnedInstance {
            controller,
            cb_index: index,
        });
        index
    }

    /// Adds a render item and returns its index, which is also its object slot.
    ///
    /// # Errors
    ///
    /// Fails if the material or skinned instance does not exist.
    pub fn add_item(&mut self, desc: RenderItemDesc) -> Result<usize> {
        ensure!(
            desc.material < self.materials.len(),
            "render item refers to missing material {}",
            desc.material
        );
        let skinned_cb_index = match desc.skinned_instance {
            Some(instance) => {
                let Some(skinned) = self.skinned.get(instance) else {
                    anyhow::bail!("render item refers to missing skinned instance {instance}");
                };
                Some(skinned.cb_index)
            }
            None => None,
        };

        let index = self.items.len();
        self.items.push(RenderItem {
            world: desc.world,
            tex_transform: desc.tex_transform,
            frames_dirty: FramesDirty::new(self.ring_size),
            obj_cb_index: index,
            material: desc.material,
            layer: desc.layer,
            submesh: desc.submesh,
            skinned_cb_index,
            skinned_instance: desc.skinned_instance,
        });
        self.layers[desc.layer.index()].push(index);
        Ok(index)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn skinned_instances(&self) -> &[SkinnedInstance] {
        &self.skinned
    }

    /// Indices of the items in `layer`, in insertion order.
    pub fn layer(&self, layer: RenderLayer) -> &[usize] {
        &self.layers[layer.index()]
    }

    /// Moves an item and schedules the new transform for every frame resource.
    pub fn set_item_world(&mut self, item: usize, world: Mat4) -> Result<()> {
        let Some(item) = self.items.get_mut(item) else {
            anyhow::bail!("no render item {item}");
        };
        item.world = world;
        item.frames_dirty.mark();
        Ok(())
    }

    /// Edits a material and schedules it for every frame resource.
    pub fn update_material(&mut self, material: usize, edit: impl FnOnce(&mut Material)) -> Result<()> {
        let Some(material) = self.materials.get_mut(material) else {
            anyhow::bail!("no material {material}");
        };
        edit(material);
        material.frames_dirty.mark();
        Ok(())
    }

    /// Buffer sizes a frame resource needs to hold this scene.
    pub fn frame_resource_descriptor(&self, pass_count: usize) -> FrameResourceDescriptor {
        FrameResourceDescriptor {
            pass_count,
            object_count: self.items.len(),
            skinned_count: self.skinned.len(),
            material_count: self.materials.len(),
        }
    }
}
