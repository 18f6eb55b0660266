//! Draws a [`Scene`] each frame.
//!
//! Meshes and textures are uploaded lazily the first frame their asset is
//! `Ready`; until then draws that need a mesh are skipped and textured
//! materials bind a white placeholder. All instances of a frame are packed
//! into one instance buffer and drawn with one `draw_indexed` per batch.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use orrery_assets::{AssetStore, Handle, MeshData, TextureData};
use orrery_scene::{DrawItem, Scene, Shading};

use crate::buffer::{InstanceBuffer, InstanceRaw, MeshBuffer};
use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{RenderPassBuilder, background_clear_color};
use crate::pipeline::{FrameUniform, ScenePipeline, srgb_to_linear};
use crate::texture::{GpuTexture, TextureBinder, TextureError};

/// A contiguous run of instances sharing one mesh and texture.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub mesh: Handle<MeshData>,
    pub texture: Option<Handle<TextureData>>,
    pub instances: Range<u32>,
}

/// Counters from the last rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: usize,
    pub instances: usize,
}

/// Flatten draw items into one instance array plus per-item batches.
pub fn build_batches(items: &[DrawItem]) -> (Vec<InstanceRaw>, Vec<DrawBatch>) {
    let mut instances = Vec::with_capacity(items.iter().map(|i| i.transforms.len()).sum());
    let mut batches = Vec::with_capacity(items.len());

    for item in items {
        if item.transforms.is_empty() {
            continue;
        }
        let color = srgb_to_linear(item.material.color);
        let lit = item.material.shading == Shading::Lambert;
        let start = instances.len() as u32;
        instances.extend(
            item.transforms
                .iter()
                .map(|&model| InstanceRaw::new(model, color, lit)),
        );
        batches.push(DrawBatch {
            mesh: item.mesh,
            texture: item.material.texture,
            instances: start..instances.len() as u32,
        });
    }
    (instances, batches)
}

pub struct SceneRenderer {
    pipeline: ScenePipeline,
    binder: TextureBinder,
    depth: DepthBuffer,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    instances: InstanceBuffer,
    white: GpuTexture,
    meshes: HashMap<u64, MeshBuffer>,
    textures: HashMap<u64, GpuTexture>,
    rejected: HashSet<u64>,
}

impl SceneRenderer {
    pub fn new(ctx: &RenderContext) -> Result<Self, TextureError> {
        let device = &ctx.device;
        let binder = TextureBinder::new(device);
        let pipeline = ScenePipeline::new(device, ctx.surface_format, binder.bind_group_layout());
        let (width, height) = ctx.size();
        let depth = DepthBuffer::new(device, width, height);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: FrameUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &pipeline.frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let white = binder.create(device, &ctx.queue, "white-placeholder", &TextureData::white())?;

        Ok(Self {
            pipeline,
            binder,
            depth,
            frame_buffer,
            frame_bind_group,
            instances: InstanceBuffer::new(device),
            white,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            rejected: HashSet::new(),
        })
    }

    /// Resize the depth buffer to match a reconfigured surface.
    pub fn resize(&mut self, ctx: &RenderContext) {
        let (width, height) = ctx.size();
        self.depth.resize(&ctx.device, width, height);
    }

    /// Render one frame. `SurfaceError::Timeout` means the frame was skipped.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        scene: &Scene,
        camera: &Camera,
        assets: &AssetStore,
    ) -> Result<RenderStats, SurfaceError> {
        let items = scene.graph.draw_list();
        self.upload_ready_assets(ctx, &items, assets);

        let drawable: Vec<DrawItem> = items
            .into_iter()
            .filter(|item| self.meshes.contains_key(&item.mesh.id()))
            .collect();
        let (instances, batches) = build_batches(&drawable);
        self.instances.write(&ctx.device, &ctx.queue, &instances);

        let uniform = FrameUniform::new(camera, &scene.graph.lighting());
        ctx.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniform));

        let frame = ctx.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let builder = RenderPassBuilder::new()
            .clear_color(background_clear_color(scene.background))
            .depth(&self.depth)
            .label("scene-pass");
        {
            let mut pass = builder.begin(&mut encoder, &view);
            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            if !instances.is_empty() {
                pass.set_vertex_buffer(1, self.instances.buffer.slice(..));
            }
            for batch in &batches {
                let Some(mesh) = self.meshes.get(&batch.mesh.id()) else {
                    continue;
                };
                let texture = batch
                    .texture
                    .and_then(|handle| self.textures.get(&handle.id()))
                    .unwrap_or(&self.white);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                mesh.bind(&mut pass);
                mesh.draw_instanced(&mut pass, batch.instances.clone());
            }
        }

        ctx.queue.submit([encoder.finish()]);
        frame.present();

        Ok(RenderStats {
            draw_calls: batches.len(),
            instances: instances.len(),
        })
    }

    pub fn uploaded_mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn uploaded_texture_count(&self) -> usize {
        self.textures.len()
    }

    fn upload_ready_assets(&mut self, ctx: &RenderContext, items: &[DrawItem], assets: &AssetStore) {
        for item in items {
            let mesh_id = item.mesh.id();
            let mesh_state = assets.mesh(item.mesh);
            if !self.meshes.contains_key(&mesh_id)
                && !self.rejected.contains(&mesh_id)
                && let Some(data) = mesh_state.ready()
            {
                match MeshBuffer::from_mesh(&ctx.device, &format!("mesh-{mesh_id}"), data) {
                    Some(buffer) => {
                        self.meshes.insert(mesh_id, buffer);
                    }
                    None => {
                        log::warn!("Mesh {mesh_id} has no triangles, not drawing it");
                        self.rejected.insert(mesh_id);
                    }
                }
            }

            let Some(handle) = item.material.texture else {
                continue;
            };
            let texture_id = handle.id();
            if self.textures.contains_key(&texture_id) || self.rejected.contains(&texture_id) {
                continue;
            }
            if let Some(data) = assets.texture(handle).ready().cloned() {
                match self.binder.create(
                    &ctx.device,
                    &ctx.queue,
                    &format!("texture-{texture_id}"),
                    &data,
                ) {
                    Ok(texture) => {
                        self.textures.insert(texture_id, texture);
                    }
                    Err(e) => {
                        log::warn!("Texture {texture_id} rejected: {e}");
                        self.rejected.insert(texture_id);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};
    use orrery_assets::uv_sphere;
    use orrery_scene::{Material, NodeKind, SceneGraph, Transform};

    fn graph_with_items() -> (SceneGraph, AssetStore) {
        let mut assets = AssetStore::new("assets", 0);
        let sphere = assets.insert_mesh(uv_sphere(8, 6));
        let mut graph = SceneGraph::new();
        graph.add(
            "sun",
            NodeKind::Mesh {
                mesh: sphere,
                material: Material::unlit([1.0; 3]),
            },
            Transform::IDENTITY,
            None,
        );
        graph.add(
            "stars",
            NodeKind::InstancedMesh {
                mesh: sphere,
                material: Material::lambert([0.5; 3]),
                instances: vec![
                    Transform::from_translation(Vec3::X),
                    Transform::from_translation(Vec3::Y),
                    Transform::from_translation(Vec3::Z),
                ],
            },
            Transform::IDENTITY,
            None,
        );
        (graph, assets)
    }

    #[test]
    fn test_batches_cover_every_instance_contiguously() {
        let (graph, _assets) = graph_with_items();
        let (instances, batches) = build_batches(&graph.draw_list());
        assert_eq!(instances.len(), 4);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].instances, 0..1);
        assert_eq!(batches[1].instances, 1..4);
    }

    #[test]
    fn test_batch_instances_carry_shading_and_transform() {
        let (graph, _assets) = graph_with_items();
        let (instances, _) = build_batches(&graph.draw_list());
        assert_eq!(instances[0].color[3], 0.0);
        assert_eq!(instances[1].color[3], 1.0);
        assert_eq!(
            instances[2].model,
            Mat4::from_translation(Vec3::Y).to_cols_array_2d()
        );
    }

    #[test]
    fn test_items_without_transforms_are_skipped() {
        let (graph, _assets) = graph_with_items();
        let mut items = graph.draw_list();
        items[0].transforms.clear();
        let (instances, batches) = build_batches(&items);
        assert_eq!(instances.len(), 3);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].instances, 0..3);
    }

    #[test]
    fn test_empty_draw_list() {
        let (instances, batches) = build_batches(&[]);
        assert!(instances.is_empty());
        assert!(batches.is_empty());
    }
}
