//! The single instanced scene pipeline.
//!
//! Group 0 holds the per-frame [`FrameUniform`] (camera and lights), group 1 a
//! material texture. Every draw is instanced: per-instance model matrix and
//! tint come from [`InstanceRaw`], whose `color.w` selects Lambert or unlit
//! shading.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use orrery_scene::Lighting;

use crate::buffer::{InstanceRaw, VertexPositionNormalUv};
use crate::camera::Camera;
use crate::depth::DepthBuffer;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// Linear ambient light color.
    pub ambient: [f32; 4],
    /// Unit vector from surfaces toward the directional light.
    pub light_dir: [f32; 4],
    /// Linear directional light color, premultiplied by intensity.
    pub light_color: [f32; 4],
}

impl FrameUniform {
    pub const SIZE: u64 = std::mem::size_of::<FrameUniform>() as u64;

    pub fn new(camera: &Camera, lighting: &Lighting) -> Self {
        let p = camera.position;
        let d = lighting.direction;
        let ambient = srgb_to_linear(lighting.ambient);
        let light = srgb_to_linear(lighting.color);
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: [p.x, p.y, p.z, 1.0],
            ambient: [ambient[0], ambient[1], ambient[2], 0.0],
            light_dir: [d.x, d.y, d.z, 0.0],
            light_color: [light[0], light[1], light[2], 0.0],
        }
    }
}

/// Convert one sRGB-encoded channel to linear.
pub fn srgb_channel_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Config and material colors are authored in sRGB; the surface is an sRGB
/// target, so shader math runs on linear values.
pub fn srgb_to_linear(color: [f32; 3]) -> [f32; 3] {
    color.map(srgb_channel_to_linear)
}

pub struct ScenePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
}

impl ScenePipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene-shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_SHADER_SOURCE.into()),
        });

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("frame-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(FrameUniform::SIZE),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene-pipeline-layout"),
            bind_group_layouts: &[&frame_bind_group_layout, texture_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexPositionNormalUv::layout(), InstanceRaw::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: DepthBuffer::COMPARE_FUNCTION,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            frame_bind_group_layout,
        }
    }
}

pub const SCENE_SHADER_SOURCE: &str = r#"
struct FrameUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniform;

@group(1) @binding(0)
var t_diffuse: texture_2d<f32>;
@group(1) @binding(1)
var s_diffuse: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(instance.model_0, instance.model_1, instance.model_2, instance.model_3);
    let world = model * vec4<f32>(vertex.position, 1.0);
    let normal_matrix = mat3x3<f32>(model[0].xyz, model[1].xyz, model[2].xyz);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_normal = normal_matrix * vertex.normal;
    out.uv = vertex.uv;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(t_diffuse, s_diffuse, in.uv).rgb * in.color.rgb;
    if (in.color.w < 0.5) {
        return vec4<f32>(base, 1.0);
    }
    let n = normalize(in.world_normal);
    let diffuse = max(dot(n, normalize(frame.light_dir.xyz)), 0.0);
    let light = frame.ambient.rgb + frame.light_color.rgb * diffuse;
    return vec4<f32>(base * light, 1.0);
}
"#;
