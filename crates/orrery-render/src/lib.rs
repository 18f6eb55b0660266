//! wgpu rendering for orrery scenes: device and surface setup, the orbit camera,
//! and a single instanced pipeline that draws a scene graph's draw list.

pub mod buffer;
pub mod camera;
pub mod controls;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod pipeline;
pub mod renderer;
pub mod surface;
pub mod texture;

pub use buffer::{InstanceBuffer, InstanceRaw, MeshBuffer, VertexPositionNormalUv};
pub use camera::Camera;
pub use controls::{OrbitControls, PITCH_LIMIT};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{RenderPassBuilder, background_clear_color};
pub use pipeline::{FrameUniform, SCENE_SHADER_SOURCE, ScenePipeline, srgb_to_linear};
pub use renderer::{DrawBatch, RenderStats, SceneRenderer, build_batches};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper, clamp_pixel_ratio};
pub use texture::{GpuTexture, TextureBinder, TextureError};
