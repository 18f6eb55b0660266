//! GPU textures built from decoded [`TextureData`], each with a ready-to-bind
//! texture + sampler bind group (group 1 of the scene pipeline).

use orrery_assets::TextureData;

/// Uploaded texture plus its bind group.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Image textures are authored in sRGB; sampling returns linear values.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const BYTES_PER_PIXEL: u32 = 4;

/// Shared bind group layout and sampler for all material textures.
pub struct TextureBinder {
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl TextureBinder {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-linear"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Self {
            bind_group_layout,
            sampler,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn create(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &TextureData,
    ) -> Result<GpuTexture, TextureError> {
        validate(data)?;
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(data.width * BYTES_PER_PIXEL),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        log::info!("Created texture '{label}' ({}x{})", data.width, data.height);
        Ok(GpuTexture {
            texture,
            view,
            bind_group,
            dimensions: (data.width, data.height),
        })
    }
}

fn validate(data: &TextureData) -> Result<(), TextureError> {
    if data.width == 0 || data.height == 0 {
        return Err(TextureError::ZeroDimensions {
            width: data.width,
            height: data.height,
        });
    }
    let expected = data.width as usize * data.height as usize * BYTES_PER_PIXEL as usize;
    if data.rgba.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.rgba.len(),
            expected,
            width: data.width,
            height: data.height,
        });
    }
    Ok(())
}

/// Create a test GPU device and queue. Returns `None` if no GPU is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_white() {
        assert!(validate(&TextureData::white()).is_ok());
    }

    #[test]
    fn test_zero_dimensions_returns_error() {
        let data = TextureData {
            width: 0,
            height: 4,
            rgba: Vec::new(),
        };
        assert!(matches!(
            validate(&data),
            Err(TextureError::ZeroDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_data_size_mismatch_returns_error() {
        let data = TextureData {
            width: 2,
            height: 2,
            rgba: vec![0; 12],
        };
        assert!(matches!(
            validate(&data),
            Err(TextureError::DataSizeMismatch {
                actual: 12,
                expected: 16,
                ..
            })
        ));
    }

    #[test]
    fn test_create_texture_on_device() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let binder = TextureBinder::new(&device);
        let data = TextureData {
            width: 4,
            height: 2,
            rgba: vec![128; 32],
        };
        let texture = binder.create(&device, &queue, "test", &data).unwrap();
        assert_eq!(texture.dimensions, (4, 2));
        assert_eq!(texture.texture.format(), TEXTURE_FORMAT);
    }
}
