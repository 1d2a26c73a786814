//! Bind group layout builders for compute pipelines.
//!
//! Every effect kernel uses the same slots:
//!
//! | binding | resource |
//! |---|---|
//! | 0 | input `texture_2d<f32>` (read with `textureLoad`) |
//! | 1 | output `texture_storage_2d<rgba8unorm, write>` |
//! | 2 | uniform parameters |
//! | 3 | optional read-only storage buffer (lookup tables) |

use wgpu::{BindGroupLayout, BindGroupLayoutEntry, Device, ShaderStages, TextureFormat};

/// Builder for creating bind group layouts with common patterns.
pub struct BindGroupLayoutBuilder {
    label: Option<&'static str>,
    entries: Vec<BindGroupLayoutEntry>,
}

impl BindGroupLayoutBuilder {
    pub fn new(label: &'static str) -> Self {
        Self {
            label: Some(label),
            entries: Vec::new(),
        }
    }

    /// Add a uniform buffer entry.
    pub fn uniform(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    /// Add a sampled 2D texture entry.
    pub fn texture_2d(mut self, binding: u32, visibility: ShaderStages) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        self
    }

    /// Add a write-only 2D storage texture entry.
    pub fn storage_texture(
        mut self,
        binding: u32,
        visibility: ShaderStages,
        format: TextureFormat,
    ) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        });
        self
    }

    /// Add a storage buffer entry.
    pub fn storage_buffer(mut self, binding: u32, visibility: ShaderStages, read_only: bool) -> Self {
        self.entries.push(BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the bind group layout.
    pub fn build(self, device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: self.label,
            entries: &self.entries,
        })
    }
}

/// Standard effect layout builder: input texture, output storage texture,
/// uniforms, and a lookup buffer when `with_lookup` is set.
pub fn effect_layout_builder(label: &'static str, with_lookup: bool) -> BindGroupLayoutBuilder {
    let builder = BindGroupLayoutBuilder::new(label)
        .texture_2d(0, ShaderStages::COMPUTE)
        .storage_texture(1, ShaderStages::COMPUTE, TextureFormat::Rgba8Unorm)
        .uniform(2, ShaderStages::COMPUTE);
    if with_lookup {
        builder.storage_buffer(3, ShaderStages::COMPUTE, true)
    } else {
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::gpu::acquire_device;

    #[test]
    fn test_effect_layout_slots() {
        assert_eq!(effect_layout_builder("plain", false).len(), 3);
        assert_eq!(effect_layout_builder("lookup", true).len(), 4);
    }

    #[tokio::test]
    async fn test_effect_layout_creation() {
        let resources = match acquire_device(&DeviceConfig::default(), |_, _| ()).await {
            Ok(resources) => resources,
            Err(_) => return, // Skip if no GPU
        };

        let _plain = effect_layout_builder("plain", false).build(&resources.device);
        let _lookup = effect_layout_builder("lookup", true).build(&resources.device);
    }
}
