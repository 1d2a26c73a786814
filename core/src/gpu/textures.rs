//! Device textures and readback buffers for effect passes.

use wgpu::{Device, Queue, Texture, TextureFormat, TextureUsages, TextureView};

use super::GpuError;
use crate::buffer::{ImageBuffer, BYTES_PER_PIXEL};

/// An RGBA8 texture that can be uploaded to, read by a kernel, written as a
/// storage texture, and copied out.
/// The texture must outlive its view, so we keep them together.
pub struct EffectTexture {
    texture: Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl EffectTexture {
    pub fn new(device: &Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage: TextureUsages::TEXTURE_BINDING
                | TextureUsages::STORAGE_BINDING
                | TextureUsages::COPY_SRC
                | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Upload `image`, which must match the texture's size.
    pub fn upload(&self, queue: &Queue, image: &ImageBuffer) {
        debug_assert_eq!(image.dimensions(), (self.width, self.height));
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.row_bytes() as u32),
                rows_per_image: Some(self.height),
            },
            self.extent(),
        );
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// Readback buffer for a texture whose row bytes are already aligned.
///
/// No per-row repacking happens here; the whole padded image comes back and
/// the caller trims it.
pub struct ReadbackBuffer {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl ReadbackBuffer {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let size = width as u64 * BYTES_PER_PIXEL as u64 * height as u64;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn row_bytes(&self) -> u32 {
        self.width * BYTES_PER_PIXEL
    }

    /// Record a copy of `source` into this buffer.
    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, source: &EffectTexture) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: source.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.row_bytes()),
                    rows_per_image: Some(self.height),
                },
            },
            source.extent(),
        );
    }

    /// Map the buffer and copy its contents out.
    ///
    /// Blocks until the device has finished all submitted work.
    pub fn read_image(&self, device: &Device) -> Result<ImageBuffer, GpuError> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::BufferMapFailed(e.to_string()))?;

        rx.recv()
            .map_err(|e| GpuError::BufferMapFailed(e.to_string()))?
            .map_err(|e| GpuError::BufferMapFailed(format!("{:?}", e)))?;

        let data = slice.get_mapped_range().to_vec();
        self.buffer.unmap();

        ImageBuffer::new(self.width, self.height, data)
            .map_err(|e| GpuError::BufferMapFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::pad_for_alignment;
    use crate::config::DeviceConfig;
    use crate::gpu::acquire_device;

    #[tokio::test]
    async fn test_upload_and_read_back() {
        let resources = match acquire_device(&DeviceConfig::default(), |_, _| ()).await {
            Ok(resources) => resources,
            Err(_) => return,
        };
        let device = &resources.device;

        let image = pad_for_alignment(&ImageBuffer::from_fn(5, 3, |x, y| {
            [x as u8 * 40, y as u8 * 80, 7, 255]
        }));
        let (width, height) = image.dimensions();
        assert_eq!(width, 64);

        let texture = EffectTexture::new(device, "test", width, height);
        texture.upload(&resources.queue, &image);

        let readback = ReadbackBuffer::new(device, width, height);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test_encoder"),
        });
        readback.copy_from(&mut encoder, &texture);
        resources.queue.submit(Some(encoder.finish()));

        assert_eq!(readback.read_image(device).unwrap(), image);
    }
}
