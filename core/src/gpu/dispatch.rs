//! Ordered compute-pass execution over a host image.
//!
//! One call is one invocation: pad the input to the row alignment, upload it,
//! run every pass in order (ping-ponging between two textures), copy the last
//! output into a mappable buffer, wait for it, and trim the padding.

use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Device, Queue};

use super::pipelines::ComputeKernel;
use super::textures::{EffectTexture, ReadbackBuffer};
use super::GpuError;
use crate::buffer::{pad_for_alignment_to, unpad_to_original, ImageBuffer};

/// One pass of an invocation.
pub struct ComputePass<'a> {
    pub kernel: &'a ComputeKernel,
    /// Uniform block contents, usually `bytemuck::bytes_of(&params)`.
    pub uniforms: &'a [u8],
    /// Lookup buffer bound at slot 3 for kernels that declare it.
    pub lookup: Option<&'a wgpu::Buffer>,
}

impl<'a> ComputePass<'a> {
    pub fn new(kernel: &'a ComputeKernel, uniforms: &'a [u8]) -> Self {
        Self {
            kernel,
            uniforms,
            lookup: None,
        }
    }

    pub fn with_lookup(mut self, lookup: &'a wgpu::Buffer) -> Self {
        self.lookup = Some(lookup);
        self
    }
}

/// Run `passes` in order over `input` and return an image of the input's size.
///
/// Pass `n` reads pass `n - 1`'s output. An empty pass list or an empty image
/// returns the input unchanged without touching the device. `row_alignment`
/// must be a non-zero multiple of `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`.
pub fn run_compute_passes(
    device: &Device,
    queue: &Queue,
    input: &ImageBuffer,
    row_alignment: u32,
    passes: &[ComputePass<'_>],
) -> Result<ImageBuffer, GpuError> {
    check_row_alignment(row_alignment)?;
    if passes.is_empty() || input.is_empty() {
        return Ok(input.clone());
    }

    let padded = pad_for_alignment_to(input, row_alignment);
    let (width, height) = padded.dimensions();
    let max = device.limits().max_texture_dimension_2d;
    if width > max || height > max {
        return Err(GpuError::TextureTooLarge { width, height, max });
    }

    log::debug!(
        "Dispatching {} pass(es) over {}x{} (aligned from {}x{})",
        passes.len(),
        width,
        height,
        input.width(),
        input.height()
    );

    let textures = [
        EffectTexture::new(device, "effect_ping", width, height),
        EffectTexture::new(device, "effect_pong", width, height),
    ];
    textures[0].upload(queue, &padded);

    let empty_lookup = passes
        .iter()
        .any(|p| p.kernel.uses_lookup && p.lookup.is_none())
        .then(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("empty_lookup"),
                size: 16,
                usage: wgpu::BufferUsages::STORAGE,
                mapped_at_creation: false,
            })
        });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("effect_encoder"),
    });

    let (groups_x, groups_y) = ComputeKernel::workgroups(width, height);
    for (i, pass) in passes.iter().enumerate() {
        let source = &textures[i % 2];
        let target = &textures[(i + 1) % 2];

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(pass.kernel.label),
            contents: pass.uniforms,
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let lookup = pass.lookup.or(empty_lookup.as_ref());
        let bind_group = create_bind_group(device, pass.kernel, source, target, &uniforms, lookup);

        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(pass.kernel.label),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&pass.kernel.pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        cpass.dispatch_workgroups(groups_x, groups_y, 1);
    }

    let output = &textures[passes.len() % 2];
    let readback = ReadbackBuffer::new(device, width, height);
    readback.copy_from(&mut encoder, output);
    queue.submit(Some(encoder.finish()));

    let result = readback.read_image(device)?;
    Ok(unpad_to_original(&result, input.width(), input.height()))
}

/// Texture-to-buffer copies reject any other stride.
pub fn check_row_alignment(row_alignment: u32) -> Result<(), GpuError> {
    if row_alignment == 0 || row_alignment % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT != 0 {
        return Err(GpuError::RowAlignment(row_alignment));
    }
    Ok(())
}

fn create_bind_group(
    device: &Device,
    kernel: &ComputeKernel,
    source: &EffectTexture,
    target: &EffectTexture,
    uniforms: &wgpu::Buffer,
    lookup: Option<&wgpu::Buffer>,
) -> BindGroup {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(source.view()),
        },
        wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::TextureView(target.view()),
        },
        wgpu::BindGroupEntry {
            binding: 2,
            resource: uniforms.as_entire_binding(),
        },
    ];
    if let (true, Some(lookup)) = (kernel.uses_lookup, lookup) {
        entries.push(wgpu::BindGroupEntry {
            binding: 3,
            resource: lookup.as_entire_binding(),
        });
    }

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(kernel.label),
        layout: &kernel.layout,
        entries: &entries,
    })
}
