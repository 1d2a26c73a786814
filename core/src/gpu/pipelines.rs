//! Compute pipeline creation.

use wgpu::{BindGroupLayout, ComputePipeline, Device, PipelineLayout, ShaderModule};

use super::layouts::effect_layout_builder;

/// Edge of the square workgroup every effect kernel declares
/// (`@workgroup_size(16, 16)`).
pub const WORKGROUP_SIZE: u32 = 16;

/// A compiled effect kernel and the layout it was compiled against.
pub struct ComputeKernel {
    pub label: &'static str,
    pub layout: BindGroupLayout,
    pub pipeline: ComputePipeline,
    /// Whether binding 3 (lookup buffer) is part of the layout.
    pub uses_lookup: bool,
}

impl ComputeKernel {
    /// Compile `entry_point` from `wgsl` against the standard effect layout.
    pub fn new(
        device: &Device,
        label: &'static str,
        wgsl: &str,
        entry_point: &'static str,
        with_lookup: bool,
    ) -> Self {
        let shader = create_shader(device, label, wgsl);
        let layout = effect_layout_builder(label, with_lookup).build(device);
        let pipeline_layout = create_pipeline_layout(device, label, &[&layout]);
        let pipeline =
            create_compute_pipeline(device, label, &pipeline_layout, &shader, entry_point);

        Self {
            label,
            layout,
            pipeline,
            uses_lookup: with_lookup,
        }
    }

    /// Workgroup counts covering a `width x height` texture.
    pub fn workgroups(width: u32, height: u32) -> (u32, u32) {
        (width.div_ceil(WORKGROUP_SIZE), height.div_ceil(WORKGROUP_SIZE))
    }
}

pub fn create_shader(device: &Device, label: &str, wgsl: &str) -> ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{}_shader", label)),
        source: wgpu::ShaderSource::Wgsl(wgsl.into()),
    })
}

/// Create a pipeline layout from bind group layouts.
pub fn create_pipeline_layout(
    device: &Device,
    label: &str,
    layouts: &[&BindGroupLayout],
) -> PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{}_pipeline_layout", label)),
        bind_group_layouts: layouts,
        immediate_size: 0,
    })
}

pub fn create_compute_pipeline(
    device: &Device,
    label: &str,
    layout: &PipelineLayout,
    shader: &ShaderModule,
    entry_point: &str,
) -> ComputePipeline {
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(&format!("{}_pipeline", label)),
        layout: Some(layout),
        module: shader,
        entry_point: Some(entry_point),
        compilation_options: Default::default(),
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroups_cover_texture() {
        assert_eq!(ComputeKernel::workgroups(64, 1), (4, 1));
        assert_eq!(ComputeKernel::workgroups(65, 17), (5, 2));
        assert_eq!(ComputeKernel::workgroups(0, 0), (0, 0));
    }
}
