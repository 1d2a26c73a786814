//! Two-pass box blur (horizontal, then vertical).
//!
//! The input is surrounded by a transparent border as wide as the radius so
//! the kernel never reads past the true edges, blurred in premultiplied
//! space, then cropped back to the host's dimensions.

use bytemuck::{Pod, Zeroable};

use super::{Effect, EffectEnv, EffectError, EffectInfo, EffectVersion};
use crate::buffer::{add_border_padding, crop_region, premultiply, unpremultiply, ImageBuffer};
use crate::config::RuntimeConfig;
use crate::gpu::{acquire_device, run_compute_passes, ComputeKernel, ComputePass, ComputeResources};
use crate::params::{ParamDescriptor, ParameterSchema, ParameterSet};

/// Upper bound on the physical radius after DPI scaling.
pub const MAX_RADIUS: u32 = 512;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BlurUniforms {
    radius: u32,
    direction: u32,
    _pad: [u32; 2],
}

impl BlurUniforms {
    fn new(radius: u32, direction: u32) -> Self {
        Self {
            radius,
            direction,
            _pad: [0; 2],
        }
    }
}

/// Physical radius for a logical `radius` at `env`'s density.
pub fn physical_radius(radius: f64, env: &EffectEnv) -> u32 {
    let scaled = (radius * env.scale_factor()).round();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as u32).min(MAX_RADIUS)
    }
}

/// Per-channel mix of `original` toward `processed` by `t` in `[0, 1]`.
pub fn blend(original: &ImageBuffer, processed: &ImageBuffer, t: f32) -> ImageBuffer {
    let t = t.clamp(0.0, 1.0);
    if t >= 1.0 {
        return processed.clone();
    }
    let mut out = original.clone();
    for y in 0..original.height() {
        for x in 0..original.width() {
            let a = original.pixel(x, y);
            let b = processed.pixel(x, y);
            let mixed = std::array::from_fn(|c| {
                (a[c] as f32 + (b[c] as f32 - a[c] as f32) * t).round() as u8
            });
            out.set_pixel(x, y, mixed);
        }
    }
    out
}

pub struct BlurPipelines {
    kernel: ComputeKernel,
    row_alignment: u32,
}

pub struct BoxBlur {
    schema: ParameterSchema,
}

impl BoxBlur {
    pub fn new() -> Self {
        let schema = ParameterSchema::new()
            .with("radius", ParamDescriptor::real(8.0).range(0.0, 200.0).pixels())
            .with("strength", ParamDescriptor::real(100.0).range(0.0, 100.0));
        Self { schema }
    }
}

impl Default for BoxBlur {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for BoxBlur {
    type Resources = ComputeResources<BlurPipelines>;

    fn info(&self) -> EffectInfo {
        EffectInfo {
            id: "box-blur",
            title: "Box Blur",
            version: EffectVersion::new(1, 0),
        }
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    async fn init_resources(&self, config: &RuntimeConfig) -> Result<Self::Resources, EffectError> {
        let row_alignment = config.row_alignment;
        let resources = acquire_device(&config.device, |device, _| BlurPipelines {
            kernel: ComputeKernel::new(
                device,
                "box_blur",
                include_str!("shaders/box_blur.wgsl"),
                "main",
                false,
            ),
            row_alignment,
        })
        .await?;
        Ok(resources)
    }

    fn invoke(
        &self,
        resources: &Self::Resources,
        params: &ParameterSet,
        input: &ImageBuffer,
        env: &EffectEnv,
    ) -> Result<ImageBuffer, EffectError> {
        let radius = physical_radius(params.real("radius")?, env);
        let strength = (params.real("strength")? / 100.0) as f32;
        if radius == 0 || strength <= 0.0 || input.is_empty() {
            return Ok(input.clone());
        }

        let padded = premultiply(&add_border_padding(input, radius));
        let horizontal = BlurUniforms::new(radius, 0);
        let vertical = BlurUniforms::new(radius, 1);
        let pipelines = &resources.pipelines;
        let passes = [
            ComputePass::new(&pipelines.kernel, bytemuck::bytes_of(&horizontal)),
            ComputePass::new(&pipelines.kernel, bytemuck::bytes_of(&vertical)),
        ];

        let blurred = run_compute_passes(
            &resources.device,
            &resources.queue,
            &padded,
            pipelines.row_alignment,
            &passes,
        )?;
        let cropped = crop_region(
            &unpremultiply(&blurred),
            radius as f64,
            radius as f64,
            input.width() as f64,
            input.height() as f64,
        );
        Ok(blend(input, &cropped, strength))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_radius_scales_and_clamps() {
        assert_eq!(physical_radius(8.0, &EffectEnv::default()), 8);
        assert_eq!(physical_radius(8.0, &EffectEnv::new(2.0, 1.0)), 16);
        assert_eq!(physical_radius(2.4, &EffectEnv::default()), 2);
        assert_eq!(physical_radius(-3.0, &EffectEnv::default()), 0);
        assert_eq!(physical_radius(f64::NAN, &EffectEnv::default()), 0);
        assert_eq!(physical_radius(1e9, &EffectEnv::default()), MAX_RADIUS);
    }

    #[test]
    fn test_blend_endpoints_and_midpoint() {
        let a = ImageBuffer::from_fn(2, 1, |_, _| [0, 100, 200, 255]);
        let b = ImageBuffer::from_fn(2, 1, |_, _| [100, 100, 0, 255]);
        assert_eq!(blend(&a, &b, 0.0), a);
        assert_eq!(blend(&a, &b, 1.0), b);
        assert_eq!(blend(&a, &b, 0.5).pixel(1, 0), [50, 100, 100, 255]);
    }

    #[test]
    fn test_radius_is_pixel_unit() {
        let effect = BoxBlur::new();
        let params = effect.schema().defaults();
        let scaled = effect.rescale(&params, 2.0);
        assert_eq!(scaled.real("radius").unwrap(), 16.0);
        assert_eq!(scaled.real("strength").unwrap(), 100.0);
    }
}
