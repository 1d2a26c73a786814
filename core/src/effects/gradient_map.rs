//! Gradient map: recolor each pixel by looking its luminance up in a list of
//! color stops.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::{Effect, EffectEnv, EffectError, EffectInfo, EffectVersion};
use crate::buffer::ImageBuffer;
use crate::config::RuntimeConfig;
use crate::gpu::{acquire_device, run_compute_passes, ComputeKernel, ComputePass, ComputeResources};
use crate::params::{ColorRgba, ColorStop, ColorStops, ParamDescriptor, ParameterSchema, ParameterSet};

/// Number of entries in the lookup table uploaded per invocation.
pub const LUT_SIZE: usize = 256;

/// Named stop lists selectable from the `preset` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientPreset {
    Custom,
    BlackAndWhite,
    Sepia,
    Duotone,
    Rainbow,
}

impl GradientPreset {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "custom" => Some(Self::Custom),
            "black-and-white" | "blackandwhite" | "bw" => Some(Self::BlackAndWhite),
            "sepia" => Some(Self::Sepia),
            "duotone" => Some(Self::Duotone),
            "rainbow" => Some(Self::Rainbow),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::BlackAndWhite => "black-and-white",
            Self::Sepia => "sepia",
            Self::Duotone => "duotone",
            Self::Rainbow => "rainbow",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Custom,
            Self::BlackAndWhite,
            Self::Sepia,
            Self::Duotone,
            Self::Rainbow,
        ]
    }

    /// Stops this preset forces, or `None` for `Custom`.
    pub fn stops(&self) -> Option<ColorStops> {
        let stops = match self {
            Self::Custom => return None,
            Self::BlackAndWhite => vec![
                ColorStop::new(ColorRgba::BLACK, 0.0),
                ColorStop::new(ColorRgba::WHITE, 1.0),
            ],
            Self::Sepia => vec![
                ColorStop::new(ColorRgba::new(0.2, 0.05, 0.0, 1.0), 0.0),
                ColorStop::new(ColorRgba::new(1.0, 0.9, 0.7, 1.0), 1.0),
            ],
            Self::Duotone => vec![
                ColorStop::new(ColorRgba::new(0.05, 0.2, 0.6, 1.0), 0.0),
                ColorStop::new(ColorRgba::new(1.0, 0.8, 0.2, 1.0), 1.0),
            ],
            Self::Rainbow => vec![
                ColorStop::new(ColorRgba::new(1.0, 0.0, 0.0, 1.0), 0.0),
                ColorStop::new(ColorRgba::new(1.0, 1.0, 0.0, 1.0), 0.2),
                ColorStop::new(ColorRgba::new(0.0, 1.0, 0.0, 1.0), 0.4),
                ColorStop::new(ColorRgba::new(0.0, 1.0, 1.0, 1.0), 0.6),
                ColorStop::new(ColorRgba::new(0.0, 0.0, 1.0, 1.0), 0.8),
                ColorStop::new(ColorRgba::new(1.0, 0.0, 1.0, 1.0), 1.0),
            ],
        };
        Some(ColorStops::new(stops))
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GradientUniforms {
    strength: f32,
    _pad: [f32; 3],
}

/// Sample `stops` at `LUT_SIZE` evenly spaced positions over `[0, 1]`.
pub fn build_lut(stops: &ColorStops) -> Vec<[f32; 4]> {
    (0..LUT_SIZE)
        .map(|i| {
            let position = i as f32 / (LUT_SIZE - 1) as f32;
            stops.sample(position).to_array()
        })
        .collect()
}

pub struct GradientPipelines {
    kernel: ComputeKernel,
    row_alignment: u32,
}

pub struct GradientMap {
    schema: ParameterSchema,
}

impl GradientMap {
    pub fn new() -> Self {
        let presets: Vec<&str> = GradientPreset::all().iter().map(|p| p.name()).collect();
        let schema = ParameterSchema::new()
            .with("stops", ParamDescriptor::color_stops(ColorStops::default()))
            .with("strength", ParamDescriptor::real(100.0).range(0.0, 100.0))
            .with("preset", ParamDescriptor::choice("custom", &presets));
        Self { schema }
    }

    fn preset_of(params: &ParameterSet) -> GradientPreset {
        params
            .string("preset")
            .ok()
            .and_then(GradientPreset::from_str)
            .unwrap_or(GradientPreset::Custom)
    }
}

impl Default for GradientMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for GradientMap {
    type Resources = ComputeResources<GradientPipelines>;

    fn info(&self) -> EffectInfo {
        EffectInfo {
            id: "gradient-map",
            title: "Gradient Map",
            version: EffectVersion::new(1, 0),
        }
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Schema normalization, then a non-custom preset overwrites the stops.
    fn normalize(&self, params: &ParameterSet) -> ParameterSet {
        let normalized = crate::params::normalize(&self.schema, params);
        match Self::preset_of(&normalized).stops() {
            Some(stops) => normalized.with("stops", stops),
            None => normalized,
        }
    }

    /// Sets built from different presets do not blend; the whole set
    /// switches halfway.
    fn interpolate(&self, a: &ParameterSet, b: &ParameterSet, t: f64) -> ParameterSet {
        if Self::preset_of(a) != Self::preset_of(b) {
            let picked = if t < 0.5 { a } else { b };
            return picked.clone();
        }
        crate::params::interpolate(&self.schema, a, b, t)
    }

    async fn init_resources(&self, config: &RuntimeConfig) -> Result<Self::Resources, EffectError> {
        let row_alignment = config.row_alignment;
        let resources = acquire_device(&config.device, |device, _| GradientPipelines {
            kernel: ComputeKernel::new(
                device,
                "gradient_map",
                include_str!("shaders/gradient_map.wgsl"),
                "main",
                true,
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
        _env: &EffectEnv,
    ) -> Result<ImageBuffer, EffectError> {
        let lut = build_lut(params.color_stops("stops")?);
        let uniforms = GradientUniforms {
            strength: (params.real("strength")? / 100.0) as f32,
            _pad: [0.0; 3],
        };

        let lut_buffer = resources
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("gradient_lut"),
                contents: bytemuck::cast_slice(&lut),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let pipelines = &resources.pipelines;
        let pass = ComputePass::new(&pipelines.kernel, bytemuck::bytes_of(&uniforms))
            .with_lookup(&lut_buffer);
        let output = run_compute_passes(
            &resources.device,
            &resources.queue,
            input,
            pipelines.row_alignment,
            &[pass],
        )?;
        Ok(output)
    }
}
