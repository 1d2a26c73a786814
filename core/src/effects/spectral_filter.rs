//! Frequency-domain low/high-pass filter. Runs entirely on the CPU.

use super::{Effect, EffectEnv, EffectError, EffectInfo, EffectResources, EffectVersion};
use crate::buffer::{resize, ImageBuffer};
use crate::config::RuntimeConfig;
use crate::params::{ParamDescriptor, ParameterSchema, ParameterSet};
use crate::spectrum::{filter_spectrum, forward_2d, inverse_2d, optimal_dimensions_within};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    LowPass,
    HighPass,
}

impl FilterMode {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low-pass" | "lowpass" | "low" => Some(Self::LowPass),
            "high-pass" | "highpass" | "high" => Some(Self::HighPass),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LowPass => "low-pass",
            Self::HighPass => "high-pass",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::LowPass, Self::HighPass]
    }

    /// Whether a bin at squared distance `d2` from the center survives a
    /// cutoff radius `radius`.
    pub fn keeps(&self, d2: f64, radius: f64) -> bool {
        match self {
            Self::LowPass => d2 <= radius * radius,
            Self::HighPass => d2 > radius * radius,
        }
    }
}

/// Working-size cap carried from the runtime configuration.
#[derive(Debug, Clone, Copy)]
pub struct SpectralSettings {
    pub max_dimension: u32,
}

impl EffectResources for SpectralSettings {}

pub struct SpectralFilter {
    schema: ParameterSchema,
}

impl SpectralFilter {
    pub fn new() -> Self {
        let modes: Vec<&str> = FilterMode::all().iter().map(|m| m.name()).collect();
        let schema = ParameterSchema::new()
            .with("mode", ParamDescriptor::choice("low-pass", &modes))
            .with("cutoff", ParamDescriptor::real(0.25).range(0.0, 1.0));
        Self { schema }
    }
}

impl Default for SpectralFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for SpectralFilter {
    type Resources = SpectralSettings;

    fn info(&self) -> EffectInfo {
        EffectInfo {
            id: "spectral-filter",
            title: "Spectral Filter",
            version: EffectVersion::new(1, 0),
        }
    }

    fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    async fn init_resources(&self, config: &RuntimeConfig) -> Result<Self::Resources, EffectError> {
        Ok(SpectralSettings {
            max_dimension: config.spectral_max_dimension,
        })
    }

    /// Resize to a power-of-two plane, mask the centered spectrum with a
    /// circle of radius `cutoff * min(w, h) / 2`, invert, and resize back.
    /// Alpha is taken from the input.
    fn invoke(
        &self,
        resources: &Self::Resources,
        params: &ParameterSet,
        input: &ImageBuffer,
        _env: &EffectEnv,
    ) -> Result<ImageBuffer, EffectError> {
        if input.is_empty() {
            return Ok(input.clone());
        }
        let mode = FilterMode::from_str(params.string("mode")?).unwrap_or(FilterMode::LowPass);
        let cutoff = params.real("cutoff")?;

        let (width, height) =
            optimal_dimensions_within(input.width(), input.height(), resources.max_dimension);
        let working = resize(input, width as f64, height as f64);

        let spectrum = forward_2d(&working)?;
        let radius = cutoff * width.min(height) as f64 / 2.0;
        let filtered = filter_spectrum(&spectrum, |x, y, _, _| {
            mode.keeps((x * x + y * y) as f64, radius)
        });
        let plane = inverse_2d(&filtered)?;

        let mut output = resize(&plane, input.width() as f64, input.height() as f64);
        for y in 0..input.height() {
            for x in 0..input.width() {
                let mut px = output.pixel(x, y);
                px[3] = input.pixel(x, y)[3];
                output.set_pixel(x, y, px);
            }
        }
        Ok(output)
    }
}
