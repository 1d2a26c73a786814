//! Effect contract, invocation orchestration, and built-in effects.
//!
//! An [`Effect`] is a typed definition: metadata, a parameter schema, the
//! four lifecycle hooks, an async resource initializer, and `invoke`.
//! [`EffectInstance`] owns one effect plus its lazily acquired resources and
//! erases it into the object-safe [`EffectRuntime`] that the
//! [`EffectRegistry`] stores.

pub mod box_blur;
pub mod gradient_map;
pub mod registry;
pub mod spectral_filter;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::buffer::{ImageBuffer, ImageError};
use crate::config::RuntimeConfig;
use crate::gpu::{ComputeResources, DeviceHealth, GpuError};
use crate::params::{self, ColorRgba, ParamError, ParameterSchema, ParameterSet};
use crate::spectrum::FftError;

pub use box_blur::BoxBlur;
pub use gradient_map::{GradientMap, GradientPreset};
pub use registry::{EffectRegistry, RegistryError};
pub use spectral_filter::{FilterMode, SpectralFilter};

/// Errors that can occur while initializing or invoking an effect.
#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
    #[error("FFT error: {0}")]
    Fft(#[from] FftError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("Parameter error: {0}")]
    Params(#[from] ParamError),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Effect '{id}' returned {got_width}x{got_height}, expected {width}x{height}")]
    OutputSize {
        id: &'static str,
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
}

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectVersion {
    pub major: u32,
    pub minor: u32,
}

impl EffectVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for EffectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Identity of an effect as listed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub version: EffectVersion,
}

/// Host-supplied display density for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectEnv {
    pub dpi_scale: f64,
    pub base_dpi_scale: f64,
}

impl EffectEnv {
    pub fn new(dpi_scale: f64, base_dpi_scale: f64) -> Self {
        Self {
            dpi_scale,
            base_dpi_scale,
        }
    }

    /// Ratio converting logical pixels into physical pixels.
    ///
    /// Falls back to 1.0 when either side is not a positive finite number.
    pub fn scale_factor(&self) -> f64 {
        let ratio = self.dpi_scale / self.base_dpi_scale;
        if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        }
    }
}

impl Default for EffectEnv {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

// ============================================================================
// Effect contract
// ============================================================================

/// What an effect keeps between invocations.
///
/// Device-backed bundles report their health so a lost device can be
/// noticed before the next dispatch.
pub trait EffectResources: Send + Sync {
    fn health(&self) -> Option<&DeviceHealth> {
        None
    }
}

impl EffectResources for () {}

impl<P: Send + Sync> EffectResources for ComputeResources<P> {
    fn health(&self) -> Option<&DeviceHealth> {
        Some(&self.health)
    }
}

/// A pluggable parametric image effect.
///
/// The lifecycle hooks default to the schema-driven implementations in
/// [`crate::params::lifecycle`]; effects override them to add rules that
/// span several fields. Every hook must be pure and total over parameter
/// sets whose values match the schema's kinds.
#[allow(async_fn_in_trait)]
pub trait Effect: Send + Sync {
    type Resources: EffectResources;

    fn info(&self) -> EffectInfo;

    fn schema(&self) -> &ParameterSchema;

    fn normalize(&self, params: &ParameterSet) -> ParameterSet {
        params::normalize(self.schema(), params)
    }

    fn rescale(&self, params: &ParameterSet, factor: f64) -> ParameterSet {
        params::rescale(self.schema(), params, factor)
    }

    fn interpolate(&self, a: &ParameterSet, b: &ParameterSet, t: f64) -> ParameterSet {
        params::interpolate(self.schema(), a, b, t)
    }

    fn adjust_colors(
        &self,
        params: &ParameterSet,
        remap: &dyn Fn(ColorRgba) -> ColorRgba,
    ) -> ParameterSet {
        params::adjust_colors(params, remap)
    }

    /// Build the effect's long-lived resources. Called once per instance,
    /// and again only after the device backing them has been lost.
    async fn init_resources(&self, config: &RuntimeConfig) -> Result<Self::Resources, EffectError>;

    /// Process one image. `params` has already been completed against the
    /// schema and normalized. The result must have the input's dimensions.
    fn invoke(
        &self,
        resources: &Self::Resources,
        params: &ParameterSet,
        input: &ImageBuffer,
        env: &EffectEnv,
    ) -> Result<ImageBuffer, EffectError>;
}

/// Object-safe view of an effect together with its resources.
pub trait EffectRuntime: Send + Sync {
    fn info(&self) -> EffectInfo;

    fn schema(&self) -> &ParameterSchema;

    fn normalize(&self, params: &ParameterSet) -> ParameterSet;

    fn rescale(&self, params: &ParameterSet, factor: f64) -> ParameterSet;

    fn interpolate(&self, a: &ParameterSet, b: &ParameterSet, t: f64) -> ParameterSet;

    fn adjust_colors(
        &self,
        params: &ParameterSet,
        remap: &dyn Fn(ColorRgba) -> ColorRgba,
    ) -> ParameterSet;

    /// Acquire resources now instead of on the first invocation.
    fn initialize(&self) -> Result<(), EffectError>;

    fn is_initialized(&self) -> bool;

    /// Run the effect. Blocks until the output has been read back.
    fn invoke(
        &self,
        params: &ParameterSet,
        input: &ImageBuffer,
        env: &EffectEnv,
    ) -> Result<ImageBuffer, EffectError>;
}

// ============================================================================
// Instance
// ============================================================================

/// An effect and the resources it acquired.
///
/// Resources are created on first use and shared by every later
/// invocation. When the backing device reports loss, the next invocation
/// fails with [`GpuError::DeviceLost`] and discards them; the one after
/// that initializes again.
pub struct EffectInstance<E: Effect> {
    effect: E,
    config: RuntimeConfig,
    resources: Mutex<Option<Arc<E::Resources>>>,
}

impl<E: Effect> EffectInstance<E> {
    pub fn new(effect: E, config: RuntimeConfig) -> Self {
        Self {
            effect,
            config,
            resources: Mutex::new(None),
        }
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn resources(&self) -> Result<Arc<E::Resources>, EffectError> {
        let mut slot = self
            .resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(resources) = slot.as_ref() {
            if let Some(reason) = resources.health().and_then(DeviceHealth::lost_reason) {
                log::warn!(
                    "[{}] device lost, resources dropped: {}",
                    self.effect.info().id,
                    reason
                );
                *slot = None;
                return Err(GpuError::DeviceLost(reason).into());
            }
            return Ok(Arc::clone(resources));
        }

        let info = self.effect.info();
        log::debug!("[{}] initializing resources", info.id);
        let resources = Arc::new(pollster::block_on(
            self.effect.init_resources(&self.config),
        )?);
        *slot = Some(Arc::clone(&resources));
        Ok(resources)
    }
}

impl<E: Effect> EffectRuntime for EffectInstance<E> {
    fn info(&self) -> EffectInfo {
        self.effect.info()
    }

    fn schema(&self) -> &ParameterSchema {
        self.effect.schema()
    }

    fn normalize(&self, params: &ParameterSet) -> ParameterSet {
        self.effect.normalize(params)
    }

    fn rescale(&self, params: &ParameterSet, factor: f64) -> ParameterSet {
        self.effect.rescale(params, factor)
    }

    fn interpolate(&self, a: &ParameterSet, b: &ParameterSet, t: f64) -> ParameterSet {
        self.effect.interpolate(a, b, t)
    }

    fn adjust_colors(
        &self,
        params: &ParameterSet,
        remap: &dyn Fn(ColorRgba) -> ColorRgba,
    ) -> ParameterSet {
        self.effect.adjust_colors(params, remap)
    }

    fn initialize(&self) -> Result<(), EffectError> {
        self.resources().map(|_| ())
    }

    fn is_initialized(&self) -> bool {
        self.resources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn invoke(
        &self,
        params: &ParameterSet,
        input: &ImageBuffer,
        env: &EffectEnv,
    ) -> Result<ImageBuffer, EffectError> {
        let info = self.effect.info();
        let params = self
            .effect
            .normalize(&self.effect.schema().complete(params.clone())?);
        let resources = self.resources()?;

        log::debug!(
            "[{}] invoke {}x{} at scale {:.2}",
            info.id,
            input.width(),
            input.height(),
            env.scale_factor()
        );
        let output = self.effect.invoke(&resources, &params, input, env)?;

        if output.dimensions() != input.dimensions() {
            return Err(EffectError::OutputSize {
                id: info.id,
                width: input.width(),
                height: input.height(),
                got_width: output.width(),
                got_height: output.height(),
            });
        }
        Ok(output)
    }
}
