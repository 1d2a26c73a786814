//! LiveEffect Core
//!
//! Parametric image effects that run on a compute device, with the buffer
//! plumbing they need to interoperate with a host's RGBA images.
//!
//! # Features
//!
//! - Stride alignment, border padding, cropping and resampling of RGBA buffers
//! - Centered 2D FFT / inverse FFT and spectrum masking
//! - One wgpu device per effect with ordered ping-pong compute passes
//! - Schema-driven parameter normalization, DPI rescaling, interpolation and recoloring
//! - An explicit effect registry with built-in gradient map, box blur and spectral filter

pub mod buffer;
pub mod config;
pub mod effects;
pub mod gpu;
pub mod params;
pub mod spectrum;

// Re-export commonly used types
pub use buffer::{
    add_border_padding, aligned_width, crop_region, pad_for_alignment, resize, unpad_to_original,
    ImageBuffer, ImageError,
};
pub use config::{ConfigError, DeviceConfig, RuntimeConfig};
pub use effects::{
    Effect, EffectEnv, EffectError, EffectInfo, EffectInstance, EffectRegistry, EffectRuntime,
    EffectVersion, RegistryError,
};
pub use gpu::{acquire_device, ComputeResources, GpuError};
pub use params::{
    ColorRgba, ColorStop, ColorStops, ParamDescriptor, ParamError, ParamValue, ParameterSchema,
    ParameterSet,
};
pub use spectrum::{
    filter_spectrum, forward_2d, inverse_2d, optimal_dimensions, transform_1d, FftError,
    ImageSpectrum,
};

/// Install the `env_logger` backend with a default filter of `info`.
///
/// `RUST_LOG` overrides the filter. Calling this more than once is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
