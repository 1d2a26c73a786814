//! CPU frequency-domain engine for spectral effects.
//!
//! Provides:
//! - A recursive radix-2 Cooley-Tukey transform over split real/imaginary arrays
//! - Separable 2D forward/inverse transforms with the FFT-shift folded into a
//!   `(-1)^(x+y)` sign pattern, so the zero frequency sits at the plane's center
//! - Center-relative spectrum masking and power-of-two sizing helpers
//!
//! Everything here is synchronous and holds no state between calls.

mod fft;
mod filter;
mod plane;

pub use fft::{inverse_1d, transform_1d};
pub use filter::{
    filter_spectrum, optimal_dimensions, optimal_dimensions_within, MAX_SPECTRAL_DIMENSION,
};
pub use plane::{forward_2d, forward_plane, inverse_2d, inverse_plane};

use rustfft::num_complex::Complex;

/// Errors raised by the frequency transform engine.
#[derive(Debug, thiserror::Error)]
pub enum FftError {
    #[error("FFT length must be a power of 2, got {0}")]
    NotPowerOfTwo(usize),
    #[error("Real and imaginary parts differ in length: {real} vs {imag}")]
    LengthMismatch { real: usize, imag: usize },
    #[error("Spectrum channel has {got} bins, expected {expected} for {width}x{height}")]
    ShapeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
}

/// Split complex array: parallel real and imaginary parts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexChannel {
    pub real: Vec<f32>,
    pub imag: Vec<f32>,
}

impl ComplexChannel {
    pub fn new(real: Vec<f32>, imag: Vec<f32>) -> Result<Self, FftError> {
        if real.len() != imag.len() {
            return Err(FftError::LengthMismatch {
                real: real.len(),
                imag: imag.len(),
            });
        }
        Ok(Self { real, imag })
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            real: vec![0.0; len],
            imag: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    pub(crate) fn to_complex(&self) -> Vec<Complex<f32>> {
        self.real
            .iter()
            .zip(&self.imag)
            .map(|(&re, &im)| Complex::new(re, im))
            .collect()
    }

    pub(crate) fn from_complex(values: &[Complex<f32>]) -> Self {
        Self {
            real: values.iter().map(|c| c.re).collect(),
            imag: values.iter().map(|c| c.im).collect(),
        }
    }
}

/// Per-channel spectra of an RGBA image.
///
/// Bin `(x, y)` lives at index `y * width + x`; the zero frequency is at
/// `(width / 2, height / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSpectrum {
    pub width: u32,
    pub height: u32,
    /// R, G, B, A.
    pub channels: [ComplexChannel; 4],
}

impl ImageSpectrum {
    pub fn bins(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub(crate) fn check_shape(&self) -> Result<(), FftError> {
        let expected = self.bins();
        for channel in &self.channels {
            if channel.real.len() != channel.imag.len() {
                return Err(FftError::LengthMismatch {
                    real: channel.real.len(),
                    imag: channel.imag.len(),
                });
            }
            if channel.len() != expected {
                return Err(FftError::ShapeMismatch {
                    width: self.width,
                    height: self.height,
                    expected,
                    got: channel.len(),
                });
            }
        }
        Ok(())
    }
}
