//! Recursive radix-2 FFT.
//!
//! One forward core serves both directions: the inverse conjugates its input,
//! runs the forward transform, conjugates the output and divides by `n`.

use std::f64::consts::PI;

use rustfft::num_complex::Complex;

use super::{ComplexChannel, FftError};

/// Forward DFT of `real + i*imag`.
///
/// The length must be a power of two; anything else is rejected with
/// [`FftError::NotPowerOfTwo`].
pub fn transform_1d(real: &[f32], imag: &[f32]) -> Result<ComplexChannel, FftError> {
    let input = split_to_complex(real, imag)?;
    Ok(ComplexChannel::from_complex(&forward(&input)))
}

/// Inverse DFT of `real + i*imag`, normalized by the length.
pub fn inverse_1d(real: &[f32], imag: &[f32]) -> Result<ComplexChannel, FftError> {
    let input = split_to_complex(real, imag)?;
    let scale = 1.0 / input.len() as f32;
    let output: Vec<Complex<f32>> = inverse_unnormalized(&input)
        .into_iter()
        .map(|c| c * scale)
        .collect();
    Ok(ComplexChannel::from_complex(&output))
}

pub(crate) fn check_power_of_two(n: usize) -> Result<(), FftError> {
    if n.is_power_of_two() {
        Ok(())
    } else {
        Err(FftError::NotPowerOfTwo(n))
    }
}

/// Forward transform. Callers guarantee a power-of-two length.
pub(crate) fn forward(input: &[Complex<f32>]) -> Vec<Complex<f32>> {
    let n = input.len();
    if n <= 1 {
        return input.to_vec();
    }

    let half = n / 2;
    let even: Vec<Complex<f32>> = input.iter().step_by(2).copied().collect();
    let odd: Vec<Complex<f32>> = input.iter().skip(1).step_by(2).copied().collect();
    let even = forward(&even);
    let odd = forward(&odd);

    let mut output = vec![Complex::new(0.0, 0.0); n];
    for k in 0..half {
        let theta = -2.0 * PI * k as f64 / n as f64;
        let twiddle = Complex::new(theta.cos() as f32, theta.sin() as f32);
        let t = twiddle * odd[k];
        output[k] = even[k] + t;
        output[k + half] = even[k] - t;
    }
    output
}

/// Inverse transform without the `1/n` factor.
pub(crate) fn inverse_unnormalized(input: &[Complex<f32>]) -> Vec<Complex<f32>> {
    let conjugated: Vec<Complex<f32>> = input.iter().map(|c| c.conj()).collect();
    forward(&conjugated).into_iter().map(|c| c.conj()).collect()
}

fn split_to_complex(real: &[f32], imag: &[f32]) -> Result<Vec<Complex<f32>>, FftError> {
    if real.len() != imag.len() {
        return Err(FftError::LengthMismatch {
            real: real.len(),
            imag: imag.len(),
        });
    }
    check_power_of_two(real.len())?;
    Ok(real
        .iter()
        .zip(imag)
        .map(|(&re, &im)| Complex::new(re, im))
        .collect())
}
