//! Separable 2D transforms over image planes.

use rustfft::num_complex::Complex;

use super::fft::{check_power_of_two, forward, inverse_unnormalized};
use super::{ComplexChannel, FftError, ImageSpectrum};
use crate::buffer::ImageBuffer;

/// Centered forward transform of every RGBA channel.
///
/// Width and height must both be powers of two.
pub fn forward_2d(image: &ImageBuffer) -> Result<ImageSpectrum, FftError> {
    let (width, height) = image.dimensions();
    check_dimensions(width, height)?;

    let data = image.data();
    let channels = [0usize, 1, 2, 3].map(|c| {
        let mut plane: Vec<Complex<f32>> = data
            .chunks_exact(4)
            .map(|px| Complex::new(px[c] as f32, 0.0))
            .collect();
        forward_in_place(&mut plane, width as usize, height as usize);
        ComplexChannel::from_complex(&plane)
    });

    Ok(ImageSpectrum {
        width,
        height,
        channels,
    })
}

/// Inverse of [`forward_2d`]; samples are clamped to `[0, 255]` and rounded.
pub fn inverse_2d(spectrum: &ImageSpectrum) -> Result<ImageBuffer, FftError> {
    check_dimensions(spectrum.width, spectrum.height)?;
    spectrum.check_shape()?;

    let planes: Vec<ComplexChannel> = spectrum
        .channels
        .iter()
        .map(|channel| inverse_plane(channel, spectrum.width, spectrum.height))
        .collect::<Result<_, _>>()?;

    let mut data = Vec::with_capacity(spectrum.bins() * 4);
    for i in 0..spectrum.bins() {
        for plane in &planes {
            data.push(plane.real[i].round().clamp(0.0, 255.0) as u8);
        }
    }

    Ok(ImageBuffer::from_raw_parts(spectrum.width, spectrum.height, data))
}

/// Centered forward transform of one complex plane (row pass, then column pass).
pub fn forward_plane(
    values: &ComplexChannel,
    width: u32,
    height: u32,
) -> Result<ComplexChannel, FftError> {
    let mut plane = checked_plane(values, width, height)?;
    forward_in_place(&mut plane, width as usize, height as usize);
    Ok(ComplexChannel::from_complex(&plane))
}

/// Inverse of [`forward_plane`] (column pass, then row pass, shift, `1/(w*h)`).
pub fn inverse_plane(
    spectrum: &ComplexChannel,
    width: u32,
    height: u32,
) -> Result<ComplexChannel, FftError> {
    let mut plane = checked_plane(spectrum, width, height)?;
    transform_columns(
        &mut plane,
        width as usize,
        height as usize,
        inverse_unnormalized,
    );
    transform_rows(&mut plane, width as usize, inverse_unnormalized);
    apply_center_shift(&mut plane, width as usize);

    let scale = 1.0 / plane.len() as f32;
    for value in &mut plane {
        *value *= scale;
    }
    Ok(ComplexChannel::from_complex(&plane))
}

fn check_dimensions(width: u32, height: u32) -> Result<(), FftError> {
    check_power_of_two(width as usize)?;
    check_power_of_two(height as usize)
}

fn checked_plane(
    values: &ComplexChannel,
    width: u32,
    height: u32,
) -> Result<Vec<Complex<f32>>, FftError> {
    check_dimensions(width, height)?;
    if values.real.len() != values.imag.len() {
        return Err(FftError::LengthMismatch {
            real: values.real.len(),
            imag: values.imag.len(),
        });
    }
    let expected = width as usize * height as usize;
    if values.len() != expected {
        return Err(FftError::ShapeMismatch {
            width,
            height,
            expected,
            got: values.len(),
        });
    }
    Ok(values.to_complex())
}

/// Shift, row pass, column pass.
fn forward_in_place(plane: &mut [Complex<f32>], width: usize, height: usize) {
    apply_center_shift(plane, width);
    transform_rows(plane, width, forward);
    transform_columns(plane, width, height, forward);
}

/// Multiply sample `(x, y)` by `(-1)^(x+y)`.
fn apply_center_shift(plane: &mut [Complex<f32>], width: usize) {
    for (i, value) in plane.iter_mut().enumerate() {
        let (x, y) = (i % width, i / width);
        if (x + y) % 2 == 1 {
            *value = -*value;
        }
    }
}

fn transform_rows(
    plane: &mut [Complex<f32>],
    width: usize,
    transform: fn(&[Complex<f32>]) -> Vec<Complex<f32>>,
) {
    for row in plane.chunks_exact_mut(width) {
        let out = transform(row);
        row.copy_from_slice(&out);
    }
}

fn transform_columns(
    plane: &mut [Complex<f32>],
    width: usize,
    height: usize,
    transform: fn(&[Complex<f32>]) -> Vec<Complex<f32>>,
) {
    let mut column = Vec::with_capacity(height);
    for x in 0..width {
        column.clear();
        column.extend((0..height).map(|y| plane[y * width + x]));
        for (y, value) in transform(&column).into_iter().enumerate() {
            plane[y * width + x] = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(width: u32, height: u32) -> ImageBuffer {
        ImageBuffer::from_fn(width, height, |x, y| {
            [
                (x * 31 + y * 7) as u8,
                (x * y) as u8,
                (255 - x * 3) as u8,
                200,
            ]
        })
    }

    #[test]
    fn test_constant_image_puts_energy_at_center() {
        let img = ImageBuffer::from_fn(8, 4, |_, _| [10, 0, 0, 255]);
        let spectrum = forward_2d(&img).unwrap();
        let red = &spectrum.channels[0];
        let center = 2 * 8 + 4;

        assert!((red.real[center] - 10.0 * 32.0).abs() < 1e-3);
        for i in (0..32).filter(|&i| i != center) {
            assert!(red.real[i].abs() < 1e-3, "bin {i} = {}", red.real[i]);
            assert!(red.imag[i].abs() < 1e-3);
        }
    }

    #[test]
    fn test_image_round_trip() {
        let img = test_image(16, 8);
        let back = inverse_2d(&forward_2d(&img).unwrap()).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_image_and_plane_forward_agree() {
        let img = test_image(8, 4);
        let spectrum = forward_2d(&img).unwrap();
        let green = ComplexChannel::new(
            img.data().chunks_exact(4).map(|px| px[1] as f32).collect(),
            vec![0.0; 32],
        )
        .unwrap();
        let plane = forward_plane(&green, 8, 4).unwrap();
        assert_eq!(plane, spectrum.channels[1]);
    }

    #[test]
    fn test_plane_round_trip() {
        let (w, h) = (8u32, 16u32);
        let n = (w * h) as usize;
        let values = ComplexChannel::new(
            (0..n).map(|i| ((i * 37) % 101) as f32 - 50.0).collect(),
            (0..n).map(|i| ((i * 13) % 17) as f32 * 0.25).collect(),
        )
        .unwrap();

        let back = inverse_plane(&forward_plane(&values, w, h).unwrap(), w, h).unwrap();
        for i in 0..n {
            assert!((back.real[i] - values.real[i]).abs() < 1e-3);
            assert!((back.imag[i] - values.imag[i]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_non_power_of_two_image_is_rejected() {
        let img = test_image(12, 8);
        assert!(matches!(
            forward_2d(&img).unwrap_err(),
            FftError::NotPowerOfTwo(12)
        ));
    }

    #[test]
    fn test_inverse_rejects_wrong_shape() {
        let mut spectrum = forward_2d(&test_image(4, 4)).unwrap();
        spectrum.channels[2] = ComplexChannel::zeros(8);
        assert!(matches!(
            inverse_2d(&spectrum).unwrap_err(),
            FftError::ShapeMismatch {
                expected: 16,
                got: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_inverse_clamps_to_byte_range() {
        let mut spectrum = forward_2d(&ImageBuffer::from_fn(4, 4, |_, _| [200, 0, 0, 0])).unwrap();
        // Doubling the DC term pushes red to 400 and must clamp.
        spectrum.channels[0].real[2 * 4 + 2] *= 2.0;
        let out = inverse_2d(&spectrum).unwrap();
        assert!(out.data().chunks_exact(4).all(|px| px[0] == 255));
    }
}
