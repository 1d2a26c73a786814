//! Spectrum masking and power-of-two sizing.

use super::{ComplexChannel, ImageSpectrum};

/// Largest edge [`optimal_dimensions`] will produce.
pub const MAX_SPECTRAL_DIMENSION: u32 = 512;

/// Zero every bin the predicate rejects, in all four channels.
///
/// The predicate receives center-relative coordinates
/// `(x - width / 2, y - height / 2)` plus the plane size, so `(0, 0)` is the
/// zero frequency. It is called once per bin.
pub fn filter_spectrum<F>(spectrum: &ImageSpectrum, mut keep: F) -> ImageSpectrum
where
    F: FnMut(i64, i64, u32, u32) -> bool,
{
    let (width, height) = (spectrum.width, spectrum.height);
    let half_w = (width / 2) as i64;
    let half_h = (height / 2) as i64;

    let mask: Vec<bool> = (0..spectrum.bins())
        .map(|i| {
            let x = (i % width as usize) as i64 - half_w;
            let y = (i / width as usize) as i64 - half_h;
            keep(x, y, width, height)
        })
        .collect();

    let channels = spectrum.channels.clone().map(|channel| apply_mask(channel, &mask));
    ImageSpectrum {
        width,
        height,
        channels,
    }
}

fn apply_mask(mut channel: ComplexChannel, mask: &[bool]) -> ComplexChannel {
    for (i, keep) in mask.iter().enumerate() {
        if !keep {
            if let Some(re) = channel.real.get_mut(i) {
                *re = 0.0;
            }
            if let Some(im) = channel.imag.get_mut(i) {
                *im = 0.0;
            }
        }
    }
    channel
}

/// Power-of-two working size for spectral processing, capped at
/// [`MAX_SPECTRAL_DIMENSION`].
pub fn optimal_dimensions(width: u32, height: u32) -> (u32, u32) {
    optimal_dimensions_within(width, height, MAX_SPECTRAL_DIMENSION)
}

/// Scale `(width, height)` uniformly so neither edge exceeds `max_dimension`,
/// then floor each edge to a power of two (at least 1).
pub fn optimal_dimensions_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let mut w = width as f64;
    let mut h = height as f64;
    let max = max_dimension as f64;

    // Same factor as min(max / w, max / h), with the longer edge pinned to
    // exactly `max` so it cannot round below a power of two.
    if w > max || h > max {
        if w >= h {
            h = h * max / w;
            w = max;
        } else {
            w = w * max / h;
            h = max;
        }
    }

    (floor_power_of_two(w), floor_power_of_two(h))
}

fn floor_power_of_two(value: f64) -> u32 {
    let v = (value.floor() as u32).max(1);
    1 << (31 - v.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ImageBuffer;
    use crate::spectrum::forward_2d;

    fn spectrum() -> ImageSpectrum {
        let img = ImageBuffer::from_fn(8, 8, |x, y| [(x * 30) as u8, (y * 30) as u8, 7, 255]);
        forward_2d(&img).unwrap()
    }

    #[test]
    fn test_keep_all_is_identity() {
        let s = spectrum();
        assert_eq!(filter_spectrum(&s, |_, _, _, _| true), s);
    }

    #[test]
    fn test_keep_none_zeroes_everything() {
        let out = filter_spectrum(&spectrum(), |_, _, _, _| false);
        for channel in &out.channels {
            assert!(channel.real.iter().chain(&channel.imag).all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_predicate_sees_centered_coordinates() {
        let s = spectrum();
        let mut seen = Vec::new();
        let out = filter_spectrum(&s, |x, y, w, h| {
            seen.push((x, y));
            assert_eq!((w, h), (8, 8));
            x == 0 && y == 0
        });

        assert_eq!(seen.len(), 64);
        assert_eq!(seen[0], (-4, -4));
        assert_eq!(seen[63], (3, 3));

        let center = 4 * 8 + 4;
        for (i, (a, b)) in out.channels[0].real.iter().zip(&s.channels[0].real).enumerate() {
            if i == center {
                assert_eq!(a, b);
            } else {
                assert_eq!(*a, 0.0);
            }
        }
    }

    #[test]
    fn test_optimal_dimensions() {
        assert_eq!(optimal_dimensions(1000, 500), (512, 256));
        assert_eq!(optimal_dimensions(300, 200), (256, 128));
        assert_eq!(optimal_dimensions(100, 3000), (16, 512));
        assert_eq!(optimal_dimensions(512, 512), (512, 512));
        assert_eq!(optimal_dimensions(0, 0), (1, 1));
        assert_eq!(optimal_dimensions_within(300, 200, 64), (64, 32));
    }

    #[test]
    fn test_optimal_dimensions_are_bounded_powers_of_two() {
        for w in (1..3000).step_by(37) {
            for h in (1..3000).step_by(91) {
                let (ow, oh) = optimal_dimensions(w, h);
                assert!(ow.is_power_of_two() && oh.is_power_of_two());
                assert!(ow <= MAX_SPECTRAL_DIMENSION && oh <= MAX_SPECTRAL_DIMENSION);
            }
        }
    }
}
