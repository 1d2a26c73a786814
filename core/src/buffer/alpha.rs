//! Straight <-> premultiplied alpha conversion.

use super::ImageBuffer;

/// Multiply color channels by alpha.
pub fn premultiply(image: &ImageBuffer) -> ImageBuffer {
    map_pixels(image, |[r, g, b, a]| {
        let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        [scale(r), scale(g), scale(b), a]
    })
}

/// Divide color channels by alpha. Fully transparent pixels become black.
pub fn unpremultiply(image: &ImageBuffer) -> ImageBuffer {
    map_pixels(image, |[r, g, b, a]| {
        if a == 0 {
            return [0, 0, 0, 0];
        }
        let scale = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
        [scale(r), scale(g), scale(b), a]
    })
}

fn map_pixels(image: &ImageBuffer, f: impl Fn([u8; 4]) -> [u8; 4]) -> ImageBuffer {
    let mut out = image.clone();
    for px in out.data.chunks_exact_mut(4) {
        let mapped = f([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&mapped);
    }
    out
}
