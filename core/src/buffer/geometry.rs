//! Border padding, cropping and resampling.
//!
//! Coordinates arrive as `f64` from parameter math and are rounded to the
//! nearest pixel, then clamped to the source bounds. None of these fail.

use image::imageops::{self, FilterType};

use super::{byte_len, ImageBuffer, BYTES_PER_PIXEL};

/// Surround `image` with `px` transparent pixels on every side.
///
/// The result is `(width + 2px) x (height + 2px)` with the original at `(px, px)`.
pub fn add_border_padding(image: &ImageBuffer, px: u32) -> ImageBuffer {
    if px == 0 {
        return image.clone();
    }

    let width = image.width().saturating_add(px.saturating_mul(2));
    let height = image.height().saturating_add(px.saturating_mul(2));
    let bpp = BYTES_PER_PIXEL as usize;
    let dst_row = width as usize * bpp;
    let src_row = image.row_bytes();
    let x_offset = px as usize * bpp;

    let mut data = vec![0u8; byte_len(width, height)];
    if src_row > 0 {
        for (y, src) in image.data().chunks_exact(src_row).enumerate() {
            let start = (y + px as usize) * dst_row + x_offset;
            data[start..start + src_row].copy_from_slice(src);
        }
    }

    ImageBuffer {
        data,
        width,
        height,
    }
}

/// Extract the `w x h` region whose top-left corner is `(x, y)`.
///
/// The origin is clamped into the image and the size is clamped so the region
/// never extends past the right or bottom edge.
pub fn crop_region(image: &ImageBuffer, x: f64, y: f64, w: f64, h: f64) -> ImageBuffer {
    let x = round_px(x).min(image.width());
    let y = round_px(y).min(image.height());
    let w = round_px(w).min(image.width() - x);
    let h = round_px(h).min(image.height() - y);

    if x == 0 && y == 0 && w == image.width() && h == image.height() {
        return image.clone();
    }

    let bpp = BYTES_PER_PIXEL as usize;
    let src_row = image.row_bytes();
    let start_col = x as usize * bpp;
    let run = w as usize * bpp;

    let mut data = Vec::with_capacity(byte_len(w, h));
    if run > 0 {
        for row in image
            .data()
            .chunks_exact(src_row)
            .skip(y as usize)
            .take(h as usize)
        {
            data.extend_from_slice(&row[start_col..start_col + run]);
        }
    }

    ImageBuffer {
        data,
        width: w,
        height: h,
    }
}

/// Bilinear resample to `w x h`.
pub fn resize(image: &ImageBuffer, w: f64, h: f64) -> ImageBuffer {
    let w = round_px(w);
    let h = round_px(h);

    if (w, h) == image.dimensions() {
        return image.clone();
    }
    if w == 0 || h == 0 || image.is_empty() {
        return ImageBuffer::blank(w, h);
    }

    let resized = imageops::resize(&image.to_rgba_image(), w, h, FilterType::Triangle);
    ImageBuffer::from_rgba_image(resized)
}

/// Nearest pixel count; negatives and NaN become 0 (saturating cast).
fn round_px(value: f64) -> u32 {
    value.round() as u32
}
