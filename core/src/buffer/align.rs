//! Row-stride alignment for linear buffer <-> texture copies.
//!
//! Texture copies require every row's byte length to be a multiple of a fixed
//! quantum. Rather than re-laying out rows on every copy, the image itself is
//! widened with zero columns on the right, dispatched, and cropped back.

use super::{byte_len, ImageBuffer};

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: u32 = 4;

/// Row byte quantum for texture copies. Equal to `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`.
pub const COPY_ROW_ALIGNMENT: u32 = 256;

/// Smallest width `>= width` whose RGBA row length is a multiple of [`COPY_ROW_ALIGNMENT`].
pub fn aligned_width(width: u32) -> u32 {
    aligned_width_for(width, BYTES_PER_PIXEL, COPY_ROW_ALIGNMENT)
}

/// Smallest width `>= width` such that `width * bytes_per_pixel` is a multiple of `alignment`.
///
/// Computed as `ceil(width * bpp / alignment) * alignment / bpp`, rounded to the
/// nearest pixel. The result is exact whenever `alignment` is a multiple of
/// `bytes_per_pixel`. A zero `bytes_per_pixel` or `alignment` leaves `width` as is.
pub fn aligned_width_for(width: u32, bytes_per_pixel: u32, alignment: u32) -> u32 {
    if bytes_per_pixel == 0 || alignment == 0 {
        return width;
    }

    let bpp = bytes_per_pixel as u64;
    let row_bytes = width as u64 * bpp;
    let aligned_row_bytes = row_bytes.div_ceil(alignment as u64) * alignment as u64;
    let rounded = (aligned_row_bytes + bpp / 2) / bpp;
    rounded.min(u32::MAX as u64) as u32
}

/// Widen `image` to [`aligned_width`], zero-filling the new right-hand columns.
pub fn pad_for_alignment(image: &ImageBuffer) -> ImageBuffer {
    pad_for_alignment_to(image, COPY_ROW_ALIGNMENT)
}

/// Widen `image` so its row byte length is a multiple of `alignment`.
///
/// Height is never changed and the original pixels keep their coordinates.
pub fn pad_for_alignment_to(image: &ImageBuffer, alignment: u32) -> ImageBuffer {
    let new_width = aligned_width_for(image.width(), BYTES_PER_PIXEL, alignment);
    if new_width == image.width() {
        return image.clone();
    }

    let src_row = image.row_bytes();
    let dst_row = new_width as usize * BYTES_PER_PIXEL as usize;
    let mut data = vec![0u8; byte_len(new_width, image.height())];
    for (dst, src) in data
        .chunks_exact_mut(dst_row)
        .zip(image.data().chunks_exact(src_row))
    {
        dst[..src_row].copy_from_slice(src);
    }

    ImageBuffer {
        data,
        width: new_width,
        height: image.height(),
    }
}

/// Extract the top-left `original_width x original_height` region.
///
/// Requests larger than `image` are clamped to its bounds.
pub fn unpad_to_original(
    image: &ImageBuffer,
    original_width: u32,
    original_height: u32,
) -> ImageBuffer {
    let width = original_width.min(image.width());
    let height = original_height.min(image.height());
    if width == image.width() && height == image.height() {
        return image.clone();
    }

    let src_row = image.row_bytes();
    let dst_row = width as usize * BYTES_PER_PIXEL as usize;
    let mut data = Vec::with_capacity(byte_len(width, height));
    if dst_row > 0 {
        for row in image.data().chunks_exact(src_row).take(height as usize) {
            data.extend_from_slice(&row[..dst_row]);
        }
    }

    ImageBuffer {
        data,
        width,
        height,
    }
}
