//! Host image buffers and the alignment/padding engine.
//!
//! Every buffer is row-major RGBA8 with straight (non-premultiplied) alpha.
//! Effects that need premultiplied math convert at their own boundary with
//! [`premultiply`] and [`unpremultiply`].

mod align;
mod alpha;
mod geometry;

pub use align::{
    aligned_width, aligned_width_for, pad_for_alignment, pad_for_alignment_to, unpad_to_original,
    BYTES_PER_PIXEL, COPY_ROW_ALIGNMENT,
};
pub use alpha::{premultiply, unpremultiply};
pub use geometry::{add_border_padding, crop_region, resize};

use std::path::Path;

use image::RgbaImage;

/// Errors that can occur when building or exporting image buffers.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Buffer length {len} does not match {width}x{height} RGBA (expected {expected})")]
    SizeMismatch {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Row-major RGBA8 image.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageBuffer {
    /// Wrap host bytes, checking the length invariant.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = byte_len(width, height);
        if data.len() != expected {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                len: data.len(),
                expected,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Wrap bytes the caller built for exactly `width * height` pixels.
    pub(crate) fn from_raw_parts(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), byte_len(width, height));
        Self {
            data,
            width,
            height,
        }
    }

    /// Fully transparent black image.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; byte_len(width, height)],
            width,
            height,
        }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(byte_len(width, height));
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of bytes in one row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Give the bytes back to the host.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One row of pixels as raw bytes.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.row_bytes();
        &self.data[start..start + self.row_bytes()]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Copy into an `image` crate buffer.
    pub fn to_rgba_image(&self) -> RgbaImage {
        // The length invariant makes `from_raw` infallible here.
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.into_raw(),
            width,
            height,
        }
    }

    /// Write the buffer as a PNG, mainly for test harnesses and debugging.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        self.to_rgba_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL as usize
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL as usize
}
