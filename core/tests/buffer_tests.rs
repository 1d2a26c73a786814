//! Integration tests for the buffer alignment engine.

use liveeffect::buffer::{
    add_border_padding, aligned_width, aligned_width_for, crop_region, pad_for_alignment,
    pad_for_alignment_to, premultiply, resize, unpad_to_original, unpremultiply, ImageBuffer,
};

/// Deterministic pseudo-random image (xorshift), so failures reproduce.
fn noise(width: u32, height: u32, seed: u32) -> ImageBuffer {
    let mut state = seed.max(1);
    ImageBuffer::from_fn(width, height, |_, _| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        };
        [next(), next(), next(), next()]
    })
}

// ==================== Alignment ====================

#[test]
fn test_aligned_width_concrete() {
    // 100 px -> 400 bytes -> 512 bytes -> 128 px
    assert_eq!(aligned_width(100), 128);
    assert_eq!(aligned_width(64), 64);
    assert_eq!(aligned_width(0), 0);
    assert_eq!(aligned_width(1), 64);
}

#[test]
fn test_aligned_width_properties() {
    for width in 0..2048 {
        let aligned = aligned_width(width);
        assert!(aligned >= width, "{} -> {}", width, aligned);
        assert_eq!(aligned * 4 % 256, 0, "{} -> {}", width, aligned);
        assert!(aligned - width < 64, "{} -> {}", width, aligned);
    }
}

#[test]
fn test_aligned_width_other_quanta() {
    assert_eq!(aligned_width_for(3, 4, 16), 4);
    assert_eq!(aligned_width_for(100, 4, 512), 128);
    assert_eq!(aligned_width_for(100, 4, 0), 100);
}

#[test]
fn test_pad_unpad_round_trip() {
    for (i, &(w, h)) in [(1, 1), (5, 3), (63, 2), (64, 4), (65, 7), (130, 1), (0, 5), (9, 0)]
        .iter()
        .enumerate()
    {
        let img = noise(w, h, i as u32 + 1);
        for alignment in [256, 512, 1024] {
            let padded = pad_for_alignment_to(&img, alignment);
            assert_eq!(padded.height(), h);
            assert_eq!(padded.row_bytes() % alignment as usize, 0);
            assert_eq!(unpad_to_original(&padded, w, h), img);
        }
    }
}

#[test]
fn test_pad_leaves_aligned_image_untouched() {
    let img = noise(128, 3, 7);
    assert_eq!(pad_for_alignment(&img), img);
}

#[test]
fn test_padding_columns_are_zero() {
    let img = ImageBuffer::from_fn(3, 2, |_, _| [255, 255, 255, 255]);
    let padded = pad_for_alignment(&img);
    assert_eq!(padded.width(), 64);
    assert_eq!(padded.pixel(2, 1), [255; 4]);
    assert_eq!(padded.pixel(3, 1), [0; 4]);
    assert_eq!(padded.pixel(63, 0), [0; 4]);
}

// ==================== Geometry ====================

#[test]
fn test_border_padding_concrete() {
    let img = noise(10, 10, 3);
    let padded = add_border_padding(&img, 5);
    assert_eq!(padded.dimensions(), (20, 20));
    for y in 5..15 {
        for x in 5..15 {
            assert_eq!(padded.pixel(x, y), img.pixel(x - 5, y - 5));
        }
    }
    assert_eq!(padded.pixel(0, 0), [0; 4]);
    assert_eq!(padded.pixel(19, 19), [0; 4]);
    assert_eq!(crop_region(&padded, 5.0, 5.0, 10.0, 10.0), img);
}

#[test]
fn test_crop_never_exceeds_source() {
    let img = noise(12, 8, 9);
    let cases = [
        (-5.0, -5.0, 100.0, 100.0),
        (11.6, 7.6, 4.0, 4.0),
        (3.0, 2.0, -1.0, 4.0),
        (f64::NAN, 0.0, 3.0, 3.0),
        (100.0, 100.0, 1.0, 1.0),
        (2.4, 1.5, 3.5, 2.49),
    ];
    for (x, y, w, h) in cases {
        let out = crop_region(&img, x, y, w, h);
        assert!(out.width() <= img.width() && out.height() <= img.height());
        assert_eq!(out.data().len(), (out.width() * out.height() * 4) as usize);
    }
}

#[test]
fn test_crop_rounds_coordinates() {
    let img = ImageBuffer::from_fn(10, 10, |x, y| [x as u8, y as u8, 0, 255]);
    let out = crop_region(&img, 2.4, 1.5, 3.5, 2.49);
    assert_eq!(out.dimensions(), (4, 2));
    assert_eq!(out.pixel(0, 0), [2, 2, 0, 255]);
}

#[test]
fn test_resize_constant_image() {
    let img = ImageBuffer::from_fn(33, 17, |_, _| [10, 20, 30, 255]);
    let out = resize(&img, 64.4, 7.6);
    assert_eq!(out.dimensions(), (64, 8));
    for (i, &v) in out.data().iter().enumerate() {
        let expected = [10u8, 20, 30, 255][i % 4];
        assert!((v as i32 - expected as i32).abs() <= 1, "byte {}: {}", i, v);
    }
}

// ==================== Alpha ====================

#[test]
fn test_premultiply_opaque_is_identity() {
    let img = ImageBuffer::from_fn(8, 8, |x, y| [x as u8 * 30, y as u8 * 30, 77, 255]);
    assert_eq!(premultiply(&img), img);
    assert_eq!(unpremultiply(&premultiply(&img)), img);
}

#[test]
fn test_premultiply_half_alpha() {
    let img = ImageBuffer::from_fn(1, 1, |_, _| [200, 100, 0, 128]);
    let pre = premultiply(&img);
    let [r, g, b, a] = pre.pixel(0, 0);
    assert_eq!(a, 128);
    assert!((r as i32 - 100).abs() <= 1);
    assert!((g as i32 - 50).abs() <= 1);
    assert_eq!(b, 0);

    let back = unpremultiply(&pre).pixel(0, 0);
    assert!((back[0] as i32 - 200).abs() <= 2);
    assert!((back[1] as i32 - 100).abs() <= 2);
}
