//! Benchmarks for the buffer alignment engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use liveeffect::buffer::{
    add_border_padding, crop_region, pad_for_alignment, resize, unpad_to_original, ImageBuffer,
};

fn test_image(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::from_fn(width, height, |x, y| [x as u8, y as u8, (x ^ y) as u8, 255])
}

fn bench_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("Alignment");

    for (width, height) in [(100, 100), (1000, 750), (1921, 1080)] {
        let image = test_image(width, height);
        group.throughput(Throughput::Bytes(image.data().len() as u64));

        group.bench_with_input(
            BenchmarkId::new("pad", format!("{}x{}", width, height)),
            &image,
            |b, image| {
                b.iter(|| black_box(pad_for_alignment(image)));
            },
        );

        let padded = pad_for_alignment(&image);
        group.bench_with_input(
            BenchmarkId::new("unpad", format!("{}x{}", width, height)),
            &padded,
            |b, padded| {
                b.iter(|| black_box(unpad_to_original(padded, width, height)));
            },
        );
    }

    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("Geometry");
    let image = test_image(1000, 750);

    for px in [4, 32, 128] {
        group.bench_with_input(BenchmarkId::new("border_padding", px), &px, |b, &px| {
            b.iter(|| black_box(add_border_padding(&image, px)));
        });
    }

    group.bench_function("crop_region", |b| {
        b.iter(|| black_box(crop_region(&image, 100.4, 50.6, 640.0, 480.0)));
    });

    group.bench_function("resize_to_512", |b| {
        b.iter(|| black_box(resize(&image, 512.0, 384.0)));
    });

    group.finish();
}

criterion_group!(benches, bench_alignment, bench_geometry);
criterion_main!(benches);
