//! Benchmarks for the frequency transform engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use liveeffect::buffer::ImageBuffer;
use liveeffect::spectrum::{filter_spectrum, forward_2d, inverse_2d, transform_1d};

fn bench_transform_1d(c: &mut Criterion) {
    let mut group = c.benchmark_group("Transform 1D");

    for size in [256usize, 1024, 4096] {
        let real: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let imag = vec![0.0f32; size];

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("forward", size), &size, |b, _| {
            b.iter(|| black_box(transform_1d(&real, &imag)));
        });
    }

    group.finish();
}

fn bench_image_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Image Spectrum");
    group.sample_size(20);

    for size in [64u32, 256, 512] {
        let image = ImageBuffer::from_fn(size, size, |x, y| [x as u8, y as u8, 90, 255]);
        let spectrum = forward_2d(&image).unwrap();
        let radius = (size / 8) as i64;

        group.bench_with_input(BenchmarkId::new("forward_2d", size), &image, |b, image| {
            b.iter(|| black_box(forward_2d(image)));
        });
        group.bench_with_input(BenchmarkId::new("low_pass", size), &spectrum, |b, spectrum| {
            b.iter(|| {
                let filtered = filter_spectrum(spectrum, |x, y, _, _| x * x + y * y <= radius * radius);
                black_box(inverse_2d(&filtered))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transform_1d, bench_image_spectrum);
criterion_main!(benches);
