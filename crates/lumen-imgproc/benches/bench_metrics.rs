use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use lumen_image::Image;
use lumen_imgproc::metrics;

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    let mut rng = rand::rng();

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        // input image
        let image_size = [*width, *height].into();
        let data = (0..width * height).map(|_| rng.random::<u8>()).collect();
        let image = Image::<u8, 1>::new(image_size, data).unwrap();

        group.bench_with_input(
            BenchmarkId::new("shannon_entropy", &parameter_string),
            &image,
            |b, i| b.iter(|| metrics::shannon_entropy(black_box(i))),
        );

        group.bench_with_input(
            BenchmarkId::new("ame", &parameter_string),
            &image,
            |b, i| b.iter(|| metrics::ame(black_box(i), &metrics::AmeParams::default())),
        );

        group.bench_with_input(
            BenchmarkId::new("bie", &parameter_string),
            &image,
            |b, i| b.iter(|| metrics::bie(black_box(i), metrics::DEFAULT_BLOCK_SIZE)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_metrics);
criterion_main!(benches);
