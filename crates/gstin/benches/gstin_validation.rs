use criterion::{Criterion, black_box, criterion_group, criterion_main};

use gstsync_gstin::{Gstin, compute_check_digit};

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("gstin");

    group.bench_function("parse_valid", |b| {
        b.iter(|| Gstin::parse(black_box("27AAPFU0939F1ZV")))
    });

    group.bench_function("parse_bad_check_digit", |b| {
        b.iter(|| Gstin::parse(black_box("33AAACH1234A1ZX")))
    });

    group.bench_function("check_digit_only", |b| {
        b.iter(|| compute_check_digit(black_box("29AAGCB7383J1Z")))
    });

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
