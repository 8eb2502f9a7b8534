use realfield::{RealField, RoundingMode};

use RoundingMode::NearestTiesToEven as rme;

fn test_sqrt() {
    let f = RealField::new(10000, rme, false).unwrap();
    black_box(f.from_u64(2).sqrt());
}

fn test_div() {
    let f = RealField::new(2000, rme, false).unwrap();
    let a = f.from_rational(355, 113);
    let b = f.from_u64(10005).sqrt();
    black_box(a.div(&b).unwrap());
}

fn test_powi() {
    let f = RealField::new(1000, rme, false).unwrap();
    black_box(f.from_rational(11, 10).powi(11000));
}

fn test_powi_large_exponent() {
    let f = RealField::new(200, rme, false).unwrap();
    black_box(f.from_rational(1_000_001, 1_000_000).powi(1 << 40));
}

fn test_print_decimal() {
    let f = RealField::new(4000, rme, false).unwrap();
    black_box(f.from_rational(1, 7).to_string());
}

fn test_parse_decimal() {
    let f = RealField::new(2000, rme, false).unwrap();
    let text = "3.14159265358979323846264338327950288419716939937510e-12345";
    black_box(f.parse(text).unwrap());
}

fn test_rem() {
    let f = RealField::new(100, rme, false).unwrap();
    let a = f.from_u64(1).mul_2si(100_000);
    let b = f.from_u64(3);
    black_box(a.rem(&b).unwrap());
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("test_sqrt", |b| b.iter(test_sqrt));
    c.bench_function("test_div", |b| b.iter(test_div));
    c.bench_function("test_powi", |b| b.iter(test_powi));
    c.bench_function("test_powi_large_exponent", |b| {
        b.iter(test_powi_large_exponent)
    });
    c.bench_function("test_print_decimal", |b| b.iter(test_print_decimal));
    c.bench_function("test_parse_decimal", |b| b.iter(test_parse_decimal));
    c.bench_function("test_rem", |b| b.iter(test_rem));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
