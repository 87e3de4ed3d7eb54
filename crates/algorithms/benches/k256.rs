//! Benchmarks for secp256k1 (K256) elliptic curve operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use koblitz_algorithms::ec::k256::{
    base_point_g, precompute_base, scalar_mult_base_g, FieldElement, Point, PrecomputedPoint,
    Scalar, K256_FIELD_ELEMENT_SIZE, K256_SCALAR_SIZE,
};
use rand::rngs::OsRng;
use rand::RngCore;

/// Generate a random field element for benchmarking
fn random_field_element() -> FieldElement {
    let mut bytes = [0u8; K256_FIELD_ELEMENT_SIZE];
    loop {
        OsRng.fill_bytes(&mut bytes);
        if let Ok(fe) = FieldElement::from_bytes(&bytes) {
            return fe;
        }
    }
}

/// Generate a random scalar for benchmarking
fn random_scalar() -> Scalar {
    let mut bytes = [0u8; K256_SCALAR_SIZE];
    loop {
        OsRng.fill_bytes(&mut bytes);
        if let Ok(scalar) = Scalar::new(bytes) {
            if !scalar.is_zero() {
                return scalar;
            }
        }
    }
}

/// Generate a random point on the curve for benchmarking
fn random_point() -> Point {
    let scalar = random_scalar();
    scalar_mult_base_g(&scalar).expect("scalar multiplication should succeed")
}

fn bench_field_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("k256_field");

    let a = random_field_element();
    let b = random_field_element();

    group.bench_function("add", |bench| {
        bench.iter(|| black_box(&a).add(black_box(&b)))
    });
    group.bench_function("mul", |bench| {
        bench.iter(|| black_box(&a).mul(black_box(&b)))
    });
    group.bench_function("square", |bench| {
        bench.iter(|| black_box(&a).square())
    });
    group.bench_function("invert", |bench| {
        bench.iter(|| black_box(&a).invert().unwrap())
    });
    group.bench_function("sqrt", |bench| {
        let square = a.square();
        bench.iter(|| black_box(&square).sqrt().unwrap())
    });

    group.finish();
}

fn bench_scalar_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("k256_scalar");

    let a = random_scalar();
    let b = random_scalar();

    group.bench_function("mul_mod_n", |bench| {
        bench.iter(|| black_box(&a).mul_mod_n(black_box(&b)))
    });
    group.bench_function("inv_mod_n", |bench| {
        bench.iter(|| black_box(&a).inv_mod_n().unwrap())
    });

    group.finish();
}

fn bench_scalar_multiplication(c: &mut Criterion) {
    let mut group = c.benchmark_group("k256_scalar_mult");
    group.sample_size(20);

    let k = random_scalar();
    let q = random_point();

    group.bench_function("base_point_w4", |bench| {
        precompute_base(4).unwrap();
        bench.iter(|| scalar_mult_base_g(black_box(&k)).unwrap())
    });
    group.bench_function("base_point_w8", |bench| {
        precompute_base(8).unwrap();
        bench.iter(|| scalar_mult_base_g(black_box(&k)).unwrap())
    });
    group.bench_function("arbitrary_point_ladder", |bench| {
        bench.iter(|| black_box(&q).mul(black_box(&k)).unwrap())
    });
    group.bench_function("arbitrary_point_cached", |bench| {
        let cached = PrecomputedPoint::new(&q, 4).unwrap();
        bench.iter(|| cached.mul(black_box(&k)))
    });

    group.finish();
}

fn bench_group_law(c: &mut Criterion) {
    let mut group = c.benchmark_group("k256_group");

    let p = random_point();
    let q = random_point();
    let g = base_point_g();

    group.bench_function("add", |bench| {
        bench.iter(|| black_box(&p).add(black_box(&q)))
    });
    group.bench_function("double", |bench| {
        bench.iter(|| black_box(&g).double())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_field_arithmetic,
    bench_scalar_arithmetic,
    bench_scalar_multiplication,
    bench_group_law
);
criterion_main!(benches);
