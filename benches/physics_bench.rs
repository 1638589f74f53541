//! Benchmarks for lockstep-physics
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lockstep_physics::collider::collide;
use lockstep_physics::spatial::SpatialGrid;
use lockstep_physics::store::BodyStore;
use lockstep_physics::{DeterministicRng, Fixed, PhysicsConfig, PhysicsManager, RigidBodySpec, Shape, Vec3Fix};

/// Arena with a floor and `count` balls scattered above it
fn arena(count: usize) -> PhysicsManager {
    let mut physics = PhysicsManager::new(PhysicsConfig {
        max_bodies: count + 1,
        ..PhysicsConfig::default()
    })
    .unwrap();
    physics.create_body(&RigidBodySpec::fixed(
        Vec3Fix::from_int(0, -1, 0),
        Shape::cuboid(Vec3Fix::from_int(40, 1, 40)),
    ));
    let mut rng = DeterministicRng::new(7);
    for _ in 0..count {
        let position = Vec3Fix::new(
            rng.next_fixed_range(Fixed::from_int(-15), Fixed::from_int(15)),
            rng.next_fixed_range(Fixed::ONE, Fixed::from_int(8)),
            rng.next_fixed_range(Fixed::from_int(-15), Fixed::from_int(15)),
        );
        physics.create_body(&RigidBodySpec::dynamic(position, Shape::sphere(Fixed::HALF), Fixed::ONE));
    }
    physics
}

// ============================================================================
// Step benchmarks
// ============================================================================

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for count in [8usize, 32, 128] {
        group.bench_with_input(BenchmarkId::new("arena_60_steps", count), &count, |b, &count| {
            b.iter_batched(
                || arena(count),
                |mut physics| {
                    for _ in 0..60 {
                        physics.step();
                    }
                    physics.checksum()
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.bench_function("update_variable_frames", |b| {
        b.iter_batched(
            || arena(32),
            |mut physics| {
                for micros in [16_000u32, 17_500, 15_250, 16_667] {
                    physics.update_micros(black_box(micros));
                }
                physics.step_count()
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// Math benchmarks
// ============================================================================

fn bench_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("math");

    let a = Fixed::from_ratio(12345, 100);
    let b = Fixed::from_ratio(-678, 10);

    group.bench_function("fixed_mul", |bench| {
        bench.iter(|| black_box(black_box(a) * black_box(b)));
    });

    group.bench_function("fixed_div", |bench| {
        bench.iter(|| black_box(black_box(a) / black_box(b)));
    });

    group.bench_function("fixed_sqrt", |bench| {
        bench.iter(|| black_box(black_box(a).sqrt()));
    });

    let v = Vec3Fix::from_int(3, -4, 12);
    group.bench_function("vec3_normalize", |bench| {
        bench.iter(|| black_box(black_box(v).normalize()));
    });

    group.finish();
}

// ============================================================================
// Collision benchmarks
// ============================================================================

fn bench_collision(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision");

    let sphere = Shape::sphere(Fixed::ONE);
    let cuboid = Shape::cuboid(Vec3Fix::from_int(1, 1, 1));
    let capsule = Shape::capsule(Fixed::HALF, Fixed::from_int(2));
    let pa = Vec3Fix::ZERO;
    let pb = Vec3Fix::new(Fixed::from_ratio(3, 2), Fixed::HALF, Fixed::ZERO);

    group.bench_function("sphere_sphere", |bench| {
        bench.iter(|| collide(black_box(&sphere), pa, black_box(&sphere), pb));
    });
    group.bench_function("sphere_box", |bench| {
        bench.iter(|| collide(black_box(&sphere), pa, black_box(&cuboid), pb));
    });
    group.bench_function("box_box", |bench| {
        bench.iter(|| collide(black_box(&cuboid), pa, black_box(&cuboid), pb));
    });
    group.bench_function("capsule_capsule", |bench| {
        bench.iter(|| collide(black_box(&capsule), pa, black_box(&capsule), pb));
    });

    group.bench_function("grid_rebuild_128", |bench| {
        let mut store = BodyStore::new(128);
        let mut rng = DeterministicRng::new(3);
        for _ in 0..128 {
            let spec = RigidBodySpec::dynamic(rng.next_vec3(Fixed::from_int(20)), sphere, Fixed::ONE);
            let _ = store.insert(&spec);
        }
        let mut grid = SpatialGrid::new(Fixed::from_int(2));
        bench.iter(|| {
            grid.rebuild(black_box(&store).iter().map(|b| (b.id, b.aabb())));
            grid.candidate_pairs().count()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_math, bench_collision);
criterion_main!(benches);
