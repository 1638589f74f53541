#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use lockstep_physics::collider::collide;
use lockstep_physics::{Fixed, Shape, Vec3Fix};

#[derive(Debug, Arbitrary)]
struct ShapeInput {
    kind: u8,
    a: u16,
    b: u16,
    c: u16,
}

#[derive(Debug, Arbitrary)]
struct CollisionInput {
    a: ShapeInput,
    b: ShapeInput,
    pa: (i16, i16, i16),
    pb: (i16, i16, i16),
}

fn position((x, y, z): (i16, i16, i16)) -> Vec3Fix {
    Vec3Fix::from_raw([(x as i32) << 4, (y as i32) << 4, (z as i32) << 4])
}

fn shape(input: &ShapeInput) -> Shape {
    let dim = |v: u16| Fixed::from_raw(v as i32 + 1);
    match input.kind % 3 {
        0 => Shape::sphere(dim(input.a)),
        1 => Shape::cuboid(Vec3Fix::new(dim(input.a), dim(input.b), dim(input.c))),
        _ => Shape::capsule(dim(input.a), dim(input.b)),
    }
}

// Narrow-phase on arbitrary shapes and positions. Must never panic, and
// distinct positions must give mirrored results.
fuzz_target!(|input: CollisionInput| {
    let sa = shape(&input.a);
    let sb = shape(&input.b);
    let pa = position(input.pa);
    let pb = position(input.pb);

    let ab = collide(&sa, pa, &sb, pb);
    let ba = collide(&sb, pb, &sa, pa);
    if pa == pb {
        return;
    }
    assert_eq!(ab.is_some(), ba.is_some());
    if let (Some(ab), Some(ba)) = (ab, ba) {
        assert_eq!(ab.normal, -ba.normal);
        assert_eq!(ab.penetration, ba.penetration);
        assert!(!ab.penetration.is_negative());
    }
});
