#![no_main]
use libfuzzer_sys::fuzz_target;
use lockstep_physics::{Fixed, PhysicsConfig, PhysicsManager, RigidBodySpec, Shape, Vec3Fix};

// Feed arbitrary bytes to load_state. Must never panic; a rejected buffer
// leaves the world untouched.
fuzz_target!(|data: &[u8]| {
    let mut physics = PhysicsManager::new(PhysicsConfig::default()).unwrap();
    for i in 0..3 {
        physics.create_body(&RigidBodySpec::dynamic(
            Vec3Fix::from_int(i * 2, 1, 0),
            Shape::sphere(Fixed::HALF),
            Fixed::ONE,
        ));
    }
    let before = physics.checksum();
    if physics.load_state(data).is_err() {
        assert_eq!(physics.checksum(), before);
    } else {
        physics.step();
    }
});
