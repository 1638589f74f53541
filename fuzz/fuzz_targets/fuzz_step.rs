#![no_main]
use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use lockstep_physics::{Fixed, PhysicsConfig, PhysicsManager, RigidBodySpec, Shape, Vec3Fix};

#[derive(Debug, Arbitrary)]
enum Action {
    Create { x: i16, y: i16, z: i16, radius: u8, mass: i16 },
    Destroy { id: u8 },
    Impulse { id: u8, x: i16, y: i16, z: i16 },
    Teleport { id: u8, x: i16, y: i16, z: i16 },
    Update { micros: u32 },
    Step,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    actions: Vec<Action>,
}

fn vec3(x: i16, y: i16, z: i16) -> Vec3Fix {
    Vec3Fix::from_raw([(x as i32) << 8, (y as i32) << 8, (z as i32) << 8])
}

/// Within +-8 per axis; with mass >= 0.25 one impulse moves a body < 64 m/s.
fn impulse(x: i16, y: i16, z: i16) -> Vec3Fix {
    Vec3Fix::from_raw([(x as i32) << 4, (y as i32) << 4, (z as i32) << 4])
}

/// Non-positive input exercises rejection; positive mass lands in [0.25, 8.25].
fn body_mass(raw: i16) -> Fixed {
    if raw <= 0 {
        Fixed::from_raw(raw as i32)
    } else {
        Fixed::from_raw(16_384 + ((raw as i32) << 4))
    }
}

// Drive the manager with arbitrary lifecycle calls and frame times.
// Must never panic, and a replay of the same calls must match.
fuzz_target!(|input: FuzzInput| {
    let mut physics = PhysicsManager::new(PhysicsConfig::default()).unwrap();
    physics.start_recording().unwrap();

    for action in input.actions.iter().take(256) {
        match *action {
            Action::Create { x, y, z, radius, mass } => {
                let spec = RigidBodySpec::dynamic(
                    vec3(x, y, z),
                    Shape::sphere(Fixed::from_raw((radius as i32) << 10)),
                    body_mass(mass),
                );
                physics.create_body(&spec);
            }
            Action::Destroy { id } => {
                physics.destroy_body(id as u32);
            }
            Action::Impulse { id, x, y, z } => physics.apply_impulse(id as u32, impulse(x, y, z)),
            Action::Teleport { id, x, y, z } => physics.set_position(id as u32, vec3(x, y, z)),
            Action::Update { micros } => {
                physics.update_micros(micros % 200_000);
            }
            Action::Step => physics.step(),
        }
    }

    if let Some(log) = physics.stop_recording() {
        let replayed = log.replay().unwrap();
        assert_eq!(replayed.checksum(), physics.checksum());
    }
});
