//! Bouncing Ball Example
//!
//! Drops a ball onto a floor, knocks a second ball across the arena and
//! prints positions plus the per-step checksum two lockstep peers would
//! compare.
//!
//! ```bash
//! cargo run --example bouncing_ball
//! ```

use lockstep_physics::prelude::*;

fn main() {
    let mut physics = PhysicsManager::new(PhysicsConfig::default()).expect("default config is valid");

    // Floor with its top face at y=0
    physics.create_body(
        &RigidBodySpec::fixed(
            Vec3Fix::from_int(0, -1, 0),
            Shape::cuboid(Vec3Fix::from_int(20, 1, 20)),
        )
        .with_restitution(Fixed::ONE),
    );

    let ball = physics.create_body(
        &RigidBodySpec::dynamic(Vec3Fix::from_int(0, 10, 0), Shape::sphere(Fixed::HALF), Fixed::ONE)
            .with_restitution(Fixed::from_ratio(8, 10)),
    );
    let target = physics.create_body(&RigidBodySpec::dynamic(
        Vec3Fix::new(Fixed::from_int(4), Fixed::HALF, Fixed::ZERO),
        Shape::sphere(Fixed::HALF),
        Fixed::from_int(2),
    ));
    let sensor = physics.create_body(&RigidBodySpec::trigger(
        Vec3Fix::new(Fixed::from_int(8), Fixed::HALF, Fixed::ZERO),
        Shape::cuboid(Vec3Fix::from_int(1, 1, 1)),
    ));

    println!("Bodies: ball={ball} target={target} sensor={sensor}");
    println!("{:>5} {:>8} {:>8} {:>18}", "step", "ball.y", "target.x", "checksum");

    // Simulate 4 seconds at 60 Hz frame times; the engine runs 120 Hz steps
    for frame in 0..240 {
        if frame == 60 {
            physics.apply_impulse(target, Vec3Fix::from_int(12, 2, 0));
        }
        physics.update(1.0 / 60.0);

        for event in physics.events().trigger_events() {
            let what = if event.entered { "entered" } else { "left" };
            println!("  body {} {} trigger {}", event.other_body, what, event.trigger_body);
        }

        if frame % 20 == 0 {
            let y = physics.get_body(ball).map(|b| b.position.y.to_f32()).unwrap_or_default();
            let x = physics.get_body(target).map(|b| b.position.x.to_f32()).unwrap_or_default();
            println!("{:>5} {:>8.3} {:>8.3} {:>18x}", physics.step_count(), y, x, physics.checksum().0);
        }
    }

    let stats = physics.stats();
    println!(
        "\nDone: {} steps, {} sleeping, {} contacts in the last step",
        stats.steps, stats.sleeping, stats.collision.contacts
    );
}
