//! Collision Manager
//!
//! Broad phase, narrow phase and impulse resolution for one step.
//!
//! # Pipeline
//!
//! 1. **Broad**: canonical candidate pairs from the [`SpatialGrid`] in
//!    ascending `(a, b)` order. Pairs are dropped when the layer/mask test
//!    fails, when neither body can respond (unless one is a trigger), or
//!    when a sleeping body meets a partner that is not awake and moving.
//! 2. **Narrow**: [`collide`] on the two shapes.
//! 3. **Resolve**, in discovery order:
//!    - positional correction `max(pen - slop, 0) * percent`, split by
//!      inverse-mass share
//!    - if approaching (`v_rel · n <= 0`): restitution impulse with
//!      `e = min(e_a, e_b)` and a Coulomb friction impulse on the tangent
//!
//! Impulses are evaluated as `Δv = (1 + e) · v_rel·n · w / (w_a + w_b)`,
//! which equals `j · w` with `j = -(1 + e) · v_rel·n / (w_a + w_b)` but keeps
//! every intermediate inside Q16.16 for very heavy bodies.
//!
//! Triggers are reported but never resolved.

use crate::body::RigidBody;
use crate::collider::{collide, Contact};
use crate::config::PhysicsConfig;
use crate::event::EventCollector;
use crate::filter::CollisionFilter;
use crate::math::{Fixed, Vec3Fix};
use crate::sleeping::wakes_on_contact;
use crate::spatial::SpatialGrid;
use crate::store::BodyStore;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Per-step collision counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Candidate pairs from the broad phase
    pub candidate_pairs: u32,
    /// Pairs that reached the narrow phase
    pub pairs_tested: u32,
    /// Overlaps found (including triggers)
    pub contacts: u32,
    /// Contacts that received an impulse
    pub contacts_resolved: u32,
    /// Trigger overlaps
    pub trigger_overlaps: u32,
    /// Sleeping bodies woken by contact
    pub bodies_woken: u32,
}

/// Broad phase filtering decision for one pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PairAction {
    Skip,
    Trigger,
    Resolve,
}

fn classify(a: &RigidBody, b: &RigidBody, config: &PhysicsConfig) -> PairAction {
    if !CollisionFilter::can_collide(&a.filter, &b.filter) {
        return PairAction::Skip;
    }
    if a.is_trigger || b.is_trigger {
        return PairAction::Trigger;
    }
    let responds = |x: &RigidBody| x.is_dynamic();
    if !responds(a) && !responds(b) {
        return PairAction::Skip;
    }
    let sleep = &config.sleep;
    let a_ok = !a.is_sleeping || wakes_on_contact(b, sleep);
    let b_ok = !b.is_sleeping || wakes_on_contact(a, sleep);
    if a.is_sleeping && b.is_sleeping {
        return PairAction::Skip;
    }
    if !(a_ok && b_ok) {
        return PairAction::Skip;
    }
    if !a.can_move() && !b.can_move() {
        return PairAction::Skip;
    }
    PairAction::Resolve
}

/// Narrow phase and resolution state
#[derive(Clone, Debug, Default)]
pub struct CollisionManager {
    contacts: Vec<Contact>,
    stats: CollisionStats,
}

impl CollisionManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Run broad phase, narrow phase and resolution over the grid's pairs.
    ///
    /// The grid must have been rebuilt from `store` after integration.
    pub fn detect_and_resolve(
        &mut self,
        store: &mut BodyStore,
        grid: &SpatialGrid,
        config: &PhysicsConfig,
        events: &mut EventCollector,
    ) -> CollisionStats {
        self.contacts.clear();
        self.stats = CollisionStats::default();

        for (id_a, id_b) in grid.candidate_pairs() {
            self.stats.candidate_pairs += 1;
            // Bodies missing mid-step are skipped silently
            let Some((a, b)) = store.get_pair_mut(id_a, id_b) else {
                continue;
            };

            let action = classify(a, b, config);
            if action == PairAction::Skip {
                continue;
            }

            self.stats.pairs_tested += 1;
            let Some(geometry) = collide(&a.shape, a.position, &b.shape, b.position) else {
                continue;
            };
            let contact = Contact::new(id_a, id_b, geometry);
            self.contacts.push(contact);
            self.stats.contacts += 1;

            if action == PairAction::Trigger {
                self.stats.trigger_overlaps += 1;
                if a.is_trigger {
                    events.report_trigger(id_a, id_b);
                }
                if b.is_trigger {
                    events.report_trigger(id_b, id_a);
                }
                continue;
            }

            if a.is_sleeping {
                a.wake();
                self.stats.bodies_woken += 1;
            }
            if b.is_sleeping {
                b.wake();
                self.stats.bodies_woken += 1;
            }

            let vn = (b.velocity - a.velocity).dot(contact.normal);
            events.report_contact(id_a, id_b, contact.normal, contact.point, contact.penetration, vn);

            if resolve_contact(a, b, &contact, config) {
                self.stats.contacts_resolved += 1;
            }
        }

        log::trace!(
            "collision: {} candidates, {} tested, {} contacts, {} resolved",
            self.stats.candidate_pairs,
            self.stats.pairs_tested,
            self.stats.contacts,
            self.stats.contacts_resolved
        );
        self.stats
    }

    /// Contacts found in the last step, in discovery order
    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Contacts of the last step involving `id`
    pub fn contacts_for_body(&self, id: u32) -> Vec<Contact> {
        self.contacts.iter().filter(|c| c.involves(id)).copied().collect()
    }

    /// Counters of the last step
    #[inline]
    pub fn stats(&self) -> CollisionStats {
        self.stats
    }

    /// Forget the last step's contacts
    pub fn clear(&mut self) {
        self.contacts.clear();
        self.stats = CollisionStats::default();
    }
}

/// Positional correction plus restitution and friction impulses.
///
/// Returns `true` if an impulse was applied (bodies approaching).
pub fn resolve_contact(a: &mut RigidBody, b: &mut RigidBody, contact: &Contact, config: &PhysicsConfig) -> bool {
    let wa = a.inverse_mass;
    let wb = b.inverse_mass;
    let w_sum = wa + wb;
    let (Some(share_a), Some(share_b)) = (wa.checked_div(w_sum), wb.checked_div(w_sum)) else {
        return false;
    };
    let n = contact.normal;

    // Positional correction
    let excess = (contact.penetration - config.contact_slop).max(Fixed::ZERO);
    if excess.is_positive() {
        let correction = excess * config.correction_percent;
        a.position -= n * (correction * share_a);
        b.position += n * (correction * share_b);
    }

    let v_rel = b.velocity - a.velocity;
    let vn = v_rel.dot(n);
    if vn.is_positive() {
        return false;
    }

    // Restitution: relative normal velocity change of (1 + e) * vn
    let e = a.material.restitution.min(b.material.restitution);
    let dv_normal = (Fixed::ONE + e) * vn;
    a.velocity += n * (dv_normal * share_a);
    b.velocity -= n * (dv_normal * share_b);

    // Friction on the tangential component, bounded by mu * |dv_normal|
    let tangent = v_rel - n * vn;
    let speed_t = tangent.length();
    if speed_t.is_positive() {
        let budget = dv_normal.abs();
        let mu_s = (a.material.friction_static * b.material.friction_static).sqrt();
        let mu_k = (a.material.friction_kinetic * b.material.friction_kinetic).sqrt();
        let removed = if speed_t <= mu_s * budget {
            tangent
        } else {
            (tangent / speed_t) * (mu_k * budget).min(speed_t)
        };
        a.velocity += removed * share_a;
        b.velocity -= removed * share_b;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Material, RigidBodySpec};
    use crate::shape::Shape;

    fn frictionless(restitution: Fixed) -> Material {
        Material {
            friction_static: Fixed::ZERO,
            friction_kinetic: Fixed::ZERO,
            restitution,
            drag: Fixed::ZERO,
        }
    }

    fn ball(x: i32, vx: i32, mass: i32, e: Fixed) -> RigidBodySpec {
        RigidBodySpec::dynamic(Vec3Fix::from_int(x, 0, 0), Shape::sphere(Fixed::HALF), Fixed::from_int(mass))
            .with_velocity(Vec3Fix::from_int(vx, 0, 0))
            .with_material(frictionless(e))
    }

    fn run(store: &mut BodyStore, config: &PhysicsConfig) -> (CollisionManager, CollisionStats) {
        let mut grid = SpatialGrid::new(config.cell_size);
        grid.rebuild(store.iter().map(|b| (b.id, b.aabb())));
        let mut manager = CollisionManager::new();
        let mut events = EventCollector::default();
        events.begin_frame();
        let stats = manager.detect_and_resolve(store, &grid, config, &mut events);
        (manager, stats)
    }

    #[test]
    fn test_elastic_equal_mass_swap() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let a = store.insert(&ball(0, 2, 1, Fixed::ONE)).unwrap();
        let b = store.insert(&ball(1, -2, 1, Fixed::ONE)).unwrap();
        let (_, stats) = run(&mut store, &config);
        assert_eq!(stats.contacts_resolved, 1);
        assert_eq!(store.get(a).unwrap().velocity, Vec3Fix::from_int(-2, 0, 0));
        assert_eq!(store.get(b).unwrap().velocity, Vec3Fix::from_int(2, 0, 0));
    }

    #[test]
    fn test_separating_pair_gets_no_impulse() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        // A sits right of B and moves further right
        let a = store.insert(&ball(0, 1, 1, Fixed::ONE)).unwrap();
        store.insert(&ball(0, -1, 1, Fixed::ONE)).unwrap();
        store.get_mut(a).unwrap().position = Vec3Fix::new(Fixed::HALF, Fixed::ZERO, Fixed::ZERO);
        let (manager, stats) = run(&mut store, &config);
        assert_eq!(manager.contacts().len(), 1);
        assert_eq!(stats.contacts_resolved, 0);
    }

    #[test]
    fn test_static_static_never_resolved() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let wall = RigidBodySpec::fixed(Vec3Fix::ZERO, Shape::sphere(Fixed::ONE));
        let a = store.insert(&wall).unwrap();
        let b = store.insert(&wall).unwrap();
        let (manager, stats) = run(&mut store, &config);
        assert_eq!(stats.pairs_tested, 0);
        assert!(manager.contacts().is_empty());
        assert_eq!(store.get(a).unwrap().position, Vec3Fix::ZERO);
        assert_eq!(store.get(b).unwrap().position, Vec3Fix::ZERO);
    }

    #[test]
    fn test_trigger_reports_without_response() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let zone = store
            .insert(&RigidBodySpec::trigger(Vec3Fix::ZERO, Shape::cuboid(Vec3Fix::from_int(2, 2, 2))))
            .unwrap();
        let runner = store.insert(&ball(1, 5, 1, Fixed::ONE)).unwrap();

        let mut grid = SpatialGrid::new(config.cell_size);
        grid.rebuild(store.iter().map(|b| (b.id, b.aabb())));
        let mut manager = CollisionManager::new();
        let mut events = EventCollector::default();
        events.begin_frame();
        let stats = manager.detect_and_resolve(&mut store, &grid, &config, &mut events);

        assert_eq!(stats.trigger_overlaps, 1);
        assert_eq!(stats.contacts_resolved, 0);
        assert_eq!(store.get(runner).unwrap().velocity, Vec3Fix::from_int(5, 0, 0));
        assert_eq!(events.trigger_events()[0].trigger_body, zone);
        assert_eq!(events.trigger_events()[0].other_body, runner);
    }

    #[test]
    fn test_layer_mask_filters_pairs() {
        use crate::filter::layers;
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let ghost = CollisionFilter::new(layers::PROJECTILE, layers::ENVIRONMENT);
        store.insert(&ball(0, 1, 1, Fixed::ONE).with_filter(ghost)).unwrap();
        store.insert(&ball(0, -1, 1, Fixed::ONE)).unwrap();
        let (manager, _) = run(&mut store, &config);
        assert!(manager.contacts().is_empty());
    }

    #[test]
    fn test_knockback_shares_momentum() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let light = store.insert(&ball(0, 10, 1, Fixed::ZERO)).unwrap();
        let heavy = store.insert(&ball(1, 0, 10, Fixed::ZERO)).unwrap();
        run(&mut store, &config);

        let v1 = store.get(light).unwrap().velocity.x;
        let v2 = store.get(heavy).unwrap().velocity.x;
        // Perfectly inelastic: both end near 10/11
        let expected = Fixed::from_ratio(10, 11);
        assert!((v1 - expected).abs() <= Fixed::from_ratio(1, 100), "v1 = {}", v1.to_f32());
        assert!((v2 - expected).abs() <= Fixed::from_ratio(1, 100), "v2 = {}", v2.to_f32());

        // Momentum conserved to fixed-point precision
        let p = v1 + v2 * Fixed::from_int(10);
        assert!((p - Fixed::from_int(10)).abs() <= Fixed::from_ratio(1, 100));
    }

    #[test]
    fn test_positional_correction_by_inverse_mass() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let ground = store
            .insert(&RigidBodySpec::fixed(Vec3Fix::from_int(0, -1, 0), Shape::cuboid(Vec3Fix::from_int(5, 1, 5))))
            .unwrap();
        // Sphere sunk 0.25 into the ground
        let spec = RigidBodySpec::dynamic(
            Vec3Fix::new(Fixed::ZERO, Fixed::from_ratio(1, 4), Fixed::ZERO),
            Shape::sphere(Fixed::HALF),
            Fixed::ONE,
        );
        let ball_id = store.insert(&spec).unwrap();
        run(&mut store, &config);

        assert_eq!(store.get(ground).unwrap().position, Vec3Fix::from_int(0, -1, 0));
        let y = store.get(ball_id).unwrap().position.y;
        // (0.25 - 0.01) * 0.8 = 0.192
        let expected = Fixed::from_ratio(1, 4) + (Fixed::from_ratio(1, 4) - Fixed::from_ratio(1, 100)) * Fixed::from_ratio(8, 10);
        assert!((y - expected).abs() <= Fixed::from_raw(2));
    }

    #[test]
    fn test_sleeping_body_ignores_resting_partner() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let a = store.insert(&ball(0, 0, 1, Fixed::ONE)).unwrap();
        store.insert(&ball(1, 0, 1, Fixed::ONE)).unwrap();
        store.get_mut(a).unwrap().sleep();
        let (_, stats) = run(&mut store, &config);
        assert_eq!(stats.pairs_tested, 0);
        assert!(store.get(a).unwrap().is_sleeping);
    }

    #[test]
    fn test_moving_partner_wakes_sleeper() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let a = store.insert(&ball(0, 0, 1, Fixed::ONE)).unwrap();
        store.insert(&ball(1, -3, 1, Fixed::ONE)).unwrap();
        store.get_mut(a).unwrap().sleep();
        let (_, stats) = run(&mut store, &config);
        assert_eq!(stats.bodies_woken, 1);
        let woken = store.get(a).unwrap();
        assert!(!woken.is_sleeping);
        assert!(woken.velocity.x.is_negative());
    }

    #[test]
    fn test_friction_slows_sliding() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        store
            .insert(&RigidBodySpec::fixed(Vec3Fix::from_int(0, -1, 0), Shape::cuboid(Vec3Fix::from_int(5, 1, 5))))
            .unwrap();
        let spec = RigidBodySpec::dynamic(
            Vec3Fix::new(Fixed::ZERO, Fixed::from_ratio(2, 5), Fixed::ZERO),
            Shape::sphere(Fixed::HALF),
            Fixed::ONE,
        )
        .with_velocity(Vec3Fix::new(Fixed::from_int(4), Fixed::NEG_ONE, Fixed::ZERO));
        let id = store.insert(&spec).unwrap();
        run(&mut store, &config);
        let v = store.get(id).unwrap().velocity;
        assert!(v.x < Fixed::from_int(4));
        assert!(v.x.is_positive());
    }

    #[test]
    fn test_contacts_for_body() {
        let config = PhysicsConfig::default();
        let mut store = BodyStore::new(4);
        let a = store.insert(&ball(0, 0, 1, Fixed::ONE)).unwrap();
        let b = store.insert(&ball(1, 0, 1, Fixed::ONE)).unwrap();
        let c = store.insert(&ball(20, 0, 1, Fixed::ONE)).unwrap();
        let (manager, _) = run(&mut store, &config);
        assert_eq!(manager.contacts_for_body(a).len(), 1);
        assert_eq!(manager.contacts_for_body(b)[0].body_a, a);
        assert!(manager.contacts_for_body(c).is_empty());
    }
}
