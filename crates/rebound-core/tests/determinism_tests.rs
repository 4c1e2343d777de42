// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

mod common;

use common::{body_with, ground, run};
use rebound_core::{BodyDesc, BroadPhaseKind, ShapeDesc, StepStats, World, WorldConfig};
use rebound_math::{Quat, Vec3};

#[allow(clippy::cast_precision_loss)]
fn pile(broad_phase: BroadPhaseKind) -> World {
    let mut world = World::new(WorldConfig {
        broad_phase,
        ..WorldConfig::default()
    })
    .unwrap();
    ground(&mut world);
    for i in 0..4 {
        let y = 0.6 + 1.1 * i as f32;
        let tilt = Quat::from_axis_angle(Vec3::new(1.0, 0.0, 1.0), 0.1 * i as f32);
        body_with(
            &mut world,
            BodyDesc::dynamic()
                .with_position(Vec3::new(0.05 * i as f32, y, 0.0))
                .with_orientation(tilt),
            ShapeDesc::cuboid(1.0, 1.0, 1.0),
        );
        body_with(
            &mut world,
            BodyDesc::dynamic().with_position(Vec3::new(2.0, y, 0.1 * i as f32)),
            ShapeDesc::sphere(0.5),
        );
        body_with(
            &mut world,
            BodyDesc::dynamic().with_position(Vec3::new(-2.0, y, 0.0)),
            ShapeDesc::cylinder(0.5, 1.0),
        );
    }
    world
}

#[test]
fn identical_worlds_stay_identical() {
    let mut a = pile(BroadPhaseKind::SweepAndPrune);
    let mut b = pile(BroadPhaseKind::SweepAndPrune);
    assert_eq!(a.state_hash(), b.state_hash());

    for _ in 0..200 {
        a.step();
        b.step();
        assert_eq!(a.state_hash(), b.state_hash());
    }
    assert_eq!(a.stats(), b.stats());
}

#[test]
fn broad_phase_choice_does_not_change_the_outcome() {
    let mut sap = pile(BroadPhaseKind::SweepAndPrune);
    let mut brute = pile(BroadPhaseKind::BruteForce);

    run(&mut sap, 150);
    run(&mut brute, 150);

    assert_eq!(sap.state_hash(), brute.state_hash());
    assert_eq!(sap.stats().contacts, brute.stats().contacts);
}

#[test]
fn stepping_changes_the_hash() {
    let mut world = pile(BroadPhaseKind::SweepAndPrune);
    let before = world.state_hash();

    world.step();

    assert_ne!(before, world.state_hash());
}

#[test]
fn clear_empties_the_world_and_restarts_counters() {
    let mut world = pile(BroadPhaseKind::SweepAndPrune);
    run(&mut world, 10);
    assert!(world.num_contacts() > 0);

    world.clear();

    assert_eq!(world.num_bodies(), 0);
    assert_eq!(world.num_shapes(), 0);
    assert_eq!(world.num_contacts(), 0);
    assert_eq!(world.steps(), 0);
    assert_eq!(*world.stats(), StepStats::default());
    world.step();
    assert_eq!(world.stats().pair_checks, 0);
}
