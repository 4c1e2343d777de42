// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

mod common;

use common::{body_with, ground, position, run, sphere_body, weightless};
use rebound_core::{BodyDesc, ShapeDesc, World};
use rebound_math::Vec3;

fn awake_ball(world: &mut World, at: Vec3) {
    body_with(
        world,
        BodyDesc::dynamic().with_position(at).without_sleep(),
        ShapeDesc::sphere(1.0),
    );
}

#[test]
fn ground_does_not_join_islands() {
    let mut world = World::default();
    ground(&mut world);
    awake_ball(&mut world, Vec3::new(-5.0, 0.99, 0.0));
    awake_ball(&mut world, Vec3::new(5.0, 0.99, 0.0));

    world.step();

    assert_eq!(world.stats().touching_contacts, 2);
    assert_eq!(world.stats().islands, 2);
}

#[test]
fn touching_bodies_share_one_island() {
    let mut world = weightless();
    sphere_body(&mut world, Vec3::ZERO, 1.0);
    sphere_body(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0);
    sphere_body(&mut world, Vec3::new(3.0, 0.0, 0.0), 1.0);

    world.step();

    assert_eq!(world.stats().islands, 1);
}

#[test]
fn lonely_body_counts_as_an_island() {
    let mut world = World::default();
    let (ball, _) = sphere_body(&mut world, Vec3::new(0.0, 10.0, 0.0), 0.5);

    world.step();

    assert_eq!(world.stats().islands, 1);
    assert_eq!(world.num_contacts(), 0);
    let v = world.body(ball).unwrap().linear_velocity();
    assert!((v.y() + 9.81 / 60.0).abs() < 1e-4);
}

#[test]
fn per_body_gravity_overrides_the_world() {
    let mut world = World::default();
    let (floater, _) = body_with(
        &mut world,
        BodyDesc::dynamic().with_gravity(Vec3::new(0.0, 2.0, 0.0)),
        ShapeDesc::sphere(0.5),
    );
    let (anchored, _) = body_with(
        &mut world,
        BodyDesc::dynamic()
            .with_position(Vec3::new(5.0, 0.0, 0.0))
            .without_gravity()
            .without_sleep(),
        ShapeDesc::sphere(0.5),
    );

    run(&mut world, 30);

    assert!(position(&world, floater).y() > 0.0);
    assert_eq!(position(&world, anchored), Vec3::new(5.0, 0.0, 0.0));
}

#[test]
fn weightless_idle_body_sleeps_then_wakes_on_velocity() {
    let mut world = weightless();
    let (ball, _) = sphere_body(&mut world, Vec3::ZERO, 0.5);

    run(&mut world, 40);
    assert!(world.body(ball).unwrap().is_sleeping());

    world.set_linear_velocity(ball, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    assert!(!world.body(ball).unwrap().is_sleeping());
    world.step();
    assert!(position(&world, ball).x() > 0.0);
}

#[test]
fn bodies_that_disallow_sleep_stay_awake() {
    let mut world = weightless();
    let (ball, _) = body_with(&mut world, BodyDesc::dynamic().without_sleep(), ShapeDesc::sphere(0.5));

    run(&mut world, 120);
    world.sleep_body(ball).unwrap();

    assert!(!world.body(ball).unwrap().is_sleeping());
}

#[test]
fn resting_stack_sleeps_and_wakes_as_a_whole() {
    let mut world = World::default();
    ground(&mut world);
    let (bottom, _) = sphere_body(&mut world, Vec3::new(0.0, 0.5, 0.0), 0.5);
    let (top, _) = sphere_body(&mut world, Vec3::new(0.0, 1.5, 0.0), 0.5);

    run(&mut world, 600);
    assert!(world.body(bottom).unwrap().is_sleeping());
    assert!(world.body(top).unwrap().is_sleeping());
    assert_eq!(world.stats().islands, 0);

    world.wake_body(bottom).unwrap();
    world.step();

    assert!(!world.body(bottom).unwrap().is_sleeping());
    assert!(!world.body(top).unwrap().is_sleeping());
}

#[test]
fn removing_a_support_wakes_what_rested_on_it() {
    let mut world = World::default();
    ground(&mut world);
    let (bottom, _) = sphere_body(&mut world, Vec3::new(0.0, 0.5, 0.0), 0.5);
    let (top, _) = sphere_body(&mut world, Vec3::new(0.0, 1.5, 0.0), 0.5);
    run(&mut world, 600);
    assert!(world.body(top).unwrap().is_sleeping());

    world.remove_body(bottom).unwrap();

    assert!(!world.body(top).unwrap().is_sleeping());
    let before = position(&world, top).y();
    run(&mut world, 10);
    assert!(position(&world, top).y() < before);
}
