// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

mod common;

use common::{body_with, run, sphere_body, weightless};
use rebound_core::{BodyDesc, CollisionFilter, JointDesc, ShapeDesc, WorldError};
use rebound_math::Vec3;

#[test]
fn overlapping_spheres_report_one_midpoint_contact() {
    let mut world = weightless();
    let (_, a) = sphere_body(&mut world, Vec3::ZERO, 1.0);
    let (_, b) = sphere_body(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0);

    world.step();

    let contact = world.contact_between(a, b).unwrap();
    assert_eq!(contact.manifold().num_points(), 1);
    let p = contact.manifold().points()[0];
    assert!((p.penetration + 0.5).abs() < 1e-5);
    assert!((p.normal - Vec3::UNIT_X).length() < 1e-5);
    assert!((p.position.x() - 0.75).abs() < 1e-5);
    assert!(!p.warm_started);
    assert_eq!(world.stats().contacts_added, 1);
}

#[test]
fn contact_survives_while_bounds_overlap() {
    let mut world = weightless();
    let (_, a) = sphere_body(&mut world, Vec3::ZERO, 1.0);
    let (_, b) = sphere_body(&mut world, Vec3::new(1.9, 0.0, 0.0), 1.0);

    world.step();
    let id = world.contact_between(a, b).unwrap().id();
    run(&mut world, 5);

    assert_eq!(world.num_contacts(), 1);
    assert_eq!(world.contacts().next().unwrap().id(), id);
}

#[test]
fn separating_bodies_destroy_their_contact() {
    let mut world = weightless();
    let (left, a) = sphere_body(&mut world, Vec3::ZERO, 0.5);
    let (right, b) = sphere_body(&mut world, Vec3::new(0.9, 0.0, 0.0), 0.5);
    world.set_linear_velocity(left, Vec3::new(-2.0, 0.0, 0.0)).unwrap();
    world.set_linear_velocity(right, Vec3::new(2.0, 0.0, 0.0)).unwrap();

    world.step();
    assert_eq!(world.num_contacts(), 1);

    let mut removed = 0;
    for _ in 0..60 {
        world.step();
        removed += world.stats().contacts_removed;
    }
    assert_eq!(removed, 1);
    assert_eq!(world.num_contacts(), 0);
    assert!(!world.is_touching(a, b));
    assert!(world.shape(a).unwrap().contacts().is_empty());
}

#[test]
fn disjoint_filters_never_create_contacts() {
    let mut world = weightless();
    let only = |group: u32| CollisionFilter {
        belongs_to: group,
        collides_with: group,
    };
    body_with(&mut world, BodyDesc::dynamic(), ShapeDesc::sphere(1.0).with_filter(only(0b01)));
    body_with(
        &mut world,
        BodyDesc::dynamic().with_position(Vec3::new(1.0, 0.0, 0.0)),
        ShapeDesc::sphere(1.0).with_filter(only(0b10)),
    );

    run(&mut world, 3);

    assert_eq!(world.num_contacts(), 0);
}

#[test]
fn immovable_pairs_never_collide() {
    let mut world = weightless();
    body_with(&mut world, BodyDesc::fixed(), ShapeDesc::sphere(1.0));
    body_with(
        &mut world,
        BodyDesc::kinematic().with_position(Vec3::new(1.0, 0.0, 0.0)),
        ShapeDesc::cuboid(1.0, 1.0, 1.0),
    );

    run(&mut world, 3);

    assert_eq!(world.num_contacts(), 0);
}

#[test]
fn joint_without_collision_suppresses_contacts() {
    let mut world = weightless();
    let (a, _) = sphere_body(&mut world, Vec3::ZERO, 1.0);
    let (b, _) = sphere_body(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0);
    world.step();
    assert_eq!(world.num_contacts(), 1);

    let joint = world
        .add_joint(JointDesc::ball(a, b).with_anchors(Vec3::new(0.75, 0.0, 0.0), Vec3::new(-0.75, 0.0, 0.0)))
        .unwrap();
    assert_eq!(world.num_contacts(), 0);
    run(&mut world, 3);
    assert_eq!(world.num_contacts(), 0);

    world.remove_joint(joint).unwrap();
    world.step();
    assert_eq!(world.num_contacts(), 1);
    assert!(matches!(world.remove_joint(joint), Err(WorldError::UnknownJoint(_))));
}

#[test]
fn joint_allowing_collision_keeps_contacts() {
    let mut world = weightless();
    let (a, sa) = sphere_body(&mut world, Vec3::ZERO, 1.0);
    let (b, sb) = sphere_body(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0);
    world
        .add_joint(
            JointDesc::ball(a, b)
                .with_anchors(Vec3::new(0.75, 0.0, 0.0), Vec3::new(-0.75, 0.0, 0.0))
                .with_collision(true),
        )
        .unwrap();

    world.step();

    assert!(world.is_touching(sa, sb));
}

#[test]
fn removing_a_shape_destroys_its_contacts() {
    let mut world = weightless();
    let (_, a) = sphere_body(&mut world, Vec3::ZERO, 1.0);
    let (_, b) = sphere_body(&mut world, Vec3::new(1.5, 0.0, 0.0), 1.0);
    world.step();

    let removed = world.remove_shape(b).unwrap();

    assert!(removed.contacts().is_empty());
    assert_eq!(world.num_contacts(), 0);
    assert!(world.shape(a).unwrap().contacts().is_empty());
    assert!(matches!(world.remove_shape(b), Err(WorldError::UnknownShape(_))));
}

#[test]
fn names_resolve_touching_bodies() {
    let mut world = weightless();
    body_with(&mut world, BodyDesc::dynamic().with_name("left"), ShapeDesc::sphere(1.0));
    body_with(
        &mut world,
        BodyDesc::dynamic()
            .with_name("right")
            .with_position(Vec3::new(1.5, 0.0, 0.0)),
        ShapeDesc::sphere(1.0),
    );
    body_with(
        &mut world,
        BodyDesc::dynamic()
            .with_name("far")
            .with_position(Vec3::new(10.0, 0.0, 0.0)),
        ShapeDesc::sphere(1.0),
    );

    world.step();

    assert!(world.check_contact("left", "right"));
    assert!(world.check_contact("right", "left"));
    assert!(!world.check_contact("left", "far"));
    assert!(!world.check_contact("left", "missing"));
}
