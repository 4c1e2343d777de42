// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rebound_core::{BodyDesc, ShapeDesc, World, WorldConfig, MAX_MANIFOLD_POINTS};
use rebound_math::{Quat, Vec3};

fn shape_desc() -> impl Strategy<Value = ShapeDesc> {
    prop_oneof![
        (0.2f32..1.2).prop_map(ShapeDesc::sphere),
        (0.2f32..2.0, 0.2f32..2.0, 0.2f32..2.0).prop_map(|(w, h, d)| ShapeDesc::cuboid(w, h, d)),
        (0.2f32..1.0, 0.2f32..2.0).prop_map(|(r, h)| ShapeDesc::cylinder(r, h)),
        (0.5f32..1.5).prop_map(|s| ShapeDesc::tetra([
            Vec3::new(-s, 0.0, -s),
            Vec3::new(s, 0.0, -s),
            Vec3::new(0.0, 0.0, s),
            Vec3::new(0.0, s, 0.0),
        ])),
        Just(ShapeDesc::particle()),
    ]
}

fn point(extent: f32) -> impl Strategy<Value = Vec3> {
    (-extent..extent, -extent..extent, -extent..extent).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn orientation() -> impl Strategy<Value = Quat> {
    (point(1.0), -3.1f32..3.1).prop_map(|(axis, angle)| Quat::from_axis_angle(axis, angle))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn manifolds_are_bounded_and_penetrating(
        a in shape_desc(),
        b in shape_desc(),
        pa in point(1.0),
        pb in point(1.0),
        qa in orientation(),
        qb in orientation(),
    ) {
        let mut world = World::new(WorldConfig { gravity: Vec3::ZERO, ..WorldConfig::default() }).unwrap();
        let ground = world
            .add_body(BodyDesc::fixed().with_position(Vec3::new(0.0, -1.5, 0.0)))
            .unwrap();
        world.add_shape(ground, ShapeDesc::plane(Vec3::UNIT_Y)).unwrap();
        for (desc, at, q) in [(a, pa, qa), (b, pb, qb)] {
            let body = world
                .add_body(BodyDesc::dynamic().with_position(at).with_orientation(q))
                .unwrap();
            world.add_shape(body, desc).unwrap();
        }

        world.step();

        for contact in world.contacts() {
            let manifold = contact.manifold();
            prop_assert!(manifold.num_points() <= MAX_MANIFOLD_POINTS);
            prop_assert_eq!(contact.is_touching(), !manifold.is_empty());
            for p in manifold.points() {
                prop_assert!(p.penetration <= 0.0);
                prop_assert!(p.position.is_finite());
                prop_assert!((p.normal.length() - 1.0).abs() < 1e-3);
            }
        }
        for (_, body) in world.bodies() {
            prop_assert!(body.position().is_finite());
            prop_assert!(body.linear_velocity().is_finite());
        }
    }

    #[test]
    fn contact_pairs_are_unique(
        descs in prop::collection::vec(shape_desc(), 2..6),
        seeds in prop::collection::vec(point(1.5), 6),
    ) {
        let mut world = World::new(WorldConfig { gravity: Vec3::ZERO, ..WorldConfig::default() }).unwrap();
        for (desc, at) in descs.into_iter().zip(seeds) {
            let body = world.add_body(BodyDesc::dynamic().with_position(at)).unwrap();
            world.add_shape(body, desc).unwrap();
        }

        for _ in 0..3 {
            world.step();
            let mut pairs: Vec<_> = world
                .contacts()
                .map(|c| {
                    let (a, b) = (c.shape1(), c.shape2());
                    if a < b { (a, b) } else { (b, a) }
                })
                .collect();
            let total = pairs.len();
            pairs.sort();
            pairs.dedup();
            prop_assert_eq!(pairs.len(), total);
            for contact in world.contacts() {
                let s1 = world.shape(contact.shape1()).unwrap();
                prop_assert!(s1.contacts().contains(&contact.id()));
            }
        }
    }
}
