// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Integration tests for rebound-geom broad-phase implementations.

use proptest::prelude::*;
use rebound_geom::broad::{BroadPhase, BruteForceBroadPhase, SweepAndPrune};
use rebound_geom::types::aabb::Aabb;
use rebound_math::Vec3;

fn cube(x: f32, y: f32, z: f32) -> Aabb {
    Aabb::from_center_half_extents(Vec3::new(x, y, z), 1.0, 1.0, 1.0)
}

fn exercise_pair_order(bp: &mut dyn BroadPhase) {
    // Two overlapping boxes and one far-away, inserted out of order.
    bp.create_proxy(2, cube(100.0, 0.0, 0.0));
    bp.create_proxy(1, cube(1.0, 0.0, 0.0));
    bp.create_proxy(0, cube(0.0, 0.0, 0.0));
    bp.detect_pairs();
    assert_eq!(bp.pairs(), &[(0, 1)]);

    bp.create_proxy(3, cube(0.5, 0.0, 0.0));
    bp.detect_pairs();
    // Expected canonical order: (0,1), (0,3), (1,3)
    assert_eq!(bp.pairs(), &[(0, 1), (0, 3), (1, 3)]);

    bp.update_proxy(3, cube(100.5, 0.0, 0.0));
    bp.detect_pairs();
    assert_eq!(bp.pairs(), &[(0, 1), (2, 3)]);

    bp.remove_proxy(0);
    bp.detect_pairs();
    assert_eq!(bp.pairs(), &[(2, 3)]);
    assert_eq!(bp.num_proxies(), 3);
}

#[test]
fn brute_force_pair_order_is_deterministic() {
    exercise_pair_order(&mut BruteForceBroadPhase::new());
}

#[test]
fn sweep_and_prune_pair_order_is_deterministic() {
    exercise_pair_order(&mut SweepAndPrune::new());
}

#[test]
fn touching_faces_overlap() {
    let mut bp = SweepAndPrune::new();
    bp.create_proxy(0, cube(0.0, 0.0, 0.0));
    bp.create_proxy(1, cube(2.0, 0.0, 0.0));
    bp.detect_pairs();
    assert_eq!(bp.pairs(), &[(0, 1)]);
}

#[test]
fn sweep_and_prune_skips_disjoint_x_intervals() {
    let mut bp = SweepAndPrune::new();
    for i in 0..10u8 {
        bp.create_proxy(usize::from(i), cube(f32::from(i) * 10.0, 0.0, 0.0));
    }
    bp.detect_pairs();
    assert!(bp.pairs().is_empty());
    assert_eq!(bp.num_pair_checks(), 0);

    let mut brute = BruteForceBroadPhase::new();
    for i in 0..10u8 {
        brute.create_proxy(usize::from(i), cube(f32::from(i) * 10.0, 0.0, 0.0));
    }
    brute.detect_pairs();
    assert_eq!(brute.num_pair_checks(), 45);
}

#[test]
fn unbounded_proxy_pairs_with_everything() {
    let mut bp = SweepAndPrune::new();
    bp.create_proxy(5, Aabb::everything());
    bp.create_proxy(1, cube(-50.0, 0.0, 0.0));
    bp.create_proxy(9, cube(50.0, 0.0, 0.0));
    bp.detect_pairs();
    assert_eq!(bp.pairs(), &[(1, 5), (5, 9)]);
}

proptest! {
    #[test]
    fn sweep_and_prune_matches_brute_force(
        boxes in prop::collection::vec(
            (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0, 0.1f32..4.0),
            0..40,
        )
    ) {
        let mut brute = BruteForceBroadPhase::new();
        let mut sap = SweepAndPrune::new();
        for (i, (x, y, z, h)) in boxes.iter().enumerate() {
            let bb = Aabb::from_center_half_extents(Vec3::new(*x, *y, *z), *h, *h, *h);
            brute.create_proxy(i, bb);
            sap.create_proxy(i, bb);
        }
        brute.detect_pairs();
        sap.detect_pairs();
        prop_assert_eq!(brute.pairs(), sap.pairs());
        prop_assert!(sap.num_pair_checks() <= brute.num_pair_checks());
    }
}
