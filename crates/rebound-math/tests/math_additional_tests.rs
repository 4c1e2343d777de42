// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::float_cmp)]
use proptest::prelude::*;
use rebound_math::{self as math, Lcg, Mat3, Quat, Vec3};

fn approx_eq(a: f32, b: f32) {
    let diff = (a - b).abs();
    assert!(diff <= 1e-5, "expected {b}, got {a} (diff {diff})");
}

fn approx_eq3(a: Vec3, b: Vec3) {
    for i in 0..3 {
        approx_eq(a[i], b[i]);
    }
}

#[test]
fn vec3_normalize_degenerate_returns_zero() {
    let v = Vec3::new(1e-12, -1e-12, 0.0);
    let n = v.normalize();
    assert_eq!(n.to_array(), [0.0, 0.0, 0.0]);
}

#[test]
fn quat_identity_properties() {
    let id = Quat::identity();
    let composed = id.multiply(&id);
    assert_eq!(composed.to_array(), id.to_array());
    assert_eq!(id.to_mat3(), Mat3::IDENTITY);
}

#[test]
fn deg_rad_roundtrip_basic_angles() {
    for deg in [0.0f32, 45.0, 90.0, 180.0, -90.0] {
        let rad = math::deg_to_rad(deg);
        let back = math::rad_to_deg(rad);
        assert!((back - deg).abs() < 1e-4);
    }
}

#[test]
fn quat_matrix_agrees_with_composition() {
    let a = Quat::from_axis_angle(Vec3::UNIT_Y, 0.7);
    let b = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), -1.1);
    let v = Vec3::new(0.3, -2.0, 5.0);
    let via_quat = a.multiply(&b).rotate(v);
    let via_mat = a.to_mat3() * (b.to_mat3() * v);
    approx_eq3(via_quat, via_mat);
}

#[test]
fn rotated_diagonal_tensor_keeps_trace() {
    let inertia = Mat3::from_diagonal(Vec3::new(1.0, 2.0, 3.0));
    let rot = Quat::from_axis_angle(Vec3::new(0.2, 1.0, -0.4), 0.9).to_mat3();
    let world = inertia.rotate_tensor(&rot);
    approx_eq(world.at(0, 0) + world.at(1, 1) + world.at(2, 2), 6.0);
    // Symmetric.
    approx_eq(world.at(0, 1), world.at(1, 0));
    approx_eq(world.at(0, 2), world.at(2, 0));
}

#[test]
fn transpose_mul_vec_inverts_rotation() {
    let rot = Quat::from_axis_angle(Vec3::UNIT_Z, 1.3).to_mat3();
    let v = Vec3::new(1.0, 2.0, 3.0);
    approx_eq3(rot.transpose_mul_vec(rot * v), v);
}

proptest! {
    #[test]
    fn lcg_shuffle_is_a_permutation(seed in any::<u32>(), len in 0usize..64) {
        let mut lcg = Lcg::from_seed(seed);
        let mut items: Vec<usize> = (0..len).collect();
        lcg.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..len).collect::<Vec<_>>());
    }

    #[test]
    fn lcg_next_below_stays_in_range(seed in any::<u32>(), bound in 1usize..1000) {
        let mut lcg = Lcg::from_seed(seed);
        for _ in 0..16 {
            prop_assert!(lcg.next_below(bound) < bound);
        }
    }

    #[test]
    fn cross_is_orthogonal(
        ax in -10.0f32..10.0, ay in -10.0f32..10.0, az in -10.0f32..10.0,
        bx in -10.0f32..10.0, by in -10.0f32..10.0, bz in -10.0f32..10.0,
    ) {
        let a = Vec3::new(ax, ay, az);
        let b = Vec3::new(bx, by, bz);
        let c = a.cross(&b);
        prop_assert!(c.dot(&a).abs() <= 1e-2);
        prop_assert!(c.dot(&b).abs() <= 1e-2);
    }
}
