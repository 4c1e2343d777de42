// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Detectors with a sphere (or particle) as the first shape.

use rebound_math::{clamp, Vec3};

use super::closest::closest_point_on_triangle;
use crate::contact::manifold::ManifoldWriter;
use crate::shape::{Shape, ShapeKind};

/// Sphere against sphere.
pub(crate) fn sphere_sphere(s1: &Shape, s2: &Shape, out: &mut ManifoldWriter<'_>) {
    let (Some(r1), Some(r2)) = (s1.sphere_radius(), s2.sphere_radius()) else {
        return;
    };
    let d = s2.position() - s1.position();
    let len_sq = d.length_squared();
    let reach = r1 + r2;
    if len_sq <= 0.0 || len_sq >= reach * reach {
        return;
    }
    let len = len_sq.sqrt();
    let n = d.scale(1.0 / len);
    let pen = len - reach;
    out.add_point(s1.position() + n.scale(r1 + pen * 0.5), n, pen);
}

/// Sphere against half-space. The point lies on the plane directly under
/// the sphere centre.
pub(crate) fn sphere_plane(sphere: &Shape, plane: &Shape, out: &mut ManifoldWriter<'_>) {
    let (Some(r), Some(n)) = (sphere.sphere_radius(), plane.plane_normal()) else {
        return;
    };
    let c = sphere.position();
    let d = (c - plane.position()).dot(&n);
    if d >= r {
        return;
    }
    let normal = -n;
    out.add_point(c + normal.scale(d), normal, d - r);
}

/// Sphere against box: clamp the centre into the box; a centre inside the
/// box is pushed out through the nearest face.
pub(crate) fn sphere_box(sphere: &Shape, cuboid: &Shape, out: &mut ManifoldWriter<'_>) {
    let (Some(r), ShapeKind::Box { half_extents: h }) = (sphere.sphere_radius(), *cuboid.kind()) else {
        return;
    };
    let pose = cuboid.world_transform();
    let c = sphere.position();
    let local = pose.inverse_apply_point(c);
    let clamped = Vec3::new(
        clamp(local.x(), -h.x(), h.x()),
        clamp(local.y(), -h.y(), h.y()),
        clamp(local.z(), -h.z(), h.z()),
    );
    let diff = local - clamped;
    let dist_sq = diff.length_squared();
    if dist_sq > 0.0 {
        if dist_sq >= r * r {
            return;
        }
        let dist = dist_sq.sqrt();
        let normal = pose.apply_direction(diff.scale(-1.0 / dist));
        let surface = pose.apply_point(clamped);
        let deepest = c + normal.scale(r);
        out.add_point((surface + deepest).scale(0.5), normal, dist - r);
        return;
    }

    let mut axis = 0;
    let mut face_dist = f32::INFINITY;
    for i in 0..3 {
        let gap = h[i] - local[i].abs();
        if gap < face_dist {
            face_dist = gap;
            axis = i;
        }
    }
    let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };
    let face_normal = pose.rotation().column(axis).scale(sign);
    out.add_point(
        c + face_normal.scale((face_dist - r) * 0.5),
        -face_normal,
        -(face_dist + r),
    );
}

/// Sphere against cylinder, using the cylinder's exact round profile.
pub(crate) fn sphere_cylinder(sphere: &Shape, cylinder: &Shape, out: &mut ManifoldWriter<'_>) {
    let (Some(rs), ShapeKind::Cylinder { radius: rc, half_height }) = (sphere.sphere_radius(), *cylinder.kind()) else {
        return;
    };
    let ps = sphere.position();
    let pc = cylinder.position();
    let axis = cylinder.rotation().column(1);
    let along = (ps - pc).dot(&axis);
    if along < -half_height - rs || along > half_height + rs {
        return;
    }
    let mut radial = ps - (pc + axis.scale(along));
    let radial_sq = radial.length_squared();
    if radial_sq > (rs + rc) * (rs + rc) {
        return;
    }
    if radial_sq > rc * rc {
        radial = radial.scale(rc / radial_sq.sqrt());
    }
    let on_cylinder = pc + axis.scale(along.clamp(-half_height, half_height)) + radial;
    let d = on_cylinder - ps;
    let len_sq = d.length_squared();
    if len_sq <= 0.0 || len_sq >= rs * rs {
        return;
    }
    let len = len_sq.sqrt();
    let n = d.scale(1.0 / len);
    out.add_point(ps + n.scale(rs), n, len - rs);
}

/// Sphere against tetrahedron.
pub(crate) fn sphere_tetra(sphere: &Shape, tetra: &Shape, out: &mut ManifoldWriter<'_>) {
    let (Some(r), ShapeKind::Tetra { vertices: local }) = (sphere.sphere_radius(), *tetra.kind()) else {
        return;
    };
    let pose = tetra.world_transform();
    let v = local.map(|p| pose.apply_point(p));
    let centroid = tetra.position();
    let c = sphere.position();

    let mut inside = true;
    let mut best_face: Option<(f32, Vec3)> = None;
    let mut closest: Option<(f32, Vec3)> = None;
    for [i, j, k] in [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]] {
        let Some(mut n) = (v[j] - v[i]).cross(&(v[k] - v[i])).try_normalize() else {
            continue;
        };
        if n.dot(&(v[i] - centroid)) < 0.0 {
            n = -n;
        }
        let height = (c - v[i]).dot(&n);
        if height > 0.0 {
            inside = false;
        }
        let gap = -height;
        if best_face.is_none_or(|(g, _)| gap < g) {
            best_face = Some((gap, n));
        }
        let q = closest_point_on_triangle(c, v[i], v[j], v[k]);
        let dsq = q.distance_squared(&c);
        if closest.is_none_or(|(d, _)| dsq < d) {
            closest = Some((dsq, q));
        }
    }

    if inside {
        if let Some((gap, n)) = best_face {
            out.add_point(c + n.scale((gap - r) * 0.5), -n, -(gap + r));
        }
        return;
    }
    let Some((dsq, q)) = closest else { return };
    if dsq <= 0.0 || dsq >= r * r {
        return;
    }
    let dist = dsq.sqrt();
    let n = (q - c).scale(1.0 / dist);
    out.add_point((q + c + n.scale(r)).scale(0.5), n, dist - r);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::arena::{ArenaHandle, BodyHandle, ShapeHandle};
    use crate::contact::manifold::{BodyFrame, ContactManifold};
    use crate::shape::ShapeDesc;
    use rebound_geom::Transform;
    use rebound_math::Mat3;

    fn placed(desc: ShapeDesc, at: Vec3) -> Shape {
        let mut s = Shape::new(ShapeHandle::from_parts(0, 0), BodyHandle::from_parts(0, 0), desc);
        s.sync_pose(&Transform::from_translation(at), 0.005);
        s
    }

    fn run(f: fn(&Shape, &Shape, &mut ManifoldWriter<'_>), a: &Shape, b: &Shape) -> ContactManifold {
        let frame = |s: &Shape| BodyFrame { position: s.position(), rotation: Mat3::IDENTITY };
        let mut m = ContactManifold::default();
        let mut w = ManifoldWriter::new(&mut m, frame(a), frame(b), false);
        f(a, b, &mut w);
        m
    }

    #[test]
    fn overlapping_spheres_report_half_depth_midpoint() {
        let a = placed(ShapeDesc::sphere(1.0), Vec3::ZERO);
        let b = placed(ShapeDesc::sphere(1.0), Vec3::new(1.5, 0.0, 0.0));
        let m = run(sphere_sphere, &a, &b);
        assert_eq!(m.num_points(), 1);
        let p = m.points()[0];
        assert!((p.penetration + 0.5).abs() < 1e-6);
        assert_eq!(p.normal, Vec3::UNIT_X);
        assert!((p.position.x() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn resting_sphere_touches_plane() {
        let s = placed(ShapeDesc::sphere(1.0), Vec3::new(0.0, 0.99, 0.0));
        let p = placed(ShapeDesc::plane(Vec3::UNIT_Y), Vec3::ZERO);
        let m = run(sphere_plane, &s, &p);
        assert_eq!(m.num_points(), 1);
        assert_eq!(m.points()[0].normal, -Vec3::UNIT_Y);
        assert!((m.points()[0].penetration + 0.01).abs() < 1e-5);
    }

    #[test]
    fn sphere_plane_point_lies_on_the_plane_under_the_centre() {
        let s = placed(ShapeDesc::sphere(1.0), Vec3::new(0.3, 0.9, -0.2));
        let p = placed(ShapeDesc::plane(Vec3::UNIT_Y), Vec3::new(0.0, 0.1, 0.0));
        let m = run(sphere_plane, &s, &p);
        assert_eq!(m.num_points(), 1);
        let point = m.points()[0].position;
        assert!((point - Vec3::new(0.3, 0.1, -0.2)).length() < 1e-6, "point at {point:?}");
        assert!((m.points()[0].penetration + 0.2).abs() < 1e-6);
    }

    #[test]
    fn sphere_inside_box_exits_through_nearest_face() {
        let s = placed(ShapeDesc::sphere(0.1), Vec3::new(0.0, 0.9, 0.0));
        let b = placed(ShapeDesc::cuboid(2.0, 2.0, 2.0), Vec3::ZERO);
        let m = run(sphere_box, &s, &b);
        assert_eq!(m.num_points(), 1);
        assert_eq!(m.points()[0].normal, -Vec3::UNIT_Y);
        assert!((m.points()[0].penetration + 0.2).abs() < 1e-5);
    }

    #[test]
    fn sphere_beside_cylinder_hits_its_wall() {
        let s = placed(ShapeDesc::sphere(0.5), Vec3::new(1.4, 0.0, 0.0));
        let c = placed(ShapeDesc::cylinder(1.0, 2.0), Vec3::ZERO);
        let m = run(sphere_cylinder, &s, &c);
        assert_eq!(m.num_points(), 1);
        let p = m.points()[0];
        assert!((p.normal - (-Vec3::UNIT_X)).length() < 1e-5);
        assert!((p.penetration + 0.1).abs() < 1e-5);
    }

    #[test]
    fn sphere_above_tetra_touches_its_apex() {
        let t = placed(
            ShapeDesc::tetra([
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 0.0),
            ]),
            Vec3::ZERO,
        );
        let s = placed(ShapeDesc::sphere(0.5), Vec3::new(0.0, 1.4, 0.0));
        let m = run(sphere_tetra, &s, &t);
        assert_eq!(m.num_points(), 1);
        assert!(m.points()[0].normal.y() < -0.99);
        assert!((m.points()[0].penetration + 0.1).abs() < 1e-4);
    }
}
