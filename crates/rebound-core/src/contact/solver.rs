// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sequential-impulse rows for one contact manifold.
//!
//! Sign convention: relative velocity is `v2 − v1` at the contact point and
//! normals point from body 1 to body 2, so a separating impulse is negative.
//! A positive row impulse `λ` adds `λ·dir` momentum to body 1 and removes it
//! from body 2.

use rebound_math::Vec3;

use super::manifold::{ContactManifold, ManifoldPoint, MAX_MANIFOLD_POINTS};
use crate::body::RigidBody;
use crate::constraint::StepContext;

/// Jacobian data for one direction of one contact point.
#[derive(Debug, Clone, Copy, Default)]
struct Axis {
    dir: Vec3,
    /// `invM1·dir`
    u1: Vec3,
    /// `invM2·dir`
    u2: Vec3,
    /// `r1 × dir`
    t1: Vec3,
    /// `r2 × dir`
    t2: Vec3,
    /// `invI1·(r1 × dir)`
    tu1: Vec3,
    /// `invI2·(r2 × dir)`
    tu2: Vec3,
    den: f32,
}

impl Axis {
    fn build(dir: Vec3, r1: Vec3, r2: Vec3, b1: &RigidBody, b2: &RigidBody) -> Self {
        let t1 = r1.cross(&dir);
        let t2 = r2.cross(&dir);
        let tu1 = b1.inverse_inertia * t1;
        let tu2 = b2.inverse_inertia * t2;
        let k = b1.inverse_mass
            + b2.inverse_mass
            + dir.dot(&(tu1.cross(&r1) + tu2.cross(&r2)));
        Self {
            dir,
            u1: dir.scale(b1.inverse_mass),
            u2: dir.scale(b2.inverse_mass),
            t1,
            t2,
            tu1,
            tu2,
            den: if k > 0.0 { 1.0 / k } else { 0.0 },
        }
    }

    fn relative_velocity(&self, v: &Velocities) -> f32 {
        (v.lin2 - v.lin1).dot(&self.dir) + v.ang2.dot(&self.t2) - v.ang1.dot(&self.t1)
    }

    fn apply(&self, v: &mut Velocities, impulse: f32) {
        v.lin1 += self.u1.scale(impulse);
        v.ang1 += self.tu1.scale(impulse);
        v.lin2 -= self.u2.scale(impulse);
        v.ang2 -= self.tu2.scale(impulse);
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ContactRow {
    normal: Axis,
    tangent: Axis,
    binormal: Axis,
    normal_impulse: f32,
    tangent_impulse: f32,
    binormal_impulse: f32,
    normal_target: f32,
}

#[derive(Debug, Clone, Copy)]
struct Velocities {
    lin1: Vec3,
    ang1: Vec3,
    lin2: Vec3,
    ang2: Vec3,
}

impl Velocities {
    fn read(b1: &RigidBody, b2: &RigidBody) -> Self {
        Self {
            lin1: b1.linear_velocity,
            ang1: b1.angular_velocity,
            lin2: b2.linear_velocity,
            ang2: b2.angular_velocity,
        }
    }

    fn write(self, b1: &mut RigidBody, b2: &mut RigidBody) {
        b1.linear_velocity = self.lin1;
        b1.angular_velocity = self.ang1;
        b2.linear_velocity = self.lin2;
        b2.angular_velocity = self.ang2;
    }
}

/// Solver state for one contact.
#[derive(Debug, Clone, Default)]
pub(crate) struct ContactSolver {
    rows: [ContactRow; MAX_MANIFOLD_POINTS],
    num_rows: usize,
    pub(crate) restitution: f32,
    pub(crate) friction: f32,
}

impl ContactSolver {
    pub(crate) fn reset(&mut self) {
        self.num_rows = 0;
    }

    pub(crate) fn pre_solve(
        &mut self,
        manifold: &ContactManifold,
        b1: &mut RigidBody,
        b2: &mut RigidBody,
        ctx: &StepContext,
    ) {
        let cfg = &ctx.solver;
        self.num_rows = manifold.num_points();
        for (row, p) in self.rows.iter_mut().zip(manifold.points()) {
            let r1 = p.position - b1.position;
            let r2 = p.position - b2.position;
            let rel = (b2.linear_velocity + b2.angular_velocity.cross(&r2))
                - (b1.linear_velocity + b1.angular_velocity.cross(&r1));
            let n = p.normal;
            let mut rvn = n.dot(&rel);

            let projected = rel - n.scale(rvn);
            let tangent = if projected.length_squared() <= cfg.tangent_degeneracy_sq {
                n.any_perpendicular()
            } else {
                projected.normalize()
            };
            let binormal = n.cross(&tangent);

            row.normal = Axis::build(n, r1, r2, b1, b2);
            row.tangent = Axis::build(tangent, r1, r2, b1, b2);
            row.binormal = Axis::build(binormal, r1, r2, b1, b2);
            row.tangent_impulse = 0.0;
            row.binormal_impulse = 0.0;

            if p.warm_started {
                row.normal_impulse = p.normal_impulse;
                let mut v = Velocities::read(b1, b2);
                row.normal.apply(&mut v, row.normal_impulse);
                v.write(b1, b2);
                rvn = 0.0;
            } else {
                row.normal_impulse = 0.0;
            }

            if rvn > -cfg.restitution_threshold {
                rvn = 0.0;
            }
            let separation = -(p.penetration + cfg.slop) * ctx.inv_time_step * cfg.bias_factor;
            row.normal_target = (self.restitution * -rvn).max(separation);
        }
    }

    pub(crate) fn solve(&mut self, b1: &mut RigidBody, b2: &mut RigidBody) {
        let mut v = Velocities::read(b1, b2);
        let friction = self.friction;
        for row in &mut self.rows[..self.num_rows] {
            let max = -row.normal_impulse * friction;

            let old_t = row.tangent_impulse;
            let old_b = row.binormal_impulse;
            let mut t = old_t + row.tangent.relative_velocity(&v) * row.tangent.den;
            let mut b = old_b + row.binormal.relative_velocity(&v) * row.binormal.den;
            let len_sq = t * t + b * b;
            if len_sq > max * max {
                let s = max / len_sq.sqrt();
                t *= s;
                b *= s;
            }
            row.tangent.apply(&mut v, t - old_t);
            row.binormal.apply(&mut v, b - old_b);
            row.tangent_impulse = t;
            row.binormal_impulse = b;

            let old_n = row.normal_impulse;
            let rvn = row.normal.relative_velocity(&v);
            let n = (old_n + (rvn - row.normal_target) * row.normal.den).min(0.0);
            row.normal.apply(&mut v, n - old_n);
            row.normal_impulse = n;
        }
        v.write(b1, b2);
    }

    pub(crate) fn post_solve(&self, manifold: &mut ContactManifold) {
        for (p, row) in manifold.points_mut().iter_mut().zip(&self.rows[..self.num_rows]) {
            store(p, row);
        }
    }
}

fn store(p: &mut ManifoldPoint, row: &ContactRow) {
    p.normal = row.normal.dir;
    p.tangent = row.tangent.dir;
    p.binormal = row.binormal.dir;
    p.normal_impulse = row.normal_impulse;
    p.tangent_impulse = row.tangent_impulse;
    p.binormal_impulse = row.binormal_impulse;
    p.normal_denominator = row.normal.den;
    p.tangent_denominator = row.tangent.den;
    p.binormal_denominator = row.binormal.den;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::arena::{ArenaHandle, BodyHandle};
    use crate::body::{aggregate_mass, BodyDesc};
    use crate::config::SolverConfig;
    use crate::contact::manifold::{BodyFrame, ManifoldWriter};
    use crate::shape::ShapeKind;
    use rebound_geom::Transform;
    use rebound_math::Mat3;

    fn normal_denominator(n: Vec3, r1: Vec3, r2: Vec3, m1: f32, m2: f32, i1: Mat3, i2: Mat3) -> f32 {
        let k = m1 + m2 + n.dot(&((i1 * r1.cross(&n)).cross(&r1) + (i2 * r2.cross(&n)).cross(&r2)));
        1.0 / k
    }

    fn unit_sphere_body(desc: BodyDesc) -> RigidBody {
        let mut b = RigidBody::new(BodyHandle::from_parts(0, 0), desc);
        let info = ShapeKind::Sphere { radius: 1.0 }.mass_info(1.0);
        b.apply_mass(aggregate_mass(&[(info, Transform::identity())]));
        b
    }

    fn frame(b: &RigidBody) -> BodyFrame {
        BodyFrame { position: b.position(), rotation: b.rotation() }
    }

    #[test]
    fn denominator_matches_closed_form() {
        let b1 = unit_sphere_body(BodyDesc::dynamic());
        let b2 = unit_sphere_body(BodyDesc::dynamic().with_position(Vec3::new(0.0, 2.0, 0.0)));
        let r1 = Vec3::new(0.3, 1.0, 0.0);
        let r2 = Vec3::new(0.3, -1.0, 0.0);
        let axis = Axis::build(Vec3::UNIT_Y, r1, r2, &b1, &b2);
        let expect = normal_denominator(
            Vec3::UNIT_Y,
            r1,
            r2,
            b1.inverse_mass(),
            b2.inverse_mass(),
            b1.inverse_inertia(),
            b2.inverse_inertia(),
        );
        assert!((axis.den - expect).abs() < 1e-6);
    }

    #[test]
    fn approaching_spheres_stop_closing() {
        let mut b1 = unit_sphere_body(BodyDesc::dynamic().with_linear_velocity(Vec3::new(0.0, 0.5, 0.0)));
        let mut b2 = unit_sphere_body(
            BodyDesc::dynamic()
                .with_position(Vec3::new(0.0, 1.99, 0.0))
                .with_linear_velocity(Vec3::new(0.0, -0.5, 0.0)),
        );
        let mut manifold = ContactManifold::default();
        let mut w = ManifoldWriter::new(&mut manifold, frame(&b1), frame(&b2), false);
        w.add_point(Vec3::new(0.0, 0.995, 0.0), Vec3::UNIT_Y, -0.01);

        let ctx = StepContext::new(1.0 / 60.0, SolverConfig::default());
        let mut solver = ContactSolver { restitution: 0.0, friction: 0.5, ..ContactSolver::default() };
        solver.pre_solve(&manifold, &mut b1, &mut b2, &ctx);
        for _ in 0..10 {
            solver.solve(&mut b1, &mut b2);
        }
        solver.post_solve(&mut manifold);

        let closing = (b2.linear_velocity() - b1.linear_velocity()).y();
        assert!(closing >= -1e-4, "still closing at {closing}");
        assert!(manifold.points()[0].normal_impulse < 0.0);
    }

    #[test]
    fn post_solve_writes_basis_and_denominators_back() {
        let mut b1 = unit_sphere_body(BodyDesc::dynamic());
        let mut b2 = unit_sphere_body(
            BodyDesc::dynamic()
                .with_position(Vec3::new(0.0, 1.99, 0.0))
                .with_linear_velocity(Vec3::new(0.3, -0.5, 0.1)),
        );
        let mut manifold = ContactManifold::default();
        let mut w = ManifoldWriter::new(&mut manifold, frame(&b1), frame(&b2), false);
        w.add_point(Vec3::new(0.0, 0.995, 0.0), Vec3::UNIT_Y, -0.01);

        let ctx = StepContext::new(1.0 / 60.0, SolverConfig::default());
        let mut solver = ContactSolver { restitution: 0.2, friction: 0.5, ..ContactSolver::default() };
        solver.pre_solve(&manifold, &mut b1, &mut b2, &ctx);
        solver.solve(&mut b1, &mut b2);
        solver.post_solve(&mut manifold);

        let row = solver.rows[0];
        let p = manifold.points()[0];
        assert_eq!(p.normal, row.normal.dir);
        assert_eq!(p.tangent, row.tangent.dir);
        assert_eq!(p.binormal, row.binormal.dir);
        assert_eq!(p.normal_denominator, row.normal.den);
        assert_eq!(p.tangent_denominator, row.tangent.den);
        assert_eq!(p.binormal_denominator, row.binormal.den);
        assert_eq!(p.normal_impulse, row.normal_impulse);
        assert_eq!(p.tangent_impulse, row.tangent_impulse);
        assert_eq!(p.binormal_impulse, row.binormal_impulse);
        assert!(p.normal_denominator > 0.0);
        assert!(p.tangent.dot(&p.normal).abs() < 1e-5);
        assert!((p.binormal.length() - 1.0).abs() < 1e-5);
    }
}
