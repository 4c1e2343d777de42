// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use rebound_math::{Mat3, Vec3};

use crate::arena::BodyHandle;
use crate::body::RigidBody;
use crate::constraint::{BodySet, Constraint, StepContext};

/// Skew-symmetric matrix `[r]ₓ` with `[r]ₓ·v = r × v`.
pub(crate) fn skew(r: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, r.z(), -r.y()),
        Vec3::new(-r.z(), 0.0, r.x()),
        Vec3::new(r.y(), -r.x(), 0.0),
    )
}

/// Lever arms of the two anchors at the bodies' current orientation.
pub(crate) fn levers(b1: &RigidBody, b2: &RigidBody, a1: Vec3, a2: Vec3) -> (Vec3, Vec3) {
    (b1.rotation() * a1, b2.rotation() * a2)
}

/// Relative velocity of anchor 2 with respect to anchor 1.
pub(crate) fn anchor_velocity(b1: &RigidBody, b2: &RigidBody, r1: Vec3, r2: Vec3) -> Vec3 {
    (b2.linear_velocity() + b2.angular_velocity().cross(&r2))
        - (b1.linear_velocity() + b1.angular_velocity().cross(&r1))
}

/// Pins an anchor on each body to the same world point.
#[derive(Debug, Clone)]
pub struct BallJoint {
    body1: BodyHandle,
    body2: BodyHandle,
    local_anchor1: Vec3,
    local_anchor2: Vec3,
    r1: Vec3,
    r2: Vec3,
    inverse_k: Mat3,
    bias: Vec3,
    impulse: Vec3,
}

impl BallJoint {
    /// Joint with anchors given relative to each body's centre of mass, in
    /// body axes.
    pub fn new(body1: BodyHandle, body2: BodyHandle, local_anchor1: Vec3, local_anchor2: Vec3) -> Self {
        Self {
            body1,
            body2,
            local_anchor1,
            local_anchor2,
            r1: Vec3::ZERO,
            r2: Vec3::ZERO,
            inverse_k: Mat3::ZERO,
            bias: Vec3::ZERO,
            impulse: Vec3::ZERO,
        }
    }

    /// Accumulated impulse from the last solve.
    pub fn impulse(&self) -> Vec3 {
        self.impulse
    }
}

impl Constraint for BallJoint {
    fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body1, self.body2)
    }

    fn pre_solve(&mut self, bodies: &mut BodySet, ctx: &StepContext) {
        let Some((b1, b2)) = bodies.pair_mut(self.body1, self.body2) else {
            return;
        };
        let (r1, r2) = levers(b1, b2, self.local_anchor1, self.local_anchor2);
        self.r1 = r1;
        self.r2 = r2;
        let (s1, s2) = (skew(r1), skew(r2));
        let k = Mat3::from_diagonal(Vec3::splat(b1.inverse_mass() + b2.inverse_mass()))
            - s1 * b1.inverse_inertia() * s1
            - s2 * b2.inverse_inertia() * s2;
        self.inverse_k = k.inverse_or_zero();
        let error = (b2.position() + r2) - (b1.position() + r1);
        self.bias = error.scale(ctx.solver.joint_bias_factor * ctx.inv_time_step);

        b1.apply_impulse_at_lever(r1, -self.impulse);
        b2.apply_impulse_at_lever(r2, self.impulse);
    }

    fn solve(&mut self, bodies: &mut BodySet) {
        let Some((b1, b2)) = bodies.pair_mut(self.body1, self.body2) else {
            return;
        };
        let cdot = anchor_velocity(b1, b2, self.r1, self.r2);
        let delta = self.inverse_k * -(cdot + self.bias);
        self.impulse += delta;
        b1.apply_impulse_at_lever(self.r1, -delta);
        b2.apply_impulse_at_lever(self.r2, delta);
    }

    fn post_solve(&mut self, _bodies: &mut BodySet) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skew_matches_cross_product() {
        let r = Vec3::new(1.0, -2.0, 3.0);
        let v = Vec3::new(0.5, 4.0, -1.0);
        assert!((skew(r) * v - r.cross(&v)).length() < 1e-6);
    }
}
