// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use rebound_math::{clamp, Vec3};

use super::ball::{anchor_velocity, levers};
use crate::arena::BodyHandle;
use crate::constraint::{BodySet, Constraint, StepContext};

/// Keeps the distance between two anchors within `[min, max]`.
///
/// Between the limits the joint applies nothing. With `min == max` it acts
/// as a rigid rod.
#[derive(Debug, Clone)]
pub struct DistanceJoint {
    body1: BodyHandle,
    body2: BodyHandle,
    local_anchor1: Vec3,
    local_anchor2: Vec3,
    min: f32,
    max: f32,
    r1: Vec3,
    r2: Vec3,
    axis: Vec3,
    denominator: f32,
    bias: f32,
    error: f32,
    rigid: bool,
    active: bool,
    impulse: f32,
}

impl DistanceJoint {
    /// Joint with body-local anchors and a length range. The bounds are
    /// swapped if given out of order.
    pub fn new(
        body1: BodyHandle,
        body2: BodyHandle,
        local_anchor1: Vec3,
        local_anchor2: Vec3,
        min: f32,
        max: f32,
    ) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            body1,
            body2,
            local_anchor1,
            local_anchor2,
            min: min.max(0.0),
            max: max.max(0.0),
            r1: Vec3::ZERO,
            r2: Vec3::ZERO,
            axis: Vec3::UNIT_Y,
            denominator: 0.0,
            bias: 0.0,
            error: 0.0,
            rigid: max - min <= 0.0,
            active: false,
            impulse: 0.0,
        }
    }

    /// Limits as `(min, max)`.
    pub fn limits(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Accumulated impulse along the anchor axis.
    pub fn impulse(&self) -> f32 {
        self.impulse
    }

    /// Clamp applied to the accumulated impulse for the current side.
    fn clamp_impulse(&self, value: f32) -> f32 {
        if self.rigid {
            value
        } else if self.error < 0.0 {
            value.max(0.0)
        } else {
            value.min(0.0)
        }
    }
}

impl Constraint for DistanceJoint {
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
        let d = (b2.position() + r2) - (b1.position() + r1);
        let len = d.length();
        if let Some(axis) = d.try_normalize() {
            self.axis = axis;
        }
        let error = len - clamp(len, self.min, self.max);
        self.error = error;
        self.active = self.rigid || error != 0.0;
        if !self.active {
            self.impulse = 0.0;
            return;
        }
        let n = self.axis;
        let k = b1.inverse_mass()
            + b2.inverse_mass()
            + n.dot(&((b1.inverse_inertia() * r1.cross(&n)).cross(&r1) + (b2.inverse_inertia() * r2.cross(&n)).cross(&r2)));
        self.denominator = if k > 0.0 { 1.0 / k } else { 0.0 };
        self.bias = error * ctx.solver.joint_bias_factor * ctx.inv_time_step;
        self.impulse = self.clamp_impulse(self.impulse);

        let j = n.scale(self.impulse);
        b1.apply_impulse_at_lever(r1, -j);
        b2.apply_impulse_at_lever(r2, j);
    }

    fn solve(&mut self, bodies: &mut BodySet) {
        if !self.active {
            return;
        }
        let Some((b1, b2)) = bodies.pair_mut(self.body1, self.body2) else {
            return;
        };
        let cdot = anchor_velocity(b1, b2, self.r1, self.r2).dot(&self.axis);
        let old = self.impulse;
        let total = self.clamp_impulse(old - (cdot + self.bias) * self.denominator);
        self.impulse = total;
        let j = self.axis.scale(total - old);
        b1.apply_impulse_at_lever(self.r1, -j);
        b2.apply_impulse_at_lever(self.r2, j);
    }

    fn post_solve(&mut self, _bodies: &mut BodySet) {}
}
