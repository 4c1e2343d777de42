// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Joints: user constraints between two bodies.

mod ball;
mod distance;

use rebound_math::Vec3;

pub use ball::BallJoint;
pub use distance::DistanceJoint;

use crate::arena::BodyHandle;
use crate::constraint::{BodySet, Constraint, StepContext};

/// Built-in joint types.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum JointKind {
    /// Point-to-point pin; see [`BallJoint`].
    Ball,
    /// Length range between the anchors; see [`DistanceJoint`].
    Distance {
        /// Shortest allowed distance.
        min: f32,
        /// Longest allowed distance.
        max: f32,
    },
}

/// Description of a joint to add to a world.
///
/// Anchors are relative to each body's centre of mass, in body axes, as of
/// the moment the joint is added.
#[derive(Debug, Clone, PartialEq)]
pub struct JointDesc {
    /// First body.
    pub body1: BodyHandle,
    /// Second body.
    pub body2: BodyHandle,
    /// Anchor on the first body.
    pub local_anchor1: Vec3,
    /// Anchor on the second body.
    pub local_anchor2: Vec3,
    /// Joint type.
    pub kind: JointKind,
    /// Whether the two bodies' shapes still collide with each other.
    pub allow_collision: bool,
    /// Optional unique name.
    pub name: Option<String>,
}

impl JointDesc {
    /// Ball joint between `body1` and `body2` with anchors at their centres.
    pub fn ball(body1: BodyHandle, body2: BodyHandle) -> Self {
        Self {
            body1,
            body2,
            local_anchor1: Vec3::ZERO,
            local_anchor2: Vec3::ZERO,
            kind: JointKind::Ball,
            allow_collision: false,
            name: None,
        }
    }

    /// Distance joint between `body1` and `body2` limited to `[min, max]`.
    pub fn distance(body1: BodyHandle, body2: BodyHandle, min: f32, max: f32) -> Self {
        Self {
            kind: JointKind::Distance { min, max },
            ..Self::ball(body1, body2)
        }
    }

    /// Sets both anchors.
    pub fn with_anchors(mut self, local_anchor1: Vec3, local_anchor2: Vec3) -> Self {
        self.local_anchor1 = local_anchor1;
        self.local_anchor2 = local_anchor2;
        self
    }

    /// Lets the joined bodies keep colliding.
    pub fn with_collision(mut self, allow: bool) -> Self {
        self.allow_collision = allow;
        self
    }

    /// Names the joint.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn build(&self) -> Box<dyn Constraint> {
        match self.kind {
            JointKind::Ball => Box::new(BallJoint::new(
                self.body1,
                self.body2,
                self.local_anchor1,
                self.local_anchor2,
            )),
            JointKind::Distance { min, max } => Box::new(DistanceJoint::new(
                self.body1,
                self.body2,
                self.local_anchor1,
                self.local_anchor2,
                min,
                max,
            )),
        }
    }
}

/// A joint owned by a world.
#[derive(Debug)]
pub struct Joint {
    constraint: Box<dyn Constraint>,
    allow_collision: bool,
    name: Option<String>,
    pub(crate) added_to_island: bool,
}

impl Joint {
    pub(crate) fn from_desc(desc: JointDesc) -> Self {
        Self {
            constraint: desc.build(),
            allow_collision: desc.allow_collision,
            name: desc.name,
            added_to_island: false,
        }
    }

    /// Wraps a caller-supplied constraint.
    pub fn custom(constraint: Box<dyn Constraint>, allow_collision: bool, name: Option<String>) -> Self {
        Self {
            constraint,
            allow_collision,
            name,
            added_to_island: false,
        }
    }

    /// The two joined bodies.
    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        self.constraint.bodies()
    }

    /// The body on the other side from `body`.
    pub fn other_body(&self, body: BodyHandle) -> BodyHandle {
        let (b1, b2) = self.bodies();
        if b1 == body { b2 } else { b1 }
    }

    /// Whether the joined bodies collide with each other.
    pub fn allow_collision(&self) -> bool {
        self.allow_collision
    }

    /// Name given at creation.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn pre_solve(&mut self, bodies: &mut BodySet, ctx: &StepContext) {
        self.constraint.pre_solve(bodies, ctx);
    }

    pub(crate) fn solve(&mut self, bodies: &mut BodySet) {
        self.constraint.solve(bodies);
    }

    pub(crate) fn post_solve(&mut self, bodies: &mut BodySet) {
        self.constraint.post_solve(bodies);
    }
}
