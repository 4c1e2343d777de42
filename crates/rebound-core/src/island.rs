// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Simulation islands: connected components of awake non-static bodies
//! linked by touching contacts and joints.
//!
//! Static bodies anchor an island but never join it, so two stacks resting
//! on the same ground remain independent.

use rebound_math::{Lcg, Vec3};

use crate::arena::{Arena, BodyHandle, JointHandle, ShapeHandle};
use crate::config::SleepConfig;
use crate::constraint::{BodySet, Constraint, StepContext};
use crate::contact::{ContactId, ContactSet};
use crate::joint::Joint;
use crate::shape::Shape;

/// A constraint taking part in an island solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IslandConstraint {
    /// Touching contact.
    Contact(ContactId),
    /// Joint.
    Joint(JointHandle),
}

/// Reusable island storage.
#[derive(Debug, Default)]
pub(crate) struct Island {
    stack: Vec<BodyHandle>,
    neighbours: Vec<BodyHandle>,
    pub(crate) bodies: Vec<BodyHandle>,
    pub(crate) constraints: Vec<IslandConstraint>,
}

/// What an island solve did with its bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IslandOutcome {
    /// Bodies were integrated.
    Moved,
    /// Every body fell asleep.
    Slept,
}

impl Island {
    /// Flood-fills from `seed` (which must be awake and non-static).
    pub(crate) fn build(
        &mut self,
        seed: BodyHandle,
        bodies: &mut BodySet,
        shapes: &Arena<ShapeHandle, Shape>,
        contacts: &mut ContactSet,
        joints: &mut Arena<JointHandle, Joint>,
    ) {
        self.stack.clear();
        self.bodies.clear();
        self.constraints.clear();
        if let Some(b) = bodies.get_mut(seed) {
            b.added_to_island = true;
        }
        self.stack.push(seed);

        while let Some(handle) = self.stack.pop() {
            let Some(body) = bodies.get_mut(handle) else { continue };
            body.sleeping = false;
            self.bodies.push(handle);

            self.neighbours.clear();
            for shape in body.shapes.iter().filter_map(|h| shapes.get(*h)) {
                for &id in shape.contacts() {
                    let Some(contact) = contacts.get_mut(id) else { continue };
                    if contact.added_to_island || !contact.is_touching() {
                        continue;
                    }
                    contact.added_to_island = true;
                    self.constraints.push(IslandConstraint::Contact(id));
                    self.neighbours.push(contact.other_body(handle));
                }
            }
            for &jh in &body.joints {
                let Some(joint) = joints.get_mut(jh) else { continue };
                if joint.added_to_island {
                    continue;
                }
                joint.added_to_island = true;
                self.constraints.push(IslandConstraint::Joint(jh));
                self.neighbours.push(joint.other_body(handle));
            }

            for &next in &self.neighbours {
                let Some(other) = bodies.get_mut(next) else { continue };
                if other.added_to_island || other.is_static() {
                    continue;
                }
                other.added_to_island = true;
                self.stack.push(next);
            }
        }
    }

    /// Applies gravity, solves every constraint, then either integrates the
    /// bodies or puts the whole island to sleep.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn solve(
        &mut self,
        bodies: &mut BodySet,
        contacts: &mut ContactSet,
        joints: &mut Arena<JointHandle, Joint>,
        ctx: &StepContext,
        iterations: u32,
        gravity: Vec3,
        sleep: &SleepConfig,
        rng: Option<&mut Lcg>,
    ) -> IslandOutcome {
        for h in &self.bodies {
            if let Some(b) = bodies.get_mut(*h) {
                b.apply_gravity(gravity, ctx.time_step);
            }
        }
        if let Some(rng) = rng {
            rng.shuffle(&mut self.constraints);
        }

        for c in &self.constraints {
            match *c {
                IslandConstraint::Contact(id) => {
                    if let Some(contact) = contacts.get_mut(id) {
                        contact.pre_solve(bodies, ctx);
                    }
                }
                IslandConstraint::Joint(h) => {
                    if let Some(joint) = joints.get_mut(h) {
                        joint.pre_solve(bodies, ctx);
                    }
                }
            }
        }
        for _ in 0..iterations {
            for c in &self.constraints {
                match *c {
                    IslandConstraint::Contact(id) => {
                        if let Some(contact) = contacts.get_mut(id) {
                            contact.solve(bodies);
                        }
                    }
                    IslandConstraint::Joint(h) => {
                        if let Some(joint) = joints.get_mut(h) {
                            joint.solve(bodies);
                        }
                    }
                }
            }
        }
        for c in &self.constraints {
            match *c {
                IslandConstraint::Contact(id) => {
                    if let Some(contact) = contacts.get_mut(id) {
                        contact.post_solve(bodies);
                    }
                }
                IslandConstraint::Joint(h) => {
                    if let Some(joint) = joints.get_mut(h) {
                        joint.post_solve(bodies);
                    }
                }
            }
        }

        let mut min_sleep = f32::INFINITY;
        for h in &self.bodies {
            let Some(b) = bodies.get_mut(*h) else { continue };
            if b.is_sleep_eligible(sleep) {
                b.sleep_time += ctx.time_step;
                min_sleep = min_sleep.min(b.sleep_time);
            } else {
                b.sleep_time = 0.0;
                min_sleep = 0.0;
            }
        }

        let outcome = if min_sleep >= sleep.time_to_sleep {
            IslandOutcome::Slept
        } else {
            IslandOutcome::Moved
        };
        for h in &self.bodies {
            let Some(b) = bodies.get_mut(*h) else { continue };
            match outcome {
                IslandOutcome::Slept => b.sleep(),
                IslandOutcome::Moved => b.update_position(ctx.time_step),
            }
        }
        outcome
    }
}
