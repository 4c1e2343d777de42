// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The solver-facing constraint interface shared by contacts and joints.

use core::fmt;

use crate::arena::{Arena, BodyHandle};
use crate::body::RigidBody;
use crate::config::SolverConfig;

/// Body storage constraints read and write velocities through.
pub type BodySet = Arena<BodyHandle, RigidBody>;

/// Per-step values every constraint sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Step length in seconds.
    pub time_step: f32,
    /// `1 / time_step`.
    pub inv_time_step: f32,
    /// Solver constants.
    pub solver: SolverConfig,
}

impl StepContext {
    /// Context for a step of `time_step` seconds.
    pub fn new(time_step: f32, solver: SolverConfig) -> Self {
        Self {
            time_step,
            inv_time_step: 1.0 / time_step,
            solver,
        }
    }
}

/// A velocity constraint between two bodies.
///
/// Within one island the world calls `pre_solve` on every constraint, then
/// `solve` on every constraint for each iteration, then `post_solve`.
/// Implementations mutate only the velocities of the two bodies they name.
pub trait Constraint: fmt::Debug + Send + Sync {
    /// The two bodies this constraint couples.
    fn bodies(&self) -> (BodyHandle, BodyHandle);

    /// Builds per-step data and applies warm-start impulses.
    fn pre_solve(&mut self, bodies: &mut BodySet, ctx: &StepContext);

    /// One Gauss-Seidel sweep.
    fn solve(&mut self, bodies: &mut BodySet);

    /// Stores accumulated impulses for the next step.
    fn post_solve(&mut self, bodies: &mut BodySet);
}
