// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! rebound-core: impulse-based rigid-body simulation.
//!
//! A [`World`] owns bodies, shapes and joints in generational arenas and
//! advances them by fixed steps: broad phase, contact maintenance with
//! warm-started manifolds, island construction over the contact and joint
//! graph, a sequential-impulse solve, then integration or sleep.
//!
//! ```
//! use rebound_core::{BodyDesc, ShapeDesc, World};
//! use rebound_math::Vec3;
//!
//! # fn main() -> Result<(), rebound_core::WorldError> {
//! let mut world = World::default();
//! let ground = world.add_body(BodyDesc::fixed())?;
//! world.add_shape(ground, ShapeDesc::plane(Vec3::UNIT_Y))?;
//! let ball = world.add_body(BodyDesc::dynamic().with_position(Vec3::new(0.0, 3.0, 0.0)))?;
//! world.add_shape(ball, ShapeDesc::sphere(1.0))?;
//! for _ in 0..120 {
//!     world.step();
//! }
//! assert!(world.body(ball).is_some_and(|b| b.position().y() < 3.0));
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

pub mod arena;
pub mod body;
pub mod config;
pub mod constraint;
pub mod contact;
mod error;
mod island;
pub mod joint;
pub mod narrowphase;
pub mod shape;
mod stats;
mod world;

pub use arena::{Arena, ArenaHandle, BodyHandle, JointHandle, ShapeHandle};
pub use body::{aggregate_mass, BodyDesc, BodyType, MassProperties, RigidBody};
pub use config::{BroadPhaseKind, ConfigError, ContactConfig, SleepConfig, SolverConfig, WorldConfig};
pub use constraint::{BodySet, Constraint, StepContext};
pub use contact::{Contact, ContactId, ContactManifold, ManifoldPoint, MAX_MANIFOLD_POINTS};
pub use error::WorldError;
pub use joint::{BallJoint, DistanceJoint, Joint, JointDesc, JointKind};
pub use narrowphase::{DetectFn, Detector, DetectorTable};
pub use shape::{CollisionFilter, MassInfo, Material, Shape, ShapeDesc, ShapeKind, ShapeType};
pub use stats::StepStats;
pub use world::{BoxedBroadPhase, StateHash, World};
