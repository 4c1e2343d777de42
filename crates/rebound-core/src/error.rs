// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use thiserror::Error;

use crate::arena::{BodyHandle, JointHandle, ShapeHandle};
use crate::config::ConfigError;

/// Structural misuse a world rejects.
///
/// A rejected call leaves the world exactly as it was. Numerical degeneracy
/// is never reported here; the step handles it in place.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError {
    /// The body handle is stale or belongs to another world.
    #[error("unknown body: {0}")]
    UnknownBody(BodyHandle),
    /// The shape handle is stale or belongs to another world.
    #[error("unknown shape: {0}")]
    UnknownShape(ShapeHandle),
    /// The joint handle is stale or belongs to another world.
    #[error("unknown joint: {0}")]
    UnknownJoint(JointHandle),
    /// A joint names a body this world does not hold.
    #[error("joint references unresolved bodies {body1} / {body2}")]
    JointBodiesUnresolved {
        /// First body named by the joint.
        body1: BodyHandle,
        /// Second body named by the joint.
        body2: BodyHandle,
    },
    /// A joint's two ends are the same body.
    #[error("joint connects {0} to itself")]
    SelfJoint(BodyHandle),
    /// Another body or joint already uses this name.
    #[error("name already in use: {0}")]
    DuplicateName(String),
    /// The world configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
