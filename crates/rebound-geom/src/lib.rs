// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for rebound.

This crate provides:
- Axis-aligned bounding boxes (`Aabb`).
- Rigid transforms (`Transform`).
- The broad-phase trait and two interchangeable implementations:
  an all-pairs baseline and single-axis sweep-and-prune.

Design notes:
- Deterministic: ordering of pair outputs is canonical.
- Float32 throughout.
"]
#![forbid(unsafe_code)]

/// Broad-phase proxies and candidate pair detection.
pub mod broad;
/// Foundational geometric types.
pub mod types;

pub use broad::{BroadPhase, BruteForceBroadPhase, SweepAndPrune};
pub use types::aabb::Aabb;
pub use types::transform::Transform;
