// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase interface and two reference implementations.
//!
//! Determinism contract (applies to all implementations here):
//! - Pair identity is canonicalized as `(min_id, max_id)`.
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - Overlap is inclusive on faces (touching AABBs are considered overlapping).
//!
//! [`BruteForceBroadPhase`] is an `O(n²)` all-pairs baseline.
//! [`SweepAndPrune`] sorts proxies along X and only tests pairs whose X
//! intervals overlap. Both produce identical pair lists for identical input.

mod brute_force;
mod sweep_prune;

pub use brute_force::BruteForceBroadPhase;
pub use sweep_prune::SweepAndPrune;

use crate::types::aabb::Aabb;

/// Broad-phase interface consumed by the physics world.
///
/// Proxy ids are caller-chosen (the world uses shape slot indices). Pairs are
/// computed by [`BroadPhase::detect_pairs`] and read back with
/// [`BroadPhase::pairs`] until the next detection.
pub trait BroadPhase {
    /// Registers a proxy with the given `id` and bounds. Re-registering an id
    /// replaces its bounds.
    fn create_proxy(&mut self, id: usize, aabb: Aabb);
    /// Removes a proxy if present.
    fn remove_proxy(&mut self, id: usize);
    /// Updates the bounds of an existing proxy.
    fn update_proxy(&mut self, id: usize, aabb: Aabb);
    /// Recomputes the overlapping pair list.
    fn detect_pairs(&mut self);
    /// Canonical, sorted pair list from the last [`BroadPhase::detect_pairs`].
    fn pairs(&self) -> &[(usize, usize)];
    /// Number of AABB overlap tests performed by the last detection.
    fn num_pair_checks(&self) -> usize;
    /// Number of registered proxies.
    fn num_proxies(&self) -> usize;
    /// Current bounds of a proxy.
    fn proxy_aabb(&self, id: usize) -> Option<Aabb>;
}

fn canonical(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
