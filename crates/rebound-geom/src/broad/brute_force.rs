// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use super::BroadPhase;
use crate::types::aabb::Aabb;

/// A minimal broad-phase using an `O(n²)` all-pairs sweep.
///
/// Serves as the correctness baseline for [`super::SweepAndPrune`]: both must
/// report the same canonical pair list.
#[derive(Debug, Default)]
pub struct BruteForceBroadPhase {
    items: BTreeMap<usize, Aabb>,
    pairs: Vec<(usize, usize)>,
    checks: usize,
}

impl BruteForceBroadPhase {
    /// Creates an empty broad phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BroadPhase for BruteForceBroadPhase {
    fn create_proxy(&mut self, id: usize, aabb: Aabb) {
        self.items.insert(id, aabb);
    }

    fn remove_proxy(&mut self, id: usize) {
        self.items.remove(&id);
    }

    fn update_proxy(&mut self, id: usize, aabb: Aabb) {
        if let Some(slot) = self.items.get_mut(&id) {
            *slot = aabb;
        }
    }

    fn detect_pairs(&mut self) {
        self.pairs.clear();
        self.checks = 0;
        // BTreeMap iteration is sorted by id, so (a, b) below is canonical
        // and emitted in lexicographic order.
        let items: Vec<(usize, Aabb)> = self.items.iter().map(|(id, bb)| (*id, *bb)).collect();
        for (i, (a_id, a_bb)) in items.iter().enumerate() {
            for (b_id, b_bb) in &items[i + 1..] {
                self.checks += 1;
                if a_bb.overlaps(b_bb) {
                    self.pairs.push((*a_id, *b_id));
                }
            }
        }
    }

    fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    fn num_pair_checks(&self) -> usize {
        self.checks
    }

    fn num_proxies(&self) -> usize {
        self.items.len()
    }

    fn proxy_aabb(&self, id: usize) -> Option<Aabb> {
        self.items.get(&id).copied()
    }
}
