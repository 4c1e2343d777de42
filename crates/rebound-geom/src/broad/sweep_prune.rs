// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use super::{canonical, BroadPhase};
use crate::types::aabb::Aabb;

/// Single-axis sweep-and-prune.
///
/// Proxies are sorted by `min.x` (ties broken by id) and swept once; a pair is
/// tested in full only when the X intervals overlap. The sort order is kept
/// between detections, so coherent motion sorts nearly-sorted input.
#[derive(Debug, Default)]
pub struct SweepAndPrune {
    items: BTreeMap<usize, Aabb>,
    order: Vec<usize>,
    pairs: Vec<(usize, usize)>,
    checks: usize,
}

impl SweepAndPrune {
    /// Creates an empty broad phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn min_x(&self, id: usize) -> f32 {
        self.items.get(&id).map_or(f32::INFINITY, |bb| bb.min().x())
    }
}

impl BroadPhase for SweepAndPrune {
    fn create_proxy(&mut self, id: usize, aabb: Aabb) {
        if self.items.insert(id, aabb).is_none() {
            self.order.push(id);
        }
    }

    fn remove_proxy(&mut self, id: usize) {
        if self.items.remove(&id).is_some() {
            self.order.retain(|&other| other != id);
        }
    }

    fn update_proxy(&mut self, id: usize, aabb: Aabb) {
        if let Some(slot) = self.items.get_mut(&id) {
            *slot = aabb;
        }
    }

    fn detect_pairs(&mut self) {
        self.pairs.clear();
        self.checks = 0;

        // Insertion sort: cheap on the nearly-sorted order left by the last step.
        for i in 1..self.order.len() {
            let mut j = i;
            while j > 0 {
                let (a, b) = (self.order[j - 1], self.order[j]);
                let (ka, kb) = (self.min_x(a), self.min_x(b));
                if ka > kb || (ka == kb && a > b) {
                    self.order.swap(j - 1, j);
                    j -= 1;
                } else {
                    break;
                }
            }
        }

        for (i, &a) in self.order.iter().enumerate() {
            let Some(a_bb) = self.items.get(&a) else {
                continue;
            };
            let a_max_x = a_bb.max().x();
            for &b in &self.order[i + 1..] {
                let Some(b_bb) = self.items.get(&b) else {
                    continue;
                };
                if b_bb.min().x() > a_max_x {
                    break;
                }
                self.checks += 1;
                if a_bb.overlaps(b_bb) {
                    self.pairs.push(canonical(a, b));
                }
            }
        }
        self.pairs.sort_unstable();
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
