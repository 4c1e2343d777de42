// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

/// Linear-congruential generator used to shuffle solver constraint order.
///
/// * `x ← (x · 98765 + 123456789) mod 2³¹`.
/// * Not statistically strong; it only needs to break the systematic bias of
///   always solving constraints in list order.
/// * State is plain data so a world can persist it across steps and two
///   worlds seeded alike shuffle alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Seed used when a world does not configure one.
    pub const DEFAULT_SEED: u32 = 65535;

    const MULTIPLIER: u64 = 98765;
    const INCREMENT: u64 = 123_456_789;
    const MASK: u64 = 0x7fff_ffff;

    /// Constructs a generator from `seed` (reduced to 31 bits).
    pub const fn from_seed(seed: u32) -> Self {
        Self { state: seed & 0x7fff_ffff }
    }

    /// Current state.
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Advances and returns the next 31-bit value.
    pub fn next_u31(&mut self) -> u32 {
        let next = (u64::from(self.state) * Self::MULTIPLIER + Self::INCREMENT) & Self::MASK;
        // Masked to 31 bits above.
        #[allow(clippy::cast_possible_truncation)]
        {
            self.state = next as u32;
        }
        self.state
    }

    /// Returns the next value in `[0, 1)`.
    ///
    /// Uses the high 24 bits so the quotient is exact in `f32`.
    #[allow(clippy::cast_precision_loss)]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u31() >> 7) as f32 / 16_777_216.0
    }

    /// Returns a value in `[0, bound)`; `bound` must be non-zero.
    ///
    /// Computes `floor(x / 2³¹ · bound)` exactly in integer arithmetic.
    pub fn next_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "next_below requires a non-zero bound");
        let x = u128::from(self.next_u31());
        #[allow(clippy::cast_possible_truncation)]
        {
            ((x * bound as u128) >> 31) as usize
        }
    }

    /// Shuffles `items` in place with Fisher–Yates, drawing one value per
    /// position from the back of the slice to the front.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for j in (1..items.len()).rev() {
            let k = self.next_below(j + 1);
            items.swap(j, k);
        }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::from_seed(Self::DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequence_is_pinned() {
        let mut lcg = Lcg::default();
        let values: Vec<u32> = (0..4).map(|_| lcg.next_u31()).collect();
        assert_eq!(values, vec![153570120, 1946836413, 178395758, 1424647467]);
    }

    #[test]
    fn shuffle_of_eight_is_pinned() {
        let mut lcg = Lcg::default();
        let mut items: Vec<u32> = (0..8).collect();
        lcg.shuffle(&mut items);
        assert_eq!(items, vec![4, 2, 1, 5, 3, 7, 6, 0]);
        assert_eq!(lcg.state(), 1665489930);
    }

    #[test]
    fn shuffle_handles_short_slices() {
        let mut lcg = Lcg::default();
        let mut empty: [u8; 0] = [];
        lcg.shuffle(&mut empty);
        let mut one = [7];
        lcg.shuffle(&mut one);
        assert_eq!(one, [7]);
        // Nothing drawn for slices shorter than two.
        assert_eq!(lcg.state(), Lcg::DEFAULT_SEED);
    }

    #[test]
    fn next_f32_is_in_unit_interval() {
        let mut lcg = Lcg::from_seed(1);
        for _ in 0..1000 {
            let v = lcg.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
