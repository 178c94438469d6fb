//! Deterministic PRNG for strategies that randomize their yield.
//!
//! SplitMix64: 8 bytes of state, reproducible across platforms, so a seeded
//! economy replays the same kind substitutions and lucky strikes.

use crate::fixed::Fixed64;

/// SplitMix64 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform index in `0..bound`. A bound of 0 yields 0.
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        // Multiply-shift on the upper 32 bits; bias is negligible for the
        // handful of choices strategies make.
        let r = (self.next_u64() >> 32) as u128;
        ((r * bound as u128) >> 32) as usize
    }

    /// Returns `true` with the given probability (Fixed64 in [0, 1]).
    ///
    /// - probability <= 0 always returns false
    /// - probability >= 1 always returns true
    pub fn chance(&mut self, probability: Fixed64) -> bool {
        if probability <= Fixed64::ZERO {
            return false;
        }
        if probability >= Fixed64::ONE {
            return true;
        }
        // For p in (0,1) the raw Q32.32 bits are the fraction scaled to [0, 2^32).
        let upper = (self.next_u64() >> 32) as u32;
        (upper as u64) < probability.to_bits() as u64
    }

    /// Get the internal state.
    pub fn state(&self) -> u64 {
        self.state
    }
}
