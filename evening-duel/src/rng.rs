//! Injectable randomness for the duel.
//!
//! The engine never reaches for ambient randomness: every roll goes through a
//! [`RollSource`] owned by the [`crate::Duel`]. Any `rand` generator works, and
//! [`ScriptedRolls`] replays a fixed script for deterministic tests.

use std::collections::VecDeque;

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;

use crate::chamber::RoundKind;
use crate::constants::PERCENT;

/// Source of uniform integer rolls.
pub trait RollSource {
    /// Uniform value in `0..bound`. A zero bound yields 0.
    fn roll_below(&mut self, bound: u32) -> u32;

    /// Uniform percentage roll in `0..100`.
    fn roll_pct(&mut self) -> u32 {
        self.roll_below(PERCENT)
    }

    /// Weighted choice between the two round kinds.
    fn roll_weighted(&mut self, live: u8, blank: u8) -> RoundKind {
        let total = u32::from(live) + u32::from(blank);
        if self.roll_below(total) < u32::from(live) {
            RoundKind::Live
        } else {
            RoundKind::Blank
        }
    }
}

impl<R: RngCore> RollSource for R {
    fn roll_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.gen_range(0..bound)
    }
}

/// Replays a fixed queue of rolls; each value is reduced modulo the requested bound.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    script: VecDeque<u32>,
    served: u64,
}

impl ScriptedRolls {
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: script.into_iter().collect(),
            served: 0,
        }
    }

    /// Append more rolls to the end of the script.
    pub fn extend(&mut self, rolls: impl IntoIterator<Item = u32>) {
        self.script.extend(rolls);
    }

    /// Number of rolls served so far, including fallbacks past the end of the script.
    #[must_use]
    pub const fn served(&self) -> u64 {
        self.served
    }

    /// Rolls still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RollSource for ScriptedRolls {
    fn roll_below(&mut self, bound: u32) -> u32 {
        self.served = self.served.saturating_add(1);
        let next = self.script.pop_front().unwrap_or(0);
        if bound == 0 { 0 } else { next % bound }
    }
}

/// Seeded duel stream that counts the raw draws it serves.
#[derive(Debug, Clone)]
pub struct DuelRng {
    rng: SmallRng,
    draws: u64,
}

impl DuelRng {
    /// Derive the duel stream from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(derive_stream_seed(seed, b"duel")),
            draws: 0,
        }
    }

    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RngCore for DuelRng {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Domain-separated stream seed: HMAC-SHA256 keyed by the user seed.
#[must_use]
pub fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_rolls_reduce_modulo_bound_and_count() {
        let mut rolls = ScriptedRolls::new([7, 42, 250]);
        assert_eq!(rolls.roll_below(6), 1);
        assert_eq!(rolls.roll_pct(), 42);
        assert_eq!(rolls.roll_pct(), 50);
        assert_eq!(rolls.roll_below(5), 0, "exhausted script falls back to zero");
        assert_eq!(rolls.served(), 4);
        assert_eq!(rolls.remaining(), 0);
    }

    #[test]
    fn weighted_roll_splits_on_live_count() {
        let mut rolls = ScriptedRolls::new([0, 2, 3, 5]);
        assert_eq!(rolls.roll_weighted(3, 3), RoundKind::Live);
        assert_eq!(rolls.roll_weighted(3, 3), RoundKind::Live);
        assert_eq!(rolls.roll_weighted(3, 3), RoundKind::Blank);
        assert_eq!(rolls.roll_weighted(3, 3), RoundKind::Blank);
    }

    #[test]
    fn weighted_roll_respects_single_kind_chambers() {
        let mut rng = DuelRng::from_user_seed(99);
        for _ in 0..64 {
            assert_eq!(rng.roll_weighted(4, 0), RoundKind::Live);
            assert_eq!(rng.roll_weighted(0, 2), RoundKind::Blank);
        }
    }

    #[test]
    fn duel_rng_is_reproducible_and_counts_draws() {
        let mut a = DuelRng::from_user_seed(1337);
        let mut b = DuelRng::from_user_seed(1337);
        let rolls_a: Vec<u32> = (0..16).map(|_| a.roll_below(100)).collect();
        let rolls_b: Vec<u32> = (0..16).map(|_| b.roll_below(100)).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(a.draws() >= 16);
        assert!(rolls_a.iter().all(|&r| r < 100));
    }

    #[test]
    fn stream_seed_uses_domain_hmac() {
        let seed = 0xDEAD_BEEF;
        assert_ne!(
            derive_stream_seed(seed, b"duel"),
            derive_stream_seed(seed, b"other")
        );
        assert_eq!(
            derive_stream_seed(seed, b"duel"),
            derive_stream_seed(seed, b"duel")
        );
        let mut expected = SmallRng::seed_from_u64(derive_stream_seed(seed, b"duel"));
        let mut rng = DuelRng::from_user_seed(seed);
        assert_eq!(rng.next_u32(), expected.next_u32());
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn zero_bound_never_panics() {
        let mut rng = DuelRng::from_user_seed(5);
        assert_eq!(rng.roll_below(0), 0);
    }
}
