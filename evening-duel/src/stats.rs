//! Player personality stats and the health they derive.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INSIGHT, DEFAULT_RAPPORT, DEFAULT_RESOLVE, DEFAULT_VITALITY, STAT_MAX, STAT_MIN,
};

/// Four personality stats, each clamped to `1..=10` at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerStats {
    vitality: u8,
    resolve: u8,
    insight: u8,
    rapport: u8,
}

impl PlayerStats {
    #[must_use]
    pub fn new(vitality: i32, resolve: i32, insight: i32, rapport: i32) -> Self {
        Self {
            vitality: clamp_stat(vitality),
            resolve: clamp_stat(resolve),
            insight: clamp_stat(insight),
            rapport: clamp_stat(rapport),
        }
    }

    #[must_use]
    pub const fn vitality(&self) -> u8 {
        self.vitality
    }

    /// Drives the starting item grant.
    #[must_use]
    pub const fn resolve(&self) -> u8 {
        self.resolve
    }

    /// Biases the adversary's targeting.
    #[must_use]
    pub const fn insight(&self) -> u8 {
        self.insight
    }

    #[must_use]
    pub const fn rapport(&self) -> u8 {
        self.rapport
    }

    /// Starting HP: `ceil(vitality / 2)` clamped to `1..=hp_cap`.
    #[must_use]
    pub fn starting_hp(&self, hp_cap: u8) -> u8 {
        self.vitality.div_ceil(2).clamp(1, hp_cap.max(1))
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            vitality: DEFAULT_VITALITY,
            resolve: DEFAULT_RESOLVE,
            insight: DEFAULT_INSIGHT,
            rapport: DEFAULT_RAPPORT,
        }
    }
}

fn clamp_stat(value: i32) -> u8 {
    let clamped = value.clamp(i32::from(STAT_MIN), i32::from(STAT_MAX));
    u8::try_from(clamped).unwrap_or(STAT_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_clamp_into_range() {
        let stats = PlayerStats::new(-4, 0, 11, 250);
        assert_eq!(stats.vitality(), 1);
        assert_eq!(stats.resolve(), 1);
        assert_eq!(stats.insight(), 10);
        assert_eq!(stats.rapport(), 10);
    }

    #[test]
    fn vitality_derives_starting_hp() {
        let hp: Vec<u8> = (1..=10)
            .map(|v| PlayerStats::new(v, 5, 5, 5).starting_hp(5))
            .collect();
        assert_eq!(hp, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn starting_hp_respects_cap() {
        let stats = PlayerStats::new(10, 5, 5, 5);
        assert_eq!(stats.starting_hp(3), 3);
        assert_eq!(stats.starting_hp(0), 1);
    }

    #[test]
    fn default_stats_follow_stage_defaults() {
        let stats = PlayerStats::default();
        assert_eq!(
            (
                stats.vitality(),
                stats.resolve(),
                stats.insight(),
                stats.rapport()
            ),
            (8, 5, 7, 6)
        );
        assert_eq!(stats.starting_hp(5), 4);
    }
}
