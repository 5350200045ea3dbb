//! Duel tuning configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ADVERSARY_START_HP, CHAMBER_CAPACITY, HP_CAP, ITEM_GRANT_THRESHOLDS, MAX_LIVE_ROUNDS,
    MIN_LIVE_ROUNDS, PERCENT,
};
use crate::planner::TargetingTable;

const DEFAULT_DUEL_DATA: &str = include_str!("../data/duel.json");

/// Errors raised when duel configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DuelConfigError {
    #[error("chamber capacity must hold at least one live and one blank round (got {capacity})")]
    CapacityTooSmall { capacity: u8 },
    #[error("live range {min}..={max} must leave a blank round in a chamber of {capacity}")]
    LiveRange { min: u8, max: u8, capacity: u8 },
    #[error("{field} must be at least 1")]
    ZeroHealth { field: &'static str },
    #[error("{field} must be a percentage (got {value})")]
    Percentage { field: &'static str, value: u8 },
    #[error("item grant thresholds must be non-decreasing (got {thresholds:?})")]
    GrantThresholds { thresholds: [u8; 4] },
    #[error("failed to parse duel config: {0}")]
    Parse(String),
}

/// Tunable parameters of a duel. Every field falls back to the compiled constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelConfig {
    #[serde(default = "DuelConfig::default_chamber_capacity")]
    pub chamber_capacity: u8,
    #[serde(default = "DuelConfig::default_min_live")]
    pub min_live: u8,
    #[serde(default = "DuelConfig::default_max_live")]
    pub max_live: u8,
    #[serde(default = "DuelConfig::default_hp_cap")]
    pub hp_cap: u8,
    #[serde(default = "DuelConfig::default_adversary_hp")]
    pub adversary_hp: u8,
    #[serde(default = "DuelConfig::default_item_grant_thresholds")]
    pub item_grant_thresholds: [u8; 4],
    #[serde(default)]
    pub targeting: TargetingTable,
}

impl DuelConfig {
    const fn default_chamber_capacity() -> u8 {
        CHAMBER_CAPACITY
    }

    const fn default_min_live() -> u8 {
        MIN_LIVE_ROUNDS
    }

    const fn default_max_live() -> u8 {
        MAX_LIVE_ROUNDS
    }

    const fn default_hp_cap() -> u8 {
        HP_CAP
    }

    const fn default_adversary_hp() -> u8 {
        ADVERSARY_START_HP
    }

    const fn default_item_grant_thresholds() -> [u8; 4] {
        ITEM_GRANT_THRESHOLDS
    }

    /// Configuration built purely from the compiled constants.
    #[must_use]
    pub fn compiled() -> Self {
        Self {
            chamber_capacity: CHAMBER_CAPACITY,
            min_live: MIN_LIVE_ROUNDS,
            max_live: MAX_LIVE_ROUNDS,
            hp_cap: HP_CAP,
            adversary_hp: ADVERSARY_START_HP,
            item_grant_thresholds: ITEM_GRANT_THRESHOLDS,
            targeting: TargetingTable::default(),
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or violates an invariant.
    pub fn from_json(raw: &str) -> Result<Self, DuelConfigError> {
        let cfg: Self =
            serde_json::from_str(raw).map_err(|err| DuelConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the invariants a duel relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), DuelConfigError> {
        if self.chamber_capacity < 2 {
            return Err(DuelConfigError::CapacityTooSmall {
                capacity: self.chamber_capacity,
            });
        }
        if self.min_live == 0 || self.min_live > self.max_live || self.max_live >= self.chamber_capacity
        {
            return Err(DuelConfigError::LiveRange {
                min: self.min_live,
                max: self.max_live,
                capacity: self.chamber_capacity,
            });
        }
        if self.hp_cap == 0 {
            return Err(DuelConfigError::ZeroHealth { field: "hp_cap" });
        }
        if self.adversary_hp == 0 {
            return Err(DuelConfigError::ZeroHealth {
                field: "adversary_hp",
            });
        }
        if !self.item_grant_thresholds.is_sorted() {
            return Err(DuelConfigError::GrantThresholds {
                thresholds: self.item_grant_thresholds,
            });
        }
        self.targeting.validate()
    }

    /// Number of items granted for a resolve score.
    #[must_use]
    pub fn items_for_resolve(&self, resolve: u8) -> u8 {
        let below = self
            .item_grant_thresholds
            .iter()
            .position(|&bound| resolve <= bound)
            .unwrap_or(self.item_grant_thresholds.len());
        u8::try_from(below).unwrap_or(u8::MAX)
    }
}

impl Default for DuelConfig {
    fn default() -> Self {
        serde_json::from_str(DEFAULT_DUEL_DATA).unwrap_or_else(|_| Self::compiled())
    }
}

impl TargetingTable {
    pub(crate) fn validate(&self) -> Result<(), DuelConfigError> {
        let fields = [
            ("targeting.live_base", self.live_base),
            ("targeting.live_floor", self.live_floor),
            ("targeting.blank_base", self.blank_base),
            ("targeting.blank_ceiling", self.blank_ceiling),
        ];
        for (field, value) in fields {
            if u32::from(value) > PERCENT {
                return Err(DuelConfigError::Percentage { field, value });
            }
        }
        Ok(())
    }
}
