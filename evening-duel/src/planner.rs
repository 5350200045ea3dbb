//! Adversary turn planning.
//!
//! A plan commits to a target and to the kind of the round it will fire. The
//! committed kind is always the one held in the chamber's lookahead, so the
//! eventual draw cannot contradict the plan.
use serde::{Deserialize, Serialize};

use crate::chamber::{Chamber, RoundKind};
use crate::constants::{
    TARGET_BLANK_BASE, TARGET_BLANK_CEILING, TARGET_BLANK_SLOPE, TARGET_LIVE_BASE,
    TARGET_LIVE_FLOOR, TARGET_LIVE_SLOPE,
};
use crate::rng::RollSource;

/// Who the shooter points the barrel at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Opponent,
    Oneself,
}

/// The adversary's pre-committed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub target: Target,
    pub round: RoundKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerPhase {
    #[default]
    Idle,
    Planned,
}

/// Percent chance of aiming at the opponent, keyed by the previewed round.
///
/// Live: `max(floor, base - slope * insight)`.
/// Blank: `min(ceiling, base + slope * insight)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingTable {
    #[serde(default = "TargetingTable::default_live_base")]
    pub live_base: u8,
    #[serde(default = "TargetingTable::default_live_slope")]
    pub live_slope: u8,
    #[serde(default = "TargetingTable::default_live_floor")]
    pub live_floor: u8,
    #[serde(default = "TargetingTable::default_blank_base")]
    pub blank_base: u8,
    #[serde(default = "TargetingTable::default_blank_slope")]
    pub blank_slope: u8,
    #[serde(default = "TargetingTable::default_blank_ceiling")]
    pub blank_ceiling: u8,
}

impl TargetingTable {
    const fn default_live_base() -> u8 {
        TARGET_LIVE_BASE
    }

    const fn default_live_slope() -> u8 {
        TARGET_LIVE_SLOPE
    }

    const fn default_live_floor() -> u8 {
        TARGET_LIVE_FLOOR
    }

    const fn default_blank_base() -> u8 {
        TARGET_BLANK_BASE
    }

    const fn default_blank_slope() -> u8 {
        TARGET_BLANK_SLOPE
    }

    const fn default_blank_ceiling() -> u8 {
        TARGET_BLANK_CEILING
    }

    #[must_use]
    pub fn opponent_chance(&self, round: RoundKind, insight: u8) -> u8 {
        match round {
            RoundKind::Live => {
                let shift = u16::from(self.live_slope) * u16::from(insight);
                let chance = u16::from(self.live_base)
                    .saturating_sub(shift)
                    .max(u16::from(self.live_floor));
                u8::try_from(chance).unwrap_or(u8::MAX)
            }
            RoundKind::Blank => {
                let shift = u16::from(self.blank_slope) * u16::from(insight);
                let chance = (u16::from(self.blank_base) + shift).min(u16::from(self.blank_ceiling));
                u8::try_from(chance).unwrap_or(u8::MAX)
            }
        }
    }
}

impl Default for TargetingTable {
    fn default() -> Self {
        Self {
            live_base: TARGET_LIVE_BASE,
            live_slope: TARGET_LIVE_SLOPE,
            live_floor: TARGET_LIVE_FLOOR,
            blank_base: TARGET_BLANK_BASE,
            blank_slope: TARGET_BLANK_SLOPE,
            blank_ceiling: TARGET_BLANK_CEILING,
        }
    }
}

/// Decide the adversary's next action against `chamber`.
///
/// A single-kind chamber is played optimally without rolling; otherwise the
/// next round is previewed and the target is rolled against the table.
pub fn plan_turn(
    chamber: &mut Chamber,
    table: &TargetingTable,
    insight: u8,
    rng: &mut impl RollSource,
) -> Plan {
    if chamber.pin_certain(RoundKind::Live) {
        return Plan {
            target: Target::Opponent,
            round: RoundKind::Live,
        };
    }
    if chamber.pin_certain(RoundKind::Blank) {
        return Plan {
            target: Target::Oneself,
            round: RoundKind::Blank,
        };
    }

    let round = chamber.peek(rng);
    let chance = table.opponent_chance(round, insight);
    let target = if rng.roll_pct() < u32::from(chance) {
        Target::Opponent
    } else {
        Target::Oneself
    };
    Plan { target, round }
}
