//! Consumable player items.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::chamber::RoundKind;
use crate::rng::RollSource;

/// The four one-shot abilities the player may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// The adversary loses its next turn.
    Skip,
    /// Restore one HP.
    Heal,
    /// Learn the next round without firing it.
    Peek,
    /// Reload the chamber on the spot.
    Reload,
}

impl ItemKind {
    pub const ALL: [Self; 4] = [Self::Skip, Self::Heal, Self::Peek, Self::Reload];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Skip => "Procrastinate",
            Self::Heal => "Short Break",
            Self::Peek => "AI Assist",
            Self::Reload => "Fresh Start",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Heal => "heal",
            Self::Peek => "peek",
            Self::Reload => "reload",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure to use an item. No state changes when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("no {0} left")]
    Depleted(ItemKind),
}

/// What a successful item use did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemEffect {
    SkipArmed,
    Healed { before: u8, after: u8 },
    Peeked(RoundKind),
    Reloaded { live: u8, blank: u8 },
}

/// Per-kind charge counters. Granted once; never replenished during a duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub skip: u8,
    pub heal: u8,
    pub peek: u8,
    pub reload: u8,
}

impl Inventory {
    /// Grant `count` items, each kind chosen uniformly.
    #[must_use]
    pub fn granted(count: u8, rng: &mut impl RollSource) -> Self {
        let mut inventory = Self::default();
        let kinds = u32::try_from(ItemKind::ALL.len()).unwrap_or(1);
        for _ in 0..count {
            let pick = usize::try_from(rng.roll_below(kinds)).unwrap_or(0);
            if let Some(&kind) = ItemKind::ALL.get(pick) {
                let slot = inventory.slot_mut(kind);
                *slot = slot.saturating_add(1);
            }
        }
        inventory
    }

    #[must_use]
    pub const fn count(&self, kind: ItemKind) -> u8 {
        match kind {
            ItemKind::Skip => self.skip,
            ItemKind::Heal => self.heal,
            ItemKind::Peek => self.peek,
            ItemKind::Reload => self.reload,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u16 {
        self.skip as u16 + self.heal as u16 + self.peek as u16 + self.reload as u16
    }

    /// Spend one charge of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Depleted`] if no charge is left.
    pub fn take(&mut self, kind: ItemKind) -> Result<(), ItemError> {
        let slot = self.slot_mut(kind);
        if *slot == 0 {
            return Err(ItemError::Depleted(kind));
        }
        *slot -= 1;
        Ok(())
    }

    const fn slot_mut(&mut self, kind: ItemKind) -> &mut u8 {
        match kind {
            ItemKind::Skip => &mut self.skip,
            ItemKind::Heal => &mut self.heal,
            ItemKind::Peek => &mut self.peek,
            ItemKind::Reload => &mut self.reload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{DuelRng, ScriptedRolls};

    #[test]
    fn grant_follows_scripted_picks() {
        let mut rolls = ScriptedRolls::new([0, 1, 1, 3]);
        let inventory = Inventory::granted(4, &mut rolls);
        assert_eq!(
            inventory,
            Inventory {
                skip: 1,
                heal: 2,
                peek: 0,
                reload: 1
            }
        );
        assert_eq!(inventory.total(), 4);
    }

    #[test]
    fn zero_grant_consumes_no_rolls() {
        let mut rolls = ScriptedRolls::default();
        let inventory = Inventory::granted(0, &mut rolls);
        assert_eq!(inventory, Inventory::default());
        assert_eq!(rolls.served(), 0);
    }

    #[test]
    fn seeded_grant_totals_match_count() {
        for seed in 0..50 {
            let mut rng = DuelRng::from_user_seed(seed);
            assert_eq!(Inventory::granted(3, &mut rng).total(), 3);
        }
    }

    #[test]
    fn take_decrements_and_refuses_underflow() {
        let mut inventory = Inventory {
            heal: 1,
            ..Inventory::default()
        };
        assert!(inventory.take(ItemKind::Heal).is_ok());
        assert_eq!(inventory.heal, 0);
        assert_eq!(
            inventory.take(ItemKind::Heal),
            Err(ItemError::Depleted(ItemKind::Heal))
        );
        assert_eq!(inventory.heal, 0);
    }

    #[test]
    fn depleted_error_names_the_item() {
        assert_eq!(
            ItemError::Depleted(ItemKind::Peek).to_string(),
            "no AI Assist left"
        );
    }
}
