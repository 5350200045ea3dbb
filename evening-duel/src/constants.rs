//! Centralized balance and tuning constants for the evening duel.
//!
//! These values are the compiled fallback for [`crate::config::DuelConfig`];
//! the bundled JSON document mirrors them.

// Chamber ------------------------------------------------------------------
pub(crate) const CHAMBER_CAPACITY: u8 = 6;
pub(crate) const MIN_LIVE_ROUNDS: u8 = 1;
pub(crate) const MAX_LIVE_ROUNDS: u8 = 5;

// Combatants ---------------------------------------------------------------
pub(crate) const HP_CAP: u8 = 5;
pub(crate) const ADVERSARY_START_HP: u8 = 5;
pub(crate) const STAT_MIN: u8 = 1;
pub(crate) const STAT_MAX: u8 = 10;

// Default player stats used when a duel starts without carried stats.
pub(crate) const DEFAULT_VITALITY: u8 = 8;
pub(crate) const DEFAULT_RESOLVE: u8 = 5;
pub(crate) const DEFAULT_INSIGHT: u8 = 7;
pub(crate) const DEFAULT_RAPPORT: u8 = 6;

// Item grants --------------------------------------------------------------
/// Upper resolve bound for granting 0, 1, 2 and 3 items; above the last bound grants 4.
pub(crate) const ITEM_GRANT_THRESHOLDS: [u8; 4] = [2, 4, 6, 8];

// Adversary targeting (percent) ---------------------------------------------
pub(crate) const TARGET_LIVE_BASE: u8 = 80;
pub(crate) const TARGET_LIVE_SLOPE: u8 = 3;
pub(crate) const TARGET_LIVE_FLOOR: u8 = 30;
pub(crate) const TARGET_BLANK_BASE: u8 = 30;
pub(crate) const TARGET_BLANK_SLOPE: u8 = 3;
pub(crate) const TARGET_BLANK_CEILING: u8 = 90;
pub(crate) const PERCENT: u32 = 100;
