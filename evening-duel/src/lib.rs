//! Evening Duel Engine
//!
//! Platform-agnostic core logic for the evening-stage duel: a shared chamber of
//! live and blank rounds, a player with one-shot items, and an adversary whose
//! targeting is biased by the player's insight.
//! This crate holds all duel mechanics without UI, timing, or animation.

pub mod chamber;
pub mod config;
pub(crate) mod constants;
pub mod duel;
pub mod items;
pub mod planner;
pub mod rng;
pub mod stats;

// Re-export commonly used types
pub use chamber::{Chamber, ChamberStateError, Lookahead, RoundKind};
pub use config::{DuelConfig, DuelConfigError};
pub use duel::{Actor, Duel, DuelLog, DuelOutcome, DuelSnapshot, Shot, TurnResult};
pub use items::{Inventory, ItemEffect, ItemError, ItemKind};
pub use planner::{Plan, PlannerPhase, Target, TargetingTable, plan_turn};
pub use rng::{DuelRng, RollSource, ScriptedRolls, derive_stream_seed};
pub use stats::PlayerStats;
