//! The evening duel engine.
//!
//! A [`Duel`] owns every piece of duel state and is mutated only through its
//! methods. It never sequences turns or waits: the caller decides whose turn it
//! is, reloads when [`Duel::needs_reload`] holds, and reads back the returned
//! [`Shot`] to learn whether the shooter keeps the turn.
use serde::{Deserialize, Serialize};

use crate::chamber::{Chamber, Lookahead, RoundKind};
use crate::config::{DuelConfig, DuelConfigError};
use crate::items::{Inventory, ItemEffect, ItemError, ItemKind};
use crate::planner::{self, Plan, PlannerPhase, Target};
use crate::rng::RollSource;
use crate::stats::PlayerStats;

/// One side of the duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Player,
    Adversary,
}

impl Actor {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Adversary,
            Self::Adversary => Self::Player,
        }
    }

    #[must_use]
    pub const fn resolve(self, target: Target) -> Self {
        match target {
            Target::Opponent => self.opponent(),
            Target::Oneself => self,
        }
    }
}

/// Whether the acting side keeps the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnResult {
    End,
    Continue,
}

/// Result of pulling the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    pub shooter: Actor,
    pub target: Actor,
    /// `None` when the duel was already over and nothing was fired.
    pub round: Option<RoundKind>,
    pub turn: TurnResult,
}

impl Shot {
    const fn void(shooter: Actor, target: Actor) -> Self {
        Self {
            shooter,
            target,
            round: None,
            turn: TurnResult::End,
        }
    }

    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self.round, Some(RoundKind::Live))
    }

    #[must_use]
    pub const fn keeps_turn(&self) -> bool {
        matches!(self.turn, TurnResult::Continue)
    }
}

/// How a finished duel ended, from the player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelOutcome {
    Victory,
    Defeat,
    Draw,
}

/// Ordered collector of human-readable duel lines. The engine never reads it back.
pub trait DuelLog {
    fn push_line(&mut self, line: String);
}

impl DuelLog for Vec<String> {
    fn push_line(&mut self, line: String) {
        self.push(line);
    }
}

impl DuelLog for String {
    fn push_line(&mut self, line: String) {
        self.push_str(&line);
        self.push('\n');
    }
}

/// Serializable view of a duel for reports and presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelSnapshot {
    pub stats: PlayerStats,
    pub player_hp: u8,
    pub adversary_hp: u8,
    pub live: u8,
    pub blank: u8,
    pub lookahead: Lookahead,
    pub inventory: Inventory,
    pub adversary_skip: bool,
    pub planner: PlannerPhase,
    pub outcome: Option<DuelOutcome>,
}

/// Single-owner duel state.
#[derive(Debug, Clone)]
pub struct Duel<R> {
    config: DuelConfig,
    stats: PlayerStats,
    player_hp: u8,
    adversary_hp: u8,
    chamber: Chamber,
    plan: Option<Plan>,
    inventory: Inventory,
    adversary_skip: bool,
    rng: R,
}

impl<R: RollSource> Duel<R> {
    /// Start a duel with the bundled configuration.
    #[must_use]
    pub fn new(stats: PlayerStats, rng: R) -> Self {
        Self::build(stats, DuelConfig::default(), rng)
    }

    /// Start a duel with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_config(stats: PlayerStats, config: DuelConfig, rng: R) -> Result<Self, DuelConfigError> {
        config.validate()?;
        Ok(Self::build(stats, config, rng))
    }

    fn build(stats: PlayerStats, config: DuelConfig, mut rng: R) -> Self {
        let mut chamber = Chamber::unloaded(&config);
        chamber.reload(&mut rng);
        let inventory = Inventory::granted(config.items_for_resolve(stats.resolve()), &mut rng);
        let player_hp = stats.starting_hp(config.hp_cap);
        log::debug!(
            "duel started: player {player_hp} HP, adversary {} HP, {} items",
            config.adversary_hp,
            inventory.total()
        );
        Self {
            player_hp,
            adversary_hp: config.adversary_hp,
            chamber,
            plan: None,
            inventory,
            adversary_skip: false,
            stats,
            config,
            rng,
        }
    }

    // ---------------- queries ----------------

    #[must_use]
    pub const fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    #[must_use]
    pub const fn config(&self) -> &DuelConfig {
        &self.config
    }

    #[must_use]
    pub const fn player_hp(&self) -> u8 {
        self.player_hp
    }

    #[must_use]
    pub const fn adversary_hp(&self) -> u8 {
        self.adversary_hp
    }

    #[must_use]
    pub const fn hp(&self, actor: Actor) -> u8 {
        match actor {
            Actor::Player => self.player_hp,
            Actor::Adversary => self.adversary_hp,
        }
    }

    #[must_use]
    pub const fn live_count(&self) -> u8 {
        self.chamber.live_count()
    }

    #[must_use]
    pub const fn blank_count(&self) -> u8 {
        self.chamber.blank_count()
    }

    #[must_use]
    pub const fn remaining(&self) -> u8 {
        self.chamber.remaining()
    }

    #[must_use]
    pub const fn lookahead(&self) -> Lookahead {
        self.chamber.lookahead()
    }

    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[must_use]
    pub const fn item_count(&self, kind: ItemKind) -> u8 {
        self.inventory.count(kind)
    }

    #[must_use]
    pub const fn adversary_skip_pending(&self) -> bool {
        self.adversary_skip
    }

    #[must_use]
    pub const fn plan(&self) -> Option<Plan> {
        self.plan
    }

    #[must_use]
    pub const fn planner_phase(&self) -> PlannerPhase {
        match self.plan {
            Some(_) => PlannerPhase::Planned,
            None => PlannerPhase::Idle,
        }
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.player_hp == 0 || self.adversary_hp == 0
    }

    #[must_use]
    pub const fn needs_reload(&self) -> bool {
        self.chamber.needs_reload()
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<DuelOutcome> {
        match (self.player_hp, self.adversary_hp) {
            (0, 0) => Some(DuelOutcome::Draw),
            (0, _) => Some(DuelOutcome::Defeat),
            (_, 0) => Some(DuelOutcome::Victory),
            _ => None,
        }
    }

    /// The injected randomness source.
    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }

    #[must_use]
    pub fn snapshot(&self) -> DuelSnapshot {
        DuelSnapshot {
            stats: self.stats,
            player_hp: self.player_hp,
            adversary_hp: self.adversary_hp,
            live: self.chamber.live_count(),
            blank: self.chamber.blank_count(),
            lookahead: self.chamber.lookahead(),
            inventory: self.inventory,
            adversary_skip: self.adversary_skip,
            planner: self.planner_phase(),
            outcome: self.outcome(),
        }
    }

    // ---------------- chamber ----------------

    /// Load a fresh chamber, discarding any preview and pending plan.
    pub fn reload(&mut self, log: &mut impl DuelLog) {
        self.reload_chamber();
        log.push_line(format!(
            "Reloaded! ({} live / {} blank)",
            self.chamber.live_count(),
            self.chamber.blank_count()
        ));
    }

    fn reload_chamber(&mut self) {
        self.chamber.reload(&mut self.rng);
        self.plan = None;
    }

    fn draw_round(&mut self) -> RoundKind {
        if self.chamber.needs_reload() {
            log::warn!("draw requested against an empty chamber; reloading first");
            self.reload_chamber();
        }
        self.chamber.draw(&mut self.rng)
    }

    // ---------------- firing ----------------

    /// `actor` fires at the other side. Always ends the turn.
    pub fn fire_at_opponent(&mut self, actor: Actor, log: &mut impl DuelLog) -> Shot {
        self.fire(actor, Target::Opponent, log)
    }

    /// `actor` fires at itself. A blank keeps the turn.
    pub fn fire_at_self(&mut self, actor: Actor, log: &mut impl DuelLog) -> Shot {
        self.fire(actor, Target::Oneself, log)
    }

    fn fire(&mut self, shooter: Actor, target: Target, log: &mut impl DuelLog) -> Shot {
        let victim = shooter.resolve(target);
        if self.is_over() {
            log.push_line(String::from("The duel is already over."));
            return Shot::void(shooter, victim);
        }
        if let Some(plan) = self.plan.take() {
            // Someone else is consuming the round the plan committed to.
            log::warn!("pending adversary plan {plan:?} invalidated by a {shooter:?} shot");
        }
        let round = self.draw_round();
        self.resolve_shot(shooter, target, round, log)
    }

    fn resolve_shot(
        &mut self,
        shooter: Actor,
        target: Target,
        round: RoundKind,
        log: &mut impl DuelLog,
    ) -> Shot {
        let victim = shooter.resolve(target);
        if round.is_live() {
            self.damage(victim);
        }
        log.push_line(shot_line(shooter, victim, round));
        let turn = match (target, round) {
            (Target::Oneself, RoundKind::Blank) => TurnResult::Continue,
            _ => TurnResult::End,
        };
        Shot {
            shooter,
            target: victim,
            round: Some(round),
            turn,
        }
    }

    fn damage(&mut self, actor: Actor) {
        let hp = match actor {
            Actor::Player => &mut self.player_hp,
            Actor::Adversary => &mut self.adversary_hp,
        };
        *hp = hp.saturating_sub(1);
    }

    // ---------------- items ----------------

    /// Spend one player item.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::Depleted`] if no charge of `kind` is left; a
    /// failure line is still logged and nothing else changes.
    pub fn use_item(
        &mut self,
        kind: ItemKind,
        log: &mut impl DuelLog,
    ) -> Result<ItemEffect, ItemError> {
        if let Err(err) = self.inventory.take(kind) {
            log.push_line(format!("You have no {kind} left."));
            return Err(err);
        }
        let effect = match kind {
            ItemKind::Skip => {
                self.adversary_skip = true;
                log.push_line(format!("[{kind}] The adversary will skip its next turn!"));
                ItemEffect::SkipArmed
            }
            ItemKind::Heal => {
                let before = self.player_hp;
                self.player_hp = before.saturating_add(1).min(self.config.hp_cap);
                log.push_line(format!(
                    "[{kind}] HP restored! ({before} -> {})",
                    self.player_hp
                ));
                ItemEffect::Healed {
                    before,
                    after: self.player_hp,
                }
            }
            ItemKind::Peek => {
                if self.chamber.needs_reload() {
                    log::warn!("peek requested against an empty chamber; reloading first");
                    self.reload_chamber();
                }
                let next = self.chamber.peek(&mut self.rng);
                log.push_line(format!("[{kind}] The next round is a {next}."));
                ItemEffect::Peeked(next)
            }
            ItemKind::Reload => {
                self.reload_chamber();
                let live = self.chamber.live_count();
                let blank = self.chamber.blank_count();
                log.push_line(format!(
                    "[{kind}] Instant reload! ({live} live / {blank} blank) Your turn continues."
                ));
                ItemEffect::Reloaded { live, blank }
            }
        };
        log::debug!("item {} used: {effect:?}", kind.key());
        Ok(effect)
    }

    /// # Errors
    ///
    /// See [`Duel::use_item`].
    pub fn use_skip(&mut self, log: &mut impl DuelLog) -> Result<ItemEffect, ItemError> {
        self.use_item(ItemKind::Skip, log)
    }

    /// # Errors
    ///
    /// See [`Duel::use_item`].
    pub fn use_heal(&mut self, log: &mut impl DuelLog) -> Result<ItemEffect, ItemError> {
        self.use_item(ItemKind::Heal, log)
    }

    /// # Errors
    ///
    /// See [`Duel::use_item`].
    pub fn use_peek(&mut self, log: &mut impl DuelLog) -> Result<ItemEffect, ItemError> {
        self.use_item(ItemKind::Peek, log)
    }

    /// # Errors
    ///
    /// See [`Duel::use_item`].
    pub fn use_reload(&mut self, log: &mut impl DuelLog) -> Result<ItemEffect, ItemError> {
        self.use_item(ItemKind::Reload, log)
    }

    // ---------------- adversary ----------------

    /// Consume a pending skip. Call when the adversary's turn would begin.
    pub fn consume_adversary_skip(&mut self, log: &mut impl DuelLog) -> bool {
        if !self.adversary_skip {
            return false;
        }
        self.adversary_skip = false;
        log.push_line(String::from("The adversary is busy procrastinating and skips its turn."));
        true
    }

    /// Commit the adversary to a target and a round. Returns `None` once the duel is over.
    pub fn plan_adversary_turn(&mut self, log: &mut impl DuelLog) -> Option<Plan> {
        if self.is_over() {
            return None;
        }
        if self.chamber.needs_reload() {
            log::warn!("planning against an empty chamber; reloading first");
            self.reload_chamber();
        }
        let plan = planner::plan_turn(
            &mut self.chamber,
            &self.config.targeting,
            self.stats.insight(),
            &mut self.rng,
        );
        log::debug!("adversary planned {plan:?}");
        log.push_line(String::from(match plan.target {
            Target::Opponent => "The adversary levels the barrel at you...",
            Target::Oneself => "The adversary turns the barrel on itself...",
        }));
        self.plan = Some(plan);
        Some(plan)
    }

    /// Fire the pending plan, planning first if none exists.
    pub fn execute_adversary_plan(&mut self, log: &mut impl DuelLog) -> Shot {
        if self.is_over() {
            log.push_line(String::from("The duel is already over."));
            return Shot::void(Actor::Adversary, Actor::Player);
        }
        let plan = match self.plan {
            Some(plan) => plan,
            None => {
                log::warn!("adversary executed without a plan; planning now");
                let mut scratch: Vec<String> = Vec::new();
                match self.plan_adversary_turn(&mut scratch) {
                    Some(plan) => plan,
                    None => return Shot::void(Actor::Adversary, Actor::Player),
                }
            }
        };
        self.plan = None;
        let round = self.chamber.draw(&mut self.rng);
        debug_assert_eq!(round, plan.round, "adversary drew a round it did not commit to");
        self.resolve_shot(Actor::Adversary, plan.target, round, log)
    }
}

fn shot_line(shooter: Actor, victim: Actor, round: RoundKind) -> String {
    let line = match (shooter, victim == shooter, round) {
        (Actor::Player, false, RoundKind::Live) => {
            "You fire at the adversary. Live round! The adversary takes 1 damage."
        }
        (Actor::Player, false, RoundKind::Blank) => {
            "You fire at the adversary, but it was only a blank..."
        }
        (Actor::Player, true, RoundKind::Live) => {
            "You fire at yourself... a live round! You lose 1 HP."
        }
        (Actor::Player, true, RoundKind::Blank) => {
            "You fire at yourself. A blank! Your turn continues."
        }
        (Actor::Adversary, false, RoundKind::Live) => {
            "The adversary pulls the trigger on you! Live round! You lose 1 HP."
        }
        (Actor::Adversary, false, RoundKind::Blank) => {
            "The adversary pulls the trigger on you! A blank... no harm done."
        }
        (Actor::Adversary, true, RoundKind::Live) => {
            "The adversary pulls the trigger on itself! Live round! The adversary loses 1 HP."
        }
        (Actor::Adversary, true, RoundKind::Blank) => {
            "The adversary pulls the trigger on itself! A blank. It may act again."
        }
    };
    String::from(line)
}
