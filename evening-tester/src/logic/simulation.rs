use evening_duel::{
    Actor, Duel, DuelOutcome, DuelRng, ItemEffect, ItemKind, Plan, PlayerStats, RoundKind, Shot,
    Target,
};
use serde::{Deserialize, Serialize};

use crate::logic::policy::{PlayerAction, PlayerPolicy, PolicyDecision, Strategy};

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: Strategy,
    pub stats: PlayerStats,
    pub max_turns: u32,
    /// Items the player may spend per turn; `None` is unlimited.
    pub item_cap: Option<u32>,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: Strategy, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            stats: PlayerStats::default(),
            max_turns: 200,
            item_cap: None,
        }
    }

    #[must_use]
    pub fn with_stats(mut self, stats: PlayerStats) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub fn with_item_cap(mut self, item_cap: Option<u32>) -> Self {
        self.item_cap = item_cap;
        self
    }
}

/// What happened in one conducted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnAction {
    Reload { live: u8, blank: u8 },
    PlayerFire { target: Target },
    PlayerItem { item: ItemKind, effect: ItemEffect },
    AdversarySkipped,
    AdversaryFire { plan: Plan },
}

/// Snapshot of a resolved action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub actor: Actor,
    pub action: TurnAction,
    pub round: Option<RoundKind>,
    pub player_hp: u8,
    pub adversary_hp: u8,
    pub rationale: Option<String>,
}

/// Headless turn conductor around one [`Duel`].
///
/// The engine never sequences turns itself; this session plays the controller
/// role: reload on demand, consume the adversary's skip, plan then execute,
/// and hand the turn over whenever a shot ends it.
pub struct DuelSession {
    duel: Duel<DuelRng>,
    max_turns: u32,
    item_cap: Option<u32>,
    turn: u32,
    actor: Actor,
    items_this_turn: u32,
    items_used: u32,
    shots: u32,
    pending_peek: Option<RoundKind>,
    records: Vec<TurnRecord>,
    log: Vec<String>,
    violations: Vec<String>,
}

impl DuelSession {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        log::debug!(
            "session start: {} seed {} stats {:?}",
            config.strategy.key(),
            config.seed,
            config.stats
        );
        let duel = Duel::new(config.stats, DuelRng::from_user_seed(config.seed));
        Self {
            duel,
            max_turns: config.max_turns,
            item_cap: config.item_cap,
            turn: 1,
            actor: Actor::Player,
            items_this_turn: 0,
            items_used: 0,
            shots: 0,
            pending_peek: None,
            records: Vec::new(),
            log: Vec::new(),
            violations: Vec::new(),
        }
    }

    #[must_use]
    pub fn duel(&self) -> &Duel<DuelRng> {
        &self.duel
    }

    #[must_use]
    pub fn records(&self) -> &[TurnRecord] {
        &self.records
    }

    /// Narrative lines produced by the engine, in order.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Peek/draw or plan/draw disagreements observed so far.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn shots(&self) -> u32 {
        self.shots
    }

    #[must_use]
    pub fn items_used(&self) -> u32 {
        self.items_used
    }

    #[must_use]
    pub fn outcome(&self) -> Option<DuelOutcome> {
        self.duel.outcome()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.duel.is_over() || self.turn > self.max_turns
    }

    /// Play until the duel ends or the turn limit is reached.
    pub fn run(&mut self, policy: &mut dyn PlayerPolicy) {
        while self.advance(policy).is_some() {}
    }

    /// Resolve one action. Returns `None` once the session is finished.
    pub fn advance(&mut self, policy: &mut dyn PlayerPolicy) -> Option<TurnRecord> {
        if self.is_finished() {
            return None;
        }
        let record = if self.duel.needs_reload() {
            self.reload()
        } else {
            match self.actor {
                Actor::Player => self.player_action(policy),
                Actor::Adversary => self.adversary_action(),
            }
        };
        self.records.push(record.clone());
        Some(record)
    }

    fn reload(&mut self) -> TurnRecord {
        self.duel.reload(&mut self.log);
        self.pending_peek = None;
        let action = TurnAction::Reload {
            live: self.duel.live_count(),
            blank: self.duel.blank_count(),
        };
        self.record(self.actor, action, None, None)
    }

    fn player_action(&mut self, policy: &mut dyn PlayerPolicy) -> TurnRecord {
        let items_allowed = self.item_cap.is_none_or(|cap| self.items_this_turn < cap);
        let PolicyDecision { action, rationale } =
            policy.choose(&self.duel.snapshot(), items_allowed);

        match action {
            PlayerAction::UseItem(item) if items_allowed => {
                match self.duel.use_item(item, &mut self.log) {
                    Ok(effect) => {
                        self.items_this_turn += 1;
                        self.items_used += 1;
                        match effect {
                            ItemEffect::Peeked(kind) => self.pending_peek = Some(kind),
                            ItemEffect::Reloaded { .. } => self.pending_peek = None,
                            ItemEffect::SkipArmed | ItemEffect::Healed { .. } => {}
                        }
                        let action = TurnAction::PlayerItem { item, effect };
                        self.record(Actor::Player, action, None, rationale)
                    }
                    Err(err) => {
                        log::debug!("{} policy asked for a missing item: {err}", policy.name());
                        let fallback = format!("{err}; firing at the adversary instead");
                        self.player_fire(Target::Opponent, Some(fallback))
                    }
                }
            }
            PlayerAction::UseItem(item) => {
                let fallback = format!("item cap reached before {item}; firing at the adversary");
                self.player_fire(Target::Opponent, Some(fallback))
            }
            PlayerAction::Fire(target) => self.player_fire(target, rationale),
        }
    }

    fn player_fire(&mut self, target: Target, rationale: Option<String>) -> TurnRecord {
        let shot = match target {
            Target::Opponent => self.duel.fire_at_opponent(Actor::Player, &mut self.log),
            Target::Oneself => self.duel.fire_at_self(Actor::Player, &mut self.log),
        };
        self.audit_peek(&shot);
        let record = self.record(
            Actor::Player,
            TurnAction::PlayerFire { target },
            shot.round,
            rationale,
        );
        self.finish_shot(&shot);
        record
    }

    fn adversary_action(&mut self) -> TurnRecord {
        if self.duel.consume_adversary_skip(&mut self.log) {
            let record = self.record(Actor::Adversary, TurnAction::AdversarySkipped, None, None);
            self.pass_turn();
            return record;
        }

        let plan = self.duel.plan_adversary_turn(&mut self.log);
        if let (Some(plan), Some(peeked)) = (plan, self.pending_peek)
            && plan.round != peeked
        {
            self.violations.push(format!(
                "turn {}: adversary planned a {} after the player peeked a {}",
                self.turn, plan.round, peeked
            ));
        }

        let shot = self.duel.execute_adversary_plan(&mut self.log);
        if let Some(plan) = plan
            && shot.round != Some(plan.round)
        {
            self.violations.push(format!(
                "turn {}: adversary committed to a {} but drew {:?}",
                self.turn, plan.round, shot.round
            ));
        }
        self.pending_peek = None;

        let record = match plan {
            Some(plan) => self.record(
                Actor::Adversary,
                TurnAction::AdversaryFire { plan },
                shot.round,
                None,
            ),
            None => self.record(Actor::Adversary, TurnAction::AdversarySkipped, None, None),
        };
        self.finish_shot(&shot);
        record
    }

    fn audit_peek(&mut self, shot: &Shot) {
        if let Some(peeked) = self.pending_peek.take()
            && shot.round.is_some_and(|round| round != peeked)
        {
            self.violations.push(format!(
                "turn {}: peeked a {} but drew {:?}",
                self.turn, peeked, shot.round
            ));
        }
    }

    fn finish_shot(&mut self, shot: &Shot) {
        if shot.round.is_some() {
            self.shots += 1;
        }
        if !shot.keeps_turn() {
            self.pass_turn();
        }
    }

    fn pass_turn(&mut self) {
        self.actor = self.actor.opponent();
        self.items_this_turn = 0;
        if self.actor == Actor::Player {
            self.turn += 1;
        }
    }

    fn record(
        &self,
        actor: Actor,
        action: TurnAction,
        round: Option<RoundKind>,
        rationale: Option<String>,
    ) -> TurnRecord {
        TurnRecord {
            turn: self.turn,
            actor,
            action,
            round,
            player_hp: self.duel.player_hp(),
            adversary_hp: self.duel.adversary_hp(),
            rationale,
        }
    }
}
