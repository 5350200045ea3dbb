use std::fmt;
use std::str::FromStr;

use anyhow::{Error, bail};
use evening_duel::{DuelSnapshot, ItemKind, Lookahead, Target};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// What the player does with one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Fire(Target),
    UseItem(ItemKind),
}

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub action: PlayerAction,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(action: PlayerAction, rationale: Option<String>) -> Self {
        Self { action, rationale }
    }

    fn fire(target: Target, rationale: &str) -> Self {
        Self::new(PlayerAction::Fire(target), Some(rationale.to_string()))
    }

    fn item(kind: ItemKind, rationale: &str) -> Self {
        Self::new(PlayerAction::UseItem(kind), Some(rationale.to_string()))
    }
}

/// Policy interface for automated duel play.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Pick the next player action. `items_allowed` is false once the per-turn item cap is hit.
    fn choose(&mut self, view: &DuelSnapshot, items_allowed: bool) -> PolicyDecision;
}

/// Built-in player strategies for automated duels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Cautious,
    Odds,
    Tactician,
    Gambler,
}

impl Strategy {
    pub const ALL: [Self; 4] = [Self::Cautious, Self::Odds, Self::Tactician, Self::Gambler];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Cautious => "Cautious",
            Strategy::Odds => "Odds",
            Strategy::Tactician => "Tactician",
            Strategy::Gambler => "Gambler",
        }
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Strategy::Cautious => "cautious",
            Strategy::Odds => "odds",
            Strategy::Tactician => "tactician",
            Strategy::Gambler => "gambler",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Strategy::Cautious => "Always fires at the adversary",
            Strategy::Odds => "Fires at itself when blanks are the majority",
            Strategy::Tactician => "Peeks, heals, skips and reloads before committing",
            Strategy::Gambler => "Random targets and items from a seeded stream",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Strategy::Cautious => Box::new(CautiousPolicy),
            Strategy::Odds => Box::new(OddsPolicy),
            Strategy::Tactician => Box::new(TacticianPolicy),
            Strategy::Gambler => Box::new(GamblerPolicy::new(seed)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim().to_ascii_lowercase();
        match Strategy::ALL.into_iter().find(|s| s.key() == key) {
            Some(strategy) => Ok(strategy),
            None => bail!("Unknown strategy: {raw}"),
        }
    }
}

/// Expand strategy tokens; `all` selects every strategy. Duplicates keep their first position.
pub fn resolve_strategies(tokens: &[String]) -> anyhow::Result<Vec<Strategy>> {
    let mut resolved: Vec<Strategy> = Vec::new();
    for token in tokens {
        let expanded: Vec<Strategy> = if token.eq_ignore_ascii_case("all") {
            Strategy::ALL.to_vec()
        } else {
            vec![token.parse()?]
        };
        for strategy in expanded {
            if !resolved.contains(&strategy) {
                resolved.push(strategy);
            }
        }
    }
    if resolved.is_empty() {
        resolved.extend(Strategy::ALL);
    }
    Ok(resolved)
}

struct CautiousPolicy;
struct OddsPolicy;
struct TacticianPolicy;

struct GamblerPolicy {
    rng: ChaCha20Rng,
    item_chance: f64,
}

impl GamblerPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            item_chance: 0.25,
        }
    }
}

impl PlayerPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn choose(&mut self, _view: &DuelSnapshot, _items_allowed: bool) -> PolicyDecision {
        PolicyDecision::fire(Target::Opponent, "always shoot the adversary")
    }
}

impl PlayerPolicy for OddsPolicy {
    fn name(&self) -> &'static str {
        "Odds"
    }

    fn choose(&mut self, view: &DuelSnapshot, _items_allowed: bool) -> PolicyDecision {
        odds_decision(view)
    }
}

impl PlayerPolicy for TacticianPolicy {
    fn name(&self) -> &'static str {
        "Tactician"
    }

    fn choose(&mut self, view: &DuelSnapshot, items_allowed: bool) -> PolicyDecision {
        if items_allowed && let Some(decision) = tactician_item(view) {
            return decision;
        }
        odds_decision(view)
    }
}

impl PlayerPolicy for GamblerPolicy {
    fn name(&self) -> &'static str {
        "Gambler"
    }

    fn choose(&mut self, view: &DuelSnapshot, items_allowed: bool) -> PolicyDecision {
        if items_allowed && self.rng.gen_bool(self.item_chance) {
            let held: Vec<ItemKind> = ItemKind::ALL
                .into_iter()
                .filter(|kind| view.inventory.count(*kind) > 0)
                .collect();
            if !held.is_empty() {
                let kind = held[self.rng.gen_range(0..held.len())];
                return PolicyDecision::item(kind, "feeling lucky");
            }
        }
        if self.rng.gen_bool(0.5) {
            PolicyDecision::fire(Target::Opponent, "coin flip: adversary")
        } else {
            PolicyDecision::fire(Target::Oneself, "coin flip: self")
        }
    }
}

fn odds_decision(view: &DuelSnapshot) -> PolicyDecision {
    match view.lookahead {
        Lookahead::Live => PolicyDecision::fire(Target::Opponent, "known live round"),
        Lookahead::Blank => PolicyDecision::fire(Target::Oneself, "known blank"),
        Lookahead::Empty if view.blank > view.live => {
            PolicyDecision::fire(Target::Oneself, "blanks are the majority")
        }
        Lookahead::Empty => PolicyDecision::fire(Target::Opponent, "live rounds hold the odds"),
    }
}

fn tactician_item(view: &DuelSnapshot) -> Option<PolicyDecision> {
    let inventory = &view.inventory;
    if view.player_hp <= 2 && inventory.heal > 0 {
        return Some(PolicyDecision::item(ItemKind::Heal, "patch up before the next shot"));
    }
    if view.adversary_hp <= 1 && inventory.skip > 0 && !view.adversary_skip {
        return Some(PolicyDecision::item(ItemKind::Skip, "deny the adversary a reply"));
    }
    if view.lookahead == Lookahead::Empty
        && view.live > view.blank.saturating_add(1)
        && inventory.reload > 0
    {
        return Some(PolicyDecision::item(ItemKind::Reload, "chamber is live-heavy"));
    }
    if view.lookahead == Lookahead::Empty && view.live > 0 && view.blank > 0 && inventory.peek > 0
    {
        return Some(PolicyDecision::item(ItemKind::Peek, "check before committing"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use evening_duel::{Duel, Inventory, PlayerStats, ScriptedRolls};

    fn view(live_roll: u32) -> DuelSnapshot {
        let stats = PlayerStats::new(8, 1, 7, 6);
        Duel::new(stats, ScriptedRolls::new([live_roll])).snapshot()
    }

    #[test]
    fn strategies_parse_from_keys() {
        assert_eq!("tactician".parse::<Strategy>().unwrap(), Strategy::Tactician);
        assert_eq!(" Odds ".parse::<Strategy>().unwrap(), Strategy::Odds);
        assert!("reckless".parse::<Strategy>().is_err());
    }

    #[test]
    fn resolve_strategies_expands_all_and_dedupes() {
        let tokens = vec!["odds".to_string(), "all".to_string()];
        let resolved = resolve_strategies(&tokens).unwrap();
        assert_eq!(
            resolved,
            vec![
                Strategy::Odds,
                Strategy::Cautious,
                Strategy::Tactician,
                Strategy::Gambler
            ]
        );
        assert_eq!(resolve_strategies(&[]).unwrap().len(), 4);
    }

    #[test]
    fn cautious_always_targets_adversary() {
        let mut policy = Strategy::Cautious.create_policy(1);
        let decision = policy.choose(&view(4), true);
        assert_eq!(decision.action, PlayerAction::Fire(Target::Opponent));
    }

    #[test]
    fn odds_follows_majority_and_known_rounds() {
        let mut policy = Strategy::Odds.create_policy(1);
        // 1 live / 5 blank
        assert_eq!(
            policy.choose(&view(0), true).action,
            PlayerAction::Fire(Target::Oneself)
        );
        // 5 live / 1 blank
        assert_eq!(
            policy.choose(&view(4), true).action,
            PlayerAction::Fire(Target::Opponent)
        );
        let mut known = view(0);
        known.lookahead = Lookahead::Live;
        assert_eq!(
            policy.choose(&known, true).action,
            PlayerAction::Fire(Target::Opponent)
        );
    }

    #[test]
    fn tactician_prefers_items_when_allowed() {
        let mut policy = Strategy::Tactician.create_policy(1);
        let mut snapshot = view(2);
        snapshot.inventory = Inventory {
            peek: 1,
            ..Inventory::default()
        };
        assert_eq!(
            policy.choose(&snapshot, true).action,
            PlayerAction::UseItem(ItemKind::Peek)
        );
        assert!(matches!(
            policy.choose(&snapshot, false).action,
            PlayerAction::Fire(_)
        ));

        snapshot.player_hp = 1;
        snapshot.inventory.heal = 1;
        assert_eq!(
            policy.choose(&snapshot, true).action,
            PlayerAction::UseItem(ItemKind::Heal)
        );
    }

    #[test]
    fn gambler_only_uses_held_items() {
        let mut policy = Strategy::Gambler.create_policy(9);
        let snapshot = view(2);
        for _ in 0..64 {
            let decision = policy.choose(&snapshot, true);
            assert!(matches!(decision.action, PlayerAction::Fire(_)));
        }
    }

    #[test]
    fn gambler_is_deterministic_per_seed() {
        let snapshot = view(2);
        let run = |seed| {
            let mut policy = Strategy::Gambler.create_policy(seed);
            (0..16)
                .map(|_| policy.choose(&snapshot, true).action)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }
}
