use anyhow::{Result, ensure};
use colored::Colorize;
use evening_duel::{DuelOutcome, PlayerStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::logic::policy::Strategy;
use crate::logic::simulation::{DuelSession, SimulationConfig};

/// One conducted duel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelRecord {
    pub strategy: Strategy,
    pub seed: u64,
    pub iteration: usize,
    /// `None` when the turn limit was hit first.
    pub outcome: Option<DuelOutcome>,
    pub turns: u32,
    pub shots: u32,
    pub items_used: u32,
    /// Conducted actions, reloads and item uses included.
    pub actions: usize,
    pub player_hp: u8,
    pub adversary_hp: u8,
    pub violations: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

impl DuelRecord {
    #[must_use]
    pub fn outcome_label(&self) -> &'static str {
        match self.outcome {
            Some(DuelOutcome::Victory) => "victory",
            Some(DuelOutcome::Defeat) => "defeat",
            Some(DuelOutcome::Draw) => "draw",
            None => "timeout",
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Per-strategy summary over every seed and iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAggregate {
    pub strategy: Strategy,
    pub duels: usize,
    pub wins: usize,
    pub losses: usize,
    pub unfinished: usize,
    pub win_rate: f64,
    pub loss_rate: f64,
    pub mean_turns: f64,
    pub mean_shots: f64,
    pub items_used: u64,
    pub mean_player_hp: f64,
    pub violations: usize,
}

/// Runs strategy sweeps over seeds.
pub struct DuelTester {
    stats: PlayerStats,
    max_turns: u32,
    item_cap: Option<u32>,
    verbose: bool,
}

impl DuelTester {
    #[must_use]
    pub const fn new(stats: PlayerStats, verbose: bool) -> Self {
        Self {
            stats,
            max_turns: 200,
            item_cap: None,
            verbose,
        }
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub const fn with_item_cap(mut self, item_cap: Option<u32>) -> Self {
        self.item_cap = item_cap;
        self
    }

    /// Play `iterations` duels for every strategy and seed.
    #[must_use]
    pub fn run(&self, strategies: &[Strategy], seeds: &[u64], iterations: usize) -> Vec<DuelRecord> {
        let mut records = Vec::with_capacity(strategies.len() * seeds.len() * iterations);
        for &strategy in strategies {
            if self.verbose {
                println!("🧪 Testing strategy: {}", strategy.label().bright_white());
            }
            for &seed in seeds {
                for iteration in 0..iterations {
                    let iteration_seed =
                        seed.wrapping_add(u64::try_from(iteration).unwrap_or(u64::MAX));
                    let record = self.run_single(strategy, iteration_seed, iteration);
                    if self.verbose {
                        self.announce(&record);
                    }
                    records.push(record);
                }
            }
        }
        records
    }

    /// Play one duel.
    #[must_use]
    pub fn run_single(&self, strategy: Strategy, seed: u64, iteration: usize) -> DuelRecord {
        let start = Instant::now();
        let config = SimulationConfig::new(strategy, seed)
            .with_stats(self.stats)
            .with_max_turns(self.max_turns)
            .with_item_cap(self.item_cap);
        let mut session = DuelSession::new(config);
        let mut policy = strategy.create_policy(seed);
        session.run(policy.as_mut());

        let duel = session.duel();
        for line in session.log() {
            log::trace!("[{} seed {seed}] {line}", strategy.key());
        }
        log::debug!(
            "{} seed {seed}: {:?} after {} turns",
            strategy.key(),
            session.outcome(),
            session.turn()
        );
        DuelRecord {
            strategy,
            seed,
            iteration,
            outcome: session.outcome(),
            turns: session.turn(),
            shots: session.shots(),
            items_used: session.items_used(),
            actions: session.records().len(),
            player_hp: duel.player_hp(),
            adversary_hp: duel.adversary_hp(),
            violations: session.violations().to_vec(),
            duration: start.elapsed(),
        }
    }

    fn announce(&self, record: &DuelRecord) {
        if record.passed() {
            println!(
                "  ✅ seed {} -> {} in {} turns ({} shots, {} items)",
                record.seed,
                record.outcome_label(),
                record.turns,
                record.shots,
                record.items_used
            );
        } else {
            println!(
                "  ❌ seed {} -> {}: {}",
                record.seed,
                record.outcome_label(),
                record.violations.join(" | ").red()
            );
        }
    }
}

/// Summarise records per strategy, ordered by strategy.
#[must_use]
pub fn aggregate_records(records: &[DuelRecord]) -> Vec<StrategyAggregate> {
    let mut grouped: BTreeMap<Strategy, Vec<&DuelRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.strategy).or_default().push(record);
    }
    grouped
        .into_iter()
        .map(|(strategy, group)| summarize(strategy, &group))
        .collect()
}

fn summarize(strategy: Strategy, group: &[&DuelRecord]) -> StrategyAggregate {
    let duels = group.len();
    let count = |outcome: Option<DuelOutcome>| group.iter().filter(|r| r.outcome == outcome).count();
    let wins = count(Some(DuelOutcome::Victory));
    let losses = count(Some(DuelOutcome::Defeat));
    let unfinished = count(None);
    let mean = |f: fn(&DuelRecord) -> f64| {
        if duels == 0 {
            0.0
        } else {
            group.iter().map(|r| f(r)).sum::<f64>() / ratio_denominator(duels)
        }
    };
    StrategyAggregate {
        strategy,
        duels,
        wins,
        losses,
        unfinished,
        win_rate: rate(wins, duels),
        loss_rate: rate(losses, duels),
        mean_turns: mean(|r| f64::from(r.turns)),
        mean_shots: mean(|r| f64::from(r.shots)),
        items_used: group.iter().map(|r| u64::from(r.items_used)).sum(),
        mean_player_hp: mean(|r| f64::from(r.player_hp)),
        violations: group.iter().map(|r| r.violations.len()).sum(),
    }
}

fn ratio_denominator(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

fn rate(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        ratio_denominator(hits) / ratio_denominator(total)
    }
}

/// Fail when any duel broke the lookahead contract.
pub fn validate_records(records: &[DuelRecord]) -> Result<()> {
    for record in records {
        ensure!(
            record.passed(),
            "Lookahead contract violated for strategy {} seed {}: {}",
            record.strategy,
            record.seed,
            record.violations.join(" | ")
        );
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
