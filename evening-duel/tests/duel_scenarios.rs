use evening_duel::{
    Actor, Duel, DuelConfig, DuelOutcome, DuelRng, ItemKind, Lookahead, PlannerPhase, PlayerStats,
    RoundKind, ScriptedRolls, Target, TurnResult,
};

const MAX_TURNS: usize = 200;

fn assert_consistent(duel: &Duel<DuelRng>) {
    assert!(duel.player_hp() <= 5);
    assert!(duel.adversary_hp() <= 5);
    assert!(duel.remaining() <= 6);
    if let Some(plan) = duel.plan() {
        assert_eq!(duel.lookahead().known(), Some(plan.round));
    }
    if let Some(kind) = duel.lookahead().known() {
        match kind {
            RoundKind::Live => assert!(duel.live_count() > 0),
            RoundKind::Blank => assert!(duel.blank_count() > 0),
        }
    }
}

/// Plays a full duel where the player always shoots the adversary.
fn play_out(seed: u64, stats: PlayerStats) -> (Duel<DuelRng>, Vec<String>) {
    let mut duel = Duel::new(stats, DuelRng::from_user_seed(seed));
    let mut log: Vec<String> = Vec::new();
    let mut actor = Actor::Player;
    for _ in 0..MAX_TURNS {
        if duel.is_over() {
            break;
        }
        if duel.needs_reload() {
            duel.reload(&mut log);
        }
        let shot = match actor {
            Actor::Player => duel.fire_at_opponent(Actor::Player, &mut log),
            Actor::Adversary => {
                if duel.consume_adversary_skip(&mut log) {
                    actor = Actor::Player;
                    continue;
                }
                let plan = duel.plan_adversary_turn(&mut log).expect("duel still running");
                assert_eq!(duel.planner_phase(), PlannerPhase::Planned);
                assert_consistent(&duel);
                let shot = duel.execute_adversary_plan(&mut log);
                assert_eq!(shot.round, Some(plan.round));
                assert_eq!(shot.target, Actor::Adversary.resolve(plan.target));
                shot
            }
        };
        assert_consistent(&duel);
        if shot.turn == TurnResult::End {
            actor = actor.opponent();
        }
    }
    (duel, log)
}

#[test]
fn seeded_duels_finish_with_consistent_state() {
    for seed in 0..150 {
        let (duel, log) = play_out(seed, PlayerStats::default());
        assert!(duel.is_over(), "seed {seed} did not finish");
        let outcome = duel.outcome().expect("finished duel has an outcome");
        assert_ne!(outcome, DuelOutcome::Draw, "one shot never hits both sides");
        assert!(!log.is_empty());
        assert_eq!(duel.planner_phase(), PlannerPhase::Idle);
    }
}

#[test]
fn identical_seeds_replay_identically() {
    let stats = PlayerStats::new(6, 8, 3, 5);
    let (left, left_log) = play_out(77, stats);
    let (right, right_log) = play_out(77, stats);
    assert_eq!(left.snapshot(), right.snapshot());
    assert_eq!(left_log, right_log);
}

#[test]
fn resolve_drives_item_grant() {
    for (resolve, expected) in [(1, 0), (3, 1), (5, 2), (7, 3), (10, 4)] {
        let stats = PlayerStats::new(8, resolve, 7, 6);
        let duel = Duel::new(stats, DuelRng::from_user_seed(5));
        assert_eq!(duel.inventory().total(), expected, "resolve {resolve}");
    }
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = DuelConfig {
        max_live: 6,
        ..DuelConfig::default()
    };
    let result = Duel::with_config(PlayerStats::default(), cfg, DuelRng::from_user_seed(1));
    assert!(result.is_err());
}

#[test]
fn skip_item_cancels_exactly_one_adversary_turn() {
    // Reload to 3/3, then grant one Skip (resolve 3 -> one item, pick 0).
    let stats = PlayerStats::new(8, 3, 7, 6);
    let mut duel = Duel::new(stats, ScriptedRolls::new([2, 0]));
    assert_eq!(duel.item_count(ItemKind::Skip), 1);
    let mut log: Vec<String> = Vec::new();
    duel.use_item(ItemKind::Skip, &mut log).expect("skip available");
    assert!(duel.consume_adversary_skip(&mut log));
    assert!(!duel.consume_adversary_skip(&mut log));
    assert_eq!(log.len(), 2);
}

#[test]
fn insight_seven_blank_preview_aims_at_player_below_fifty_one() {
    let stats = PlayerStats::new(8, 1, 7, 6);
    let mut duel = Duel::new(stats, ScriptedRolls::new([2, 3, 50]));
    let plan = duel
        .plan_adversary_turn(&mut Vec::<String>::new())
        .expect("duel still running");
    assert_eq!(plan.round, RoundKind::Blank);
    assert_eq!(plan.target, Target::Opponent);
    assert_eq!(duel.lookahead(), Lookahead::Blank);
}
