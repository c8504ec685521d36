//! Tests for the turn-resolution state machine.

use mischief::{
    AvatarId, Board, EngineError, Language, Player, ScriptedOracle, SpaceKind, SpaceOutcome,
    TurnEngine, TurnPhase,
};

/// Builds a player at an arbitrary position for scenario setup.
fn player(id: usize, position: usize) -> Player {
    Player {
        id,
        name: format!("Player {}", id),
        age: 10,
        avatar: AvatarId::Robot,
        position,
        skip_next_turn: false,
    }
}

fn engine_with(players: Vec<Player>) -> TurnEngine {
    TurnEngine::new(players, Board::standard(), Language::En)
}

fn fixed_oracle() -> ScriptedOracle {
    ScriptedOracle::Fixed("Hop on one foot for ten seconds!".to_string())
}

#[test]
fn movement_clamps_to_last_index_for_every_position_and_roll() {
    let last = Board::standard().last_index();
    for position in 0..=last {
        for roll in 1..=6u8 {
            let mut engine = engine_with(vec![player(0, position), player(1, 0)]);
            engine.roll(roll).expect("valid roll");
            let destination = engine.apply_move().expect("valid move");
            assert_eq!(destination, (position + roll as usize).min(last));
        }
    }
}

#[test]
fn out_of_range_rolls_are_rejected_not_clamped() {
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    assert_eq!(engine.roll(0), Err(EngineError::RollOutOfRange(0)));
    assert_eq!(engine.roll(7), Err(EngineError::RollOutOfRange(7)));
    // Rejection leaves the phase untouched.
    assert_eq!(engine.phase(), TurnPhase::AwaitingRoll);
    assert!(engine.roll(6).is_ok());
}

#[test]
fn phase_misuse_fails_loudly() {
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    assert!(matches!(engine.apply_move(), Err(EngineError::Phase { .. })));
    assert!(matches!(engine.finish_turn(), Err(EngineError::Phase { .. })));

    engine.roll(3).unwrap();
    // Rolling twice is a contract violation.
    assert!(matches!(engine.roll(3), Err(EngineError::Phase { .. })));
}

#[tokio::test]
async fn turn_advancement_is_fair_without_skips() {
    // Four players, all at Start; a roll of 1 lands on a Challenge space.
    let mut engine = engine_with((0..4).map(|id| player(id, 0)).collect());
    let oracle = fixed_oracle();

    for expected_next in [1, 2, 3, 0] {
        let report = engine.take_turn(1, &oracle).await.expect("turn");
        assert_eq!(report.next_player, Some(expected_next));
        assert_eq!(engine.current_player().id, expected_next);
    }
}

#[tokio::test]
async fn skip_flag_is_consumed_and_player_passed_over() {
    // Player 1 is flagged; advancing from player 0 must yield player 2
    // with player 1's flag cleared.
    let mut players: Vec<Player> = (0..4).map(|id| player(id, 0)).collect();
    players[1].skip_next_turn = true;
    let mut engine = engine_with(players);
    let oracle = fixed_oracle();

    let report = engine.take_turn(1, &oracle).await.expect("turn");
    assert_eq!(report.next_player, Some(2));
    assert!(!engine.players()[1].skip_next_turn);
}

#[tokio::test]
async fn all_skip_guard_terminates_and_play_resumes() {
    let mut players: Vec<Player> = (0..4).map(|id| player(id, 0)).collect();
    for p in &mut players {
        p.skip_next_turn = true;
    }
    let mut engine = engine_with(players);
    let oracle = fixed_oracle();

    // Does not loop forever; the first candidate's flag was consumed, so
    // play resumes there.
    let report = engine.take_turn(1, &oracle).await.expect("turn");
    assert_eq!(report.next_player, Some(1));
    assert!(!engine.players()[1].skip_next_turn);
    assert!(engine.players().iter().all(|p| !p.skip_next_turn));
}

#[tokio::test]
async fn reward_roll_again_keeps_the_same_player() {
    // Space 14 is the third Reward space and binds RollAgain.
    let mut engine = engine_with(vec![player(0, 11), player(1, 0)]);
    let oracle = fixed_oracle();

    let report = engine.take_turn(3, &oracle).await.expect("turn");
    assert!(report.roll_again);
    assert_eq!(report.next_player, None);
    assert_eq!(engine.current_player().id, 0);
    assert_eq!(engine.phase(), TurnPhase::AwaitingRoll);

    // The same player rolls again and the turn then passes normally.
    let report = engine.take_turn(6, &oracle).await.expect("turn");
    assert_eq!(report.player, 0);
    // 14 + 6 = 20, the fourth Reward space: Move(+1).
    assert_eq!(report.position, 21);
    assert_eq!(report.next_player, Some(1));
}

#[tokio::test]
async fn penalty_moves_back_without_going_negative() {
    // Space 5 is the first Penalty space: Move(-2).
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    let oracle = fixed_oracle();

    let report = engine.take_turn(5, &oracle).await.expect("turn");
    match report.outcome {
        SpaceOutcome::Effect { kind, delta, .. } => {
            assert_eq!(kind, SpaceKind::Penalty);
            assert_eq!(delta.position, Some(3));
        }
        other => panic!("expected penalty effect, got {:?}", other),
    }
    assert_eq!(engine.players()[0].position, 3);
}

#[tokio::test]
async fn penalty_sets_skip_flag() {
    // Space 11 is the second Penalty space: SkipNextTurn.
    let mut engine = engine_with(vec![player(0, 6), player(1, 0)]);
    let oracle = fixed_oracle();

    let report = engine.take_turn(5, &oracle).await.expect("turn");
    match report.outcome {
        SpaceOutcome::Effect { delta, .. } => assert!(delta.skip_next_turn),
        other => panic!("expected penalty effect, got {:?}", other),
    }
    assert!(engine.players()[0].skip_next_turn);
    assert_eq!(report.next_player, Some(1));
}

#[tokio::test]
async fn overshoot_lands_exactly_on_finish_and_wins() {
    let mut engine = engine_with(vec![player(0, 40), player(1, 12)]);
    let oracle = fixed_oracle();

    let report = engine.take_turn(5, &oracle).await.expect("turn");
    assert_eq!(report.position, 42);
    match report.outcome {
        SpaceOutcome::Finished { winner } => assert_eq!(winner.id, 0),
        other => panic!("expected a win, got {:?}", other),
    }
    assert_eq!(engine.winner().map(|w| w.id), Some(0));

    // The engine is frozen after the win.
    assert_eq!(engine.roll(3), Err(EngineError::GameOver));
}

#[tokio::test]
async fn finish_takes_priority_over_space_effects() {
    // Exact landing on the last index wins immediately; the Finish
    // space's category is never resolved as an effect.
    let mut engine = engine_with(vec![player(0, 41), player(1, 0)]);
    let oracle = fixed_oracle();

    let report = engine.take_turn(1, &oracle).await.expect("turn");
    assert!(matches!(report.outcome, SpaceOutcome::Finished { .. }));
}

#[tokio::test]
async fn oracle_failure_degrades_to_fallback_and_turn_completes() {
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);

    // A roll of 1 lands on a Challenge space; the oracle always fails.
    let report = engine
        .take_turn(1, &ScriptedOracle::Failing)
        .await
        .expect("turn must not fail on oracle errors");

    match report.outcome {
        SpaceOutcome::Challenge { text } => {
            assert_eq!(text, Language::En.fallback_request_failed());
        }
        other => panic!("expected challenge, got {:?}", other),
    }
    // The turn passed normally despite the failure.
    assert_eq!(report.next_player, Some(1));
}

#[tokio::test]
async fn challenge_text_comes_from_the_oracle_when_it_succeeds() {
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    let report = engine.take_turn(1, &fixed_oracle()).await.expect("turn");
    match report.outcome {
        SpaceOutcome::Challenge { text } => {
            assert_eq!(text, "Hop on one foot for ten seconds!");
        }
        other => panic!("expected challenge, got {:?}", other),
    }
}

#[test]
fn split_phase_challenge_suspends_the_turn() {
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    engine.roll(1).unwrap();
    engine.apply_move().unwrap();

    let prompt = engine.begin_challenge().expect("challenge space");
    assert_eq!(prompt.age, 10);
    assert_eq!(prompt.language, Language::En);
    // Suspended until the ticket is redeemed.
    assert_eq!(engine.phase(), TurnPhase::ResolvingSpace);
    assert_eq!(engine.begin_challenge(), Err(EngineError::ChallengeAlreadyOpen));

    engine.complete_challenge(prompt.ticket).expect("redeem");
    assert_eq!(engine.phase(), TurnPhase::TurnComplete);
    assert_eq!(engine.finish_turn().unwrap(), 1);
}

#[test]
fn stale_ticket_from_an_earlier_turn_is_rejected() {
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    engine.roll(1).unwrap();
    engine.apply_move().unwrap();
    let prompt = engine.begin_challenge().unwrap();
    engine.complete_challenge(prompt.ticket).unwrap();
    engine.finish_turn().unwrap();

    // The turn advanced; the old ticket no longer matches.
    assert_eq!(
        engine.complete_challenge(prompt.ticket),
        Err(EngineError::StaleChallenge)
    );
}

#[test]
fn ticket_from_another_session_is_rejected() {
    let mut first = engine_with(vec![player(0, 0), player(1, 0)]);
    first.roll(1).unwrap();
    first.apply_move().unwrap();
    let prompt = first.begin_challenge().unwrap();

    // A reset replaces the engine; the response arrives afterwards.
    let mut second = engine_with(vec![player(0, 0), player(1, 0)]);
    second.roll(1).unwrap();
    second.apply_move().unwrap();
    let _ = second.begin_challenge().unwrap();
    assert_eq!(
        second.complete_challenge(prompt.ticket),
        Err(EngineError::StaleChallenge)
    );
}

#[test]
fn begin_challenge_rejects_non_challenge_spaces() {
    // Space 3 is a Reward space.
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    engine.roll(3).unwrap();
    engine.apply_move().unwrap();
    assert_eq!(
        engine.begin_challenge(),
        Err(EngineError::NotAChallengeSpace {
            kind: SpaceKind::Reward
        })
    );
}

#[tokio::test]
async fn positions_stay_on_the_board_for_a_long_scripted_game() {
    let mut engine = engine_with(vec![player(0, 0), player(1, 0)]);
    let oracle = fixed_oracle();
    let last = engine.board().last_index();

    let rolls = [6, 3, 2, 5, 1, 4];
    for (i, roll) in rolls.iter().cycle().take(200).enumerate() {
        if engine.winner().is_some() {
            break;
        }
        engine
            .take_turn(*roll, &oracle)
            .await
            .unwrap_or_else(|e| panic!("turn {} failed: {}", i, e));
        for p in engine.players() {
            assert!(p.position <= last);
        }
    }
    assert!(engine.winner().is_some(), "scripted game must terminate");
}
