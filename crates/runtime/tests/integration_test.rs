use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use janken_core::{
    GameError, GameId, GameMode, GameStatus, MockBackend, Move, MoveSlot, PlayerId,
    ResolutionOutcome, WinnerSelector,
};
use janken_runtime::{
    DecryptionOracle, DecryptionRequest, Event, LifecycleEvent, OracleError, RequestId,
    ResolutionEvent, Runtime, RuntimeConfig, RuntimeError, RuntimeHandle, Topic,
};
use tokio::sync::Notify;
use tokio::time::timeout;

const ALICE: PlayerId = PlayerId::from_low_u64(0xA11CE);
const BOB: PlayerId = PlayerId::from_low_u64(0xB0B);

const WAIT: Duration = Duration::from_secs(5);

/// Oracle that accepts every request and never answers.
struct SilentOracle;

#[async_trait]
impl DecryptionOracle for SilentOracle {
    async fn decrypt(&self, _request: &DecryptionRequest) -> Result<u8, OracleError> {
        std::future::pending().await
    }
}

/// Oracle that rejects every request.
struct BrokenOracle;

#[async_trait]
impl DecryptionOracle for BrokenOracle {
    async fn decrypt(&self, _request: &DecryptionRequest) -> Result<u8, OracleError> {
        Err(OracleError::Unavailable("relayer offline".into()))
    }
}

/// Oracle that fails a fixed number of times, then answers `selector`.
struct FlakyOracle {
    failures_left: AtomicU32,
    selector: u8,
}

#[async_trait]
impl DecryptionOracle for FlakyOracle {
    async fn decrypt(&self, _request: &DecryptionRequest) -> Result<u8, OracleError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(OracleError::Unavailable("relayer timed out".into()));
        }
        Ok(self.selector)
    }
}

/// Oracle whose answers are scripted per request and held until released.
#[derive(Clone, Default)]
struct GatedOracle {
    gates: Arc<Mutex<HashMap<RequestId, Arc<Notify>>>>,
    answers: Arc<Mutex<HashMap<RequestId, u8>>>,
}

impl GatedOracle {
    fn answer(&self, request_id: RequestId, selector: u8) {
        self.answers.lock().unwrap().insert(request_id, selector);
    }

    fn gate(&self, request_id: RequestId) -> Arc<Notify> {
        Arc::clone(self.gates.lock().unwrap().entry(request_id).or_default())
    }

    fn release(&self, request_id: RequestId) {
        self.gate(request_id).notify_one();
    }
}

#[async_trait]
impl DecryptionOracle for GatedOracle {
    async fn decrypt(&self, request: &DecryptionRequest) -> Result<u8, OracleError> {
        self.gate(request.request_id).notified().await;
        let answer = self.answers.lock().unwrap().get(&request.request_id).copied();
        answer.ok_or_else(|| {
            OracleError::Unavailable(format!("no answer scripted for {}", request.request_id))
        })
    }
}

async fn mock_runtime() -> Runtime {
    Runtime::mock(RuntimeConfig::default().with_backend_seed(42))
        .await
        .expect("mock runtime should build")
}

async fn runtime_with_oracle(oracle: impl DecryptionOracle + 'static) -> Runtime {
    Runtime::builder()
        .backend(Arc::new(MockBackend::new(7)))
        .oracle(oracle)
        .build()
        .await
        .expect("runtime should build")
}

/// Creates a two-player game between Alice and Bob and plays both moves.
async fn duel(handle: &RuntimeHandle, alice: Move, bob: Move) -> GameId {
    let game_id = handle
        .create_game(GameMode::TwoPlayer, ALICE)
        .await
        .expect("create");
    handle.join_game(game_id, BOB).await.expect("join");
    handle
        .play_move(game_id, ALICE, alice)
        .await
        .expect("alice moves");
    let receipt = handle.play_move(game_id, BOB, bob).await.expect("bob moves");
    assert!(receipt.ready_to_resolve);
    game_id
}

fn game_error(err: janken_runtime::RuntimeError) -> GameError {
    err.game_error()
        .cloned()
        .unwrap_or_else(|| panic!("expected a game error, got {err}"))
}

#[tokio::test]
async fn rock_beats_scissors_in_a_duel() {
    let runtime = mock_runtime().await;
    let handle = runtime.handle();

    let game_id = duel(&handle, Move::Rock, Move::Scissors).await;
    handle.check_winner(game_id).await.expect("check winner");

    let result = timeout(WAIT, handle.wait_for_result(game_id))
        .await
        .expect("oracle should answer")
        .expect("result");

    assert_eq!(result.winner, Some(ALICE));
    assert!(result.player1_won);
    assert!(!result.is_draw);

    let game = handle.get_game(game_id).await.unwrap();
    assert!(game.is_finished());
    assert_eq!(game.winner(), Some(ALICE));
    assert_eq!(game.status(), GameStatus::Finished);
}

#[tokio::test]
async fn equal_moves_are_a_draw() {
    let runtime = mock_runtime().await;
    let handle = runtime.handle();

    let game_id = duel(&handle, Move::Paper, Move::Paper).await;
    handle.check_winner(game_id).await.unwrap();

    let result = timeout(WAIT, handle.wait_for_result(game_id))
        .await
        .unwrap()
        .unwrap();

    assert!(result.is_draw);
    assert_eq!(result.winner, None);
    let game = handle.get_game(game_id).await.unwrap();
    assert_eq!(game.winner(), Some(PlayerId::ZERO));
}

#[tokio::test]
async fn every_pair_resolves_by_the_cyclic_rule() {
    use strum::IntoEnumIterator;

    let runtime = mock_runtime().await;
    let handle = runtime.handle();

    for alice in Move::iter() {
        for bob in Move::iter() {
            let game_id = duel(&handle, alice, bob).await;
            handle.check_winner(game_id).await.unwrap();
            let result = timeout(WAIT, handle.wait_for_result(game_id))
                .await
                .unwrap()
                .unwrap();

            let expected = match WinnerSelector::from_moves(alice, bob) {
                WinnerSelector::Draw => None,
                WinnerSelector::Player1Wins => Some(ALICE),
                WinnerSelector::Player2Wins => Some(BOB),
            };
            assert_eq!(result.winner, expected, "{alice} vs {bob}");
        }
    }

    assert_eq!(handle.current_game_counter().await.unwrap(), GameId(9));
}

#[tokio::test]
async fn single_player_game_gets_an_immediate_cpu_move() {
    let runtime = mock_runtime().await;
    let handle = runtime.handle();

    let game_id = handle
        .create_game(GameMode::SinglePlayer, ALICE)
        .await
        .unwrap();
    let game = handle.get_game(game_id).await.unwrap();
    assert_eq!(game.player2(), PlayerId::CPU);

    let receipt = handle.play_move(game_id, ALICE, Move::Rock).await.unwrap();
    assert!(receipt.cpu_moved);
    assert!(receipt.ready_to_resolve);
    assert!(handle.get_game(game_id).await.unwrap().move2_submitted());

    handle.check_winner(game_id).await.unwrap();
    let result = timeout(WAIT, handle.wait_for_result(game_id))
        .await
        .unwrap()
        .unwrap();

    let game = handle.get_game(game_id).await.unwrap();
    assert!(game.is_finished());
    let winner = game.winner().unwrap();
    assert!([ALICE, PlayerId::CPU, PlayerId::ZERO].contains(&winner));
    assert_eq!(result.cpu_won, winner == PlayerId::CPU);
}

#[tokio::test]
async fn illegal_joins_are_rejected() {
    let runtime = mock_runtime().await;
    let handle = runtime.handle();

    let duel_id = handle
        .create_game(GameMode::TwoPlayer, ALICE)
        .await
        .unwrap();
    let err = handle.join_game(duel_id, ALICE).await.unwrap_err();
    assert_eq!(
        game_error(err),
        GameError::CannotJoinOwnGame {
            game_id: duel_id,
            player: ALICE,
        }
    );

    let solo_id = handle
        .create_game(GameMode::SinglePlayer, ALICE)
        .await
        .unwrap();
    let err = handle.join_game(solo_id, BOB).await.unwrap_err();
    assert_eq!(game_error(err), GameError::CannotJoinSinglePlayerGame(solo_id));

    let err = handle.join_game(GameId(99), BOB).await.unwrap_err();
    assert_eq!(game_error(err), GameError::GameNotFound(GameId(99)));
}

#[tokio::test]
async fn double_submission_and_early_resolution_are_rejected() {
    let runtime = mock_runtime().await;
    let handle = runtime.handle();

    let game_id = handle
        .create_game(GameMode::TwoPlayer, ALICE)
        .await
        .unwrap();
    handle.join_game(game_id, BOB).await.unwrap();
    handle.play_move(game_id, ALICE, Move::Rock).await.unwrap();

    let err = handle
        .play_move(game_id, ALICE, Move::Paper)
        .await
        .unwrap_err();
    assert_eq!(
        game_error(err),
        GameError::MoveAlreadySubmitted {
            game_id,
            slot: MoveSlot::Move1,
        }
    );

    let err = handle.check_winner(game_id).await.unwrap_err();
    assert_eq!(game_error(err), GameError::MovesNotReady(game_id));
    assert!(handle.pending_resolutions().await.unwrap().is_empty());
}

#[tokio::test]
async fn silent_oracle_leaves_the_game_resolving() {
    let runtime = runtime_with_oracle(SilentOracle).await;
    let handle = runtime.handle();

    let game_id = duel(&handle, Move::Rock, Move::Scissors).await;
    handle.check_winner(game_id).await.unwrap();

    let game = handle.get_game(game_id).await.unwrap();
    assert_eq!(game.status(), GameStatus::Resolving);
    assert!(!game.is_finished());
    assert_eq!(game.winner(), None);
    assert_eq!(handle.pending_resolutions().await.unwrap(), vec![game_id]);

    let err = handle.check_winner(game_id).await.unwrap_err();
    assert_eq!(game_error(err), GameError::GameFinished(game_id));

    assert!(
        timeout(Duration::from_millis(50), handle.wait_for_result(game_id))
            .await
            .is_err()
    );

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn manual_callback_is_idempotent() {
    let runtime = runtime_with_oracle(SilentOracle).await;
    let handle = runtime.handle();

    let game_id = duel(&handle, Move::Scissors, Move::Rock).await;

    let outcome = handle.fulfill_decryption(game_id, 2).await.unwrap();
    assert_eq!(outcome, ResolutionOutcome::NotPending);
    assert!(!handle.get_game(game_id).await.unwrap().is_finished());

    handle.check_winner(game_id).await.unwrap();

    let err = handle.fulfill_decryption(game_id, 7).await.unwrap_err();
    assert_eq!(
        game_error(err),
        GameError::InvalidSelector {
            game_id,
            selector: 7,
        }
    );
    assert_eq!(handle.pending_resolutions().await.unwrap(), vec![game_id]);

    let outcome = handle.fulfill_decryption(game_id, 2).await.unwrap();
    assert_eq!(
        outcome,
        ResolutionOutcome::Finalized {
            selector: WinnerSelector::Player2Wins,
            winner: BOB,
        }
    );

    let outcome = handle.fulfill_decryption(game_id, 0).await.unwrap();
    assert_eq!(outcome, ResolutionOutcome::AlreadyFinished);
    assert_eq!(handle.get_game(game_id).await.unwrap().winner(), Some(BOB));
    assert!(handle.pending_resolutions().await.unwrap().is_empty());
}

#[tokio::test]
async fn oracle_failure_is_published() {
    let runtime = runtime_with_oracle(BrokenOracle).await;
    let handle = runtime.handle();
    let mut resolution = runtime.subscribe(Topic::Resolution);

    let game_id = duel(&handle, Move::Rock, Move::Paper).await;
    let request_id = handle.check_winner(game_id).await.unwrap();

    let requested = resolution.recv().await.unwrap();
    assert_eq!(
        requested,
        Event::Resolution(ResolutionEvent::ResolutionRequested {
            game_id,
            request_id,
        })
    );

    let failed = timeout(WAIT, resolution.recv()).await.unwrap().unwrap();
    match failed {
        Event::Resolution(ResolutionEvent::DecryptionFailed {
            game_id: failed_id,
            request_id: failed_request,
            error,
        }) => {
            assert_eq!(failed_id, game_id);
            assert_eq!(failed_request, request_id);
            assert!(error.contains("relayer offline"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert_eq!(handle.pending_resolutions().await.unwrap(), vec![game_id]);
}

#[tokio::test]
async fn failed_decryption_can_be_retried() {
    let oracle = FlakyOracle {
        failures_left: AtomicU32::new(1),
        selector: WinnerSelector::Player1Wins.value(),
    };
    let runtime = runtime_with_oracle(oracle).await;
    let handle = runtime.handle();
    let mut resolution = handle.subscribe(Topic::Resolution);

    let err = handle.retry_resolution(GameId(42)).await.unwrap_err();
    assert_eq!(game_error(err), GameError::GameNotFound(GameId(42)));

    let game_id = duel(&handle, Move::Rock, Move::Scissors).await;
    let err = handle.retry_resolution(game_id).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NoPendingResolution(id) if id == game_id));

    let first = handle.check_winner(game_id).await.unwrap();
    let failed = loop {
        match timeout(WAIT, resolution.recv()).await.unwrap().unwrap() {
            Event::Resolution(ResolutionEvent::DecryptionFailed { request_id, .. }) => {
                break request_id;
            }
            _ => continue,
        }
    };
    assert_eq!(failed, first);
    assert_eq!(handle.pending_resolutions().await.unwrap(), vec![game_id]);

    let second = handle.retry_resolution(game_id).await.unwrap();
    assert_ne!(second, first);

    let result = timeout(WAIT, handle.wait_for_result(game_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.winner, Some(ALICE));

    let err = handle.retry_resolution(game_id).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NoPendingResolution(_)));
}

#[tokio::test]
async fn superseded_answer_does_not_decide_the_game() {
    let oracle = GatedOracle::default();
    let runtime = runtime_with_oracle(oracle.clone()).await;
    let handle = runtime.handle();

    // Rock beats scissors; the first request is scripted to claim otherwise
    let game_id = duel(&handle, Move::Rock, Move::Scissors).await;
    let first = handle.check_winner(game_id).await.unwrap();
    oracle.answer(first, WinnerSelector::Player2Wins.value());

    let second = handle.retry_resolution(game_id).await.unwrap();
    oracle.answer(second, WinnerSelector::Player1Wins.value());

    oracle.release(first);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let game = handle.get_game(game_id).await.unwrap();
    assert_eq!(game.status(), GameStatus::Resolving);
    assert_eq!(game.winner(), None);

    oracle.release(second);
    let result = timeout(WAIT, handle.wait_for_result(game_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.winner, Some(ALICE));
    assert!(handle.pending_resolutions().await.unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_events_carry_game_ids() {
    let runtime = mock_runtime().await;
    let handle = runtime.handle();
    let mut lifecycle = handle.subscribe(Topic::Lifecycle);

    let game_id = handle
        .create_game(GameMode::SinglePlayer, ALICE)
        .await
        .unwrap();
    handle.play_move(game_id, ALICE, Move::Paper).await.unwrap();

    let created = lifecycle.recv().await.unwrap();
    assert_eq!(
        created,
        Event::Lifecycle(LifecycleEvent::GameCreated {
            game_id,
            mode: GameMode::SinglePlayer,
            player1: ALICE,
        })
    );

    let submitted = lifecycle.recv().await.unwrap();
    assert_eq!(
        submitted,
        Event::Lifecycle(LifecycleEvent::MoveSubmitted {
            game_id,
            player: ALICE,
            slot: MoveSlot::Move1,
            cpu_moved: true,
        })
    );

    let json = serde_json::to_string(&created).unwrap();
    let decoded: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, created);
}

#[tokio::test]
async fn shutdown_completes_after_handles_are_dropped() {
    let runtime = mock_runtime().await;
    let handle = runtime.handle();

    let game_id = duel(&handle, Move::Rock, Move::Rock).await;
    handle.check_winner(game_id).await.unwrap();
    timeout(WAIT, handle.wait_for_result(game_id))
        .await
        .unwrap()
        .unwrap();

    drop(handle);
    timeout(WAIT, runtime.shutdown())
        .await
        .expect("workers should stop")
        .unwrap();
}

#[tokio::test]
async fn builder_requires_backend_and_oracle() {
    let missing_backend = Runtime::builder().oracle(SilentOracle).build().await;
    assert!(matches!(
        missing_backend,
        Err(janken_runtime::RuntimeError::MissingBackend)
    ));

    let missing_oracle = Runtime::builder()
        .backend(Arc::new(MockBackend::new(1)))
        .build()
        .await;
    assert!(matches!(
        missing_oracle,
        Err(janken_runtime::RuntimeError::MissingOracle)
    ));
}
