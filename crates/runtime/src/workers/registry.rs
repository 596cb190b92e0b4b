//! Registry worker that owns the authoritative [`janken_core::GameRegistry`].
//!
//! Receives commands from [`crate::RuntimeHandle`] one at a time, so every
//! game is mutated under serialized execution. Resolution requests leave
//! through the oracle queue; their answers re-enter as
//! [`Command::FulfillDecryption`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use janken_core::{
    ConfidentialBackend, EncryptedMove, EncryptedU8, Game, GameId, GameMode, GameRegistry, PlayerId,
    ResolutionOutcome, SubmitReceipt,
};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, LifecycleEvent, ResolutionEvent};
use crate::oracle::{DecryptionRequest, RequestId};

/// Commands that can be sent to the registry worker
pub enum Command {
    CreateGame {
        mode: GameMode,
        creator: PlayerId,
        reply: oneshot::Sender<Result<GameId>>,
    },
    JoinGame {
        game_id: GameId,
        joiner: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    SubmitMove {
        game_id: GameId,
        submitter: PlayerId,
        mv: EncryptedMove,
        reply: oneshot::Sender<Result<SubmitReceipt>>,
    },
    /// Compute the encrypted selector and enqueue its decryption.
    CheckWinner {
        game_id: GameId,
        reply: oneshot::Sender<Result<RequestId>>,
    },
    /// Re-send the outstanding decryption request under a fresh id.
    RetryResolution {
        game_id: GameId,
        reply: oneshot::Sender<Result<RequestId>>,
    },
    /// Decryption callback. The oracle worker sends it with the id it answered
    /// and without a reply channel; manual deliveries carry no id.
    FulfillDecryption {
        game_id: GameId,
        request_id: Option<RequestId>,
        selector: u8,
        reply: Option<oneshot::Sender<Result<ResolutionOutcome>>>,
    },
    QueryGame {
        game_id: GameId,
        reply: oneshot::Sender<Result<Game>>,
    },
    QueryCounter {
        reply: oneshot::Sender<GameId>,
    },
    QueryPending {
        reply: oneshot::Sender<Vec<GameId>>,
    },
}

/// Background task that processes registry commands.
pub struct RegistryWorker {
    registry: GameRegistry,
    backend: Arc<dyn ConfidentialBackend>,
    command_rx: mpsc::Receiver<Command>,
    oracle_tx: mpsc::Sender<DecryptionRequest>,
    event_bus: EventBus,
    /// Latest unanswered decryption request per game. Oracle answers must
    /// match its id.
    in_flight: HashMap<GameId, DecryptionRequest>,
    next_request_id: u64,
}

impl RegistryWorker {
    pub fn new(
        backend: Arc<dyn ConfidentialBackend>,
        command_rx: mpsc::Receiver<Command>,
        oracle_tx: mpsc::Sender<DecryptionRequest>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry: GameRegistry::new(),
            backend,
            command_rx,
            oracle_tx,
            event_bus,
            in_flight: HashMap::new(),
            next_request_id: 0,
        }
    }

    /// Main worker loop. Ends once every command sender is dropped.
    pub async fn run(mut self) {
        info!("RegistryWorker started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        if !self.in_flight.is_empty() {
            warn!(
                "RegistryWorker stopping with {} unanswered decryption request(s)",
                self.in_flight.len()
            );
        }
        info!("RegistryWorker stopped");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::CreateGame {
                mode,
                creator,
                reply,
            } => {
                let result = self.handle_create(mode, creator);
                if reply.send(result).is_err() {
                    debug!("CreateGame reply channel closed (caller dropped)");
                }
            }
            Command::JoinGame {
                game_id,
                joiner,
                reply,
            } => {
                let result = self.handle_join(game_id, joiner);
                if reply.send(result).is_err() {
                    debug!("JoinGame reply channel closed (caller dropped)");
                }
            }
            Command::SubmitMove {
                game_id,
                submitter,
                mv,
                reply,
            } => {
                let result = self.handle_submit(game_id, submitter, mv);
                if reply.send(result).is_err() {
                    debug!("SubmitMove reply channel closed (caller dropped)");
                }
            }
            Command::CheckWinner { game_id, reply } => {
                let result = self.handle_check_winner(game_id).await;
                if reply.send(result).is_err() {
                    debug!("CheckWinner reply channel closed (caller dropped)");
                }
            }
            Command::RetryResolution { game_id, reply } => {
                let result = self.handle_retry(game_id).await;
                if reply.send(result).is_err() {
                    debug!("RetryResolution reply channel closed (caller dropped)");
                }
            }
            Command::FulfillDecryption {
                game_id,
                request_id,
                selector,
                reply,
            } => {
                let result = self.handle_fulfillment(game_id, request_id, selector);
                match reply {
                    Some(reply) => {
                        if reply.send(result).is_err() {
                            debug!("FulfillDecryption reply channel closed (caller dropped)");
                        }
                    }
                    None => {
                        if let Err(e) = result {
                            warn!("Decryption callback for game {} rejected: {}", game_id, e);
                        }
                    }
                }
            }
            Command::QueryGame { game_id, reply } => {
                let result = self
                    .registry
                    .get_game(game_id)
                    .cloned()
                    .map_err(RuntimeError::from);
                if reply.send(result).is_err() {
                    debug!("QueryGame reply channel closed (caller dropped)");
                }
            }
            Command::QueryCounter { reply } => {
                if reply.send(self.registry.current_game_counter()).is_err() {
                    debug!("QueryCounter reply channel closed (caller dropped)");
                }
            }
            Command::QueryPending { reply } => {
                if reply.send(self.registry.pending_resolutions()).is_err() {
                    debug!("QueryPending reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn handle_create(&mut self, mode: GameMode, creator: PlayerId) -> Result<GameId> {
        let game_id = self.registry.create_game(mode, creator)?;
        info!("Game {} created ({}) by {}", game_id, mode, creator);

        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::GameCreated {
                game_id,
                mode,
                player1: creator,
            }));
        Ok(game_id)
    }

    fn handle_join(&mut self, game_id: GameId, joiner: PlayerId) -> Result<()> {
        self.registry.join_game(game_id, joiner)?;
        info!("Player {} joined game {}", joiner, game_id);

        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::PlayerJoined {
                game_id,
                player2: joiner,
            }));
        Ok(())
    }

    fn handle_submit(
        &mut self,
        game_id: GameId,
        submitter: PlayerId,
        mv: EncryptedMove,
    ) -> Result<SubmitReceipt> {
        let receipt = self
            .registry
            .submit_move(game_id, submitter, mv, self.backend.as_ref())?;
        debug!(
            "Game {}: {} stored for {} (cpu_moved={}, ready={})",
            game_id, receipt.slot, submitter, receipt.cpu_moved, receipt.ready_to_resolve
        );

        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::MoveSubmitted {
                game_id,
                player: submitter,
                slot: receipt.slot,
                cpu_moved: receipt.cpu_moved,
            }));
        Ok(receipt)
    }

    async fn handle_check_winner(&mut self, game_id: GameId) -> Result<RequestId> {
        let resolution = self
            .registry
            .check_winner(game_id, self.backend.as_ref())?;

        let Ok(permit) = self.oracle_tx.clone().reserve_owned().await else {
            // Request never left the engine, so the game must not stay resolving
            self.registry.release_resolution(game_id)?;
            return Err(RuntimeError::OracleChannelClosed);
        };

        let request_id = self.dispatch(permit, game_id, resolution.selector);
        info!("Game {}: decryption requested ({})", game_id, request_id);
        Ok(request_id)
    }

    async fn handle_retry(&mut self, game_id: GameId) -> Result<RequestId> {
        self.registry.get_game(game_id)?;
        let Some(previous) = self.in_flight.get(&game_id).copied() else {
            return Err(RuntimeError::NoPendingResolution(game_id));
        };

        let permit = self
            .oracle_tx
            .clone()
            .reserve_owned()
            .await
            .map_err(|_| RuntimeError::OracleChannelClosed)?;

        let request_id = self.dispatch(permit, game_id, previous.ciphertext);
        info!(
            "Game {}: decryption re-requested ({} supersedes {})",
            game_id, request_id, previous.request_id
        );
        Ok(request_id)
    }

    /// Records a new request as the game's outstanding one and hands it to
    /// the oracle queue.
    fn dispatch(
        &mut self,
        permit: mpsc::OwnedPermit<DecryptionRequest>,
        game_id: GameId,
        ciphertext: EncryptedU8,
    ) -> RequestId {
        self.next_request_id += 1;
        let request = DecryptionRequest {
            request_id: RequestId(self.next_request_id),
            game_id,
            ciphertext,
        };
        self.in_flight.insert(game_id, request);

        // Announce before handing off so the oracle's answer cannot overtake it
        self.event_bus
            .publish(Event::Resolution(ResolutionEvent::ResolutionRequested {
                game_id,
                request_id: request.request_id,
            }));
        permit.send(request);
        request.request_id
    }

    fn handle_fulfillment(
        &mut self,
        game_id: GameId,
        request_id: Option<RequestId>,
        selector: u8,
    ) -> Result<ResolutionOutcome> {
        if let Some(answered) = request_id {
            let outstanding = self.in_flight.get(&game_id).map(|r| r.request_id);
            if outstanding != Some(answered) {
                return Err(RuntimeError::StaleDecryption {
                    game_id,
                    request_id: answered,
                });
            }
        }

        let outcome = self.registry.resolve(game_id, selector)?;

        match outcome {
            ResolutionOutcome::Finalized { selector, winner } => {
                let request_id = self.in_flight.remove(&game_id).map(|r| r.request_id);
                info!(
                    "Game {} finished: {} (winner {}, request {:?})",
                    game_id, selector, winner, request_id
                );
                self.event_bus
                    .publish(Event::Resolution(ResolutionEvent::GameFinished {
                        game_id,
                        selector,
                        winner,
                    }));
            }
            ResolutionOutcome::AlreadyFinished => {
                warn!("Game {}: duplicate decryption callback ignored", game_id);
            }
            ResolutionOutcome::NotPending => {
                warn!(
                    "Game {}: decryption callback without a pending request ignored",
                    game_id
                );
            }
        }

        Ok(outcome)
    }
}
