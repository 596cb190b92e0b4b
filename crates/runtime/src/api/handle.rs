//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving games or streaming events from specific topics.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use janken_core::{
    ConfidentialBackend, EncryptedMove, Game, GameId, GameMode, GameResult, Move, PlayerId,
    ResolutionOutcome, SubmitReceipt,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, ResolutionEvent, Topic};
use crate::oracle::RequestId;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    backend: Arc<dyn ConfidentialBackend>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        backend: Arc<dyn ConfidentialBackend>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            backend,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Create a game owned by `creator`. Returns the new id.
    pub async fn create_game(&self, mode: GameMode, creator: PlayerId) -> Result<GameId> {
        self.request(|reply| Command::CreateGame {
            mode,
            creator,
            reply,
        })
        .await?
    }

    /// Join an open two-player game as player 2.
    pub async fn join_game(&self, game_id: GameId, joiner: PlayerId) -> Result<()> {
        self.request(|reply| Command::JoinGame {
            game_id,
            joiner,
            reply,
        })
        .await?
    }

    /// Submit an already encrypted move.
    pub async fn submit_move(
        &self,
        game_id: GameId,
        submitter: PlayerId,
        mv: EncryptedMove,
    ) -> Result<SubmitReceipt> {
        self.request(|reply| Command::SubmitMove {
            game_id,
            submitter,
            mv,
            reply,
        })
        .await?
    }

    /// Encrypt `mv` with the runtime's backend and submit it.
    pub async fn play_move(
        &self,
        game_id: GameId,
        submitter: PlayerId,
        mv: Move,
    ) -> Result<SubmitReceipt> {
        let encrypted = self.backend.encrypt_move(mv)?;
        self.submit_move(game_id, submitter, encrypted).await
    }

    /// Request resolution. Returns once the decryption request is queued;
    /// the winner is committed later by the oracle callback.
    pub async fn check_winner(&self, game_id: GameId) -> Result<RequestId> {
        self.request(|reply| Command::CheckWinner { game_id, reply })
            .await?
    }

    /// Re-send a resolving game's selector to the oracle, for example after a
    /// `DecryptionFailed` event. The new request supersedes the old one, whose
    /// answer is then ignored.
    pub async fn retry_resolution(&self, game_id: GameId) -> Result<RequestId> {
        self.request(|reply| Command::RetryResolution { game_id, reply })
            .await?
    }

    /// Deliver a decryption result directly, as an oracle relayer would.
    ///
    /// Duplicate or unsolicited deliveries are no-ops reported through the
    /// returned [`ResolutionOutcome`].
    pub async fn fulfill_decryption(
        &self,
        game_id: GameId,
        selector: u8,
    ) -> Result<ResolutionOutcome> {
        self.request(|reply| Command::FulfillDecryption {
            game_id,
            request_id: None,
            selector,
            reply: Some(reply),
        })
        .await?
    }

    /// Snapshot of a game.
    pub async fn get_game(&self, game_id: GameId) -> Result<Game> {
        self.request(|reply| Command::QueryGame { game_id, reply })
            .await?
    }

    /// Id of the most recently created game, `GameId(0)` when none exist.
    pub async fn current_game_counter(&self) -> Result<GameId> {
        self.request(|reply| Command::QueryCounter { reply }).await
    }

    /// Games awaiting their decryption callback.
    pub async fn pending_resolutions(&self) -> Result<Vec<GameId>> {
        self.request(|reply| Command::QueryPending { reply }).await
    }

    /// Result of a game, `None` until it is finished.
    pub async fn game_result(&self, game_id: GameId) -> Result<Option<GameResult>> {
        Ok(self.get_game(game_id).await?.result())
    }

    /// Wait until `game_id` is finished and return its result.
    ///
    /// Never completes if the oracle drops the request; wrap in a timeout
    /// when the oracle is not trusted to answer.
    pub async fn wait_for_result(&self, game_id: GameId) -> Result<GameResult> {
        // Subscribe before the first query so the finishing event cannot slip by
        let mut events = self.subscribe(Topic::Resolution);

        loop {
            if let Some(result) = self.game_result(game_id).await? {
                return Ok(result);
            }

            loop {
                match events.recv().await {
                    Ok(Event::Resolution(ResolutionEvent::GameFinished {
                        game_id: finished,
                        ..
                    })) if finished == game_id => break,
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Result watcher lagged by {} events; re-querying", skipped);
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(RuntimeError::EventStreamClosed);
                    }
                }
            }
        }
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Lifecycle` - Game creation, joins, and move submissions
    /// - `Topic::Resolution` - Decryption requests, results, and failures
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use janken_runtime::Topic;
    ///
    /// let mut resolution_rx = handle.subscribe(Topic::Resolution);
    /// while let Ok(event) = resolution_rx.recv().await {
    ///     // Handle resolution events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }
}
