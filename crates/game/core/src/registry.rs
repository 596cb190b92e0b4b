//! Game registry and lifecycle state machine.
//!
//! [`GameRegistry`] is the single owner of every [`Game`]. Each operation runs
//! all of its guards before touching state, so a returned error always leaves
//! the registry unchanged. Guards are evaluated in a fixed order:
//!
//! | operation       | guards, in order                                                         |
//! |-----------------|--------------------------------------------------------------------------|
//! | `create_game`   | reserved identity                                                        |
//! | `join_game`     | not found, single-player, already full, own game, reserved identity      |
//! | `submit_move`   | not found, finished, not a participant, already submitted                |
//! | `check_winner`  | not found, finished or pending, moves not ready                          |
//! | `resolve`       | not found; finished and not-pending are no-ops; invalid selector         |
//!
//! ```text
//! Created ──join──▶ Ready ──submit×N──▶ MovesReady ──check_winner──▶ Resolving ──resolve──▶ Finished
//! ```
use crate::confidential::{ConfidentialBackend, EncryptedMove, EncryptedU8};
use crate::error::GameError;
use crate::game::{Game, GameId, GameMode, MoveSlot};
use crate::identity::PlayerId;
use crate::outcome::WinnerSelector;
use crate::resolution::winner_selector;

/// Result of a successful move submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubmitReceipt {
    pub game_id: GameId,
    pub slot: MoveSlot,
    /// The CPU filled `move2` as part of this submission.
    pub cpu_moved: bool,
    /// Both slots are filled; `check_winner` will be accepted.
    pub ready_to_resolve: bool,
}

/// Decryption request issued by [`GameRegistry::check_winner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionRequest {
    pub game_id: GameId,
    /// Encrypted [`WinnerSelector`].
    pub selector: EncryptedU8,
}

/// What a decryption callback did to the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionOutcome {
    /// Winner committed by this callback.
    Finalized {
        selector: WinnerSelector,
        winner: PlayerId,
    },
    /// Game was already finished; redelivery ignored.
    AlreadyFinished,
    /// No decryption was requested for this game; callback ignored.
    NotPending,
}

/// Owns every game and allocates identifiers.
#[derive(Clone, Debug, Default)]
pub struct GameRegistry {
    /// Indexed by `id - 1`; insertion order is creation order.
    games: Vec<Game>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently assigned id, `GameId(0)` before the first game.
    pub fn current_game_counter(&self) -> GameId {
        GameId(self.games.len() as u64)
    }

    pub fn get_game(&self, id: GameId) -> Result<&Game, GameError> {
        Self::index(id)
            .and_then(|index| self.games.get(index))
            .ok_or(GameError::GameNotFound(id))
    }

    /// Games with an unanswered decryption request.
    pub fn pending_resolutions(&self) -> Vec<GameId> {
        self.games
            .iter()
            .filter(|game| game.pending_resolution())
            .map(Game::id)
            .collect()
    }

    pub fn create_game(&mut self, mode: GameMode, creator: PlayerId) -> Result<GameId, GameError> {
        if creator.is_reserved() {
            return Err(GameError::ReservedIdentity(creator));
        }

        let id = GameId(self.games.len() as u64 + 1);
        self.games.push(Game::new(id, mode, creator));
        Ok(id)
    }

    pub fn join_game(&mut self, id: GameId, joiner: PlayerId) -> Result<(), GameError> {
        let game = self.game_mut(id)?;

        if game.mode() == GameMode::SinglePlayer {
            return Err(GameError::CannotJoinSinglePlayerGame(id));
        }
        if game.has_player2() {
            return Err(GameError::GameAlreadyFull(id));
        }
        if joiner == game.player1() {
            return Err(GameError::CannotJoinOwnGame {
                game_id: id,
                player: joiner,
            });
        }
        if joiner.is_reserved() {
            return Err(GameError::ReservedIdentity(joiner));
        }

        game.set_player2(joiner);
        Ok(())
    }

    /// Records `mv` in the submitter's slot.
    ///
    /// In single-player games, player1's submission also draws the CPU move
    /// into `move2`. The CPU draw happens before any write, so a backend
    /// failure leaves both slots untouched.
    pub fn submit_move(
        &mut self,
        id: GameId,
        submitter: PlayerId,
        mv: EncryptedMove,
        backend: &dyn ConfidentialBackend,
    ) -> Result<SubmitReceipt, GameError> {
        let game = self.game_mut(id)?;

        if game.is_finished() {
            return Err(GameError::GameFinished(id));
        }
        let slot = game.slot_of(submitter).ok_or(GameError::NotAParticipant {
            game_id: id,
            player: submitter,
        })?;
        if game.is_slot_filled(slot) {
            return Err(GameError::MoveAlreadySubmitted { game_id: id, slot });
        }

        let cpu_move = if game.mode() == GameMode::SinglePlayer && slot == MoveSlot::Move1 {
            Some(backend.random_move()?)
        } else {
            None
        };

        game.store_move(slot, mv);
        if let Some(cpu_move) = cpu_move {
            game.store_move(MoveSlot::Move2, cpu_move);
        }

        Ok(SubmitReceipt {
            game_id: id,
            slot,
            cpu_moved: cpu_move.is_some(),
            ready_to_resolve: game.both_moves_submitted(),
        })
    }

    /// Computes the encrypted selector and marks the game as resolving.
    ///
    /// The caller is responsible for forwarding the returned request to a
    /// decryption oracle and feeding the answer back into [`Self::resolve`].
    pub fn check_winner(
        &mut self,
        id: GameId,
        backend: &dyn ConfidentialBackend,
    ) -> Result<ResolutionRequest, GameError> {
        let game = self.game_mut(id)?;

        if game.is_finished() || game.pending_resolution() {
            return Err(GameError::GameFinished(id));
        }
        let (Some(move1), Some(move2)) = (game.move1(), game.move2()) else {
            return Err(GameError::MovesNotReady(id));
        };

        let selector = winner_selector(backend, move1, move2)?;
        game.mark_pending(true);

        Ok(ResolutionRequest {
            game_id: id,
            selector,
        })
    }

    /// Applies a decrypted selector. Exactly-once: later deliveries for the
    /// same game are no-ops.
    pub fn resolve(&mut self, id: GameId, selector: u8) -> Result<ResolutionOutcome, GameError> {
        let game = self.game_mut(id)?;

        if game.is_finished() {
            return Ok(ResolutionOutcome::AlreadyFinished);
        }
        if !game.pending_resolution() {
            return Ok(ResolutionOutcome::NotPending);
        }

        let selector = WinnerSelector::decode(id, selector)?;
        let winner = selector.winner_of(game);
        game.finish(winner);

        Ok(ResolutionOutcome::Finalized { selector, winner })
    }

    /// Clears the pending flag of a request that never reached an oracle.
    ///
    /// Only valid when the [`ResolutionRequest`] returned by
    /// [`Self::check_winner`] was dropped before delivery; an answered request
    /// must go through [`Self::resolve`].
    pub fn release_resolution(&mut self, id: GameId) -> Result<(), GameError> {
        let game = self.game_mut(id)?;
        if !game.is_finished() {
            game.mark_pending(false);
        }
        Ok(())
    }

    fn index(id: GameId) -> Option<usize> {
        id.0.checked_sub(1).and_then(|index| usize::try_from(index).ok())
    }

    fn game_mut(&mut self, id: GameId) -> Result<&mut Game, GameError> {
        Self::index(id)
            .and_then(|index| self.games.get_mut(index))
            .ok_or(GameError::GameNotFound(id))
    }
}
