//! Game records and lifecycle status.
//!
//! A [`Game`] is created once, mutated in place by the registry until it is
//! finished, and never deleted. Fields are private: outside the registry a
//! game is a read-only snapshot.
use std::fmt;

use crate::confidential::EncryptedMove;
use crate::error::GameError;
use crate::identity::PlayerId;
use crate::outcome::GameResult;

/// Monotonically assigned game identifier. The first game is `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game mode, fixed at creation.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[repr(u8)]
pub enum GameMode {
    /// One human against the CPU opponent.
    SinglePlayer = 0,
    /// Two humans; the second joins after creation.
    TwoPlayer = 1,
}

impl TryFrom<u8> for GameMode {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameMode::SinglePlayer),
            1 => Ok(GameMode::TwoPlayer),
            other => Err(GameError::InvalidMode(other)),
        }
    }
}

/// Which of the two move slots a submission lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MoveSlot {
    Move1,
    Move2,
}

/// Lifecycle position of a game, derived from its flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Two-player game waiting for an opponent.
    Created,
    /// Both seats taken, at least one move missing.
    Ready,
    /// Both moves present, resolution not requested yet.
    MovesReady,
    /// Decryption request in flight.
    Resolving,
    /// Winner committed. Terminal.
    Finished,
}

/// One game, as owned by the registry.
///
/// Serializable as a snapshot only; games are never rebuilt from the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Game {
    id: GameId,
    mode: GameMode,
    player1: PlayerId,
    /// [`PlayerId::ZERO`] until joined; [`PlayerId::CPU`] in single-player games.
    player2: PlayerId,
    move1: Option<EncryptedMove>,
    move2: Option<EncryptedMove>,
    is_finished: bool,
    /// Only meaningful once `is_finished`; zero-sentinel means draw.
    winner: PlayerId,
    pending_resolution: bool,
}

impl Game {
    pub(crate) fn new(id: GameId, mode: GameMode, creator: PlayerId) -> Self {
        let player2 = match mode {
            GameMode::SinglePlayer => PlayerId::CPU,
            GameMode::TwoPlayer => PlayerId::ZERO,
        };

        Self {
            id,
            mode,
            player1: creator,
            player2,
            move1: None,
            move2: None,
            is_finished: false,
            winner: PlayerId::ZERO,
            pending_resolution: false,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn player1(&self) -> PlayerId {
        self.player1
    }

    /// Second seat. Zero-sentinel while a two-player game waits for a joiner.
    pub fn player2(&self) -> PlayerId {
        self.player2
    }

    pub fn has_player2(&self) -> bool {
        !self.player2.is_zero()
    }

    pub fn move1(&self) -> Option<&EncryptedMove> {
        self.move1.as_ref()
    }

    pub fn move2(&self) -> Option<&EncryptedMove> {
        self.move2.as_ref()
    }

    pub fn move1_submitted(&self) -> bool {
        self.move1.is_some()
    }

    pub fn move2_submitted(&self) -> bool {
        self.move2.is_some()
    }

    pub fn both_moves_submitted(&self) -> bool {
        self.move1_submitted() && self.move2_submitted()
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// True while a decryption request for this game is unanswered.
    pub fn pending_resolution(&self) -> bool {
        self.pending_resolution
    }

    /// Winner once finished; `Some(PlayerId::ZERO)` is a draw.
    pub fn winner(&self) -> Option<PlayerId> {
        self.is_finished.then_some(self.winner)
    }

    pub fn status(&self) -> GameStatus {
        if self.is_finished {
            GameStatus::Finished
        } else if self.pending_resolution {
            GameStatus::Resolving
        } else if self.both_moves_submitted() {
            GameStatus::MovesReady
        } else if self.has_player2() {
            GameStatus::Ready
        } else {
            GameStatus::Created
        }
    }

    /// Slot owned by `player`, if `player` is a real participant.
    pub fn slot_of(&self, player: PlayerId) -> Option<MoveSlot> {
        if player.is_reserved() {
            None
        } else if player == self.player1 {
            Some(MoveSlot::Move1)
        } else if player == self.player2 {
            Some(MoveSlot::Move2)
        } else {
            None
        }
    }

    pub fn is_slot_filled(&self, slot: MoveSlot) -> bool {
        match slot {
            MoveSlot::Move1 => self.move1_submitted(),
            MoveSlot::Move2 => self.move2_submitted(),
        }
    }

    /// Parsed outcome of a finished game.
    pub fn result(&self) -> Option<GameResult> {
        self.winner().map(|winner| GameResult::new(self, winner))
    }

    pub(crate) fn set_player2(&mut self, player: PlayerId) {
        self.player2 = player;
    }

    pub(crate) fn store_move(&mut self, slot: MoveSlot, mv: EncryptedMove) {
        match slot {
            MoveSlot::Move1 => self.move1 = Some(mv),
            MoveSlot::Move2 => self.move2 = Some(mv),
        }
    }

    pub(crate) fn mark_pending(&mut self, pending: bool) {
        self.pending_resolution = pending;
    }

    pub(crate) fn finish(&mut self, winner: PlayerId) {
        self.winner = winner;
        self.is_finished = true;
        self.pending_resolution = false;
    }
}
