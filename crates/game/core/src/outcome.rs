//! Winner selector encoding and parsed results.
use crate::error::GameError;
use crate::game::{Game, GameId};
use crate::identity::PlayerId;
use crate::moves::Move;

/// Three-way outcome carried (encrypted) from the resolution engine to the
/// decryption oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum WinnerSelector {
    Draw = 0,
    Player1Wins = 1,
    Player2Wins = 2,
}

impl WinnerSelector {
    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Plaintext reference of the cyclic rule.
    pub fn from_moves(move1: Move, move2: Move) -> Self {
        if move1 == move2 {
            Self::Draw
        } else if move1.beats(move2) {
            Self::Player1Wins
        } else {
            Self::Player2Wins
        }
    }

    /// Decodes a decrypted selector delivered for `game_id`.
    pub fn decode(game_id: GameId, selector: u8) -> Result<Self, GameError> {
        match selector {
            0 => Ok(Self::Draw),
            1 => Ok(Self::Player1Wins),
            2 => Ok(Self::Player2Wins),
            selector => Err(GameError::InvalidSelector { game_id, selector }),
        }
    }

    /// Identity that wins under this selector, zero-sentinel for a draw.
    pub fn winner_of(self, game: &Game) -> PlayerId {
        match self {
            Self::Draw => PlayerId::ZERO,
            Self::Player1Wins => game.player1(),
            Self::Player2Wins => game.player2(),
        }
    }
}

/// Client-facing view of a finished game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameResult {
    pub game_id: GameId,
    pub is_draw: bool,
    /// `None` for a draw.
    pub winner: Option<PlayerId>,
    pub player1_won: bool,
    pub player2_won: bool,
    pub cpu_won: bool,
}

impl GameResult {
    /// Flags are mutually exclusive: a CPU win sets only `cpu_won`.
    pub(crate) fn new(game: &Game, winner: PlayerId) -> Self {
        let is_draw = winner.is_zero();
        let cpu_won = winner.is_cpu();
        Self {
            game_id: game.id(),
            is_draw,
            winner: (!is_draw).then_some(winner),
            player1_won: !is_draw && winner == game.player1(),
            player2_won: !is_draw && !cpu_won && winner == game.player2(),
            cpu_won,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameMode;
    use strum::IntoEnumIterator;

    const ALICE: PlayerId = PlayerId::from_low_u64(0xa11ce);
    const BOB: PlayerId = PlayerId::from_low_u64(0xb0b);

    fn finished(mode: GameMode, winner: PlayerId) -> GameResult {
        let mut game = Game::new(GameId(1), mode, ALICE);
        if mode == GameMode::TwoPlayer {
            game.set_player2(BOB);
        }
        game.finish(winner);
        game.result().unwrap()
    }

    fn flags(result: &GameResult) -> [bool; 4] {
        [
            result.is_draw,
            result.player1_won,
            result.player2_won,
            result.cpu_won,
        ]
    }

    #[test]
    fn exactly_one_result_flag_is_set() {
        let cpu_win = finished(GameMode::SinglePlayer, PlayerId::CPU);
        assert_eq!(flags(&cpu_win), [false, false, false, true]);
        assert_eq!(cpu_win.winner, Some(PlayerId::CPU));

        let human_win = finished(GameMode::SinglePlayer, ALICE);
        assert_eq!(flags(&human_win), [false, true, false, false]);

        let duel_win = finished(GameMode::TwoPlayer, BOB);
        assert_eq!(flags(&duel_win), [false, false, true, false]);

        let draw = finished(GameMode::TwoPlayer, PlayerId::ZERO);
        assert_eq!(flags(&draw), [true, false, false, false]);
        assert_eq!(draw.winner, None);
    }

    #[test]
    fn plaintext_rule_matches_cyclic_table() {
        for m1 in Move::iter() {
            for m2 in Move::iter() {
                let expected = if m1 == m2 {
                    WinnerSelector::Draw
                } else if matches!(
                    (m1, m2),
                    (Move::Rock, Move::Scissors)
                        | (Move::Paper, Move::Rock)
                        | (Move::Scissors, Move::Paper)
                ) {
                    WinnerSelector::Player1Wins
                } else {
                    WinnerSelector::Player2Wins
                };
                assert_eq!(WinnerSelector::from_moves(m1, m2), expected, "{m1} vs {m2}");
            }
        }
    }

    #[test]
    fn decode_rejects_unknown_selectors() {
        for selector in WinnerSelector::iter() {
            assert_eq!(
                WinnerSelector::decode(GameId(1), selector.value()),
                Ok(selector)
            );
        }
        assert_eq!(
            WinnerSelector::decode(GameId(9), 3),
            Err(GameError::InvalidSelector {
                game_id: GameId(9),
                selector: 3
            })
        );
    }
}
