//! Plaintext move encoding.
//!
//! Moves only exist in plaintext on the client side, right before they are
//! encrypted. The discriminants are the values carried inside the ciphertext.
use crate::error::GameError;

/// A rock-paper-scissors move.
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
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum Move {
    /// Beats scissors
    Rock = 1,
    /// Beats rock
    Paper = 2,
    /// Beats paper
    Scissors = 3,
}

impl Move {
    /// Winning pairs `(winner, loser)` under the cyclic rule.
    pub const BEATS: [(Move, Move); 3] = [
        (Move::Rock, Move::Scissors),
        (Move::Paper, Move::Rock),
        (Move::Scissors, Move::Paper),
    ];

    /// Ciphertext encoding of this move.
    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Returns true if `self` beats `other`.
    pub fn beats(self, other: Move) -> bool {
        Self::BEATS.contains(&(self, other))
    }
}

impl From<Move> for u8 {
    fn from(mv: Move) -> Self {
        mv.value()
    }
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Move::Rock),
            2 => Ok(Move::Paper),
            3 => Ok(Move::Scissors),
            other => Err(GameError::InvalidMove(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("rock".parse::<Move>().unwrap(), Move::Rock);
        assert_eq!("PAPER".parse::<Move>().unwrap(), Move::Paper);
        assert_eq!("Scissors".parse::<Move>().unwrap(), Move::Scissors);
        assert!("lizard".parse::<Move>().is_err());
    }

    #[test]
    fn every_move_beats_exactly_one_other() {
        for mv in Move::iter() {
            let wins = Move::iter().filter(|other| mv.beats(*other)).count();
            assert_eq!(wins, 1, "{mv} should beat exactly one move");
            assert!(!mv.beats(mv));
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(Move::try_from(0), Err(GameError::InvalidMove(0)));
        assert_eq!(Move::try_from(4), Err(GameError::InvalidMove(4)));
        assert_eq!(Move::try_from(3), Ok(Move::Scissors));
    }
}
