//! Homomorphic winner computation.
//!
//! The selector is built as
//!
//! ```text
//! draw      = move1 == move2
//! p1_wins   = OR over (w, l) in BEATS of (move1 == w AND move2 == l)
//! selector  = draw ? Draw : (p1_wins ? Player1Wins : Player2Wins)
//! ```
//!
//! using only ciphertext operations, so neither move is decrypted.
use crate::confidential::{
    BackendError, ConfidentialBackend, EncryptedBool, EncryptedMove, EncryptedU8,
};
use crate::moves::Move;
use crate::outcome::WinnerSelector;

/// Computes the encrypted [`WinnerSelector`] for two confidential moves.
pub fn winner_selector(
    backend: &dyn ConfidentialBackend,
    move1: &EncryptedMove,
    move2: &EncryptedMove,
) -> Result<EncryptedU8, BackendError> {
    let m1 = move1.ciphertext();
    let m2 = move2.ciphertext();

    let draw = backend.eq(m1, m2)?;

    let [first, rest @ ..] = Move::BEATS;
    let mut player1_wins = plays_pair(backend, m1, m2, first)?;
    for pair in rest {
        let wins = plays_pair(backend, m1, m2, pair)?;
        player1_wins = backend.or(&player1_wins, &wins)?;
    }

    let draw_value = backend.encrypt_u8(WinnerSelector::Draw.value())?;
    let p1_value = backend.encrypt_u8(WinnerSelector::Player1Wins.value())?;
    let p2_value = backend.encrypt_u8(WinnerSelector::Player2Wins.value())?;

    let decisive = backend.select(&player1_wins, &p1_value, &p2_value)?;
    backend.select(&draw, &draw_value, &decisive)
}

/// `move1 == winning AND move2 == losing`
fn plays_pair(
    backend: &dyn ConfidentialBackend,
    m1: &EncryptedU8,
    m2: &EncryptedU8,
    (winning, losing): (Move, Move),
) -> Result<EncryptedBool, BackendError> {
    let plays_winning = backend.eq_scalar(m1, winning.value())?;
    let faces_losing = backend.eq_scalar(m2, losing.value())?;
    backend.and(&plays_winning, &faces_losing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidential::MockBackend;
    use strum::IntoEnumIterator;

    #[test]
    fn confidential_selector_matches_plaintext_rule_for_all_pairs() {
        let backend = MockBackend::new(3);
        for m1 in Move::iter() {
            for m2 in Move::iter() {
                let e1 = backend.encrypt_move(m1).unwrap();
                let e2 = backend.encrypt_move(m2).unwrap();
                let selector = winner_selector(&backend, &e1, &e2).unwrap();
                let revealed = backend.reveal(&selector).unwrap();
                assert_eq!(
                    revealed,
                    WinnerSelector::from_moves(m1, m2).value(),
                    "{m1} vs {m2}"
                );
            }
        }
    }

    #[test]
    fn selector_is_a_fresh_ciphertext() {
        let backend = MockBackend::new(3);
        let rock = backend.encrypt_move(Move::Rock).unwrap();
        let paper = backend.encrypt_move(Move::Paper).unwrap();
        let selector = winner_selector(&backend, &rock, &paper).unwrap();
        assert_ne!(&selector, rock.ciphertext());
        assert_ne!(&selector, paper.ciphertext());
    }
}
