//! Participant identities.
//!
//! Identities are 20-byte, address-style values. Two of them are reserved and
//! can never belong to a real participant: [`PlayerId::ZERO`] (no player / draw)
//! and [`PlayerId::CPU`] (the automated single-player opponent).
use std::fmt;
use std::str::FromStr;

/// Stable, comparable identity of a caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub [u8; 20]);

impl PlayerId {
    pub const LEN: usize = 20;

    /// Zero-sentinel: "no player" before a join, "no winner" after a draw.
    pub const ZERO: Self = Self([0; 20]);

    /// Reserved identity of the CPU opponent (`0x00…01`).
    pub const CPU: Self = Self::from_low_u64(1);

    /// Builds an identity whose low 8 bytes hold `value` (big-endian).
    pub const fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        let be = value.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[12 + i] = be[i];
            i += 1;
        }
        Self(bytes)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        let mut i = 0;
        while i < Self::LEN {
            if self.0[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    #[inline]
    pub fn is_cpu(&self) -> bool {
        *self == Self::CPU
    }

    /// Returns true for the zero-sentinel and the CPU identity.
    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.is_zero() || self.is_cpu()
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({self})")
    }
}

/// Error returned when parsing a [`PlayerId`] from text.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParsePlayerIdError {
    #[error("identity is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("identity must be {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

impl FromStr for PlayerId {
    type Err = ParsePlayerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        let bytes: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ParsePlayerIdError::Length {
                expected: Self::LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_identities_are_distinct() {
        assert_ne!(PlayerId::ZERO, PlayerId::CPU);
        assert!(PlayerId::ZERO.is_reserved());
        assert!(PlayerId::CPU.is_reserved());
        assert!(!PlayerId::from_low_u64(2).is_reserved());
    }

    #[test]
    fn renders_and_parses_as_hex() {
        assert_eq!(
            PlayerId::CPU.to_string(),
            "0x0000000000000000000000000000000000000001"
        );
        let parsed: PlayerId = "0x0000000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(parsed, PlayerId::CPU);

        let err = "0xabcd".parse::<PlayerId>().unwrap_err();
        assert_eq!(
            err,
            ParsePlayerIdError::Length {
                expected: 20,
                actual: 2
            }
        );
    }
}
