//! Core value types shared by the board and the wire protocol.

use crate::InvalidArgument;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Symbol a player places on the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Symbol {
    /// Circle. Encoded as a `0` bit on the wire.
    O,
    /// Cross. Encoded as a `1` bit on the wire.
    X,
}

impl Symbol {
    /// Returns the opponent's symbol.
    pub fn other(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    /// Maps a wire bit to a symbol (`true` is X).
    pub fn from_bit(bit: bool) -> Self {
        if bit { Symbol::X } else { Symbol::O }
    }

    /// Maps this symbol to its wire bit (`true` is X).
    pub fn to_bit(self) -> bool {
        self == Symbol::X
    }
}

/// Five uppercase letters identifying one match on the server.
///
/// Input is case-insensitive; the stored form is always `A`-`Z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[display("{}", _0)]
pub struct GameCode(String);

impl GameCode {
    /// Number of letters in a game code.
    pub const LENGTH: usize = 5;

    /// Validates and canonicalizes a user-entered code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if the code contains anything but the
    /// letters `A`-`Z` (in either case) or does not have exactly
    /// [`GameCode::LENGTH`] characters.
    #[instrument]
    pub fn parse(code: &str) -> Result<Self, InvalidArgument> {
        let upper = code.to_ascii_uppercase();
        if !upper.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(InvalidArgument::new(
                "The game code should just contain letters (A - Z).",
            ));
        }
        if upper.chars().count() != Self::LENGTH {
            return Err(InvalidArgument::new(format!(
                "The game code should have a length of {}.",
                Self::LENGTH
            )));
        }
        Ok(Self(upper))
    }

    /// Builds a code from letter indices (`0` is `A`, `25` is `Z`).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if an index is above 25.
    #[instrument]
    pub fn from_indices(indices: [u8; Self::LENGTH]) -> Result<Self, InvalidArgument> {
        let mut code = String::with_capacity(Self::LENGTH);
        for index in indices {
            if index > b'Z' - b'A' {
                return Err(InvalidArgument::new(format!(
                    "Letter index {} is outside A - Z",
                    index
                )));
            }
            code.push(char::from(b'A' + index));
        }
        Ok(Self(code))
    }

    /// Returns the letter indices (`0` is `A`, `25` is `Z`).
    pub fn indices(&self) -> [u8; Self::LENGTH] {
        let mut indices = [0; Self::LENGTH];
        for (slot, byte) in indices.iter_mut().zip(self.0.bytes()) {
            *slot = byte - b'A';
        }
        indices
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GameCode {
    type Error = InvalidArgument;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameCode> for String {
    fn from(code: GameCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for GameCode {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
