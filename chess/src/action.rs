use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Move};
use std::fmt::{self, Display, Formatter};

use anyhow::{anyhow, Result};

use super::GameState;

/// A legal move. Displays in UCI long algebraic notation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Action(Move);

impl Action {
    pub fn new(mv: Move) -> Self {
        Self(mv)
    }

    /// Resolves a UCI move string such as `e2e4` or `e7e8q` against the
    /// position it is played from.
    pub fn from_uci(uci: &str, game_state: &GameState) -> Result<Self> {
        let uci_move = uci
            .parse::<UciMove>()
            .map_err(|e| anyhow!("Invalid uci move {}: {}", uci, e))?;

        let mv = uci_move
            .to_move(game_state.position())
            .map_err(|e| anyhow!("Illegal move {} in {}: {}", uci, game_state, e))?;

        Ok(Self(mv))
    }

    pub fn inner(&self) -> &Move {
        &self.0
    }

    pub fn is_capture(&self) -> bool {
        self.0.is_capture()
    }

    /// Standard algebraic notation, with check and mate suffixes, for the
    /// move played from `game_state`.
    pub fn to_san(&self, game_state: &GameState) -> String {
        SanPlus::from_move(game_state.position().clone(), &self.0).to_string()
    }

    pub fn to_uci(&self) -> UciMove {
        self.0.to_uci(CastlingMode::Standard)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
