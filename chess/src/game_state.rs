use anyhow::{anyhow, Result};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use engine::{Outcome, Side};

use super::Action;

#[derive(Clone, Debug)]
pub struct GameState {
    position: Chess,
}

impl engine::GameState for GameState {
    fn initial() -> Self {
        Self {
            position: Chess::default(),
        }
    }
}

impl GameState {
    pub fn new(position: Chess) -> Self {
        Self { position }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> String {
        Fen(self.position.clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    pub fn turn(&self) -> Side {
        side(self.position.turn())
    }

    pub fn fullmoves(&self) -> usize {
        self.position.fullmoves().get() as usize
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        self.position
            .legal_moves()
            .into_iter()
            .map(Action::new)
            .collect()
    }

    pub fn play(&self, action: &Action) -> Self {
        let mut position = self.position.clone();
        position.play_unchecked(action.inner());

        Self { position }
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.position.outcome().map(|outcome| match outcome {
            shakmaty::Outcome::Decisive { winner } => Outcome::Decisive {
                winner: side(winner),
            },
            shakmaty::Outcome::Draw => Outcome::Draw,
        })
    }
}

fn side(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

impl FromStr for GameState {
    type Err = anyhow::Error;

    fn from_str(fen: &str) -> Result<Self, Self::Err> {
        let fen = fen
            .trim()
            .parse::<Fen>()
            .map_err(|e| anyhow!("Invalid FEN {}: {}", fen, e))?;

        let position = fen
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| anyhow!("Illegal position: {}", e))?;

        Ok(Self { position })
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}
