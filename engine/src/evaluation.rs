use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

use super::players::{Outcome, Side};

pub const MATE_SCORE: i32 = 10_000;
pub const MAX_CENTIPAWNS: i32 = 9_000;

const MATE_DISTANCE_PENALTY: i32 = 10;
const MAX_MATE_DISTANCE: i32 = 99;

/// A position score from the perspective of the side to move.
///
/// Mates are kept apart from centipawns so that they can be recognised, but
/// `score` maps both onto one scale where every forced mate outranks any
/// centipawn value and shorter mates rank above longer ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    Centipawns(i32),
    /// The side to move mates in the given number of moves. Zero means the
    /// opponent is already checkmated.
    MateIn(i32),
    /// The side to move is mated in the given number of moves. Zero means the
    /// side to move is checkmated.
    MatedIn(i32),
}

impl Evaluation {
    /// Maps a UCI `score mate <n>` value, where a non positive `n` means the
    /// side to move is being mated.
    pub fn from_uci_mate(moves: i32) -> Self {
        if moves > 0 {
            Evaluation::MateIn(moves)
        } else {
            Evaluation::MatedIn(-moves)
        }
    }

    pub fn from_outcome(outcome: Outcome, side_to_move: Side) -> Self {
        match outcome {
            Outcome::Decisive { winner } if winner == side_to_move => Evaluation::MateIn(0),
            Outcome::Decisive { .. } => Evaluation::MatedIn(0),
            Outcome::Draw => Evaluation::Centipawns(0),
        }
    }

    pub fn score(&self) -> f32 {
        let score = match *self {
            Evaluation::Centipawns(cp) => cp.clamp(-MAX_CENTIPAWNS, MAX_CENTIPAWNS),
            Evaluation::MateIn(moves) => MATE_SCORE - mate_distance_penalty(moves),
            Evaluation::MatedIn(moves) => -(MATE_SCORE - mate_distance_penalty(moves)),
        };

        score as f32
    }

    pub fn negate(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::MateIn(moves) => Evaluation::MatedIn(moves),
            Evaluation::MatedIn(moves) => Evaluation::MateIn(moves),
        }
    }

    /// Re-expresses an evaluation made for `evaluated_for` from the point of
    /// view of `perspective`.
    pub fn relative_to(self, evaluated_for: Side, perspective: Side) -> Self {
        if evaluated_for == perspective {
            self
        } else {
            self.negate()
        }
    }

    pub fn is_mate(&self) -> bool {
        !matches!(self, Evaluation::Centipawns(_))
    }

    pub fn is_winning_mate(&self) -> bool {
        matches!(self, Evaluation::MateIn(_))
    }

    pub fn is_losing_mate(&self) -> bool {
        matches!(self, Evaluation::MatedIn(_))
    }
}

fn mate_distance_penalty(moves: i32) -> i32 {
    moves.clamp(0, MAX_MATE_DISTANCE) * MATE_DISTANCE_PENALTY
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", *cp as f32 / 100.0),
            Evaluation::MateIn(moves) => write!(f, "#{}", moves),
            Evaluation::MatedIn(moves) => write!(f, "#-{}", moves),
        }
    }
}
