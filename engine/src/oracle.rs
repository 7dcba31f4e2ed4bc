use std::future::Future;

use thiserror::Error;

use super::evaluation::Evaluation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    #[error("engine call exceeded its deadline")]
    Timeout,
}

/// A candidate move together with the evaluation of the position it leads
/// to, scored from the perspective of the side that plays it.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredAction<A> {
    pub action: A,
    pub evaluation: Evaluation,
}

impl<A> ScoredAction<A> {
    pub fn new(action: A, evaluation: Evaluation) -> Self {
        Self { action, evaluation }
    }
}

/// An external evaluation engine.
///
/// Implementations must tolerate concurrent calls: one call may not change
/// the result of another. Adapters over a single-threaded engine process
/// serialise access internally.
pub trait PositionOracle {
    type State;
    type Action;

    /// Evaluates `game_state` from the perspective of its side to move.
    fn evaluate(
        &self,
        game_state: &Self::State,
        depth: usize,
    ) -> impl Future<Output = Result<Evaluation, OracleError>> + Send;

    /// Returns up to `k` candidate moves, best first. An empty list means the
    /// position has no legal moves.
    fn top_moves(
        &self,
        game_state: &Self::State,
        depth: usize,
        k: usize,
    ) -> impl Future<Output = Result<Vec<ScoredAction<Self::Action>>, OracleError>> + Send;

    /// How many calls the oracle can serve at once, if it is bounded. Callers
    /// keep no more calls than this outstanding so that none of them spends
    /// its deadline queued behind another.
    fn capacity(&self) -> Option<usize> {
        None
    }
}
