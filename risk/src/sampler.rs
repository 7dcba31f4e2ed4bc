use std::fmt::Display;

use common::create_rng;
use engine::{Evaluation, GameEngine, PositionOracle, Side, TacticalFeatures, ValidActions};
use futures::stream::{self, StreamExt};
use log::{debug, error, warn};
use rand::prelude::StdRng;

use super::deadline::with_deadline;
use super::{
    candidate_edge, select_candidate, RiskError, RiskOptions, Rollout, RolloutStep, Termination,
};

/// The outcome of sampling one position: the rollouts that completed and the
/// errors of those that did not.
#[derive(Debug)]
pub struct SampleSet<S, A> {
    pub requested: usize,
    pub rollouts: Vec<Rollout<S, A>>,
    pub failures: Vec<RiskError>,
}

impl<S, A> SampleSet<S, A> {
    fn failed(requested: usize, err: RiskError) -> Self {
        Self {
            requested,
            rollouts: Vec::new(),
            failures: vec![err; requested],
        }
    }

    /// True when no rollout completed because the oracle could not be
    /// reached for any of them.
    pub fn engine_unavailable(&self) -> bool {
        self.rollouts.is_empty()
            && !self.failures.is_empty()
            && self
                .failures
                .iter()
                .all(|f| matches!(f, RiskError::EngineUnavailable(_)))
    }

    pub fn into_rollouts(self) -> Result<Vec<Rollout<S, A>>, RiskError> {
        if self.engine_unavailable() {
            return Err(self.failures.into_iter().next().unwrap_or_else(|| {
                RiskError::EngineUnavailable("no rollout reached the engine".to_string())
            }));
        }

        Ok(self.rollouts)
    }
}

/// Simulates plausible continuations from a position by repeatedly sampling
/// among the oracle's strongest candidate moves.
pub struct ContinuationSampler<'a, E, O> {
    engine: &'a E,
    oracle: &'a O,
    options: &'a RiskOptions,
}

impl<'a, S, A, E, O> ContinuationSampler<'a, E, O>
where
    S: Clone,
    A: Clone + PartialEq + Display,
    E: GameEngine<State = S, Action = A>
        + ValidActions<State = S, Action = A>
        + TacticalFeatures<State = S, Action = A>,
    O: PositionOracle<State = S, Action = A>,
{
    pub fn new(engine: &'a E, oracle: &'a O, options: &'a RiskOptions) -> Self {
        Self {
            engine,
            oracle,
            options,
        }
    }

    /// Runs `n_simulations` rollouts of at most `max_ply` plies from
    /// `game_state`. Rollout `i` draws from its own generator derived from
    /// `(seed, i)`, and the returned rollouts are ordered by `i`, so the
    /// result does not depend on how the rollouts were scheduled.
    pub async fn sample(
        &self,
        game_state: &S,
        n_simulations: usize,
        max_ply: usize,
        depth: usize,
        seed: u64,
    ) -> SampleSet<S, A> {
        let root_side = self.engine.player_to_move(game_state);

        let seed_evaluation = match self.engine.terminal_state(game_state) {
            Some(outcome) => Evaluation::from_outcome(outcome, root_side),
            None => {
                match with_deadline(
                    self.options.oracle_timeout(),
                    self.oracle.evaluate(game_state, depth),
                )
                .await
                {
                    Ok(evaluation) => evaluation,
                    Err(err) => {
                        warn!("Seed evaluation failed, no rollouts sampled: {}", err);
                        return SampleSet::failed(n_simulations, err);
                    }
                }
            }
        };

        let concurrency = match self.oracle.capacity() {
            Some(capacity) => self.options.workers.min(capacity),
            None => self.options.workers,
        };

        let mut results = stream::iter(0..n_simulations)
            .map(|i| async move {
                let rng = create_rng(seed, i as u64);
                let res = self
                    .rollout(game_state, root_side, seed_evaluation, max_ply, depth, rng)
                    .await;
                (i, res)
            })
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        results.sort_by_key(|(i, _)| *i);

        let mut rollouts = Vec::with_capacity(n_simulations);
        let mut failures = Vec::new();
        for (i, res) in results {
            match res {
                Ok(rollout) => rollouts.push(rollout),
                Err(err) => {
                    warn!("Rollout {} failed: {}", i, err);
                    failures.push(err);
                }
            }
        }

        debug!(
            "Sampled {} of {} rollouts, {} failed",
            rollouts.len(),
            n_simulations,
            failures.len()
        );

        SampleSet {
            requested: n_simulations,
            rollouts,
            failures,
        }
    }

    async fn rollout(
        &self,
        game_state: &S,
        root_side: Side,
        seed_evaluation: Evaluation,
        max_ply: usize,
        depth: usize,
        mut rng: StdRng,
    ) -> Result<Rollout<S, A>, RiskError> {
        let mut state = game_state.clone();
        let mut steps = Vec::with_capacity(max_ply);

        for ply in 0..max_ply {
            if let Some(outcome) = self.engine.terminal_state(&state) {
                return Ok(Rollout::new(seed_evaluation, steps, Termination::GameOver(outcome)));
            }

            let candidates = with_deadline(
                self.options.oracle_timeout(),
                self.oracle.top_moves(&state, depth, self.options.top_k),
            )
            .await?;

            let Some(index) =
                select_candidate(&candidates, self.options.sampling_temperature, &mut rng)
            else {
                return Ok(Rollout::new(seed_evaluation, steps, Termination::NoCandidates));
            };

            let chosen = &candidates[index];
            if !self.engine.valid_actions(&state).contains(&chosen.action) {
                error!(
                    "Oracle proposed {} which is not legal at rollout ply {}",
                    chosen.action, ply
                );
                return Err(RiskError::IllegalStateReached {
                    ply,
                    action: chosen.action.to_string(),
                });
            }

            let mover = self.engine.player_to_move(&state);
            let is_capture = self.engine.is_capture(&state, &chosen.action);
            let next = self.engine.take_action(&state, &chosen.action);

            steps.push(RolloutStep {
                action: chosen.action.clone(),
                state: next.clone(),
                evaluation: chosen.evaluation.relative_to(mover, root_side),
                is_check: self.engine.is_check(&next),
                is_capture,
                candidate_edge: candidate_edge(&candidates),
            });

            state = next;
        }

        let termination = match self.engine.terminal_state(&state) {
            Some(outcome) => Termination::GameOver(outcome),
            None => Termination::MaxPly,
        };

        Ok(Rollout::new(seed_evaluation, steps, termination))
    }
}
