use std::fmt::Display;

use engine::{
    Evaluation, GameEngine, GameRecord, PositionFeatures, PositionOracle, TacticalFeatures,
    ValidActions,
};
use log::{info, warn};

use super::deadline::with_deadline;
use super::{
    compute, Cancellation, ContinuationSampler, GameReport, GameReportBuilder, MoveClassifier,
    PlyReport, RiskError, RiskOptions, RiskProfile,
};

/// An evaluation of a position from its side to move, along with the move
/// the oracle would play there.
struct PositionEvaluation<A> {
    evaluation: Evaluation,
    best_action: Option<A>,
}

/// Walks a played game, sampling the risk of every position and classifying
/// every move.
pub struct GameRiskAggregator<'a, E, O> {
    engine: &'a E,
    oracle: &'a O,
    options: &'a RiskOptions,
    classifier: MoveClassifier,
}

impl<'a, S, A, E, O> GameRiskAggregator<'a, E, O>
where
    S: Clone + Display,
    A: Clone + PartialEq + Display,
    E: GameEngine<State = S, Action = A>
        + ValidActions<State = S, Action = A>
        + TacticalFeatures<State = S, Action = A>
        + PositionFeatures<State = S, Action = A>,
    O: PositionOracle<State = S, Action = A>,
{
    pub fn new(engine: &'a E, oracle: &'a O, options: &'a RiskOptions) -> Self {
        Self {
            engine,
            oracle,
            options,
            classifier: MoveClassifier::new(options),
        }
    }

    pub async fn analyze(
        &self,
        game: &GameRecord<S, A>,
        cancellation: &Cancellation,
    ) -> Result<GameReport, RiskError> {
        self.analyze_with_progress(game, cancellation, |_| {}).await
    }

    /// Analyses the game ply by ply, handing each finished ply report to
    /// `progress`. Cancellation is checked before every ply; a cancelled
    /// analysis returns the plies completed so far with `complete` unset.
    ///
    /// Fails only when the oracle cannot be reached for the first position.
    pub async fn analyze_with_progress<F>(
        &self,
        game: &GameRecord<S, A>,
        cancellation: &Cancellation,
        mut progress: F,
    ) -> Result<GameReport, RiskError>
    where
        F: FnMut(&PlyReport),
    {
        let plies = match self.options.max_moves {
            0 => &game.plies[..],
            max_moves => &game.plies[..max_moves.min(game.plies.len())],
        };

        let first_position = plies.first().map(|p| &p.before).unwrap_or(&game.initial);
        let mut before = match self.evaluate_position(first_position).await {
            Ok(evaluation) => Some(evaluation),
            Err(err @ RiskError::EngineUnavailable(_)) => return Err(err),
            Err(err) => {
                warn!("Could not evaluate the starting position: {}", err);
                None
            }
        };

        let mut report = GameReportBuilder::new();
        let mut complete = true;

        for (ply_index, ply) in plies.iter().enumerate() {
            if cancellation.is_cancelled() {
                info!("Analysis cancelled after {} of {} plies", ply_index, plies.len());
                complete = false;
                break;
            }

            let side = self.engine.player_to_move(&ply.before);
            let risk = self.position_risk(&ply.before, ply_index).await;

            let after = match self.evaluate_position(&ply.after).await {
                Ok(evaluation) => Some(evaluation),
                Err(err) => {
                    warn!("Could not evaluate the position after ply {}: {}", ply_index, err);
                    None
                }
            };

            let assessment = match (&before, &after) {
                (Some(before), Some(after)) => {
                    let after_side = self.engine.player_to_move(&ply.after);
                    Some(self.classifier.classify(
                        ply_index,
                        before.evaluation,
                        after.evaluation.relative_to(after_side, side),
                        side,
                    ))
                }
                _ => None,
            };

            let ply_report = PlyReport {
                ply_index,
                move_number: self.engine.move_number(&ply.before),
                side,
                action: ply.action.to_string(),
                notation: self.engine.notation(&ply.before, &ply.action),
                fen_before: ply.before.to_string(),
                fen_after: ply.after.to_string(),
                phase: self.engine.phase(&ply.before),
                complexity: self.engine.complexity(&ply.before),
                best_action: before
                    .as_ref()
                    .and_then(|b| b.best_action.as_ref())
                    .map(|a| a.to_string()),
                assessment,
                risk,
            };

            info!(
                "Ply {} {} {}: {} risk {}",
                ply_index,
                side,
                ply_report.action,
                ply_report
                    .assessment
                    .as_ref()
                    .map(|a| format!("{:?}", a.classification))
                    .unwrap_or_else(|| "unassessed".to_string()),
                ply_report
                    .risk
                    .risk_score()
                    .map(|s| format!("{:.1}", s))
                    .unwrap_or_else(|| "unknown".to_string())
            );

            progress(&ply_report);
            report.push(ply_report);
            before = after;
        }

        Ok(report.finish(&self.classifier, complete))
    }

    async fn evaluate_position(&self, game_state: &S) -> Result<PositionEvaluation<A>, RiskError> {
        let side = self.engine.player_to_move(game_state);
        if let Some(outcome) = self.engine.terminal_state(game_state) {
            return Ok(PositionEvaluation {
                evaluation: Evaluation::from_outcome(outcome, side),
                best_action: None,
            });
        }

        let timeout = self.options.oracle_timeout();
        let depth = self.options.search_depth;
        let best = with_deadline(timeout, self.oracle.top_moves(game_state, depth, 1))
            .await?
            .into_iter()
            .next();

        match best {
            Some(scored) => Ok(PositionEvaluation {
                evaluation: scored.evaluation,
                best_action: Some(scored.action),
            }),
            None => Ok(PositionEvaluation {
                evaluation: with_deadline(timeout, self.oracle.evaluate(game_state, depth)).await?,
                best_action: None,
            }),
        }
    }

    async fn position_risk(&self, game_state: &S, ply_index: usize) -> RiskProfile {
        let sampler = ContinuationSampler::new(self.engine, self.oracle, self.options);
        let seed = self
            .options
            .seed
            .wrapping_add((ply_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));

        let samples = sampler
            .sample(
                game_state,
                self.options.n_simulations,
                self.options.max_ply,
                self.options.search_depth,
                seed,
            )
            .await;

        match samples.into_rollouts() {
            Ok(rollouts) => compute(&rollouts, self.options),
            Err(err) => {
                warn!("Risk of ply {} is unknown: {}", ply_index, err);
                RiskProfile::unknown()
            }
        }
    }
}
