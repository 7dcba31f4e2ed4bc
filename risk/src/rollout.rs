use engine::{Evaluation, Outcome};
use serde::Serialize;

/// Why a rollout stopped growing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    MaxPly,
    GameOver(Outcome),
    NoCandidates,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RolloutStep<S, A> {
    pub action: A,
    /// The position reached by `action`.
    pub state: S,
    /// Evaluation of `state` from the perspective of the rollout's root mover.
    pub evaluation: Evaluation,
    pub is_check: bool,
    pub is_capture: bool,
    /// Gap between the best and second best candidate offered where
    /// `action` was chosen.
    pub candidate_edge: Option<f32>,
}

impl<S, A> RolloutStep<S, A> {
    pub fn score(&self) -> f32 {
        self.evaluation.score()
    }
}

/// One simulated continuation. Every evaluation it holds is expressed from
/// the perspective of the side to move at the root.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rollout<S, A> {
    pub seed_evaluation: Evaluation,
    pub steps: Vec<RolloutStep<S, A>>,
    pub termination: Termination,
}

impl<S, A> Rollout<S, A> {
    pub fn new(
        seed_evaluation: Evaluation,
        steps: Vec<RolloutStep<S, A>>,
        termination: Termination,
    ) -> Self {
        Self {
            seed_evaluation,
            steps,
            termination,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The evaluation where the rollout ended, or the seed evaluation when it
    /// never moved.
    pub fn terminal_evaluation(&self) -> Evaluation {
        self.steps
            .last()
            .map(|s| s.evaluation)
            .unwrap_or(self.seed_evaluation)
    }

    pub fn terminal_score(&self) -> f32 {
        self.terminal_evaluation().score()
    }

    /// Scores along the path, starting with the seed.
    pub fn scores(&self) -> impl Iterator<Item = f32> + '_ {
        std::iter::once(self.seed_evaluation.score()).chain(self.steps.iter().map(|s| s.score()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(cp: i32) -> RolloutStep<(), ()> {
        RolloutStep {
            action: (),
            state: (),
            evaluation: Evaluation::Centipawns(cp),
            is_check: false,
            is_capture: false,
            candidate_edge: None,
        }
    }

    #[test]
    fn test_terminal_score_of_empty_rollout_is_seed() {
        let rollout: Rollout<(), ()> =
            Rollout::new(Evaluation::Centipawns(35), vec![], Termination::NoCandidates);

        assert!(rollout.is_empty());
        assert_eq!(rollout.terminal_score(), 35.0);
    }

    #[test]
    fn test_scores_start_with_seed() {
        let rollout = Rollout::new(
            Evaluation::Centipawns(10),
            vec![step(20), step(-5)],
            Termination::MaxPly,
        );

        assert_eq!(rollout.scores().collect::<Vec<_>>(), vec![10.0, 20.0, -5.0]);
        assert_eq!(rollout.terminal_score(), -5.0);
        assert_eq!(rollout.len(), 2);
    }
}
