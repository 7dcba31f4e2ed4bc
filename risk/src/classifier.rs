use engine::{Evaluation, Side};
use serde::{Deserialize, Serialize};

use super::{ClassificationThresholds, RiskOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Best,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

/// The judgement of one played move. Both evaluations are from the mover's
/// perspective.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveAssessment {
    pub ply_index: usize,
    pub side: Side,
    pub evaluation_before: Evaluation,
    pub evaluation_after: Evaluation,
    /// `after - before` on the score scale; negative when the move lost value.
    pub eval_change: f32,
    pub centipawn_loss: f32,
    pub classification: Classification,
}

#[derive(Clone, Debug)]
pub struct MoveClassifier {
    thresholds: ClassificationThresholds,
    accuracy_scale: f32,
    max_counted_loss: f32,
}

impl MoveClassifier {
    pub fn new(options: &RiskOptions) -> Self {
        Self {
            thresholds: options.thresholds,
            accuracy_scale: options.accuracy_scale,
            max_counted_loss: options.max_counted_loss,
        }
    }

    pub fn classify(
        &self,
        ply_index: usize,
        before: Evaluation,
        after: Evaluation,
        side: Side,
    ) -> MoveAssessment {
        let eval_change = after.score() - before.score();
        let centipawn_loss = (-eval_change).max(0.0);

        let classification = if mate_transition(before, after) {
            Classification::Blunder
        } else {
            self.tier(centipawn_loss)
        };

        MoveAssessment {
            ply_index,
            side,
            evaluation_before: before,
            evaluation_after: after,
            eval_change,
            centipawn_loss,
            classification,
        }
    }

    pub fn tier(&self, centipawn_loss: f32) -> Classification {
        let t = &self.thresholds;

        if centipawn_loss <= t.best {
            Classification::Best
        } else if centipawn_loss < t.good {
            Classification::Good
        } else if centipawn_loss < t.inaccuracy {
            Classification::Inaccuracy
        } else if centipawn_loss < t.mistake {
            Classification::Mistake
        } else {
            Classification::Blunder
        }
    }

    /// Accuracy in `[0, 100]` from the root mean square of the per move
    /// losses, each capped at `max_counted_loss`. `None` without moves.
    pub fn accuracy<I>(&self, centipawn_losses: I) -> Option<f32>
    where
        I: IntoIterator<Item = f32>,
    {
        let (count, sum_squares) = centipawn_losses
            .into_iter()
            .map(|loss| loss.clamp(0.0, self.max_counted_loss))
            .fold((0usize, 0.0f32), |(count, sum), loss| {
                (count + 1, sum + loss * loss)
            });

        if count == 0 {
            return None;
        }

        let rms = (sum_squares / count as f32).sqrt();

        Some(100.0 * (-rms / self.accuracy_scale).exp())
    }
}

/// A forced mate for the mover that the move threw away, or a forced mate
/// against the mover that the move walked into.
fn mate_transition(before: Evaluation, after: Evaluation) -> bool {
    let lost_mate = before.is_winning_mate() && !after.is_winning_mate();
    let walked_into_mate = !before.is_losing_mate() && after.is_losing_mate();

    lost_mate || walked_into_mate
}

/// Number of moves in each classification tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub best: usize,
    pub good: usize,
    pub inaccuracy: usize,
    pub mistake: usize,
    pub blunder: usize,
}

impl ClassificationCounts {
    pub fn add(&mut self, classification: Classification) {
        match classification {
            Classification::Best => self.best += 1,
            Classification::Good => self.good += 1,
            Classification::Inaccuracy => self.inaccuracy += 1,
            Classification::Mistake => self.mistake += 1,
            Classification::Blunder => self.blunder += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.best + self.good + self.inaccuracy + self.mistake + self.blunder
    }
}

impl FromIterator<Classification> for ClassificationCounts {
    fn from_iter<T: IntoIterator<Item = Classification>>(iter: T) -> Self {
        let mut counts = Self::default();
        for classification in iter {
            counts.add(classification);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use engine::Evaluation::*;

    fn classifier() -> MoveClassifier {
        MoveClassifier::new(&RiskOptions::default())
    }

    #[test]
    fn test_swing_of_three_pawns_is_a_blunder() {
        let assessment = classifier().classify(4, Centipawns(120), Centipawns(-180), Side::White);

        assert_approx_eq!(assessment.centipawn_loss, 300.0);
        assert_approx_eq!(assessment.eval_change, -300.0);
        assert_eq!(assessment.classification, Classification::Blunder);
        assert_eq!(assessment.ply_index, 4);
    }

    #[test]
    fn test_improvement_is_best_with_no_loss() {
        let assessment = classifier().classify(0, Centipawns(-50), Centipawns(40), Side::Black);

        assert_eq!(assessment.centipawn_loss, 0.0);
        assert_approx_eq!(assessment.eval_change, 90.0);
        assert_eq!(assessment.classification, Classification::Best);
    }

    #[test]
    fn test_tier_boundaries() {
        let classifier = classifier();

        assert_eq!(classifier.tier(0.0), Classification::Best);
        assert_eq!(classifier.tier(10.0), Classification::Best);
        assert_eq!(classifier.tier(10.5), Classification::Good);
        assert_eq!(classifier.tier(49.9), Classification::Good);
        assert_eq!(classifier.tier(50.0), Classification::Inaccuracy);
        assert_eq!(classifier.tier(100.0), Classification::Mistake);
        assert_eq!(classifier.tier(299.0), Classification::Mistake);
        assert_eq!(classifier.tier(300.0), Classification::Blunder);
    }

    #[test]
    fn test_losing_a_forced_mate_is_a_blunder() {
        let assessment = classifier().classify(0, MateIn(2), Centipawns(900), Side::White);

        assert_eq!(assessment.classification, Classification::Blunder);
    }

    #[test]
    fn test_walking_into_mate_is_a_blunder() {
        let assessment = classifier().classify(0, Centipawns(-20), MatedIn(5), Side::White);

        assert_eq!(assessment.classification, Classification::Blunder);
    }

    #[test]
    fn test_slower_mate_is_not_a_blunder() {
        let assessment = classifier().classify(0, MateIn(2), MateIn(3), Side::White);

        assert_approx_eq!(assessment.centipawn_loss, 10.0);
        assert_eq!(assessment.classification, Classification::Best);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = classifier();
        let pairs = [
            (Centipawns(35), Centipawns(-10)),
            (Centipawns(0), Centipawns(-250)),
            (MatedIn(4), MatedIn(2)),
        ];

        for (before, after) in pairs {
            let first = classifier.classify(1, before, after, Side::Black);
            let second = classifier.classify(1, before, after, Side::Black);
            assert_eq!(first, second);
            assert!(first.centipawn_loss >= 0.0);
        }
    }

    #[test]
    fn test_accuracy_bounds() {
        let classifier = classifier();

        assert_eq!(classifier.accuracy(Vec::new()), None);
        assert_approx_eq!(classifier.accuracy(vec![0.0, 0.0]).unwrap(), 100.0);

        let worst = classifier.accuracy(vec![50_000.0]).unwrap();
        assert!(worst > 0.0);
        assert_approx_eq!(worst, 100.0 * (-5.0f32).exp(), 1e-3);
    }

    #[test]
    fn test_accuracy_is_monotonic() {
        let classifier = classifier();
        let mut previous = 100.0;

        for loss in (0..20).map(|i| i as f32 * 50.0) {
            let accuracy = classifier.accuracy(vec![loss, 10.0]).unwrap();
            assert!(accuracy <= previous);
            previous = accuracy;
        }
    }

    #[test]
    fn test_one_large_loss_costs_more_than_many_small() {
        let classifier = classifier();

        let single = classifier.accuracy(vec![400.0, 0.0, 0.0, 0.0]).unwrap();
        let spread = classifier.accuracy(vec![100.0, 100.0, 100.0, 100.0]).unwrap();

        assert!(single < spread);
    }

    #[test]
    fn test_counts() {
        let counts = [
            Classification::Best,
            Classification::Blunder,
            Classification::Best,
            Classification::Mistake,
        ]
        .into_iter()
        .collect::<ClassificationCounts>();

        assert_eq!(counts.best, 2);
        assert_eq!(counts.blunder, 1);
        assert_eq!(counts.mistake, 1);
        assert_eq!(counts.total(), 4);
    }
}
