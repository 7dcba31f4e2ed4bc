use common::div_or_zero;
use serde::{Deserialize, Serialize};

use super::{RiskError, RiskOptions, RiskWeights, Rollout};

/// The risk of one position. `metrics` is `None` when no rollout completed,
/// which is distinct from a position that was measured as calm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub n_simulations_used: usize,
    pub metrics: Option<RiskMetrics>,
}

/// Statistics over the terminal scores of a set of rollouts, in centipawns
/// from the root mover's perspective unless noted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub volatility: f32,
    pub value_at_risk: f32,
    pub downside_deviation: f32,
    /// Fraction of rollout plies that were checks, captures or large swings.
    pub tactical_density: f32,
    /// Composite score in `[0, 100]`.
    pub risk_score: f32,
    pub expected_value: f32,
    /// Fraction of outcomes below the downside threshold.
    pub downside_probability: f32,
    /// How much the best move at the root stands out from the next best.
    /// `None` when the root never offered two candidates.
    pub best_move_edge: Option<f32>,
}

impl RiskProfile {
    pub fn unknown() -> Self {
        Self {
            n_simulations_used: 0,
            metrics: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.metrics.is_none()
    }

    pub fn risk_score(&self) -> Option<f32> {
        self.metrics.map(|m| m.risk_score)
    }

    pub fn metrics_or_insufficient(&self) -> Result<&RiskMetrics, RiskError> {
        self.metrics.as_ref().ok_or(RiskError::InsufficientData)
    }
}

/// Turns a set of rollouts into a risk profile. An empty set gives the
/// unknown profile rather than zeros.
pub fn compute<S, A>(rollouts: &[Rollout<S, A>], options: &RiskOptions) -> RiskProfile {
    if rollouts.is_empty() {
        return RiskProfile::unknown();
    }

    let values = rollouts.iter().map(|r| r.terminal_score()).collect::<Vec<_>>();

    let volatility = volatility(&values);
    let value_at_risk = value_at_risk(&values, options.var_confidence);
    let tactical_density = tactical_density(rollouts, options.swing_threshold);

    let metrics = RiskMetrics {
        volatility,
        value_at_risk,
        downside_deviation: downside_deviation(&values),
        tactical_density,
        risk_score: risk_score(volatility, value_at_risk, tactical_density, &options.weights),
        expected_value: mean(&values),
        downside_probability: downside_probability(&values, options.downside_threshold),
        best_move_edge: best_move_edge(rollouts),
    };

    RiskProfile {
        n_simulations_used: rollouts.len(),
        metrics: Some(metrics),
    }
}

fn mean(values: &[f32]) -> f32 {
    common::mean(values).unwrap_or(0.0)
}

/// Population standard deviation.
pub fn volatility(values: &[f32]) -> f32 {
    let mean = mean(values);
    let variance = div_or_zero(
        values.iter().map(|v| (v - mean).powi(2)).sum::<f32>(),
        values.len() as f32,
    );

    variance.sqrt()
}

/// The `1 - confidence` quantile of `values`, interpolating linearly between
/// neighbouring order statistics. Lower is worse.
pub fn value_at_risk(values: &[f32], confidence: f32) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let quantile = (1.0 - confidence).clamp(0.0, 1.0);
    let pos = quantile * (sorted.len() - 1) as f32;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f32;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Semi-deviation of the outcomes below the mean, taken over all outcomes so
/// that it never exceeds the volatility.
pub fn downside_deviation(values: &[f32]) -> f32 {
    let mean = mean(values);
    let below = values
        .iter()
        .filter(|&&v| v < mean)
        .map(|v| (v - mean).powi(2))
        .sum::<f32>();

    div_or_zero(below, values.len() as f32).sqrt()
}

pub fn downside_probability(values: &[f32], threshold: f32) -> f32 {
    let below = values.iter().filter(|&&v| v < threshold).count();

    div_or_zero(below as f32, values.len() as f32)
}

/// Fraction of plies across all rollouts that give check, capture, or move
/// the score by more than `swing_threshold` from the previous ply.
pub fn tactical_density<S, A>(rollouts: &[Rollout<S, A>], swing_threshold: f32) -> f32 {
    let mut plies = 0usize;
    let mut tactical = 0usize;

    for rollout in rollouts {
        let mut previous = rollout.seed_evaluation.score();
        for step in &rollout.steps {
            let score = step.score();
            plies += 1;
            if step.is_check || step.is_capture || (score - previous).abs() > swing_threshold {
                tactical += 1;
            }
            previous = score;
        }
    }

    div_or_zero(tactical as f32, plies as f32)
}

/// Mean candidate edge at the first ply of each rollout.
pub fn best_move_edge<S, A>(rollouts: &[Rollout<S, A>]) -> Option<f32> {
    let edges = rollouts
        .iter()
        .filter_map(|r| r.steps.first().and_then(|s| s.candidate_edge))
        .collect::<Vec<_>>();

    common::mean(&edges)
}

/// Weighted blend of normalised volatility, normalised losses at risk and
/// tactical density, scaled to `[0, 100]`.
pub fn risk_score(
    volatility: f32,
    value_at_risk: f32,
    tactical_density: f32,
    weights: &RiskWeights,
) -> f32 {
    let v = (volatility / weights.volatility_scale).clamp(0.0, 1.0);
    let r = (-value_at_risk / weights.var_scale).clamp(0.0, 1.0);
    let t = tactical_density.clamp(0.0, 1.0);

    let blended = div_or_zero(
        weights.volatility * v + weights.value_at_risk * r + weights.tactical_density * t,
        weights.total(),
    );

    100.0 * blended.clamp(0.0, 1.0)
}
