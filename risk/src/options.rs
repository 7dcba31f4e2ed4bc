use std::time::Duration;

use anyhow::{ensure, Result};
use common::{Config, ConfigLoader};
use serde::{Deserialize, Serialize};

/// Every tunable of an analysis. Built once, validated, then passed by
/// reference to the sampler, metrics, classifier and aggregator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskOptions {
    pub n_simulations: usize,
    pub search_depth: usize,
    pub max_ply: usize,
    pub var_confidence: f32,
    pub top_k: usize,
    pub sampling_temperature: f32,
    pub swing_threshold: f32,
    pub downside_threshold: f32,
    pub workers: usize,
    pub oracle_timeout_ms: u64,
    pub seed: u64,
    /// Only the first `max_moves` plies of a game are analysed. Zero analyses
    /// the whole game.
    pub max_moves: usize,
    pub weights: RiskWeights,
    pub thresholds: ClassificationThresholds,
    pub accuracy_scale: f32,
    pub max_counted_loss: f32,
}

/// Weights and normalisation scales of the composite risk score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub volatility: f32,
    pub value_at_risk: f32,
    pub tactical_density: f32,
    pub volatility_scale: f32,
    pub var_scale: f32,
}

/// Upper centipawn-loss bounds of each classification tier. A loss of
/// `best` or less is Best; every other bound is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub best: f32,
    pub good: f32,
    pub inaccuracy: f32,
    pub mistake: f32,
}

impl Default for RiskOptions {
    fn default() -> Self {
        Self {
            n_simulations: 12,
            search_depth: 12,
            max_ply: 40,
            var_confidence: 0.95,
            top_k: 4,
            sampling_temperature: 60.0,
            swing_threshold: 150.0,
            downside_threshold: -100.0,
            workers: 4,
            oracle_timeout_ms: 10_000,
            seed: 0,
            max_moves: 0,
            weights: RiskWeights::default(),
            thresholds: ClassificationThresholds::default(),
            accuracy_scale: 200.0,
            max_counted_loss: 1000.0,
        }
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            volatility: 0.4,
            value_at_risk: 0.35,
            tactical_density: 0.25,
            volatility_scale: 300.0,
            var_scale: 500.0,
        }
    }
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            best: 10.0,
            good: 50.0,
            inaccuracy: 100.0,
            mistake: 300.0,
        }
    }
}

impl RiskOptions {
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.n_simulations > 0, "n_simulations must be at least 1");
        ensure!(self.search_depth > 0, "search_depth must be at least 1");
        ensure!(self.top_k > 0, "top_k must be at least 1");
        ensure!(self.workers > 0, "workers must be at least 1");
        ensure!(self.oracle_timeout_ms > 0, "oracle_timeout_ms must be positive");
        ensure!(
            self.var_confidence > 0.0 && self.var_confidence < 1.0,
            "var_confidence must be within (0, 1), was {}",
            self.var_confidence
        );
        ensure!(
            self.sampling_temperature > 0.0,
            "sampling_temperature must be positive"
        );
        ensure!(self.swing_threshold >= 0.0, "swing_threshold must not be negative");
        ensure!(self.accuracy_scale > 0.0, "accuracy_scale must be positive");
        ensure!(self.max_counted_loss > 0.0, "max_counted_loss must be positive");

        self.weights.validate()?;
        self.thresholds.validate()
    }
}

impl RiskWeights {
    pub fn total(&self) -> f32 {
        self.volatility + self.value_at_risk + self.tactical_density
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.volatility >= 0.0 && self.value_at_risk >= 0.0 && self.tactical_density >= 0.0,
            "risk weights must not be negative"
        );
        ensure!(self.total() > 0.0, "at least one risk weight must be positive");
        ensure!(
            self.volatility_scale > 0.0 && self.var_scale > 0.0,
            "risk scales must be positive"
        );

        Ok(())
    }
}

impl ClassificationThresholds {
    fn validate(&self) -> Result<()> {
        ensure!(
            0.0 <= self.best
                && self.best <= self.good
                && self.good <= self.inaccuracy
                && self.inaccuracy <= self.mistake,
            "classification thresholds must ascend: {:?}",
            self
        );

        Ok(())
    }
}

impl Config for RiskOptions {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            n_simulations: config
                .get("n_simulations")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.n_simulations),
            search_depth: config
                .get("search_depth")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.search_depth),
            max_ply: config
                .get("max_ply")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.max_ply),
            var_confidence: config
                .get("var_confidence")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.var_confidence),
            top_k: config
                .get("top_k")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.top_k),
            sampling_temperature: config
                .get("sampling_temperature")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.sampling_temperature),
            swing_threshold: config
                .get("swing_threshold")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.swing_threshold),
            downside_threshold: config
                .get("downside_threshold")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.downside_threshold),
            workers: config
                .get("workers")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.workers),
            oracle_timeout_ms: config
                .get("oracle_timeout_ms")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.oracle_timeout_ms),
            seed: config
                .get("seed")
                .and_then(|v| v.as_u64())
                .unwrap_or(defaults.seed),
            max_moves: config
                .get("max_moves")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.max_moves),
            weights: RiskWeights::load(config)?,
            thresholds: ClassificationThresholds::load(config)?,
            accuracy_scale: config
                .get("accuracy_scale")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.accuracy_scale),
            max_counted_loss: config
                .get("max_counted_loss")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.max_counted_loss),
        })
    }
}

impl Config for RiskWeights {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            volatility: config
                .get("volatility_weight")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.volatility),
            value_at_risk: config
                .get("var_weight")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.value_at_risk),
            tactical_density: config
                .get("tactical_weight")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.tactical_density),
            volatility_scale: config
                .get("volatility_scale")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.volatility_scale),
            var_scale: config
                .get("var_scale")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.var_scale),
        })
    }
}

impl Config for ClassificationThresholds {
    fn load(config: &ConfigLoader) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            best: config
                .get("best_threshold")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.best),
            good: config
                .get("good_threshold")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.good),
            inaccuracy: config
                .get("inaccuracy_threshold")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.inaccuracy),
            mistake: config
                .get("mistake_threshold")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.mistake),
        })
    }
}
