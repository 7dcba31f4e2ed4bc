use engine::OracleError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("evaluation engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("evaluation engine call timed out")]
    EngineTimeout,
    #[error("illegal move {action} chosen at rollout ply {ply}")]
    IllegalStateReached { ply: usize, action: String },
    #[error("no usable rollouts to compute risk from")]
    InsufficientData,
}

impl From<OracleError> for RiskError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Unavailable(reason) => RiskError::EngineUnavailable(reason),
            OracleError::Timeout => RiskError::EngineTimeout,
        }
    }
}
