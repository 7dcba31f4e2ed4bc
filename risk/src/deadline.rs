use std::future::Future;
use std::time::Duration;

use engine::OracleError;

use super::RiskError;

/// Runs one oracle call, converting an expired deadline into
/// `RiskError::EngineTimeout`.
pub(crate) async fn with_deadline<T, F>(timeout: Duration, call: F) -> Result<T, RiskError>
where
    F: Future<Output = Result<T, OracleError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(res) => res.map_err(RiskError::from),
        Err(_) => Err(RiskError::EngineTimeout),
    }
}
