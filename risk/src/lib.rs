pub mod aggregator;
pub mod cancellation;
pub mod classifier;
mod deadline;
pub mod error;
pub mod metrics;
pub mod options;
pub mod report;
pub mod rollout;
pub mod sampler;
pub mod selection;

#[cfg(test)]
mod counting_game;

pub use aggregator::*;
pub use cancellation::*;
pub use classifier::*;
pub use error::*;
pub use metrics::*;
pub use options::*;
pub use report::*;
pub use rollout::*;
pub use sampler::*;
pub use selection::*;
