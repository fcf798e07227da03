//! The sweep agent: fans collection cycles out across configured sources and
//! persists whatever comes back.

pub mod coordinator;
pub mod scheduler;

use thiserror::Error;

pub use coordinator::{CollectionSummary, Coordinator};
pub use scheduler::{run_continuous, ScheduleConfig};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("store error: {0}")]
    Store(#[from] sweep_store::StoreError),
    #[error("collector setup error: {0}")]
    Collector(#[from] sweep_collectors::CollectorError),
}
