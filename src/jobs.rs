pub mod dispatcher;
pub mod job_result;
pub mod job_store;
pub mod job_supervisor;
pub mod scheduler;
pub mod worker;

use thiserror::Error;

/// Failure classification deciding whether a job may be retried.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    FailPermanently(String),
    #[error("{0}")]
    TryAgainLater(String),
}
