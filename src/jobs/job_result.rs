use std::fmt::{Display, Formatter, Result};

use crate::jobs::JobError;

/// Outcome of one dispatch, before it is written back to the store.
#[derive(Debug)]
pub enum JobResult {
    Completed,
    Failed(JobError),
}

impl JobResult {
    /// Whether a failed job may go back to the queue given how often it was retried.
    #[must_use]
    pub const fn should_retry(&self, retries: i32, max_retries: i32) -> bool {
        match self {
            Self::Failed(JobError::TryAgainLater(_)) => retries < max_retries,
            Self::Failed(JobError::FailPermanently(_)) | Self::Completed => false,
        }
    }
}

impl Display for JobResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Failed(e) => write!(f, "error: {e}"),
        }
    }
}
