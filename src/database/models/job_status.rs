use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Represents the current execution state of a queued job.
///
/// Completed jobs are deleted from the queue, so there is no `Completed`
/// variant: a job either still has work ahead of it or has failed for good.
///
/// # State Transitions
///
/// - `Pending` → `Running` (claimed by a worker)
/// - `Running` → deleted (success)
/// - `Running` → `Pending` (retryable failure, pushed back by the retry backoff)
/// - `Running` → `Failed` (retries exhausted or the brand cannot be resolved)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for `next_run_at` to pass and for a worker to claim it.
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,

    /// Claimed by exactly one worker.
    ///
    /// A job left here by a crashed worker stays here until an operator
    /// requeues it; there is no lease expiry.
    #[sea_orm(string_value = "running")]
    Running,

    /// Terminal. Never returned by `dequeue` again; kept for diagnostics.
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl JobStatus {
    /// Checks if a job in this state still occupies its brand's slot.
    pub const fn is_outstanding(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}
