use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The closed set of work a job can ask a brand agent to do.
///
/// Persisted as the short names the queue has always used
/// (`run`, `sync`, `plan`, `publish`).
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
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum JobType {
    /// Full research → generate → evaluate → publish → persist pipeline.
    #[sea_orm(string_value = "run")]
    #[serde(rename = "run")]
    #[strum(serialize = "run")]
    Cycle,

    /// Refresh analytics for every historical post of the brand.
    #[sea_orm(string_value = "sync")]
    #[serde(rename = "sync")]
    #[strum(serialize = "sync")]
    Sync,

    /// Pre-generate a batch of future scheduled posts.
    #[sea_orm(string_value = "plan")]
    #[serde(rename = "plan")]
    #[strum(serialize = "plan")]
    BatchPlan,

    /// Publish the scheduled post whose id is carried in the payload.
    #[sea_orm(string_value = "publish")]
    #[serde(rename = "publish")]
    #[strum(serialize = "publish")]
    Publish,
}
