use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracing: TracingConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TracingConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobsConfig {
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of worker tasks polling the queue (default: 1)
    #[serde(default = "default_worker_count")]
    pub count: u32,
    /// Seconds between two polls of a single worker (default: 5)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Retries allowed after the first failed attempt (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    /// Fixed delay before a failed job becomes due again (default: 300 = 5 minutes)
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_seconds: u64,
    /// Posts generated by a single batch-plan job (default: 5)
    #[serde(default = "default_plan_batch_size")]
    pub plan_batch_size: usize,
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }

    pub const fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_seconds)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: default_worker_count(),
            poll_interval_seconds: default_poll_interval(),
            max_retries: default_max_retries(),
            retry_backoff_seconds: default_retry_backoff(),
            plan_batch_size: default_plan_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between two scheduler passes (default: 900 = 15 minutes)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_seconds: u64,
    /// Cycle interval for brands without a positive interval (default: 4)
    #[serde(default = "default_interval_hours")]
    pub default_interval_hours: i32,
    /// Delay used when a brand's next cycle is already overdue (default: 10)
    #[serde(default = "default_catch_up_delay")]
    pub catch_up_delay_seconds: u64,
    /// Delay before the first cycle of a brand without history (default: 60)
    #[serde(default = "default_warm_up_delay")]
    pub warm_up_delay_seconds: u64,
}

impl SchedulerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_seconds.max(1))
    }

    pub const fn catch_up_delay(&self) -> Duration {
        Duration::from_secs(self.catch_up_delay_seconds)
    }

    pub const fn warm_up_delay(&self) -> Duration {
        Duration::from_secs(self.warm_up_delay_seconds)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: default_tick_interval(),
            default_interval_hours: default_interval_hours(),
            catch_up_delay_seconds: default_catch_up_delay(),
            warm_up_delay_seconds: default_warm_up_delay(),
        }
    }
}

/// Stuck-job reporting is off unless both values are set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiagnosticsConfig {
    pub stuck_report_interval_seconds: Option<u64>,
    pub stuck_after_seconds: Option<u64>,
}

impl DiagnosticsConfig {
    /// Returns `(report interval, stuck threshold)` when reporting is enabled.
    pub fn stuck_job_reporting(&self) -> Option<(Duration, Duration)> {
        match (self.stuck_report_interval_seconds, self.stuck_after_seconds) {
            (Some(interval), Some(threshold)) => Some((
                Duration::from_secs(interval.max(1)),
                Duration::from_secs(threshold),
            )),
            _ => None,
        }
    }
}

const fn default_worker_count() -> u32 {
    1
}

const fn default_poll_interval() -> u64 {
    5
}

const fn default_max_retries() -> i32 {
    3
}

const fn default_retry_backoff() -> u64 {
    300 // 5 minutes
}

const fn default_plan_batch_size() -> usize {
    5
}

const fn default_tick_interval() -> u64 {
    900 // 15 minutes
}

const fn default_interval_hours() -> i32 {
    4
}

const fn default_catch_up_delay() -> u64 {
    10
}

const fn default_warm_up_delay() -> u64 {
    60
}
