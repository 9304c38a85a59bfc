use clap::{Parser, Subcommand, ValueEnum};

use crate::database::models::job_type::JobType;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run migrations, then start the workers, the scheduler and the web server (default)
    Serve,
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Queue a job for a brand
    Enqueue {
        /// Brand the job runs for
        brand_id: String,
        /// Kind of work to queue
        #[arg(value_enum)]
        kind: EnqueueKind,
        /// Seconds before the job becomes due
        #[arg(long, default_value = "0")]
        delay_seconds: u64,
        /// Opaque payload handed to the job
        #[arg(long, default_value = "")]
        payload: String,
    },
    /// Inspect and repair the job queue
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },
    /// Show version information
    Version,
}

/// Job kinds that can be queued by hand. Publish jobs are created by the scheduler only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EnqueueKind {
    Run,
    Sync,
    Plan,
}

impl From<EnqueueKind> for JobType {
    fn from(kind: EnqueueKind) -> Self {
        match kind {
            EnqueueKind::Run => Self::Cycle,
            EnqueueKind::Sync => Self::Sync,
            EnqueueKind::Plan => Self::BatchPlan,
        }
    }
}

#[derive(Subcommand)]
pub enum JobsAction {
    /// List permanently failed jobs
    Failed,
    /// List running jobs that have not moved for a while
    Stuck {
        /// Report jobs running for at least this many seconds
        #[arg(long)]
        older_than_seconds: u64,
    },
    /// Put a failed or stuck job back in the queue
    Requeue {
        /// Id of the job to requeue
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Run migrations up
    Up {
        /// Number of migrations to run (default: all)
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Run migrations down
    Down {
        /// Number of migrations to rollback (default: 1)
        #[arg(short, long, default_value = "1")]
        steps: u32,
    },
    /// Show migration status
    Status,
    /// Reset database (down all, then up all)
    Reset,
    /// Reapply recent migrations (down then up)
    Reapply {
        /// Number of migrations to reapply (default: 1)
        #[arg(short, long, default_value = "1")]
        steps: u32,
    },
}
