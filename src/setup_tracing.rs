use time::macros::format_description;
use tracing_subscriber::{fmt::time::OffsetTime, EnvFilter};

use crate::cli::Commands;

/// Third-party targets that are too chatty at the server's level.
const QUIET_TARGETS: &str = "sqlx=warn,sea_orm_migration::migrator=warn";

pub fn setup_tracing_for_command(command: &Option<Commands>, server_log_level: &str) {
    // Operator commands stay quiet; RUST_LOG overrides everything
    let default_level = match command {
        Some(Commands::Migrate { .. } | Commands::Enqueue { .. } | Commands::Jobs { .. }) => {
            "warn"
        }
        Some(Commands::Version) => "error",
        Some(Commands::Serve) | None => server_log_level,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},{QUIET_TARGETS}")));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_ansi(true)
        .with_timer(OffsetTime::new(
            time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC),
            format_description!("[hour]:[minute]:[second].[subsecond digits:2]"),
        ))
        .compact()
        .init();
}
