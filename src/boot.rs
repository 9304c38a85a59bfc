use std::{process, sync::Arc};

use clap::Parser as _;
use config_rs::{Config as ConfigRs, ConfigError};
use tracing::{debug, trace};

use crate::{
    agent::AgentFactory,
    app::App,
    app_info::AppInfo,
    cli::{Cli, Commands},
    commands::{enqueue, jobs, migrate, serve, version},
    config::Config,
    environment::Environment,
    setup_tracing::setup_tracing_for_command,
};

/// Everything the binary supplies on top of the shared runtime.
pub struct BootConfig {
    pub app_info: AppInfo,
    /// Builds the factory that turns a brand id into a runnable agent.
    pub agent_factory: fn(&App) -> Arc<dyn AgentFactory>,
}

impl BootConfig {
    #[must_use]
    pub const fn new(app_info: AppInfo, agent_factory: fn(&App) -> Arc<dyn AgentFactory>) -> Self {
        Self {
            app_info,
            agent_factory,
        }
    }
}

pub async fn boot(config: BootConfig) {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Version)) {
        version::print_version_info(config.app_info);
        return;
    }

    let environment = Environment::from_env();

    let app_config = match read_config(&environment) {
        Ok(app_config) => app_config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration for {environment}: {e}");
            process::exit(1);
        }
    };

    setup_tracing_for_command(&cli.command, &app_config.tracing.log_level);

    debug!("Environment set to: {:?}", environment);
    trace!("Configuration loaded: {:?}", app_config);

    handle_command(environment, app_config, cli, config).await;
}

/// Load `config/{environment}.toml` overlaid with `APP_*` variables.
///
/// Nested keys use a double underscore, e.g. `APP_JOBS__WORKER__COUNT=4`.
pub fn read_config(environment: &Environment) -> Result<Config, ConfigError> {
    let config_file_name = environment.config_file();

    trace!("Reading configuration from: {}", config_file_name);

    ConfigRs::builder()
        .add_source(config_rs::File::with_name(&config_file_name))
        .add_source(
            config_rs::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

async fn handle_command(environment: Environment, config: Config, cli: Cli, boot: BootConfig) {
    match cli.command {
        Some(Commands::Migrate { action }) => {
            migrate::handle_migrate_command(&config, action).await;
        }
        Some(Commands::Enqueue {
            brand_id,
            kind,
            delay_seconds,
            payload,
        }) => {
            enqueue::handle_enqueue_command(
                &config,
                &brand_id,
                kind.into(),
                delay_seconds,
                &payload,
            )
            .await;
        }
        Some(Commands::Jobs { action }) => {
            jobs::handle_jobs_command(&config, action).await;
        }
        Some(Commands::Version) => {
            version::print_version_info(boot.app_info);
        }
        Some(Commands::Serve) | None => {
            serve::handle_serve_command(environment, config, boot.agent_factory).await;
        }
    }
}
