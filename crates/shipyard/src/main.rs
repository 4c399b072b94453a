//! shipyard CLI
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use shipyard::{Cli, Commands, commands};
use shipyard_core::config::ConfigLoader;
use tracing::debug;

mod observability;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.color.apply();

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;
    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    for config_path in &cli.config {
        let config_path = Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let loaded = loader.load().context("failed to load configuration")?;

    let obs_config = observability::ObservabilityConfig::new(loaded.config.log_dir.clone());
    let env_filter = observability::env_filter(
        cli.quiet,
        cli.verbose,
        loaded.config.log_level().as_str(),
    );
    let _guard = observability::init_observability(&obs_config, env_filter);

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        sources = loaded.sources.len(),
        "CLI initialized"
    );

    let result = match cli.command {
        Commands::Config(args) => commands::config::cmd_config(args, cli.json, loaded, &cwd)
            .map(|valid| if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE }),
        Commands::Info(args) => {
            commands::info::cmd_info(args, cli.json, loaded, &cwd).map(|()| ExitCode::SUCCESS)
        }
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}
