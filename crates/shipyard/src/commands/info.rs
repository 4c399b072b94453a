//! Info command — show package, configuration and project information.

use camino::Utf8Path;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use shipyard_core::LoadedConfig;
use shipyard_core::config;
use shipyard_core::model::deploy::DeployerKind;

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_config_dir: Option<String>,
    log_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
}

/// Unit counts as configured, before activation is resolved.
#[derive(Serialize)]
struct ProjectInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    release_service: Option<String>,
    assemblers: usize,
    distributions: usize,
    deployers: usize,
    uploaders: usize,
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    project: ProjectInfo,
}

impl FullInfo {
    fn gather(loaded: &mut LoadedConfig) -> Self {
        let settings = &loaded.config;
        let model = &mut loaded.model;
        let project = ProjectInfo {
            name: model.project.name.clone(),
            version: model.project.version.clone(),
            release_service: model.release.service().map(|(kind, _)| kind.to_string()),
            assemblers: model.assemble.all().len(),
            distributions: model.distributions.len(),
            deployers: DeployerKind::ALL
                .iter()
                .map(|kind| model.deploy.maven.by_kind(*kind).len())
                .sum(),
            uploaders: model.upload.all_mut().len(),
        };
        Self {
            package: PackageInfo::new(),
            config: ConfigInfo {
                sources: loaded.sources.iter().map(ToString::to_string).collect(),
                user_config_dir: config::user_config_dir().map(|p| p.to_string()),
                log_level: settings.log_level().as_str(),
                log_dir: settings.log_dir.as_ref().map(ToString::to_string),
            },
            project,
        }
    }
}

/// Print package information.
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `loaded` - Loaded configuration
/// * `cwd` - Current working directory
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    mut loaded: LoadedConfig,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, %cwd, "executing info command");
    let info = FullInfo::gather(&mut loaded);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{} {}", info.package.name.bold(), info.package.version.green());
    if !info.package.description.is_empty() {
        println!("{}", info.package.description);
    }
    if !info.package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), info.package.license);
    }
    if !info.package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), info.package.repository.cyan());
    }

    println!();
    println!("{}", "Configuration".bold().underline());
    if info.config.sources.is_empty() {
        println!("{}: {}", "Config files".dimmed(), "none loaded".yellow());
    }
    for source in &info.config.sources {
        println!("{}: {}", "Config file".dimmed(), source.cyan());
    }
    println!("{}: {}", "Log level".dimmed(), info.config.log_level);
    if let Some(ref dir) = info.config.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }

    println!();
    println!("{}", "Project".bold().underline());
    let project = &info.project;
    println!(
        "{}: {}",
        "Name".dimmed(),
        project.name.as_deref().unwrap_or("(unset)").cyan()
    );
    println!(
        "{}: {}",
        "Version".dimmed(),
        project.version.as_deref().unwrap_or("(unset)").cyan()
    );
    if let Some(ref service) = project.release_service {
        println!("{}: {}", "Release service".dimmed(), service.cyan());
    }
    println!(
        "{}: {} assemblers, {} distributions, {} deployers, {} uploaders",
        "Units".dimmed(),
        project.assemblers,
        project.distributions,
        project.deployers,
        project.uploaders
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_core::model::upload::Uploader;

    #[test]
    fn test_cmd_info_text_succeeds() {
        let cwd = camino::Utf8PathBuf::from("/tmp");
        assert!(cmd_info(InfoArgs::default(), false, LoadedConfig::default(), &cwd).is_ok());
    }

    #[test]
    fn test_cmd_info_json_via_global() {
        let cwd = camino::Utf8PathBuf::from("/tmp");
        assert!(cmd_info(InfoArgs::default(), true, LoadedConfig::default(), &cwd).is_ok());
    }

    #[test]
    fn test_counts_units() {
        let mut loaded = LoadedConfig::default();
        loaded.model.project.name = Some("app".into());
        loaded.model.upload.s3.insert("bucket".into(), Uploader::default());
        let info = FullInfo::gather(&mut loaded);
        assert_eq!(info.project.name.as_deref(), Some("app"));
        assert_eq!(info.project.uploaders, 1);
        assert_eq!(info.project.assemblers, 0);
        assert_eq!(info.config.log_level, "info");
    }
}
