//! Logging setup.
//!
//! Log records are written as JSON lines to a file. Standard output carries
//! command output only, so when no log file can be opened logging falls back
//! to stderr.

use std::fs::OpenOptions;

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "SHIPYARD_LOG_PATH";
const ENV_LOG_DIR: &str = "SHIPYARD_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Where and how to log.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Service name, used for the log file name.
    pub service: String,
    /// Log directory from the configuration file.
    pub log_dir: Option<Utf8PathBuf>,
}

impl ObservabilityConfig {
    /// Config for this binary with the configured log directory.
    pub fn new(log_dir: Option<Utf8PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: Utf8PathBuf,
    file_name: String,
}

impl LogTarget {
    fn in_dir(dir: Utf8PathBuf, service: &str) -> Result<Self> {
        let target = Self {
            dir,
            file_name: format!("{service}{LOG_FILE_SUFFIX}"),
        };
        target.ensure_writable()?;
        Ok(target)
    }

    fn at_path(path: &Utf8Path) -> Result<Self> {
        let Some(file_name) = path.file_name() else {
            bail!("{ENV_LOG_PATH} must include a file name");
        };
        let dir = path.parent().filter(|p| !p.as_str().is_empty()).unwrap_or(Utf8Path::new("."));
        let target = Self {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
        };
        target.ensure_writable()?;
        Ok(target)
    }

    fn path(&self) -> Utf8PathBuf {
        self.dir.join(&self.file_name)
    }

    fn ensure_writable(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create log directory {}", self.dir))?;
        let path = self.path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {path}"))?;
        Ok(())
    }
}

/// Keeps the background log writer alive; hold it until exit.
pub struct ObservabilityGuard {
    _log_guard: WorkerGuard,
}

/// Install the global subscriber.
pub fn init_observability(cfg: &ObservabilityConfig, env_filter: EnvFilter) -> ObservabilityGuard {
    let (writer, guard) = match log_writer(cfg) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("Warning: {err:#}. Falling back to stderr logging.");
            tracing_appender::non_blocking(std::io::stderr())
        }
    };

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(writer);
    tracing_subscriber::registry().with(env_filter).with(layer).init();

    tracing::debug!("logging initialized");
    ObservabilityGuard { _log_guard: guard }
}

/// Build an `EnvFilter` from CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > RUST_LOG env > configured level
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn log_writer(cfg: &ObservabilityConfig) -> Result<(NonBlocking, WorkerGuard)> {
    let target = resolve_log_target(
        &cfg.service,
        env_path(ENV_LOG_PATH)?,
        env_path(ENV_LOG_DIR)?,
        cfg.log_dir.clone(),
    )?;
    let appender = tracing_appender::rolling::daily(&target.dir, &target.file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn env_path(name: &str) -> Result<Option<Utf8PathBuf>> {
    std::env::var_os(name)
        .map(|raw| {
            Utf8PathBuf::from_path_buf(raw.into())
                .map_err(|path| anyhow!("{name} is not valid UTF-8: {}", path.display()))
        })
        .transpose()
}

/// First usable target: explicit path, env dir, configured dir, then the
/// platform data directory and the working directory.
fn resolve_log_target(
    service: &str,
    path_override: Option<Utf8PathBuf>,
    dir_override: Option<Utf8PathBuf>,
    config_dir: Option<Utf8PathBuf>,
) -> Result<LogTarget> {
    if let Some(path) = path_override {
        return LogTarget::at_path(&path);
    }
    if let Some(dir) = dir_override.or(config_dir) {
        return LogTarget::in_dir(dir, service);
    }

    let candidates = shipyard_core::config::user_data_local_dir()
        .map(|dir| dir.join("logs"))
        .into_iter()
        .chain(
            std::env::current_dir()
                .ok()
                .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok()),
        );
    for dir in candidates {
        if let Ok(target) = LogTarget::in_dir(dir, service) {
            return Ok(target);
        }
    }
    bail!("no writable log directory found")
}
