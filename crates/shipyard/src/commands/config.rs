//! Config command — resolve and validate the release configuration.

use std::path::PathBuf;

use anyhow::{Context as _, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use shipyard_core::context::{Command, Filters, Scope};
use shipyard_core::git;
use shipyard_core::listener::Event;
use shipyard_core::messages::Message;
use shipyard_core::{Context, ContextBuilder, Errors, LoadedConfig, Mode, Model};

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// What to validate (CONFIG, FULL, ASSEMBLE, DOWNLOAD, DEPLOY, ...)
    #[arg(long, default_value_t = Mode::Config)]
    pub mode: Mode,

    /// Do not require secrets
    #[arg(long)]
    pub dry_run: bool,

    /// Treat deprecated settings as errors
    #[arg(long)]
    pub strict: bool,

    /// Root of generated files (default: out/shipyard)
    #[arg(long, value_name = "DIR")]
    pub output_directory: Option<PathBuf>,

    /// Keep only artifacts for PLATFORM (repeatable)
    #[arg(long = "select-platform", value_name = "PLATFORM")]
    pub select_platforms: Vec<String>,

    /// Drop artifacts for PLATFORM (repeatable)
    #[arg(long = "reject-platform", value_name = "PLATFORM")]
    pub reject_platforms: Vec<String>,

    /// Runtime property, consulted after the environment (repeatable)
    #[arg(short = 'P', long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Only process NAME within SCOPE, e.g. `announcers=slack` (repeatable)
    #[arg(long, value_name = "SCOPE=NAME", value_parser = parse_filter)]
    pub include: Vec<(Scope, String)>,

    /// Skip NAME within SCOPE (repeatable)
    #[arg(long, value_name = "SCOPE=NAME", value_parser = parse_filter)]
    pub exclude: Vec<(Scope, String)>,

    /// Do not read the head commit from git
    #[arg(long)]
    pub no_git: bool,

    /// Print the resolved model
    #[arg(long)]
    pub show_model: bool,
}

impl Default for ConfigArgs {
    fn default() -> Self {
        Self {
            mode: Mode::Config,
            dry_run: false,
            strict: false,
            output_directory: None,
            select_platforms: Vec::new(),
            reject_platforms: Vec::new(),
            properties: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            no_git: false,
            show_model: false,
        }
    }
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn parse_filter(raw: &str) -> Result<(Scope, String), String> {
    let (scope, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SCOPE=NAME, got '{raw}'"))?;
    let scope = scope.parse::<Scope>().map_err(|e| e.to_string())?;
    Ok((scope, name.to_string()))
}

#[derive(Serialize)]
struct Outcome<'a> {
    valid: bool,
    mode: Mode,
    report: &'a Utf8Path,
    #[serde(flatten)]
    errors: &'a Errors,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a Model>,
}

fn filters(args: &ConfigArgs) -> Filters {
    let included = args
        .include
        .iter()
        .fold(Filters::default(), |f, (scope, name)| f.include(*scope, [name.as_str()]));
    args.exclude
        .iter()
        .fold(included, |f, (scope, name)| f.exclude(*scope, [name.as_str()]))
}

fn utf8(path: &std::path::Path, what: &str) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|p| anyhow!("{what} is not valid UTF-8: {}", p.display()))
}

/// Validate the loaded configuration. Returns `false` when errors were found.
#[instrument(name = "cmd_config", skip_all, fields(mode = %args.mode))]
pub fn cmd_config(
    args: ConfigArgs,
    global_json: bool,
    loaded: LoadedConfig,
    cwd: &Utf8Path,
) -> anyhow::Result<bool> {
    debug!(sources = loaded.sources.len(), "executing config command");
    let mut model = loaded.model;

    let mut builder = ContextBuilder::new(cwd)
        .mode(args.mode)
        .command(Command::Config)
        .dry_run(args.dry_run)
        .strict(args.strict)
        .select_platforms(args.select_platforms.clone())
        .reject_platforms(args.reject_platforms.clone())
        .filters(filters(&args))
        .runtime_properties(args.properties.iter().cloned().collect());
    if let Some(dir) = &args.output_directory {
        builder = builder.output_directory(utf8(dir, "output directory")?);
    }
    if !args.no_git {
        match git::inspect(cwd) {
            Ok(Some(repository)) => {
                repository.apply_origin(&mut model);
                builder = builder.commit(repository.commit);
            }
            Ok(None) => debug!("not a repository, release checks skipped"),
            Err(err) => warn!(error = %err, "could not inspect repository"),
        }
    }

    let mut context = builder.build(model).context("failed to set up the run")?;
    let valid = validate_session(&mut context)?;
    let report = context.settings().output_directory.join(shipyard_core::context::REPORT_FILE);
    let errors = context.errors();

    if global_json {
        let outcome = Outcome {
            valid,
            mode: args.mode,
            report: &report,
            errors,
            model: args.show_model.then(|| context.model()),
        };
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(valid);
    }

    print_section("Warnings", errors.warnings().iter().chain(errors.nags()), |text| {
        format!("{} {text}", "!".yellow())
    });
    print_section(
        "Errors",
        errors.configuration_errors().iter().chain(errors.assembly_errors()),
        |text| format!("{} {text}", "✗".red()),
    );
    if args.show_model {
        println!();
        println!("{}", serde_json::to_string_pretty(context.model())?);
    }
    println!();
    if valid {
        println!("{} configuration is valid ({})", "✓".green(), args.mode);
    } else {
        let count = errors.configuration_errors().len() + errors.assembly_errors().len();
        println!("{} {count} error(s) found ({})", "✗".red(), args.mode);
    }
    println!("{}: {}", "Report".dimmed(), report.cyan());
    Ok(valid)
}

/// Validate between the session start and end events.
fn validate_session(context: &mut Context) -> anyhow::Result<bool> {
    context.fire(Event::SessionStart).context("session start was rejected")?;
    context.validate_model().context("failed to write the run report")?;
    let failed = context.errors().has_errors();
    context
        .fire(Event::SessionEnd { failed })
        .context("session end was rejected")?;
    Ok(!failed)
}

fn print_section<'a>(
    title: &str,
    messages: impl Iterator<Item = &'a Message>,
    line: impl Fn(&str) -> String,
) {
    let mut messages = messages.peekable();
    if messages.peek().is_none() {
        return;
    }
    println!("{}", title.bold().underline());
    for message in messages {
        println!("  {}", line(message.text()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use shipyard_core::error::ListenerError;
    use shipyard_core::listener::Listener;
    use shipyard_core::view::ContextView;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<Event>>>,
        reject: bool,
    }

    impl Listener for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn on_event(&self, _context: &ContextView, event: &Event) -> Result<(), ListenerError> {
            self.seen.lock().unwrap().push(event.clone());
            if self.reject {
                return Err(ListenerError::Rejected("no".into()));
            }
            Ok(())
        }
    }

    fn cwd(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()
    }

    fn loaded(name: Option<&str>) -> LoadedConfig {
        let mut loaded = LoadedConfig::default();
        loaded.model.project.name = name.map(str::to_string);
        loaded.model.project.version = Some("1.0.0".into());
        loaded.model.project.authors = vec!["Ada".into()];
        loaded
    }

    #[test]
    fn valid_configuration_passes() {
        let tmp = TempDir::new().unwrap();
        let ok = cmd_config(ConfigArgs::default(), false, loaded(Some("app")), &cwd(&tmp)).unwrap();
        assert!(ok);
        assert!(cwd(&tmp).join("out/shipyard/output.properties").is_file());
    }

    #[test]
    fn missing_project_name_fails() {
        let tmp = TempDir::new().unwrap();
        let ok = cmd_config(ConfigArgs::default(), true, loaded(None), &cwd(&tmp)).unwrap();
        assert!(!ok);
    }

    #[test]
    fn unknown_platform_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let args = ConfigArgs {
            select_platforms: vec!["plan9-mips".into()],
            ..ConfigArgs::default()
        };
        assert!(cmd_config(args, false, loaded(Some("app")), &cwd(&tmp)).is_err());
    }

    #[test]
    fn filters_parse() {
        assert_eq!(
            parse_filter("announcers=slack").unwrap(),
            (Scope::Announcers, "slack".to_string())
        );
        assert!(parse_filter("nowhere=slack").is_err());
        assert!(parse_filter("slack").is_err());
        assert_eq!(parse_property("a.b=c=d").unwrap(), ("a.b".into(), "c=d".into()));
        assert!(parse_property("=x").is_err());
    }

    #[test]
    fn session_events_wrap_validation() {
        let tmp = TempDir::new().unwrap();
        let recorder = Recorder::default();
        let seen = Arc::clone(&recorder.seen);
        let mut context = ContextBuilder::new(cwd(&tmp))
            .listener(Box::new(recorder))
            .build(loaded(None).model)
            .unwrap();

        assert!(!validate_session(&mut context).unwrap());
        assert_eq!(
            *seen.lock().unwrap(),
            [Event::SessionStart, Event::SessionEnd { failed: true }]
        );
    }

    #[test]
    fn rejected_session_stops_before_validation() {
        let tmp = TempDir::new().unwrap();
        let recorder = Recorder {
            reject: true,
            ..Recorder::default()
        };
        let seen = Arc::clone(&recorder.seen);
        let mut context = ContextBuilder::new(cwd(&tmp))
            .listener(Box::new(recorder))
            .build(loaded(Some("app")).model)
            .unwrap();

        assert!(validate_session(&mut context).is_err());
        assert_eq!(*seen.lock().unwrap(), [Event::SessionStart]);
        assert!(!cwd(&tmp).join("out/shipyard/output.properties").exists());
    }
}
