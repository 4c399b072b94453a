//! The run context.
//!
//! A [`Context`] wraps the mutable [`Model`] with everything that belongs
//! to one invocation: directories, mode, flags, platform selection, filters,
//! property sources, listeners and the [`Errors`] accumulator.
//!
//! ```no_run
//! use camino::Utf8PathBuf;
//! use shipyard_core::context::{ContextBuilder, Mode};
//! use shipyard_core::model::Model;
//!
//! let mut context = ContextBuilder::new(Utf8PathBuf::from("."))
//!     .mode(Mode::Config)
//!     .dry_run(true)
//!     .build(Model::default())
//!     .unwrap();
//! let errors = context.validate_model().unwrap();
//! assert!(!errors.has_errors());
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

use crate::activation::Lifecycle;
use crate::error::{ContextError, ContextResult, ListenerError, ReportError};
use crate::errors::Errors;
use crate::keyword::keyword_enum;
use crate::listener::{Event, Listener};
use crate::model::{Commit, Model};
use crate::msg;
use crate::platform::{self, PlatformSelection};
use crate::property::{PropertyResolver, PropertySource, ProcessEnv, load_variables};
use crate::validation;
use crate::view::ContextView;

/// Default output directory, relative to the base directory.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "out/shipyard";

/// Name of the run report written under the output directory.
pub const REPORT_FILE: &str = "output.properties";

keyword_enum! {
    /// What the current run validates.
    pub enum Mode {
        /// Full configuration check.
        Config => "CONFIG",
        /// Downloaders only.
        Download => "DOWNLOAD",
        /// Assemblers only.
        Assemble => "ASSEMBLE",
        /// Full release: configuration plus paths on disk.
        Full => "FULL",
        /// Changelog only.
        Changelog => "CHANGELOG",
        /// Announcers only.
        Announce => "ANNOUNCE",
        /// Deployers only.
        Deploy => "DEPLOY",
    }
}

impl Mode {
    /// Validates the whole configuration.
    pub const fn validate_config(self) -> bool {
        matches!(self, Self::Config | Self::Full)
    }

    /// Validates assemblers.
    pub const fn validate_assembly(self) -> bool {
        matches!(self, Self::Assemble)
    }

    /// Validates downloaders.
    pub const fn validate_download(self) -> bool {
        matches!(self, Self::Download)
    }

    /// Validates announcers.
    pub const fn validate_announce(self) -> bool {
        matches!(self, Self::Announce)
    }

    /// Validates deployers.
    pub const fn validate_deploy(self) -> bool {
        matches!(self, Self::Deploy)
    }

    /// Validates the changelog.
    pub const fn validate_changelog(self) -> bool {
        matches!(self, Self::Changelog)
    }

    /// Runs one workflow step on its own, honoring include/exclude filters.
    pub const fn validate_standalone(self) -> bool {
        !self.validate_config()
    }

    /// Checks that configured paths exist.
    pub const fn validate_paths(self) -> bool {
        matches!(self, Self::Full)
    }
}

keyword_enum! {
    /// Workflow command being run.
    pub enum Command {
        /// Validate configuration.
        Config => "config",
        /// Download assets.
        Download => "download",
        /// Assemble artifacts.
        Assemble => "assemble",
        /// Generate the changelog.
        Changelog => "changelog",
        /// Compute checksums.
        Checksum => "checksum",
        /// Generate catalogs.
        Catalog => "catalog",
        /// Sign files.
        Sign => "sign",
        /// Deploy staged artifacts.
        Deploy => "deploy",
        /// Upload artifacts.
        Upload => "upload",
        /// Create the release.
        Release => "release",
        /// Prepare packager files.
        Prepare => "prepare",
        /// Package distributions.
        Package => "package",
        /// Publish packages.
        Publish => "publish",
        /// Announce the release.
        Announce => "announce",
        /// Every step.
        FullRelease => "full-release",
    }
}

keyword_enum! {
    /// Integration categories that accept include/exclude filters.
    pub enum Scope {
        /// Announcer types.
        Announcers => "announcers",
        /// Named HTTP announcers.
        HttpAnnouncers => "http-announcers",
        /// Named webhooks.
        Webhooks => "webhooks",
        /// Assembler types.
        AssemblerTypes => "assembler-types",
        /// Assembler names.
        AssemblerNames => "assembler-names",
        /// Catalogers.
        Catalogers => "catalogers",
        /// SBOM catalogers.
        SbomCatalogers => "sbom-catalogers",
        /// Distribution names.
        Distributions => "distributions",
        /// Distribution types.
        DistributionTypes => "distribution-types",
        /// Packagers.
        Packagers => "packagers",
        /// Downloader types.
        DownloaderTypes => "downloader-types",
        /// Downloader names.
        DownloaderNames => "downloader-names",
        /// Deployer types.
        DeployerTypes => "deployer-types",
        /// Deployer names.
        DeployerNames => "deployer-names",
        /// Uploader types.
        UploaderTypes => "uploader-types",
        /// Uploader names.
        UploaderNames => "uploader-names",
        /// Hook kinds (`command`, `script`).
        Hooks => "hooks",
        /// Hook phases (`before`, `success`, `failure`).
        HookPhases => "hook-phases",
        /// SWID tags.
        SwidTags => "swid-tags",
        /// Extensions.
        Extensions => "extensions",
    }
}

/// Include/exclude lists per [`Scope`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    includes: IndexMap<Scope, Vec<String>>,
    excludes: IndexMap<Scope, Vec<String>>,
}

impl Filters {
    /// Only accept `names` in `scope`.
    pub fn include<I, S>(mut self, scope: Scope, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.entry(scope).or_default().extend(names.into_iter().map(Into::into));
        self
    }

    /// Reject `names` in `scope`.
    pub fn exclude<I, S>(mut self, scope: Scope, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.entry(scope).or_default().extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether `name` passes the filters of `scope`. Matching ignores case
    /// and `-`/`_` differences.
    pub fn accepts(&self, scope: Scope, name: &str) -> bool {
        let wanted = crate::keyword::normalize(name);
        let matches = |list: Option<&Vec<String>>| {
            list.is_some_and(|l| l.iter().any(|n| crate::keyword::normalize(n) == wanted))
        };
        let included = self.includes.get(&scope).is_none_or(Vec::is_empty)
            || matches(self.includes.get(&scope));
        included && !matches(self.excludes.get(&scope))
    }

    /// True when no scope has entries.
    pub fn is_empty(&self) -> bool {
        self.includes.values().chain(self.excludes.values()).all(Vec::is_empty)
    }
}

/// Subdirectories of the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDir {
    /// Checksum files.
    Checksums,
    /// Catalogs.
    Catalogs,
    /// Signatures.
    Signatures,
    /// Prepared packager files.
    Prepare,
    /// Packaged distributions.
    Package,
    /// Assembler outputs.
    Assemble,
    /// Downloaded assets.
    Download,
    /// Transformed artifacts.
    Artifacts,
    /// Deployment staging.
    Deploy,
}

impl OutputDir {
    /// Directory name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checksums => "checksums",
            Self::Catalogs => "catalogs",
            Self::Signatures => "signatures",
            Self::Prepare => "prepare",
            Self::Package => "package",
            Self::Assemble => "assemble",
            Self::Download => "download",
            Self::Artifacts => "artifacts",
            Self::Deploy => "deploy",
        }
    }
}

/// Run-level settings, fixed once the context is built.
#[derive(Debug)]
pub struct Settings {
    /// Directory relative paths resolve against.
    pub basedir: Utf8PathBuf,
    /// Root of everything the run writes.
    pub output_directory: Utf8PathBuf,
    /// What is validated.
    pub mode: Mode,
    /// Command being run.
    pub command: Command,
    /// Do not require secrets or touch remote services.
    pub dry_run: bool,
    /// Deprecations are errors.
    pub strict: bool,
    /// Look for the repository root above the base directory.
    pub git_root_search: bool,
    /// Platforms kept or dropped.
    pub selection: PlatformSelection,
    /// Platform of the running host.
    pub host_platform: String,
    /// Include/exclude filters.
    pub filters: Filters,
    /// Property sources.
    pub properties: PropertyResolver,
}

impl Settings {
    /// A subdirectory of the output directory.
    pub fn directory(&self, dir: OutputDir) -> Utf8PathBuf {
        self.output_directory.join(dir.as_str())
    }

    /// Assembly directory of one assembler.
    pub fn assemble_directory(&self, assembler_kind: &str, name: &str) -> Utf8PathBuf {
        self.directory(OutputDir::Assemble).join(name).join(assembler_kind)
    }

    /// `path` joined onto the base directory unless absolute.
    pub fn resolve(&self, path: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.basedir.join(path)
        }
    }
}

/// Builder for [`Context`].
#[derive(Debug)]
pub struct ContextBuilder {
    basedir: Utf8PathBuf,
    output_directory: Option<Utf8PathBuf>,
    mode: Mode,
    command: Command,
    dry_run: bool,
    strict: bool,
    git_root_search: bool,
    selected_platforms: Vec<String>,
    rejected_platforms: Vec<String>,
    filters: Filters,
    environment: Option<Box<dyn PropertySource>>,
    runtime_properties: IndexMap<String, String>,
    host_platform: Option<String>,
    commit: Option<Commit>,
    listeners: Vec<Box<dyn Listener>>,
}

impl ContextBuilder {
    /// Builder rooted at `basedir`, in config mode.
    pub fn new(basedir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            basedir: basedir.into(),
            output_directory: None,
            mode: Mode::Config,
            command: Command::Config,
            dry_run: false,
            strict: false,
            git_root_search: false,
            selected_platforms: Vec::new(),
            rejected_platforms: Vec::new(),
            filters: Filters::default(),
            environment: None,
            runtime_properties: IndexMap::new(),
            host_platform: None,
            commit: None,
            listeners: Vec::new(),
        }
    }

    /// Output directory; defaults to `out/shipyard` under the base directory.
    pub fn output_directory(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.output_directory = Some(dir.into());
        self
    }

    /// Validation mode.
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Command being run.
    pub const fn command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    /// Dry run.
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Strict mode.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Search for the repository root above the base directory.
    pub const fn git_root_search(mut self, search: bool) -> Self {
        self.git_root_search = search;
        self
    }

    /// Keep only these platforms.
    pub fn select_platforms(mut self, platforms: Vec<String>) -> Self {
        self.selected_platforms = platforms;
        self
    }

    /// Drop these platforms.
    pub fn reject_platforms(mut self, platforms: Vec<String>) -> Self {
        self.rejected_platforms = platforms;
        self
    }

    /// Include/exclude filters.
    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Environment source; defaults to the process environment.
    pub fn environment(mut self, source: Box<dyn PropertySource>) -> Self {
        self.environment = Some(source);
        self
    }

    /// Runtime properties (`-P key=value`).
    pub fn runtime_properties(mut self, properties: IndexMap<String, String>) -> Self {
        self.runtime_properties = properties;
        self
    }

    /// Host platform; detected when unset.
    pub fn host_platform(mut self, platform: impl Into<String>) -> Self {
        self.host_platform = Some(platform.into());
        self
    }

    /// Head commit. Release validation only runs when one is known.
    pub fn commit(mut self, commit: Commit) -> Self {
        self.commit = Some(commit);
        self
    }

    /// Register a listener.
    pub fn listener(mut self, listener: Box<dyn Listener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Build the context around `model`.
    ///
    /// Unknown platform selectors fail here rather than being recorded,
    /// as does a base directory that does not exist. An unreadable variables
    /// file is recorded as a warning.
    #[instrument(skip_all, fields(basedir = %self.basedir, mode = %self.mode))]
    pub fn build(self, mut model: Model) -> ContextResult<Context> {
        let selection = PlatformSelection::new(self.selected_platforms, self.rejected_platforms)?;
        if !self.basedir.is_dir() {
            return Err(ContextError::MissingBasedir { path: self.basedir });
        }

        let mut errors = Errors::default();
        let environment = self.environment.unwrap_or_else(|| Box::new(ProcessEnv));
        let mut properties = PropertyResolver::new(environment)
            .with_runtime(self.runtime_properties)
            .with_inline(model.environment.properties.clone());

        if let Some(file) = model.environment.variables.as_deref().filter(|f| !f.trim().is_empty()) {
            let path = if Utf8Path::new(file).is_absolute() {
                Utf8PathBuf::from(file)
            } else {
                self.basedir.join(file)
            };
            match load_variables(&path) {
                Ok(variables) => {
                    debug!(path = %path, count = variables.len(), "loaded variables");
                    properties = properties.with_variables(variables);
                }
                Err(err) => errors.warning(msg!(
                    "context_variables_unreadable",
                    path = path,
                    error = err
                )),
            }
        }

        if self.commit.is_some() {
            model.commit = self.commit;
        }

        let output_directory = self
            .output_directory
            .unwrap_or_else(|| self.basedir.join(DEFAULT_OUTPUT_DIRECTORY));

        let settings = Settings {
            basedir: self.basedir,
            output_directory,
            mode: self.mode,
            command: self.command,
            dry_run: self.dry_run,
            strict: self.strict,
            git_root_search: self.git_root_search,
            selection,
            host_platform: self.host_platform.unwrap_or_else(platform::current),
            filters: self.filters,
            properties,
        };
        debug!(output = %settings.output_directory, host = %settings.host_platform, "context ready");

        Ok(Context {
            settings,
            model,
            errors,
            listeners: self.listeners,
            frozen: None,
        })
    }
}

/// One invocation's model, settings and outcome.
#[derive(Debug)]
pub struct Context {
    settings: Settings,
    model: Model,
    errors: Errors,
    listeners: Vec<Box<dyn Listener>>,
    frozen: Option<Arc<ContextView>>,
}

impl Context {
    /// Run settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The model.
    pub const fn model(&self) -> &Model {
        &self.model
    }

    /// The model, mutably. Drops any frozen view.
    pub fn model_mut(&mut self) -> &mut Model {
        self.frozen = None;
        &mut self.model
    }

    /// Everything recorded so far.
    pub const fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Release status of the model.
    pub fn lifecycle(&self) -> Lifecycle {
        self.model.lifecycle()
    }

    /// Resolve, default and cross-check the whole model.
    ///
    /// Every stage runs even when earlier ones recorded errors. Warnings
    /// are logged before errors, then the run report is written.
    /// Session events are not fired here; callers wrap the pass in
    /// [`Event::SessionStart`] and [`Event::SessionEnd`] through [`Context::fire`].
    #[instrument(skip_all, fields(mode = %self.settings.mode, command = %self.settings.command))]
    pub fn validate_model(&mut self) -> Result<&Errors, ReportError> {
        self.frozen = None;
        validation::validate(&self.settings, &mut self.model, &mut self.errors);
        self.errors.log_warnings();
        self.errors.log_errors();
        self.report()?;
        Ok(&self.errors)
    }

    /// Scan assembler outputs on disk and attach them as artifacts.
    ///
    /// Missing outputs are recorded as assembly errors.
    #[instrument(skip_all)]
    pub fn resolve_outputs(&mut self) -> &Errors {
        self.frozen = None;
        crate::outputs::resolve_all(&self.settings, &mut self.model, &mut self.errors);
        &self.errors
    }

    /// Report values: resolved project metadata, commit, tag, platform and
    /// the project's extra properties, sorted by key.
    pub fn report_values(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        let project = &self.model.project;
        let lifecycle = self.lifecycle();
        let mut put = |key: &str, value: Option<&str>| {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                values.insert(key.to_string(), value.to_string());
            }
        };

        put("projectName", project.name.as_deref());
        put("projectVersion", project.version.as_deref());
        put("projectSnapshot", Some(if lifecycle.snapshot { "true" } else { "false" }));
        put("projectPrerelease", Some(if lifecycle.prerelease { "true" } else { "false" }));
        put("platform", Some(self.settings.host_platform.as_str()));
        if let Some(commit) = &self.model.commit {
            put("commitFullHash", Some(commit.full_hash.as_str()));
            put("commitShortHash", Some(commit.short_hash.as_str()));
            put("commitRef", Some(commit.ref_name.as_str()));
        }
        if let Some((kind, service)) = self.model.release.service() {
            put("releaseService", Some(kind.as_str()));
            put("tagName", service.tag_name.as_deref());
            put("releaseName", service.release_name.as_deref());
        }
        for (key, value) in &project.extra_properties {
            put(&format!("project{}", crate::text::capitalize(key)), Some(value.as_str()));
        }
        values
    }

    /// Write [`REPORT_FILE`] under the output directory.
    #[instrument(skip_all)]
    pub fn report(&self) -> Result<Utf8PathBuf, ReportError> {
        let path = self.settings.output_directory.join(REPORT_FILE);
        let io = |source| ReportError::Io {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&self.settings.output_directory).map_err(io)?;

        let body: String = self
            .report_values()
            .into_iter()
            .map(|(key, value)| format!("{key}={}\n", escape_property(&value)))
            .collect();
        std::fs::write(&path, body).map_err(io)?;
        debug!(path = %path, "report written");
        Ok(path)
    }

    /// Read-only snapshot for listeners and extension code, cached until the
    /// model is next mutated.
    pub fn freeze(&mut self) -> Arc<ContextView> {
        if let Some(view) = &self.frozen {
            return Arc::clone(view);
        }
        let view = Arc::new(ContextView::new(&self.settings, self.model.clone(), self.errors.clone()));
        self.frozen = Some(Arc::clone(&view));
        view
    }

    /// Notify every listener of `event`, stopping at the first failure.
    #[instrument(skip_all, fields(event = %event))]
    pub fn fire(&mut self, event: Event) -> Result<(), ListenerError> {
        if self.listeners.is_empty() {
            return Ok(());
        }
        let view = self.freeze();
        for listener in &self.listeners {
            trace!(listener = listener.name(), "dispatching");
            listener.on_event(&view, &event).map_err(|err| ListenerError::Failed {
                listener: listener.name().to_string(),
                event: event.to_string(),
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Escape a value for a Java-style properties file.
fn escape_property(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' => out.push_str("\\="),
            ':' => out.push_str("\\:"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::tests::Recorder;
    use crate::property::MapSource;
    use tempfile::TempDir;

    fn tempdir() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        (tmp, path)
    }

    #[test]
    fn unsupported_platform_fails_fast() {
        let (_tmp, dir) = tempdir();
        let err = ContextBuilder::new(dir)
            .select_platforms(vec!["plan9-x86_64".into()])
            .build(Model::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ContextError::UnsupportedPlatform { option: "select-platform", .. }
        ));
    }

    #[test]
    fn missing_basedir_fails() {
        let (_tmp, dir) = tempdir();
        let err = ContextBuilder::new(dir.join("nope")).build(Model::default()).unwrap_err();
        assert!(matches!(err, ContextError::MissingBasedir { .. }));
    }

    #[test]
    fn unreadable_variables_file_is_a_warning() {
        let (_tmp, dir) = tempdir();
        let mut model = Model::default();
        model.environment.variables = Some("missing.toml".into());
        let context = ContextBuilder::new(dir)
            .environment(Box::new(MapSource::new()))
            .build(model)
            .unwrap();
        assert!(context.errors().contains_key("context_variables_unreadable"));
        assert!(!context.errors().has_errors());
    }

    #[test]
    fn variables_file_feeds_properties() {
        let (_tmp, dir) = tempdir();
        std::fs::write(dir.join("vars.toml"), "[announce.slack]\ntoken = \"from-file\"\n").unwrap();
        let mut model = Model::default();
        model.environment.variables = Some("vars.toml".into());
        let context = ContextBuilder::new(dir)
            .environment(Box::new(MapSource::new()))
            .build(model)
            .unwrap();
        assert_eq!(
            context.settings().properties.lookup("announce.slack.token").as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn report_keys_are_sorted() {
        let (_tmp, dir) = tempdir();
        let mut model = Model::default();
        model.project.name = Some("app".into());
        model.project.version = Some("1.0.0".into());
        model.project.extra_properties.insert("zeta".into(), "z".into());
        model.project.extra_properties.insert("alpha".into(), "a=b".into());
        let context = ContextBuilder::new(dir.clone())
            .environment(Box::new(MapSource::new()))
            .host_platform("linux-x86_64")
            .build(model)
            .unwrap();

        let path = context.report().unwrap();
        assert_eq!(path, dir.join(DEFAULT_OUTPUT_DIRECTORY).join(REPORT_FILE));
        let body = std::fs::read_to_string(path).unwrap();
        let keys: Vec<&str> = body.lines().map(|l| l.split('=').next().unwrap()).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert!(body.contains("projectAlpha=a\\=b"));
        assert!(body.contains("platform=linux-x86_64"));
    }

    #[test]
    fn report_writes_one_line_per_value() {
        let (_tmp, dir) = tempdir();
        let mut model = Model::default();
        model.project.extra_properties.insert("note".into(), "two\nlines".into());
        let context = ContextBuilder::new(dir)
            .environment(Box::new(MapSource::new()))
            .build(model)
            .unwrap();

        let body = std::fs::read_to_string(context.report().unwrap()).unwrap();
        assert!(body.ends_with('\n'));
        assert_eq!(body.lines().count(), context.report_values().len());
        assert!(body.contains("projectNote=two\\nlines\n"));
    }

    #[test]
    fn freeze_is_cached_until_mutation() {
        let (_tmp, dir) = tempdir();
        let mut context = ContextBuilder::new(dir)
            .environment(Box::new(MapSource::new()))
            .build(Model::default())
            .unwrap();
        let first = context.freeze();
        let second = context.freeze();
        assert!(Arc::ptr_eq(&first, &second));

        context.model_mut().project.name = Some("changed".into());
        let third = context.freeze();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.model().project.name.as_deref(), Some("changed"));
        assert!(first.model().project.name.is_none());
    }

    #[test]
    fn fire_stops_at_first_failure() {
        let (_tmp, dir) = tempdir();
        let ok = Recorder::new("first", None);
        let failing = Recorder::new("second", Some("boom"));
        let never = Recorder::new("third", None);
        let (ok_seen, failing_seen, never_seen) = (ok.seen(), failing.seen(), never.seen());

        let mut context = ContextBuilder::new(dir)
            .environment(Box::new(MapSource::new()))
            .listener(Box::new(ok))
            .listener(Box::new(failing))
            .listener(Box::new(never))
            .build(Model::default())
            .unwrap();

        let err = context.fire(Event::SessionStart).unwrap_err();
        assert_eq!(
            err,
            ListenerError::Failed {
                listener: "second".into(),
                event: "session-start".into(),
                reason: "boom".into(),
            }
        );
        assert_eq!(ok_seen.lock().unwrap().len(), 1);
        assert_eq!(failing_seen.lock().unwrap().len(), 1);
        assert!(never_seen.lock().unwrap().is_empty());
    }

    #[test]
    fn filters_match_loosely() {
        let filters = Filters::default()
            .include(Scope::Announcers, ["slack", "google-chat"])
            .exclude(Scope::Announcers, ["slack"]);
        assert!(filters.accepts(Scope::Announcers, "google_chat"));
        assert!(!filters.accepts(Scope::Announcers, "slack"));
        assert!(!filters.accepts(Scope::Announcers, "discord"));
        assert!(filters.accepts(Scope::Packagers, "brew"));
    }

    #[test]
    fn mode_predicates() {
        assert!(Mode::Full.validate_config());
        assert!(Mode::Full.validate_paths());
        assert!(!Mode::Config.validate_paths());
        assert!(Mode::Assemble.validate_standalone());
        assert!(!Mode::Config.validate_standalone());
    }
}
