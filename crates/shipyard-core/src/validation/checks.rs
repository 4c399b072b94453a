//! Shared helpers handed to every validation stage.
//!
//! A [`Checks`] bundles the run settings, a snapshot of project facts and
//! the error sink. Stages call its helpers instead of touching the property
//! resolver or the error list directly.

use camino::Utf8Path;
use url::Url;

use crate::activation::{self, Activatable, Active, Lifecycle};
use crate::context::{Mode, Settings};
use crate::errors::Errors;
use crate::messages::Message;
use crate::model::release::ServiceKind;
use crate::model::{HttpMethod, Model, UnitBase};
use crate::msg;
use crate::property::Missing;
use crate::template::TemplateContext;
use crate::text::{Blank, default_to};

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT: u32 = 20;
/// Default read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT: u32 = 60;
/// Upper bound for both timeouts.
pub const MAX_TIMEOUT: u32 = 300;

/// Directory probed for default message templates.
pub const TEMPLATES_DIRECTORY: &str = "src/shipyard/templates";

/// Project and release facts, recomputed before every stage.
#[derive(Debug, Clone, Default)]
pub struct Facts {
    /// Release status of the project version.
    pub lifecycle: Lifecycle,
    /// Placeholder values for names and paths.
    pub templates: TemplateContext,
    /// First configured release service.
    pub service: Option<ServiceKind>,
    /// Repository owner of the release service.
    pub owner: Option<String>,
    /// Repository name of the release service.
    pub repo: Option<String>,
    /// Token of the release service, once resolved.
    pub token: Option<String>,
    /// Signing resolved to enabled.
    pub signing: bool,
}

impl Facts {
    /// Snapshot `model`.
    pub fn gather(model: &Model) -> Self {
        let project = &model.project;
        let mut templates = TemplateContext::new();
        let mut set = |key: &str, value: Option<&str>| {
            if let Some(value) = value.and_then(|v| v.non_blank()) {
                templates.set(key, value);
            }
        };
        set("projectName", project.name.as_deref());
        set("projectVersion", project.version.as_deref());
        set("projectDescription", project.description.as_deref());
        set("projectLicense", project.license.as_deref());
        set("projectVendor", project.vendor.as_deref());
        set("projectSnapshotLabel", project.snapshot.label.as_deref());

        let service = model.release.service();
        if let Some((kind, git)) = service {
            set("releaseService", Some(kind.as_str()));
            set("repoHost", git.host.as_deref());
            set("repoOwner", git.owner.as_deref());
            set("repoName", git.name.as_deref());
            set("tagName", git.tag_name.as_deref());
            set("releaseName", git.release_name.as_deref());
            set("milestoneName", git.milestone.name.as_deref());
            if let Some(url) = git.repo_url() {
                let tag = git.tag_name.as_deref().unwrap_or_default();
                set("repoUrl", Some(url.as_str()));
                set("releaseNotesUrl", Some(format!("{url}/releases/tag/{tag}").as_str()));
            }
        }
        if let Some(commit) = &model.commit {
            set("commitFullHash", Some(commit.full_hash.as_str()));
            set("commitShortHash", Some(commit.short_hash.as_str()));
        }
        for (key, value) in &project.extra_properties {
            set(&format!("project{}", crate::text::capitalize(key)), Some(value.as_str()));
        }

        Self {
            lifecycle: model.lifecycle(),
            templates,
            service: service.map(|(kind, _)| kind),
            owner: service.and_then(|(_, git)| git.owner.clone()),
            repo: service.and_then(|(_, git)| git.name.clone()),
            token: service.and_then(|(_, git)| git.token.clone()),
            signing: model.signing.enabled,
        }
    }
}

/// Settings, facts and the error sink for one stage.
#[derive(Debug)]
pub struct Checks<'a> {
    /// Run settings.
    pub settings: &'a Settings,
    /// Facts gathered before the stage.
    pub facts: Facts,
    /// Where problems go.
    pub errors: &'a mut Errors,
    /// Mode being validated; nested scopes may differ from the run's.
    pub mode: Mode,
}

impl<'a> Checks<'a> {
    /// Checks for one stage.
    pub fn new(settings: &'a Settings, facts: Facts, errors: &'a mut Errors, mode: Mode) -> Self {
        Self {
            settings,
            facts,
            errors,
            mode,
        }
    }

    /// Running without side effects.
    pub const fn dry_run(&self) -> bool {
        self.settings.dry_run
    }

    /// Resolve a unit's activation against the project lifecycle.
    pub fn resolve<U: Activatable + ?Sized>(&self, unit: &mut U, default: Active) -> bool {
        activation::resolve(unit, default, self.facts.lifecycle)
    }

    /// Record a configuration error.
    pub fn error(&mut self, message: Message) {
        self.errors.configuration(message);
    }

    /// Record a warning.
    pub fn warn(&mut self, message: Message) {
        self.errors.warning(message);
    }

    /// A deprecated field was used; an error under `--strict`.
    pub fn deprecated(&mut self, property: &str, replacement: &str) {
        let message = msg!("validation_deprecated", property = property, replacement = replacement);
        if self.settings.strict {
            self.errors.configuration(message);
        } else {
            self.errors.nag(message);
        }
    }

    /// Resolve a required secret or setting into `slot`.
    ///
    /// Records `validation_property_missing` unless running dry.
    pub fn require_property<K: AsRef<str>>(&mut self, keys: &[K], slot: &mut Option<String>, property: &str) {
        let missing = Missing::Error {
            property,
            dry_run: self.dry_run(),
        };
        let value = self
            .settings
            .properties
            .check(keys, slot.as_deref(), missing, self.errors);
        if value.is_some() {
            *slot = value;
        }
    }

    /// Resolve an optional setting into `slot`.
    pub fn optional_property<K: AsRef<str>>(&mut self, keys: &[K], slot: &mut Option<String>) {
        let value = self
            .settings
            .properties
            .check(keys, slot.as_deref(), Missing::Ignore, self.errors);
        if value.is_some() {
            *slot = value;
        }
    }

    /// Resolve a setting into `slot`, falling back to `default`.
    pub fn property_or<K: AsRef<str>>(&mut self, keys: &[K], slot: &mut Option<String>, default: &str) {
        *slot = self
            .settings
            .properties
            .check(keys, slot.as_deref(), Missing::Default(default), self.errors);
    }

    /// Record `validation_must_not_be_blank` when `value` is blank.
    pub fn not_blank(&mut self, value: Option<&str>, field: &str) -> bool {
        if value.is_none_or(str::is_blank) {
            self.error(msg!("validation_must_not_be_blank", field = field));
            return false;
        }
        true
    }

    /// Default both timeouts of a unit and bound them.
    pub fn timeouts(&mut self, scope: &str, base: &mut UnitBase) {
        self.timeout_pair(scope, &mut base.connect_timeout, &mut base.read_timeout);
    }

    /// Default and bound a connect/read timeout pair.
    pub fn timeout_pair(&mut self, scope: &str, connect: &mut Option<u32>, read: &mut Option<u32>) {
        for (field, slot, default) in [
            ("connect_timeout", connect, DEFAULT_CONNECT_TIMEOUT),
            ("read_timeout", read, DEFAULT_READ_TIMEOUT),
        ] {
            let value = *slot.get_or_insert(default);
            if value > MAX_TIMEOUT {
                self.errors.configuration(msg!(
                    "validation_timeout_range",
                    field = format!("{scope}.{field}"),
                    value = value,
                    max = MAX_TIMEOUT
                ));
            }
        }
    }

    /// Require `value` to be an absolute http(s) URL.
    pub fn http_url(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value.and_then(|v| v.non_blank()) else {
            return;
        };
        // Unexpanded placeholders are checked once the facts exist.
        if crate::template::has_placeholders(value) {
            return;
        }
        let valid = Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        if !valid {
            self.error(msg!("validation_invalid_url", field = field, url = value));
        }
    }

    /// Default the HTTP method.
    pub fn method(slot: &mut Option<HttpMethod>, default: HttpMethod) {
        slot.get_or_insert(default);
    }

    /// Settle a message template against its inline message.
    ///
    /// An explicitly configured template must exist. When none is set, the
    /// conventional `src/shipyard/templates/<kind>.tpl` is adopted if it
    /// exists; otherwise the inline message is used, defaulting to
    /// `default_message`. Settling twice gives the same result.
    pub fn message_template(
        &mut self,
        scope: &str,
        kind: &str,
        template: &mut Option<String>,
        message: &mut Option<String>,
        default_message: &str,
    ) {
        let conventional = format!("{TEMPLATES_DIRECTORY}/{kind}.tpl");
        match template.non_blank().map(str::to_string) {
            Some(path) if self.settings.resolve(&path).is_file() => {}
            Some(path) if path == conventional => {
                *template = None;
                default_to(message, default_message);
            }
            Some(path) => {
                self.error(msg!(
                    "validation_template_missing",
                    field = format!("{scope}.template"),
                    path = path
                ));
            }
            None if message.is_blank() && self.settings.resolve(&conventional).is_file() => {
                *template = Some(conventional);
            }
            None => default_to(message, default_message),
        }
    }

    /// Require `path` to exist when the mode checks paths.
    pub fn existing_path(&mut self, field: &str, path: Option<&str>) {
        if !self.mode.validate_paths() {
            return;
        }
        if let Some(path) = path.and_then(|p| p.non_blank()) {
            if !self.settings.resolve(path).exists() {
                self.error(msg!("validation_path_missing", field = field, path = path));
            }
        }
    }

    /// True when `path`, relative to the base directory, is a file.
    pub fn is_file(&self, path: &str) -> bool {
        self.settings.resolve(path).is_file()
    }

    /// Base directory of the run.
    pub fn basedir(&self) -> &Utf8Path {
        &self.settings.basedir
    }
}

/// Candidate property keys for `field` of a unit: the scoped key first,
/// then the short `<kind>.<field>` form whose environment variable is
/// reported when missing.
pub fn keys(scope: &str, kind: &str, field: &str) -> Vec<String> {
    let scoped = format!("{scope}.{field}");
    let short = format!("{kind}.{field}");
    if scoped == short {
        vec![scoped]
    } else {
        vec![scoped, short]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::context::{Command, Filters};
    use crate::platform::PlatformSelection;
    use crate::property::{MapSource, PropertyResolver};
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) fn settings(basedir: &Utf8Path, env: MapSource) -> Settings {
        Settings {
            basedir: basedir.to_path_buf(),
            output_directory: basedir.join("out/shipyard"),
            mode: Mode::Config,
            command: Command::Config,
            dry_run: false,
            strict: false,
            git_root_search: false,
            selection: PlatformSelection::default(),
            host_platform: "linux-x86_64".into(),
            filters: Filters::default(),
            properties: PropertyResolver::new(Box::new(env)),
        }
    }

    fn tempdir() -> (TempDir, Utf8PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        (tmp, path)
    }

    #[test]
    fn keys_put_the_short_form_last() {
        assert_eq!(
            keys("announce.slack", "slack", "token"),
            ["announce.slack.token", "slack.token"]
        );
        assert_eq!(keys("slack", "slack", "token"), ["slack.token"]);
    }

    #[test]
    fn timeouts_default_and_bound() {
        let (_tmp, dir) = tempdir();
        let settings = settings(&dir, MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);

        let mut base = UnitBase::default();
        checks.timeouts("announce.slack", &mut base);
        assert_eq!(base.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert_eq!(base.read_timeout, Some(DEFAULT_READ_TIMEOUT));

        base.read_timeout = Some(301);
        checks.timeouts("announce.slack", &mut base);
        assert!(errors.contains_key("validation_timeout_range"));
    }

    #[test]
    fn urls_must_be_http() {
        let (_tmp, dir) = tempdir();
        let settings = settings(&dir, MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);
        checks.http_url("a", Some("https://example.com/hook"));
        checks.http_url("b", Some("https://{{repoOwner}}.example.com"));
        checks.http_url("c", Some("ftp://example.com"));
        checks.http_url("d", Some("not a url"));
        assert_eq!(errors.configuration_errors().len(), 2);
    }

    #[test]
    fn message_template_is_idempotent() {
        let (_tmp, dir) = tempdir();
        fs::create_dir_all(dir.join(TEMPLATES_DIRECTORY)).unwrap();
        fs::write(dir.join(TEMPLATES_DIRECTORY).join("slack.tpl"), "hi").unwrap();
        let settings = settings(&dir, MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);

        let (mut template, mut message) = (None, None);
        checks.message_template("announce.slack", "slack", &mut template, &mut message, "x");
        assert_eq!(template.as_deref(), Some("src/shipyard/templates/slack.tpl"));
        checks.message_template("announce.slack", "slack", &mut template, &mut message, "x");
        assert_eq!(template.as_deref(), Some("src/shipyard/templates/slack.tpl"));
        assert!(message.is_none());
        assert!(!errors.has_errors());
    }

    #[test]
    fn missing_conventional_template_falls_back_to_message() {
        let (_tmp, dir) = tempdir();
        let settings = settings(&dir, MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);

        let mut template = Some("src/shipyard/templates/slack.tpl".to_string());
        let mut message = None;
        checks.message_template("announce.slack", "slack", &mut template, &mut message, "released");
        assert!(template.is_none());
        assert_eq!(message.as_deref(), Some("released"));

        let mut template = Some("custom/slack.tpl".to_string());
        checks.message_template("announce.slack", "slack", &mut template, &mut message, "released");
        assert!(errors.contains_key("validation_template_missing"));
    }

    #[test]
    fn strict_turns_deprecations_into_errors() {
        let (_tmp, dir) = tempdir();
        let mut settings = settings(&dir, MapSource::new());
        let mut errors = Errors::default();
        Checks::new(&settings, Facts::default(), &mut errors, Mode::Config).deprecated("a", "b");
        assert!(!errors.has_errors());
        assert_eq!(errors.nags().len(), 1);

        settings.strict = true;
        let mut errors = Errors::default();
        Checks::new(&settings, Facts::default(), &mut errors, Mode::Config).deprecated("a", "b");
        assert!(errors.has_configuration_errors());
    }

    #[test]
    fn facts_expose_release_placeholders() {
        let mut model = Model::default();
        model.project.name = Some("app".into());
        model.project.version = Some("1.2.0".into());
        model.release.github = Some(crate::model::release::GitService {
            host: Some("github.com".into()),
            owner: Some("acme".into()),
            name: Some("app".into()),
            tag_name: Some("v1.2.0".into()),
            ..Default::default()
        });
        let facts = Facts::gather(&model);
        assert_eq!(facts.templates.render("{{repoOwner}}/{{projectName}}"), "acme/app");
        assert_eq!(
            facts.templates.get("releaseNotesUrl"),
            Some("https://github.com/acme/app/releases/tag/v1.2.0")
        );
        assert_eq!(facts.service, Some(ServiceKind::Github));
    }
}
