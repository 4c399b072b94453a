//! End-to-end validation through the public API.
//!
//! Each test loads a configuration file from a temporary project, builds a
//! context around it and validates the resulting model.

use camino::{Utf8Path, Utf8PathBuf};
use shipyard_core::context::{Mode, REPORT_FILE};
use shipyard_core::model::AssemblerKind;
use shipyard_core::property::MapSource;
use shipyard_core::{ConfigLoader, Context, ContextBuilder};
use tempfile::TempDir;

const PROJECT: &str = r#"
[project]
name = "cli"
version = "1.0.0"
authors = ["Ada Lovelace"]
"#;

fn project(extra: &str) -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
    std::fs::write(dir.join("shipyard.toml"), format!("{PROJECT}{extra}")).unwrap();
    (tmp, dir)
}

fn context(dir: &Utf8Path, mode: Mode, env: MapSource) -> Context {
    let loaded = ConfigLoader::new()
        .with_user_config(false)
        .with_file(dir.join("shipyard.toml"))
        .load()
        .unwrap();
    ContextBuilder::new(dir)
        .mode(mode)
        .environment(Box::new(env))
        .host_platform("linux-x86_64")
        .build(loaded.model)
        .unwrap()
}

const ARCHIVE: &str = r#"
[assemble.archive.cli]
active = "always"
formats = ["zip"]
"#;

#[test]
fn minimal_project_is_valid() {
    let (_tmp, dir) = project("");
    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(!errors.has_errors(), "{errors:?}");

    let report = std::fs::read_to_string(dir.join("out/shipyard").join(REPORT_FILE)).unwrap();
    assert!(report.contains("projectName=cli"));
    assert!(report.contains("projectVersion=1.0.0"));
}

#[test]
fn assembled_archive_is_published_as_a_distribution() {
    let (_tmp, dir) = project(ARCHIVE);
    let out = dir.join("out/shipyard/assemble/cli/archive");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("cli-1.0.0.zip"), b"zip").unwrap();

    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(!errors.has_errors(), "{errors:?}");

    let view = context.freeze();
    let cli = view.distribution("cli").expect("synthesized distribution");
    assert_eq!(cli.assembled_by, Some(AssemblerKind::Archive));
    assert_eq!(cli.artifacts.len(), 1);
    assert_eq!(view.enabled_distributions().count(), 1);
    assert!(view.assembler("cli").is_some());
}

#[test]
fn declared_archive_artifact_is_not_duplicated() {
    let declared = r#"
[[distributions.cli.artifacts]]
path = "out/shipyard/assemble/cli/archive/cli-1.0.0.zip"
platform = "linux-x86_64"
"#;
    let (_tmp, dir) = project(&format!("{ARCHIVE}{declared}"));
    let out = dir.join("out/shipyard/assemble/cli/archive");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("cli-1.0.0.zip"), b"zip").unwrap();

    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(!errors.has_errors(), "{errors:?}");

    let view = context.freeze();
    let cli = view.distribution("cli").expect("declared distribution");
    assert_eq!(cli.assembled_by, Some(AssemblerKind::Archive));
    assert_eq!(cli.artifacts.len(), 1);
    assert_eq!(cli.artifacts[0].platform.as_deref(), Some("linux-x86_64"));
    assert_eq!(cli.artifacts[0].resolved.as_ref(), Some(&out.join("cli-1.0.0.zip")));
}

#[test]
fn archive_name_survives_revalidation() {
    let (_tmp, dir) = project(ARCHIVE);
    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(!errors.has_errors(), "{errors:?}");
    assert!(errors.contains_key("assembly_output_missing"));
    let first = context.model().assemble.archive["cli"].archive_name.clone();
    assert!(first.is_some());

    context.validate_model().unwrap();
    assert_eq!(context.model().assemble.archive["cli"].archive_name, first);
}

#[test]
fn missing_assembly_output_is_an_assembly_error() {
    let (_tmp, dir) = project(ARCHIVE);
    let mut context = context(&dir, Mode::Assemble, MapSource::new());
    context.validate_model().unwrap();
    let errors = context.resolve_outputs();
    assert!(errors.contains_key("assembly_output_missing"));
    assert!(!errors.has_configuration_errors());
}

const SLACK: &str = r#"
[announce.slack]
active = "always"
"#;

#[test]
fn slack_without_credentials_is_rejected() {
    let (_tmp, dir) = project(SLACK);
    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(errors.contains_key("validation_slack_token"));
}

#[test]
fn configured_values_beat_the_environment() {
    let (_tmp, dir) = project(&format!("{SLACK}token = \"configured\"\n"));
    let env = MapSource::new().with("SHIPYARD_ANNOUNCE_SLACK_TOKEN", "from-env");
    let mut context = context(&dir, Mode::Config, env);
    assert!(!context.validate_model().unwrap().has_errors());
    assert_eq!(context.model().announce.slack.token.as_deref(), Some("configured"));
}

#[test]
fn blank_values_fall_back_to_the_environment() {
    let (_tmp, dir) = project(&format!("{SLACK}token = \" \"\n"));
    let env = MapSource::new().with("SHIPYARD_ANNOUNCE_SLACK_TOKEN", "from-env");
    let mut context = context(&dir, Mode::Config, env);
    assert!(!context.validate_model().unwrap().has_errors());
    assert_eq!(context.model().announce.slack.token.as_deref(), Some("from-env"));
}

#[test]
fn disabled_units_are_not_checked() {
    let (_tmp, dir) = project("[announce.slack]\nactive = \"never\"\n");
    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(!errors.has_errors(), "{errors:?}");
    assert!(!context.model().announce.slack.base.enabled);
}

#[test]
fn explicitly_enabled_containers_survive_without_children() {
    let (_tmp, dir) = project("[announce]\nenabled = true\n\n[assemble]\nenabled = true\n");
    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(!errors.has_errors(), "{errors:?}");
    assert!(context.model().announce.enabled);
    assert!(context.model().assemble.enabled);
}

#[test]
fn containers_without_children_are_disabled() {
    let (_tmp, dir) = project("");
    let mut context = context(&dir, Mode::Config, MapSource::new());
    context.validate_model().unwrap();
    assert!(!context.model().announce.enabled);
    assert!(!context.model().assemble.enabled);
}

#[test]
fn enabled_false_disables_a_unit() {
    let (_tmp, dir) = project(&format!("{SLACK}enabled = false\n"));
    let mut context = context(&dir, Mode::Config, MapSource::new());
    let errors = context.validate_model().unwrap();
    assert!(!errors.contains_key("validation_slack_token"));
    assert!(!context.model().announce.slack.base.enabled);
}
