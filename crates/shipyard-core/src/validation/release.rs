//! The release service.

use regex::Regex;

use super::checks::Checks;
use crate::error::{ValidationError, ValidationResult};
use crate::model::Model;
use crate::model::release::{GitService, ServiceKind, Sort, UpdateSection};
use crate::msg;
use crate::text::{Blank, default_to};

/// Commit author used for tags and packager repositories.
pub const DEFAULT_AUTHOR_NAME: &str = "shipyard-bot";
/// E-mail of [`DEFAULT_AUTHOR_NAME`].
pub const DEFAULT_AUTHOR_EMAIL: &str = "shipyard-bot@users.noreply.github.com";

const DEFAULT_CHANGELOG_FORMAT: &str = "- {{commitShortHash}} {{commitTitle}}";

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let configured: Vec<ServiceKind> = model.release.services().into_iter().map(|(kind, _)| kind).collect();
    match configured.as_slice() {
        [] => {
            checks.error(msg!("validation_release_service_missing"));
            return Ok(());
        }
        [_] => {}
        many => {
            let names: Vec<&str> = many.iter().map(|k| k.as_str()).collect();
            checks.error(msg!("validation_release_service_multiple", services = names.join(", ")));
        }
    }

    let snapshot = checks.facts.lifecycle.snapshot;
    let prerelease = checks.facts.lifecycle.prerelease;
    let snapshot_label = model.project.snapshot.label.clone();
    let Some((kind, service)) = model.release.service_mut() else {
        return Ok(());
    };
    if service.enabled == Some(false) {
        return Ok(());
    }
    let scope = format!("release.{kind}");

    if let Some(host) = kind.default_host() {
        default_to(&mut service.host, host);
    }
    if kind != ServiceKind::Generic {
        checks.not_blank(service.owner.as_deref(), &format!("{scope}.owner"));
        checks.not_blank(service.name.as_deref(), &format!("{scope}.name"));
    }
    let token_keys = [format!("{scope}.token"), format!("{kind}.token")];
    if kind.needs_token() {
        checks.require_property(&token_keys, &mut service.token, &format!("{scope}.token"));
    } else {
        checks.optional_property(&token_keys, &mut service.token);
    }
    checks.optional_property(&[format!("{scope}.username"), format!("{kind}.username")], &mut service.username);

    match api_endpoint(kind) {
        Some(endpoint) => default_to(&mut service.api_endpoint, endpoint),
        None if kind == ServiceKind::Gitea => {
            checks.not_blank(service.api_endpoint.as_deref(), &format!("{scope}.api_endpoint"));
        }
        None => {}
    }
    checks.http_url(&format!("{scope}.api_endpoint"), service.api_endpoint.as_deref());

    match snapshot_label.filter(|_| snapshot) {
        Some(label) => default_to(&mut service.tag_name, label),
        None => default_to(&mut service.tag_name, "v{{projectVersion}}"),
    }
    default_to(&mut service.release_name, "Release {{tagName}}");
    default_to(&mut service.branch, "main");
    default_to(&mut service.milestone.name, "{{tagName}}");
    service.milestone.close.get_or_insert(true);
    default_to(&mut service.commit_author.name, DEFAULT_AUTHOR_NAME);
    default_to(&mut service.commit_author.email, DEFAULT_AUTHOR_EMAIL);
    for flag in [
        &mut service.sign,
        &mut service.skip_tag,
        &mut service.skip_release,
        &mut service.overwrite,
        &mut service.draft,
    ] {
        flag.get_or_insert(false);
    }
    for flag in [
        &mut service.artifacts,
        &mut service.files,
        &mut service.checksums,
        &mut service.signatures,
        &mut service.catalogs,
    ] {
        flag.get_or_insert(true);
    }
    if service.sign == Some(true) && !checks.facts.signing {
        checks.warn(msg!("validation_release_sign_without_signing", scope = scope));
    }
    if kind != ServiceKind::Github && service.discussion_category_name.non_blank().is_some() {
        checks.warn(msg!("validation_unsupported_field", field = format!("{scope}.discussion_category_name")));
    }

    service.update.enabled.get_or_insert(false);
    if service.update.enabled == Some(true) && service.update.sections.is_empty() {
        service.update.sections = UpdateSection::ALL.to_vec();
    }

    changelog(checks, &scope, service);
    let (connect, read) = (&mut service.connect_timeout, &mut service.read_timeout);
    checks.timeout_pair(&scope, connect, read);

    service.prerelease.enabled.get_or_insert(prerelease);
    if let Some(pattern) = service.prerelease.pattern.non_blank() {
        Regex::new(pattern).map_err(|source| ValidationError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
    }
    Ok(())
}

fn api_endpoint(kind: ServiceKind) -> Option<&'static str> {
    match kind {
        ServiceKind::Github => Some("https://api.github.com"),
        ServiceKind::Gitlab => Some("https://gitlab.com/api/v4"),
        ServiceKind::Codeberg => Some("https://codeberg.org/api/v1"),
        ServiceKind::Gitea | ServiceKind::Generic => None,
    }
}

fn changelog(checks: &mut Checks<'_>, scope: &str, service: &mut GitService) {
    let changelog = &mut service.changelog;
    changelog.enabled.get_or_insert(true);
    changelog.sort.get_or_insert(Sort::Desc);
    changelog.links.get_or_insert(true);
    changelog.skip_merge_commits.get_or_insert(false);
    default_to(&mut changelog.format, DEFAULT_CHANGELOG_FORMAT);

    let scope = format!("{scope}.changelog");
    if changelog.content.non_blank().is_some() && changelog.content_template.non_blank().is_some() {
        checks.error(msg!(
            "validation_mutually_exclusive",
            first = format!("{scope}.content"),
            second = format!("{scope}.content_template")
        ));
    }
    if let Some(template) = changelog.content_template.non_blank() {
        if !checks.is_file(template) {
            checks.error(msg!(
                "validation_template_missing",
                field = format!("{scope}.content_template"),
                path = template
            ));
        }
    }
    checks.existing_path(&format!("{scope}.external"), changelog.external.as_deref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Mode;
    use crate::errors::Errors;
    use crate::property::MapSource;
    use crate::validation::checks::Facts;
    use crate::validation::checks::tests::settings;
    use camino::Utf8Path;

    fn github() -> GitService {
        GitService {
            owner: Some("acme".into()),
            name: Some("app".into()),
            ..GitService::default()
        }
    }

    fn run(model: &mut Model, env: MapSource) -> (Errors, ValidationResult<()>) {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), env);
        let mut errors = Errors::default();
        let facts = Facts::gather(model);
        let result = {
            let mut checks = Checks::new(&settings, facts, &mut errors, Mode::Config);
            validate(&mut checks, model)
        };
        (errors, result)
    }

    #[test]
    fn github_defaults() {
        let mut model = Model::default();
        model.release.github = Some(github());
        let (errors, result) = run(&mut model, MapSource::new().with("SHIPYARD_GITHUB_TOKEN", "t"));
        assert!(result.is_ok());
        assert!(!errors.has_errors(), "{errors:?}");

        let service = model.release.github.as_ref().unwrap();
        assert_eq!(service.host.as_deref(), Some("github.com"));
        assert_eq!(service.token.as_deref(), Some("t"));
        assert_eq!(service.tag_name.as_deref(), Some("v{{projectVersion}}"));
        assert_eq!(service.changelog.sort, Some(Sort::Desc));
        assert_eq!(service.connect_timeout, Some(20));
    }

    #[test]
    fn missing_token_names_the_short_variable() {
        let mut model = Model::default();
        model.release.github = Some(github());
        let (errors, _) = run(&mut model, MapSource::new());
        assert_eq!(errors.configuration_errors()[0].arg("env"), Some("SHIPYARD_GITHUB_TOKEN"));
    }

    #[test]
    fn exactly_one_service() {
        let mut model = Model::default();
        let (errors, _) = run(&mut model, MapSource::new());
        assert!(errors.contains_key("validation_release_service_missing"));

        model.release.github = Some(github());
        model.release.generic = Some(GitService::default());
        let (errors, _) = run(&mut model, MapSource::new().with("SHIPYARD_GITHUB_TOKEN", "t"));
        assert!(errors.contains_key("validation_release_service_multiple"));
    }

    #[test]
    fn bad_prerelease_pattern_fails_the_stage() {
        let mut model = Model::default();
        let mut service = github();
        service.prerelease.pattern = Some("(".into());
        model.release.github = Some(service);
        let (_, result) = run(&mut model, MapSource::new().with("SHIPYARD_GITHUB_TOKEN", "t"));
        assert!(matches!(result, Err(ValidationError::Pattern { .. })));
    }
}
