//! Project metadata.

use super::checks::Checks;
use crate::error::ValidationResult;
use crate::model::project::VersionPattern;
use crate::model::{Model, Stereotype};
use crate::msg;
use crate::text::{Blank, default_to};

/// Default label for snapshot releases.
pub const DEFAULT_SNAPSHOT_LABEL: &str = "early-access";

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let project = &mut model.project;
    checks.optional_property(&["project.name"], &mut project.name);
    checks.optional_property(&["project.version"], &mut project.version);
    checks.not_blank(project.name.as_deref(), "project.name");
    checks.not_blank(project.version.as_deref(), "project.version");

    project.version_pattern.get_or_insert(VersionPattern::Semver);
    project.stereotype.get_or_insert(Stereotype::None);
    default_to(&mut project.snapshot.label, DEFAULT_SNAPSHOT_LABEL);
    project.snapshot.full_changelog.get_or_insert(false);

    if project.long_description.is_blank() {
        project.long_description.clone_from(&project.description);
    }
    if project.copyright.is_blank() && !project.authors.is_empty() {
        let authors = project.authors.join(",");
        project.copyright = Some(match project.inception_year.non_blank() {
            Some(year) => format!("{year} {authors}"),
            None => authors,
        });
    }
    if project.vendor.is_blank() {
        project.vendor = project.authors.first().cloned();
    }

    let links: Vec<(String, String)> = project
        .links
        .entries()
        .into_iter()
        .map(|(name, url)| (format!("project.links.{name}"), url.to_string()))
        .collect();
    for (field, url) in links {
        checks.http_url(&field, Some(&url));
    }

    let java = &mut project.languages.java;
    if java.group_id.non_blank().is_some() {
        if java.artifact_id.is_blank() {
            java.artifact_id.clone_from(&project.name);
        }
        java.multi_project.get_or_insert(false);
    }
    Ok(())
}

/// The version must match its declared pattern.
pub(super) fn post_validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let project = &model.project;
    let Some(version) = project.version.non_blank() else {
        return Ok(());
    };
    let pattern = project.version_pattern.unwrap_or(VersionPattern::Semver);
    let valid = match pattern {
        VersionPattern::Semver => semver::Version::parse(version).is_ok(),
        VersionPattern::JavaRuntime | VersionPattern::JavaModule => version
            .split(['.', '+', '-'])
            .next()
            .is_some_and(|major| major.parse::<u64>().is_ok()),
        VersionPattern::Calver => version.chars().next().is_some_and(|c| c.is_ascii_digit()),
        VersionPattern::Chronver | VersionPattern::Custom => true,
    };
    // Snapshots carry their own suffix and are exempt.
    if !valid && !checks.facts.lifecycle.snapshot {
        checks.error(msg!(
            "validation_version_format",
            version = version,
            pattern = pattern
        ));
    }
    Ok(())
}
