//! Root packager defaults, inherited by every distribution.

use super::checks::Checks;
use super::release::{DEFAULT_AUTHOR_EMAIL, DEFAULT_AUTHOR_NAME};
use crate::error::ValidationResult;
use crate::model::Model;
use crate::model::packagers::Packager;
use crate::model::release::CommitAuthor;
use crate::text::{Blank, default_to};

/// Commit message template for packager repositories.
pub const DEFAULT_COMMIT_MESSAGE: &str = "{{distributionName}} {{tagName}}";

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    if !checks.mode.validate_config() {
        return Ok(());
    }
    let author = model
        .release
        .service()
        .map(|(_, git)| git.commit_author.clone())
        .unwrap_or_default();
    for packager in model.packagers.all_mut() {
        repository_defaults(checks, packager, &author);
    }
    Ok(())
}

/// Fill the publishing repository and commit author of `packager`.
fn repository_defaults(checks: &mut Checks<'_>, packager: &mut dyn Packager, author: &CommitAuthor) {
    let kind = packager.kind();
    let default_repository = packager.default_repository();
    let base = packager.base_mut();
    base.continue_on_error.get_or_insert(false);
    base.skip_publishing.get_or_insert(false);

    let commit_author = &mut base.commit_author;
    if commit_author.name.is_blank() {
        commit_author.name = Some(author.name.clone().unwrap_or_else(|| DEFAULT_AUTHOR_NAME.into()));
    }
    if commit_author.email.is_blank() {
        commit_author.email = Some(author.email.clone().unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.into()));
    }

    let repository = &mut base.repository;
    if repository.owner.is_blank() {
        repository.owner.clone_from(&checks.facts.owner);
    }
    checks.optional_property(
        &[format!("packagers.{kind}.token"), format!("{kind}.token")],
        &mut repository.token,
    );
    if repository.token.is_blank() {
        repository.token.clone_from(&checks.facts.token);
    }
    default_to(&mut repository.name, default_repository);
    default_to(&mut repository.branch, "main");
    default_to(&mut repository.commit_message, DEFAULT_COMMIT_MESSAGE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Mode;
    use crate::errors::Errors;
    use crate::model::release::GitService;
    use crate::property::MapSource;
    use crate::validation::checks::Facts;
    use crate::validation::checks::tests::settings;
    use camino::Utf8Path;

    #[test]
    fn repositories_default_from_release() {
        let mut model = Model::default();
        model.release.github = Some(GitService {
            owner: Some("acme".into()),
            name: Some("app".into()),
            token: Some("release-token".into()),
            ..GitService::default()
        });
        let settings = settings(
            Utf8Path::new(env!("CARGO_MANIFEST_DIR")),
            MapSource::new().with("SHIPYARD_SCOOP_TOKEN", "scoop-token"),
        );
        let mut errors = Errors::default();
        let facts = Facts::gather(&model);
        let mut checks = Checks::new(&settings, facts, &mut errors, Mode::Config);
        validate(&mut checks, &mut model).unwrap();

        let brew = &model.packagers.brew.base;
        assert_eq!(brew.repository.owner.as_deref(), Some("acme"));
        assert_eq!(brew.repository.name.as_deref(), Some("homebrew-tap"));
        assert_eq!(brew.repository.token.as_deref(), Some("release-token"));
        assert_eq!(brew.commit_author.name.as_deref(), Some(DEFAULT_AUTHOR_NAME));

        let scoop = &model.packagers.scoop.base;
        assert_eq!(scoop.repository.token.as_deref(), Some("scoop-token"));
        assert!(!errors.has_errors());
    }
}
