//! Maven deployers.

use super::checks::{Checks, keys};
use super::unit::{Rules, validate_unit};
use crate::activation::{Active, settle_container};
use crate::context::{Mode, Scope};
use crate::error::ValidationResult;
use crate::model::deploy::{DeployerKind, MavenDeployer};
use crate::model::project::Project;
use crate::model::{Authorization, Model};
use crate::msg;
use crate::text::{Blank, default_to};

/// pomchecker release used when none is configured.
pub const DEFAULT_POMCHECKER_VERSION: &str = "1.11.0";

struct DeployerRules<'m> {
    kind: DeployerKind,
    project: &'m Project,
}

impl Rules for DeployerRules<'_> {
    type Unit = MavenDeployer;

    fn applies(&self, mode: Mode) -> bool {
        mode.validate_config() || mode.validate_deploy()
    }

    fn filters<'n>(&self, _unit: &'n MavenDeployer, name: &'n str) -> Vec<(Scope, &'n str)> {
        vec![
            (Scope::DeployerTypes, self.kind.as_str()),
            (Scope::DeployerNames, name),
        ]
    }

    fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut MavenDeployer) {
        let handler = self.kind.handler();
        let kind = self.kind.as_str();

        let url = format!("{scope}.url");
        match handler.default_url {
            Some(default) if !handler.requires_url => {
                checks.property_or(&keys(scope, kind, "url"), &mut unit.url, default);
            }
            _ => checks.require_property(&keys(scope, kind, "url"), &mut unit.url, &url),
        }
        checks.http_url(&url, unit.url.as_deref());

        let authorization = *unit.authorization.get_or_insert(handler.default_authorization);
        if handler.requires_username || authorization == Authorization::Basic {
            checks.require_property(
                &keys(scope, kind, "username"),
                &mut unit.username,
                &format!("{scope}.username"),
            );
        } else {
            checks.optional_property(&keys(scope, kind, "username"), &mut unit.username);
        }
        checks.require_property(
            &keys(scope, kind, "password"),
            &mut unit.password,
            &format!("{scope}.password"),
        );

        if unit.staging_repositories.is_empty() {
            checks.error(msg!(
                "validation_must_not_be_empty",
                field = format!("{scope}.staging_repositories")
            ));
        }
        for (index, path) in unit.staging_repositories.iter().enumerate() {
            let field = format!("{scope}.staging_repositories[{index}]");
            if checks.not_blank(Some(path), &field) {
                checks.existing_path(&field, Some(path));
            }
        }
    }

    fn defaults(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut MavenDeployer) {
        let handler = self.kind.handler();
        let central = *unit.apply_maven_central_rules.get_or_insert(handler.verify_pom);
        unit.verify_pom.get_or_insert(handler.verify_pom);
        unit.source_jar.get_or_insert(central);
        unit.javadoc_jar.get_or_insert(central);
        unit.retry_delay.get_or_insert(10);
        unit.max_retries.get_or_insert(60);
        if self.kind == DeployerKind::Nexus2 {
            unit.close_repository.get_or_insert(true);
            unit.release_repository.get_or_insert(true);
        }

        let sign = *unit.sign.get_or_insert(handler.sign_by_default);
        if sign && !checks.facts.signing {
            checks.error(msg!("validation_deployer_signing", scope = scope));
        }

        if central {
            self.central_rules(checks);
        }
        for (index, entry) in unit.artifact_overrides.iter().enumerate() {
            let field = format!("{scope}.artifact_overrides[{index}]");
            checks.not_blank(entry.group_id.as_deref(), &format!("{field}.group_id"));
            checks.not_blank(entry.artifact_id.as_deref(), &format!("{field}.artifact_id"));
        }
    }

    fn shared(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut MavenDeployer) {
        checks.timeouts(scope, &mut unit.base);
    }
}

impl DeployerRules<'_> {
    /// Metadata Maven Central refuses to publish without.
    fn central_rules(&self, checks: &mut Checks<'_>) {
        let project = self.project;
        for (field, value) in [
            ("project.description", project.description.as_deref()),
            ("project.license", project.license.as_deref()),
            ("project.links.homepage", project.links.homepage.as_deref()),
        ] {
            if value.is_none_or(str::is_blank) {
                checks.error(msg!("validation_maven_central_metadata", field = field));
            }
        }
        if project.authors.is_empty() {
            checks.error(msg!("validation_maven_central_metadata", field = "project.authors"));
        }
    }
}

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let deploy = &mut model.deploy;
    let explicit = deploy.active.is_some();
    if !checks.resolve(deploy, Active::Always) {
        return Ok(());
    }
    let maven = &mut deploy.maven;
    let maven_explicit = maven.active.is_some();
    if !checks.resolve(maven, Active::Always) {
        deploy.enabled = false;
        return Ok(());
    }

    let mut any = false;
    for kind in DeployerKind::ALL {
        let rules = DeployerRules {
            kind: *kind,
            project: &model.project,
        };
        for (name, deployer) in maven.by_kind_mut(*kind) {
            deployer.kind = Some(*kind);
            deployer.base.name.clone_from(name);
            let scope = format!("deploy.maven.{kind}.{name}");
            any |= validate_unit(&rules, checks, &scope, name, deployer);
        }
    }

    let verify = DeployerKind::ALL
        .iter()
        .flat_map(|kind| maven.by_kind(*kind).values())
        .any(|d| d.base.enabled && d.verify_pom == Some(true));
    if verify {
        let pomchecker = &mut maven.pomchecker;
        default_to(&mut pomchecker.version, DEFAULT_POMCHECKER_VERSION);
        pomchecker.fail_on_warning.get_or_insert(true);
        pomchecker.fail_on_error.get_or_insert(true);
    }

    let lifecycle = checks.facts.lifecycle;
    settle_container(maven, maven_explicit, any, lifecycle);
    settle_container(deploy, explicit, any, lifecycle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Errors;
    use crate::property::MapSource;
    use crate::validation::checks::Facts;
    use crate::validation::checks::tests::settings;
    use camino::Utf8Path;

    fn deployer() -> MavenDeployer {
        let mut deployer = MavenDeployer::default();
        deployer.base.active = Some(Active::Always);
        deployer.staging_repositories = vec!["target/staging-deploy".into()];
        deployer
    }

    fn run(model: &mut Model, env: MapSource, signing: bool) -> Errors {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), env);
        let mut errors = Errors::default();
        let facts = Facts {
            signing,
            ..Facts::gather(model)
        };
        let mut checks = Checks::new(&settings, facts, &mut errors, Mode::Config);
        validate(&mut checks, model).unwrap();
        errors
    }

    #[test]
    fn github_url_defaults_from_repository() {
        let mut model = Model::default();
        model.deploy.maven.github.insert("app".into(), deployer());
        let errors = run(&mut model, MapSource::new().with("SHIPYARD_GITHUB_PASSWORD", "token"), false);
        assert!(!errors.has_errors(), "{errors:?}");

        let github = &model.deploy.maven.github["app"];
        assert_eq!(github.url.as_deref(), DeployerKind::Github.handler().default_url);
        assert_eq!(github.authorization, Some(Authorization::Bearer));
        assert_eq!(github.sign, Some(false));
        assert!(model.deploy.enabled);
        assert!(model.deploy.maven.enabled);
    }

    #[test]
    fn nexus_requires_signing_and_metadata() {
        let mut model = Model::default();
        model.deploy.maven.nexus2.insert("central".into(), deployer());
        let errors = run(
            &mut model,
            MapSource::new()
                .with("SHIPYARD_NEXUS2_URL", "https://oss.sonatype.org/service/local")
                .with("SHIPYARD_NEXUS2_USERNAME", "user")
                .with("SHIPYARD_NEXUS2_PASSWORD", "secret"),
            false,
        );
        assert!(errors.contains_key("validation_deployer_signing"));
        assert!(errors.contains_key("validation_maven_central_metadata"));
        assert_eq!(
            model.deploy.maven.pomchecker.version.as_deref(),
            Some(DEFAULT_POMCHECKER_VERSION)
        );
    }

    #[test]
    fn artifactory_requires_url_and_credentials() {
        let mut model = Model::default();
        model.deploy.maven.artifactory.insert("repo".into(), deployer());
        let errors = run(&mut model, MapSource::new(), true);
        let missing: Vec<_> = errors
            .configuration_errors()
            .iter()
            .filter(|m| m.key() == "validation_property_missing")
            .collect();
        assert_eq!(missing.len(), 3);
    }

    #[test]
    fn staging_repositories_are_required() {
        let mut model = Model::default();
        let mut gitlab = deployer();
        gitlab.staging_repositories.clear();
        gitlab.url = Some("https://gitlab.com/api/v4/projects/1/packages/maven".into());
        gitlab.password = Some("token".into());
        model.deploy.maven.gitlab.insert("app".into(), gitlab);
        let errors = run(&mut model, MapSource::new(), false);
        assert!(errors.contains_key("validation_must_not_be_empty"));
    }
}
