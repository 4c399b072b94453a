//! Uploaders.

use super::checks::{Checks, keys};
use super::unit::{Rules, validate_unit};
use crate::activation::{Active, settle_container};
use crate::context::Scope;
use crate::error::ValidationResult;
use crate::model::upload::{Uploader, UploaderKind};
use crate::model::{Authorization, HttpMethod, Model};
use crate::msg;
use crate::text::{Blank, default_to};

/// Remote path used by S3 when none is configured.
pub const DEFAULT_S3_PATH: &str = "{{projectName}}/{{tagName}}/{{artifactFile}}";

/// GitLab API used when none is configured.
pub const DEFAULT_GITLAB_API: &str = "https://gitlab.com/api/v4";

struct UploaderRules {
    kind: UploaderKind,
}

impl Rules for UploaderRules {
    type Unit = Uploader;

    fn filters<'n>(&self, _unit: &'n Uploader, name: &'n str) -> Vec<(Scope, &'n str)> {
        vec![
            (Scope::UploaderTypes, self.kind.as_str()),
            (Scope::UploaderNames, name),
        ]
    }

    fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Uploader) {
        let kind = self.kind.as_str();
        match self.kind {
            UploaderKind::Artifactory => {
                required(checks, scope, kind, "host", &mut unit.api_host);
                checks.http_url(&format!("{scope}.host"), unit.api_host.as_deref());
                let authorization = *unit.authorization.get_or_insert(Authorization::Bearer);
                credentials(checks, scope, kind, unit, authorization);
                if unit.repositories.is_empty() {
                    checks.error(msg!("validation_must_not_be_empty", field = format!("{scope}.repositories")));
                }
                for (index, repository) in unit.repositories.iter().enumerate() {
                    checks.not_blank(repository.path.as_deref(), &format!("{scope}.repositories[{index}].path"));
                }
            }
            UploaderKind::Ftp => {
                required(checks, scope, kind, "host", &mut unit.host);
                required(checks, scope, kind, "username", &mut unit.username);
                required(checks, scope, kind, "password", &mut unit.password);
                checks.not_blank(unit.path.as_deref(), &format!("{scope}.path"));
            }
            UploaderKind::Gitea => {
                required(checks, scope, kind, "host", &mut unit.api_host);
                checks.http_url(&format!("{scope}.host"), unit.api_host.as_deref());
                required(checks, scope, kind, "token", &mut unit.password);
                if unit.owner.is_blank() {
                    unit.owner.clone_from(&checks.facts.owner);
                }
                checks.not_blank(unit.owner.as_deref(), &format!("{scope}.owner"));
            }
            UploaderKind::Gitlab => {
                checks.property_or(&keys(scope, kind, "host"), &mut unit.api_host, DEFAULT_GITLAB_API);
                checks.http_url(&format!("{scope}.host"), unit.api_host.as_deref());
                required(checks, scope, kind, "token", &mut unit.password);
                required(checks, scope, kind, "project_identifier", &mut unit.project_identifier);
            }
            UploaderKind::Http => {
                checks.not_blank(unit.upload_url.as_deref(), &format!("{scope}.upload_url"));
                checks.http_url(&format!("{scope}.upload_url"), unit.upload_url.as_deref());
                let authorization = *unit.authorization.get_or_insert(Authorization::None);
                credentials(checks, scope, kind, unit, authorization);
            }
            UploaderKind::S3 => {
                required(checks, scope, kind, "bucket", &mut unit.bucket);
                required(checks, scope, kind, "region", &mut unit.region);
                for (field, slot) in [
                    ("access.key.id", &mut unit.access_key_id),
                    ("secret.key", &mut unit.secret_key),
                    ("session.token", &mut unit.session_token),
                    ("endpoint", &mut unit.endpoint),
                ] {
                    checks.optional_property(&keys(scope, kind, field), slot);
                }
                checks.http_url(&format!("{scope}.endpoint"), unit.endpoint.as_deref());
            }
            UploaderKind::Scp | UploaderKind::Sftp => {
                required(checks, scope, kind, "host", &mut unit.host);
                required(checks, scope, kind, "username", &mut unit.username);
                checks.not_blank(unit.path.as_deref(), &format!("{scope}.path"));
                checks.optional_property(&keys(scope, kind, "password"), &mut unit.password);
                checks.optional_property(&keys(scope, kind, "private.key"), &mut unit.private_key);
                checks.optional_property(&keys(scope, kind, "passphrase"), &mut unit.passphrase);
                if unit.password.is_blank() && unit.private_key.is_blank() && !checks.dry_run() {
                    checks.error(msg!("validation_ssh_credentials", scope = scope));
                }
            }
        }
    }

    fn defaults(&self, checks: &mut Checks<'_>, _scope: &str, unit: &mut Uploader) {
        for flag in [
            &mut unit.artifacts,
            &mut unit.files,
            &mut unit.signatures,
            &mut unit.checksums,
            &mut unit.catalogs,
        ] {
            flag.get_or_insert(true);
        }
        match self.kind {
            UploaderKind::Ftp => {
                unit.port.get_or_insert(21);
            }
            UploaderKind::Scp | UploaderKind::Sftp => {
                unit.port.get_or_insert(22);
            }
            UploaderKind::Http => Checks::method(&mut unit.method, HttpMethod::Put),
            UploaderKind::S3 => default_to(&mut unit.path, DEFAULT_S3_PATH),
            UploaderKind::Gitea | UploaderKind::Gitlab => {
                let templates = &checks.facts.templates;
                if unit.package_name.is_blank() {
                    unit.package_name = templates.get("projectName").map(str::to_string);
                }
                if unit.package_version.is_blank() {
                    unit.package_version = templates.get("projectVersion").map(str::to_string);
                }
            }
            UploaderKind::Artifactory => {}
        }
    }

    fn shared(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Uploader) {
        checks.timeouts(scope, &mut unit.base);
        if !unit.uploads_anything() {
            checks.warn(msg!("validation_uploader_nothing_selected", scope = scope));
            unit.base.enabled = false;
        }
    }
}

fn required(checks: &mut Checks<'_>, scope: &str, kind: &str, field: &str, slot: &mut Option<String>) {
    let property = field.replace('_', ".");
    checks.require_property(&keys(scope, kind, &property), slot, &format!("{scope}.{field}"));
}

fn credentials(checks: &mut Checks<'_>, scope: &str, kind: &str, unit: &mut Uploader, auth: Authorization) {
    if auth == Authorization::Basic {
        checks.require_property(
            &keys(scope, kind, "username"),
            &mut unit.username,
            &format!("{scope}.username"),
        );
    }
    if auth != Authorization::None {
        checks.require_property(
            &keys(scope, kind, "password"),
            &mut unit.password,
            &format!("{scope}.password"),
        );
    }
}

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let upload = &mut model.upload;
    let explicit = upload.active.is_some();
    if !checks.resolve(upload, Active::Always) {
        return Ok(());
    }
    let mut any = false;
    for (kind, name, uploader) in upload.all_mut() {
        uploader.kind = Some(kind);
        uploader.base.name.clone_from(name);
        let scope = format!("upload.{kind}.{name}");
        any |= validate_unit(&UploaderRules { kind }, checks, &scope, name, uploader) && uploader.base.enabled;
    }
    let lifecycle = checks.facts.lifecycle;
    settle_container(upload, explicit, any, lifecycle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Mode;
    use crate::errors::Errors;
    use crate::model::upload::ArtifactoryRepository;
    use crate::property::MapSource;
    use crate::validation::checks::Facts;
    use crate::validation::checks::tests::settings;
    use camino::Utf8Path;

    fn run(model: &mut Model, env: MapSource) -> Errors {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), env);
        let mut errors = Errors::default();
        let facts = Facts::gather(model);
        let mut checks = Checks::new(&settings, facts, &mut errors, Mode::Config);
        validate(&mut checks, model).unwrap();
        errors
    }

    fn uploader() -> Uploader {
        let mut uploader = Uploader::default();
        uploader.base.active = Some(Active::Always);
        uploader
    }

    #[test]
    fn s3_defaults_path_and_reads_keys() {
        let mut model = Model::default();
        model.upload.s3.insert("bucket".into(), uploader());
        let errors = run(
            &mut model,
            MapSource::new()
                .with("SHIPYARD_S3_BUCKET", "releases")
                .with("SHIPYARD_S3_REGION", "eu-west-1")
                .with("SHIPYARD_S3_ACCESS_KEY_ID", "id"),
        );
        assert!(!errors.has_errors(), "{errors:?}");
        let s3 = &model.upload.s3["bucket"];
        assert_eq!(s3.bucket.as_deref(), Some("releases"));
        assert_eq!(s3.access_key_id.as_deref(), Some("id"));
        assert_eq!(s3.path.as_deref(), Some(DEFAULT_S3_PATH));
        assert!(model.upload.enabled);
    }

    #[test]
    fn artifactory_needs_repositories() {
        let mut model = Model::default();
        let mut artifactory = uploader();
        artifactory.api_host = Some("https://example.jfrog.io/artifactory".into());
        artifactory.password = Some("token".into());
        artifactory.repositories.push(ArtifactoryRepository::default());
        model.upload.artifactory.insert("jfrog".into(), artifactory);
        let errors = run(&mut model, MapSource::new());
        assert!(errors.contains_key("validation_must_not_be_blank"));
        assert!(!errors.contains_key("validation_property_missing"));
    }

    #[test]
    fn http_method_defaults_to_put() {
        let mut model = Model::default();
        let mut http = uploader();
        http.upload_url = Some("https://uploads.example.com/{{artifactFile}}".into());
        model.upload.http.insert("web".into(), http);
        let errors = run(&mut model, MapSource::new());
        assert!(!errors.has_errors(), "{errors:?}");
        assert_eq!(model.upload.http["web"].method, Some(HttpMethod::Put));
        assert_eq!(model.upload.http["web"].authorization, Some(Authorization::None));
    }

    #[test]
    fn uploading_nothing_disables() {
        let mut model = Model::default();
        let mut http = uploader();
        http.upload_url = Some("https://uploads.example.com/".into());
        for flag in [
            &mut http.artifacts,
            &mut http.files,
            &mut http.signatures,
            &mut http.checksums,
            &mut http.catalogs,
        ] {
            *flag = Some(false);
        }
        model.upload.http.insert("web".into(), http);
        let errors = run(&mut model, MapSource::new());
        assert!(errors.contains_key("validation_uploader_nothing_selected"));
        assert!(!model.upload.http["web"].base.enabled);
        assert!(!model.upload.enabled);
    }
}
