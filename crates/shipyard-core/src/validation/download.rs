//! Downloaders.

use super::checks::{Checks, keys};
use super::unit::{Rules, validate_unit};
use crate::activation::{Active, settle_container};
use crate::context::{Mode, Scope};
use crate::error::ValidationResult;
use crate::model::download::{Downloader, DownloaderKind};
use crate::model::{Authorization, Model};
use crate::msg;
use crate::text::Blank;

struct DownloaderRules {
    kind: DownloaderKind,
}

impl Rules for DownloaderRules {
    type Unit = Downloader;

    fn applies(&self, mode: Mode) -> bool {
        mode.validate_config() || mode.validate_download()
    }

    fn filters<'n>(&self, _unit: &'n Downloader, name: &'n str) -> Vec<(Scope, &'n str)> {
        vec![
            (Scope::DownloaderTypes, self.kind.as_str()),
            (Scope::DownloaderNames, name),
        ]
    }

    fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Downloader) {
        let kind = self.kind.as_str();
        if unit.assets.is_empty() {
            checks.error(msg!("validation_must_not_be_empty", field = format!("{scope}.assets")));
        }
        for (index, asset) in unit.assets.iter().enumerate() {
            checks.not_blank(asset.input.as_deref(), &format!("{scope}.assets[{index}].input"));
        }
        match self.kind {
            DownloaderKind::Http => {
                let authorization = *unit.authorization.get_or_insert(Authorization::None);
                credentials(checks, scope, kind, unit, authorization);
            }
            DownloaderKind::Ftp | DownloaderKind::Scp | DownloaderKind::Sftp => {
                checks.require_property(&keys(scope, kind, "host"), &mut unit.host, &format!("{scope}.host"));
                checks.require_property(
                    &keys(scope, kind, "username"),
                    &mut unit.username,
                    &format!("{scope}.username"),
                );
                if self.kind == DownloaderKind::Ftp {
                    checks.require_property(
                        &keys(scope, kind, "password"),
                        &mut unit.password,
                        &format!("{scope}.password"),
                    );
                } else {
                    ssh_keys(checks, scope, kind, unit);
                }
            }
        }
    }

    fn defaults(&self, _checks: &mut Checks<'_>, _scope: &str, unit: &mut Downloader) {
        match self.kind {
            DownloaderKind::Ftp => {
                unit.port.get_or_insert(21);
            }
            DownloaderKind::Scp | DownloaderKind::Sftp => {
                unit.port.get_or_insert(22);
            }
            DownloaderKind::Http => {}
        }
        for asset in &mut unit.assets {
            asset.unpack.enabled.get_or_insert(false);
            asset.unpack.skip_root_entry.get_or_insert(false);
        }
    }

    fn shared(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Downloader) {
        checks.timeouts(scope, &mut unit.base);
    }
}

fn credentials(checks: &mut Checks<'_>, scope: &str, kind: &str, unit: &mut Downloader, auth: Authorization) {
    match auth {
        Authorization::None => {}
        Authorization::Basic => {
            checks.require_property(
                &keys(scope, kind, "username"),
                &mut unit.username,
                &format!("{scope}.username"),
            );
            checks.require_property(
                &keys(scope, kind, "password"),
                &mut unit.password,
                &format!("{scope}.password"),
            );
        }
        Authorization::Bearer => {
            checks.require_property(
                &keys(scope, kind, "password"),
                &mut unit.password,
                &format!("{scope}.password"),
            );
        }
    }
}

fn ssh_keys(checks: &mut Checks<'_>, scope: &str, kind: &str, unit: &mut Downloader) {
    checks.optional_property(&keys(scope, kind, "password"), &mut unit.password);
    checks.optional_property(&keys(scope, kind, "public.key"), &mut unit.public_key);
    checks.optional_property(&keys(scope, kind, "private.key"), &mut unit.private_key);
    checks.optional_property(&keys(scope, kind, "passphrase"), &mut unit.passphrase);
    checks.optional_property(&keys(scope, kind, "fingerprint"), &mut unit.fingerprint);
    if unit.password.is_blank() && unit.private_key.is_blank() && !checks.dry_run() {
        checks.error(msg!("validation_ssh_credentials", scope = scope));
    }
}

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let download = &mut model.download;
    let explicit = download.active.is_some();
    if !checks.resolve(download, Active::Always) {
        return Ok(());
    }
    let mut any = false;
    for (kind, name, downloader) in download.all_mut() {
        downloader.kind = Some(kind);
        downloader.base.name.clone_from(name);
        let scope = format!("download.{kind}.{name}");
        any |= validate_unit(&DownloaderRules { kind }, checks, &scope, name, downloader);
    }
    let lifecycle = checks.facts.lifecycle;
    settle_container(download, explicit, any, lifecycle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Errors;
    use crate::model::download::Asset;
    use crate::property::MapSource;
    use crate::validation::checks::Facts;
    use crate::validation::checks::tests::settings;
    use camino::Utf8Path;

    #[test]
    fn ftp_downloader_resolves_credentials() {
        let settings = settings(
            Utf8Path::new(env!("CARGO_MANIFEST_DIR")),
            MapSource::new()
                .with("SHIPYARD_FTP_HOST", "ftp.example.com")
                .with("SHIPYARD_FTP_USERNAME", "anon")
                .with("SHIPYARD_FTP_PASSWORD", "secret"),
        );
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Download);

        let mut model = Model::default();
        let mut downloader = Downloader::default();
        downloader.base.active = Some(Active::Always);
        downloader.assets.push(Asset {
            input: Some("files/app.zip".into()),
            ..Asset::default()
        });
        model.download.ftp.insert("mirror".into(), downloader);
        validate(&mut checks, &mut model).unwrap();

        assert!(!errors.has_errors(), "{errors:?}");
        let mirror = &model.download.ftp["mirror"];
        assert_eq!(mirror.host.as_deref(), Some("ftp.example.com"));
        assert_eq!(mirror.port, Some(21));
        assert!(model.download.enabled);
    }

    #[test]
    fn no_enabled_downloaders_disable_the_section() {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);
        let mut model = Model::default();
        model.download.http.insert("later".into(), Downloader::default());
        validate(&mut checks, &mut model).unwrap();
        assert!(!model.download.enabled);
        assert!(!errors.has_errors());
    }
}
