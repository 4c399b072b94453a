//! Signing.

use super::checks::Checks;
use crate::activation::Active;
use crate::error::ValidationResult;
use crate::model::Model;
use crate::model::signing::SigningMode;
use crate::msg;
use crate::text::default_to;

/// Cosign release used when none is configured.
pub const DEFAULT_COSIGN_VERSION: &str = "2.2.3";

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let signing = &mut model.signing;
    if !checks.resolve(signing, Active::Never) {
        return Ok(());
    }
    if !checks.mode.validate_config() {
        return Ok(());
    }
    let mode = *signing.mode.get_or_insert(SigningMode::Memory);
    signing.armored.get_or_insert(false);
    signing.verify.get_or_insert(true);
    for flag in [
        &mut signing.artifacts,
        &mut signing.files,
        &mut signing.checksums,
        &mut signing.catalogs,
    ] {
        flag.get_or_insert(true);
    }

    match mode {
        SigningMode::Memory | SigningMode::File => {
            checks.require_property(
                &["signing.public.key", "gpg.public.key"],
                &mut signing.public_key,
                "signing.public_key",
            );
            checks.require_property(
                &["signing.secret.key", "gpg.secret.key"],
                &mut signing.secret_key,
                "signing.secret_key",
            );
            checks.require_property(
                &["signing.passphrase", "gpg.passphrase"],
                &mut signing.passphrase,
                "signing.passphrase",
            );
            if mode == SigningMode::File {
                checks.existing_path("signing.public_key", signing.public_key.as_deref());
                checks.existing_path("signing.secret_key", signing.secret_key.as_deref());
            }
        }
        SigningMode::Command => {
            let executable = if cfg!(windows) { "gpg.exe" } else { "gpg" };
            default_to(&mut signing.command.executable, executable);
            signing.command.default_keyring.get_or_insert(true);
            checks.optional_property(&["signing.command.key.name", "gpg.key.name"], &mut signing.command.key_name);
            checks.optional_property(&["signing.passphrase", "gpg.passphrase"], &mut signing.passphrase);
        }
        SigningMode::Cosign => {
            default_to(&mut signing.cosign.version, DEFAULT_COSIGN_VERSION);
            checks.require_property(
                &["signing.cosign.private.key", "cosign.private.key"],
                &mut signing.cosign.private_key_file,
                "signing.cosign.private_key_file",
            );
            checks.optional_property(
                &["signing.cosign.public.key", "cosign.public.key"],
                &mut signing.cosign.public_key_file,
            );
            checks.require_property(
                &["signing.cosign.password", "cosign.password"],
                &mut signing.passphrase,
                "signing.passphrase",
            );
            checks.existing_path("signing.cosign.private_key_file", signing.cosign.private_key_file.as_deref());
        }
    }
    Ok(())
}

/// Enabled signing with nothing selected to sign is a no-op worth flagging.
pub(super) fn post_validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let signing = &model.signing;
    if !signing.enabled {
        return Ok(());
    }
    let anything = [signing.artifacts, signing.files, signing.checksums, signing.catalogs]
        .iter()
        .any(|flag| flag.unwrap_or(true));
    if !anything {
        checks.warn(msg!("validation_signing_nothing_selected"));
    }
    Ok(())
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

    #[test]
    fn memory_mode_requires_keys() {
        let settings = settings(
            Utf8Path::new(env!("CARGO_MANIFEST_DIR")),
            MapSource::new().with("SHIPYARD_GPG_PASSPHRASE", "pw"),
        );
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);
        let mut model = Model::default();
        model.signing.active = Some(Active::Always);
        validate(&mut checks, &mut model).unwrap();

        let envs: Vec<&str> = errors
            .configuration_errors()
            .iter()
            .filter_map(|m| m.arg("env"))
            .collect();
        assert_eq!(envs, ["SHIPYARD_GPG_PUBLIC_KEY", "SHIPYARD_GPG_SECRET_KEY"]);
        assert_eq!(model.signing.passphrase.as_deref(), Some("pw"));
        assert_eq!(model.signing.artifacts, Some(true));
    }

    #[test]
    fn disabled_signing_is_untouched() {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);
        let mut model = Model::default();
        validate(&mut checks, &mut model).unwrap();
        assert!(model.signing.mode.is_none());
        assert!(!errors.has_errors());
    }
}
