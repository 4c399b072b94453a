//! SBOM and attestation catalogers.

use super::checks::Checks;
use crate::activation::{Active, settle_container};
use crate::error::ValidationResult;
use crate::model::Model;
use crate::model::catalog::SbomCataloger;
use crate::text::default_to;

/// Tool versions used when none is configured.
const CYCLONEDX_VERSION: &str = "0.27.2";
const SYFT_VERSION: &str = "1.5.0";

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let catalog = &mut model.catalog;
    let explicit = catalog.active.is_some();
    if !checks.resolve(catalog, Active::Always) {
        return Ok(());
    }
    if !checks.mode.validate_config() {
        return Ok(());
    }
    let lifecycle = checks.facts.lifecycle;

    let sbom = &mut catalog.sbom;
    let sbom_explicit = sbom.active.is_some();
    if checks.resolve(sbom, Active::Always) {
        let cyclonedx = cataloger(checks, &mut sbom.cyclonedx, CYCLONEDX_VERSION, "json");
        let syft = cataloger(checks, &mut sbom.syft, SYFT_VERSION, "syft-json");
        settle_container(sbom, sbom_explicit, cyclonedx || syft, lifecycle);
    }

    for (enabled, name) in [
        (checks.resolve(&mut catalog.github, Active::Never), &mut catalog.github.attestation_name),
        (checks.resolve(&mut catalog.slsa, Active::Never), &mut catalog.slsa.attestation_name),
    ] {
        if enabled {
            default_to(name, "{{projectName}}-{{projectVersion}}.intoto.jsonl");
        }
    }
    for (enabled, flags) in [
        (catalog.github.enabled, [&mut catalog.github.distributions, &mut catalog.github.files]),
        (catalog.slsa.enabled, [&mut catalog.slsa.distributions, &mut catalog.slsa.files]),
    ] {
        if enabled {
            for flag in flags {
                flag.get_or_insert(true);
            }
        }
    }

    let any = catalog.any_enabled();
    settle_container(catalog, explicit, any, lifecycle);
    Ok(())
}

fn cataloger(checks: &mut Checks<'_>, cataloger: &mut SbomCataloger, version: &str, format: &str) -> bool {
    if !checks.resolve(cataloger, Active::Never) {
        return false;
    }
    default_to(&mut cataloger.version, version);
    if cataloger.formats.is_empty() {
        cataloger.formats.push(format.to_string());
    }
    cataloger.pack.enabled.get_or_insert(false);
    default_to(&mut cataloger.pack.name, "{{projectName}}-{{projectVersion}}-sboms");
    cataloger.distributions.get_or_insert(true);
    cataloger.files.get_or_insert(true);
    true
}
