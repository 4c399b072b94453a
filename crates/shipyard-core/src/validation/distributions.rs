//! Distributions and their packagers.
//!
//! In configuration mode the assembler outputs are first folded into
//! distributions (see [`crate::synthesis`]). Every distribution then gets
//! its artifacts checked, its launcher and Java metadata defaulted, and
//! each enabled packager validated against the distribution type.

use super::checks::{Checks, keys};
use super::unit::{Rules, validate_unit};
use crate::activation::Active;
use crate::context::Scope;
use crate::error::ValidationResult;
use crate::merge::Merge;
use crate::model::artifact::Selection;
use crate::model::distribution::Distribution;
use crate::model::packagers::{Packagers, SdkmanCommand, SnapConfinement, SnapGrade};
use crate::model::project::Project;
use crate::model::{Artifact, DistributionType, Model};
use crate::msg;
use crate::platform::{self, PlatformRules};
use crate::synthesis;
use crate::text::{Blank, camel_case, default_to};

/// Snap base used when none is configured.
pub const DEFAULT_SNAP_BASE: &str = "core22";
/// Lowest Windows version winget manifests declare.
pub const DEFAULT_WINGET_MINIMUM_OS: &str = "10.0.0.0";

struct DistributionRules<'m> {
    project: &'m Project,
    root: &'m Packagers,
    rules: &'m PlatformRules,
}

impl Rules for DistributionRules<'_> {
    type Unit = Distribution;

    fn default_active(&self) -> Active {
        Active::Always
    }

    fn filters<'n>(&self, unit: &'n Distribution, name: &'n str) -> Vec<(Scope, &'n str)> {
        vec![
            (Scope::Distributions, name),
            (Scope::DistributionTypes, unit.kind().as_str()),
        ]
    }

    fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Distribution) {
        if unit.artifacts.is_empty() {
            // Synthesized distributions stay empty until their assembler has run.
            if unit.assembled_by.is_none() || checks.mode.validate_paths() {
                checks.error(msg!("validation_distribution_artifacts", distribution = &unit.name));
            }
            return;
        }
        let templates = unit.templates(&checks.facts.templates);
        let rules = self.rules.layered(&unit.platform);
        for (index, artifact) in unit.artifacts.iter_mut().enumerate() {
            let field = format!("{scope}.artifacts[{index}]");
            if !checks.not_blank(artifact.path.as_deref(), &format!("{field}.path")) {
                continue;
            }
            if let Some(token) = artifact.platform.non_blank() {
                if !platform::is_supported(token) {
                    checks.error(msg!("validation_unsupported_platform", field = field, platform = token));
                }
            }
            select(checks, artifact, &rules);
            let Some(path) = artifact.resolve_path(&templates, checks.basedir(), &rules) else {
                continue;
            };
            let wanted = artifact.selection != Selection::Rejected && !artifact.is_optional();
            if checks.mode.validate_paths() && wanted && !path.exists() {
                checks.error(msg!("validation_path_missing", field = format!("{field}.path"), path = path));
            }
            artifact.resolved = Some(path);
        }
    }

    fn defaults(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Distribution) {
        let kind = *unit.distribution_type.get_or_insert(DistributionType::Binary);
        if unit.stereotype.is_none() {
            unit.stereotype = self.project.stereotype;
        }
        default_to(&mut unit.executable.name, unit.name.as_str());
        if kind.is_java() {
            default_to(&mut unit.executable.windows_extension, "bat");
            unit.java.merge(self.project.languages.java.clone());
            if kind != DistributionType::NativeImage
                && unit.java.main_class.is_blank()
                && unit.java.main_module.is_blank()
            {
                checks.error(msg!("validation_must_not_be_blank", field = format!("{scope}.java.main_class")));
            }
        }
    }

    fn shared(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Distribution) {
        unit.inherit_packagers(self.root);
        let distribution_type = unit.kind();
        let name = unit.name.clone();
        for packager in unit.packagers_mut() {
            let kind = packager.kind();
            if !checks.resolve(packager, Active::Never) {
                continue;
            }
            if !packager.supported_types().contains(&distribution_type) {
                checks.warn(msg!(
                    "validation_packager_unsupported",
                    packager = kind,
                    distribution = &name,
                    kind = distribution_type
                ));
                packager.set_enabled(false);
                continue;
            }
            default_to(
                &mut packager.base_mut().template_directory,
                format!("src/shipyard/distributions/{name}/{kind}"),
            );
        }
        self.packager_defaults(checks, scope, unit);
    }
}

impl DistributionRules<'_> {
    /// Per-packager defaults and required fields.
    fn packager_defaults(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut Distribution) {
        let project = self.project;
        let name = unit.name.clone();
        let java = unit.kind().is_java();

        if unit.brew.base.enabled {
            let brew = &mut unit.brew;
            default_to(&mut brew.formula_name, camel_case(&name));
            brew.multi_platform.get_or_insert(false);
            if unit.distribution_type == Some(DistributionType::NativePackage) {
                default_to(&mut brew.cask.name, name.to_lowercase());
                default_to(&mut brew.cask.display_name, name.as_str());
            }
        }

        if unit.chocolatey.base.enabled {
            let field = format!("{scope}.chocolatey");
            let chocolatey = &mut unit.chocolatey;
            default_to(&mut chocolatey.package_name, name.as_str());
            if chocolatey.title.is_blank() {
                chocolatey.title.clone_from(&project.name);
            }
            if chocolatey.username.is_blank() {
                chocolatey.username.clone_from(&chocolatey.base.repository.owner);
            }
            default_to(&mut chocolatey.source, "https://push.chocolatey.org/");
            let remote = *chocolatey.remote_build.get_or_insert(false);
            if !remote {
                checks.require_property(
                    &keys(&field, "chocolatey", "api.key"),
                    &mut chocolatey.api_key,
                    &format!("{field}.api_key"),
                );
            }
        }

        if unit.docker.base.enabled {
            let field = format!("{scope}.docker");
            let docker = &mut unit.docker;
            default_to(
                &mut docker.base_image,
                if java { "eclipse-temurin:21-jre" } else { "ubuntu:24.04" },
            );
            if docker.image_names.is_empty() {
                docker.image_names.push("{{repoOwner}}/{{distributionName}}:{{tagName}}".into());
            }
            docker.use_local_artifact.get_or_insert(true);
            for (label, value) in [
                ("org.opencontainers.image.title", "{{distributionName}}"),
                ("org.opencontainers.image.version", "{{projectVersion}}"),
                ("org.opencontainers.image.description", "{{projectDescription}}"),
                ("org.opencontainers.image.licenses", "{{projectLicense}}"),
            ] {
                docker.labels.entry(label.into()).or_insert_with(|| value.into());
            }
            for (index, registry) in docker.registries.iter_mut().enumerate() {
                let registry_field = format!("{field}.registries[{index}]");
                if !checks.not_blank(registry.server_name.as_deref(), &format!("{registry_field}.server_name")) {
                    continue;
                }
                let server = registry.server_name.clone().unwrap_or_default().to_lowercase();
                let prefix = format!("docker.{server}");
                checks.require_property(
                    &[format!("{prefix}.username")],
                    &mut registry.username,
                    &format!("{registry_field}.username"),
                );
                checks.require_property(
                    &[format!("{prefix}.password")],
                    &mut registry.password,
                    &format!("{registry_field}.password"),
                );
            }
        }

        if unit.jbang.base.enabled {
            default_to(&mut unit.jbang.alias, name.as_str());
            default_to(&mut unit.jbang.script, name.as_str());
        }

        if unit.scoop.base.enabled {
            let scoop = &mut unit.scoop;
            default_to(&mut scoop.package_name, name.as_str());
            default_to(&mut scoop.checkver_url, "{{repoUrl}}/releases/latest");
            default_to(
                &mut scoop.autoupdate_url,
                "{{repoUrl}}/releases/download/{{tagName}}/{{artifactFile}}",
            );
        }

        if unit.sdkman.base.enabled {
            let field = format!("{scope}.sdkman");
            let sdkman = &mut unit.sdkman;
            default_to(&mut sdkman.candidate, name.as_str());
            sdkman.command.get_or_insert(SdkmanCommand::Major);
            default_to(&mut sdkman.release_notes_url, "{{releaseNotesUrl}}");
            checks.require_property(
                &keys(&field, "sdkman", "consumer.key"),
                &mut sdkman.consumer_key,
                &format!("{field}.consumer_key"),
            );
            checks.require_property(
                &keys(&field, "sdkman", "consumer.token"),
                &mut sdkman.consumer_token,
                &format!("{field}.consumer_token"),
            );
        }

        if unit.snap.base.enabled {
            let field = format!("{scope}.snap");
            let snap = &mut unit.snap;
            default_to(&mut snap.package_name, name.to_lowercase());
            default_to(&mut snap.base_snap, DEFAULT_SNAP_BASE);
            snap.grade.get_or_insert(SnapGrade::Stable);
            snap.confinement.get_or_insert(SnapConfinement::Strict);
            if !*snap.remote_build.get_or_insert(false) {
                checks.require_property(
                    &keys(&field, "snap", "exported.login"),
                    &mut snap.exported_login,
                    &format!("{field}.exported_login"),
                );
            }
        }

        if unit.winget.base.enabled {
            let field = format!("{scope}.winget");
            let winget = &mut unit.winget;
            if winget.package_name.is_blank() {
                winget.package_name = project.name.clone().or_else(|| Some(name.clone()));
            }
            if winget.publisher.name.is_blank() {
                winget.publisher.name = project.vendor.clone().or_else(|| project.authors.first().cloned());
            }
            if winget.author.is_blank() {
                winget.author = project.authors.first().cloned();
            }
            if winget.license.is_blank() {
                winget.license.clone_from(&project.license);
            }
            if winget.publisher.url.is_blank() {
                winget.publisher.url.clone_from(&project.links.homepage);
            }
            default_to(&mut winget.moniker, name.to_lowercase());
            default_to(&mut winget.minimum_os_version, DEFAULT_WINGET_MINIMUM_OS);
            if checks.not_blank(winget.publisher.name.as_deref(), &format!("{field}.publisher.name")) {
                if winget.package_identifier.is_blank() {
                    let publisher = winget.publisher.name.as_deref().unwrap_or_default();
                    let package = winget.package_name.as_deref().unwrap_or(&name);
                    winget.package_identifier = Some(format!("{}.{}", squash(publisher), squash(package)));
                }
            }
            if let Some(identifier) = winget.package_identifier.non_blank() {
                if !valid_winget_identifier(identifier) {
                    checks.error(msg!(
                        "validation_winget_identifier",
                        field = format!("{field}.package_identifier"),
                        identifier = identifier
                    ));
                }
            }
        }
    }
}

/// Record whether `artifact` survives the platform selection.
fn select(checks: &Checks<'_>, artifact: &mut Artifact, rules: &PlatformRules) {
    let platform = artifact.platform.non_blank();
    artifact.selection = if checks.settings.selection.is_selected(platform, rules) {
        Selection::Selected
    } else {
        Selection::Rejected
    };
}

fn squash(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `Publisher.Package`, two to eight segments without spaces or slashes.
fn valid_winget_identifier(identifier: &str) -> bool {
    let segments: Vec<&str> = identifier.split('.').collect();
    (2..=8).contains(&segments.len())
        && segments.iter().all(|segment| {
            !segment.is_empty() && !segment.chars().any(|c| c.is_whitespace() || "\\/:*?\"<>|".contains(c))
        })
}

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    if checks.mode.validate_config() {
        synthesis::synthesize(checks.settings, model, checks.errors);
    }
    let rules = DistributionRules {
        project: &model.project,
        root: &model.packagers,
        rules: &model.platform,
    };
    for (name, distribution) in &mut model.distributions {
        distribution.name.clone_from(name);
        let scope = format!("distributions.{name}");
        validate_unit(&rules, checks, &scope, name, distribution);
    }
    Ok(())
}

/// Disable packagers that have nothing to package.
pub(super) fn post_validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    for (name, distribution) in &mut model.distributions {
        if !distribution.enabled {
            continue;
        }
        let distribution_type = distribution.kind();
        let artifacts = distribution.artifacts.clone();
        for packager in distribution.packagers_mut() {
            if !packager.is_enabled() {
                continue;
            }
            let extensions = packager.supported_extensions(distribution_type);
            let skip = packager.kind().skip_flag();
            let target_os = packager.target_os();
            let usable = artifacts.iter().any(|artifact| {
                artifact.selection != Selection::Rejected
                    && !artifact.flag(&skip)
                    && target_os.is_none_or(|os| {
                        artifact
                            .platform
                            .non_blank()
                            .is_none_or(|platform| platform.starts_with(os))
                    })
                    && artifact
                        .file_name()
                        .is_some_and(|file| matches_extension(&file, extensions))
            });
            if !usable {
                checks.warn(msg!(
                    "validation_packager_no_artifacts",
                    packager = packager.kind(),
                    distribution = name
                ));
                packager.set_enabled(false);
            }
        }
    }
    Ok(())
}

/// `""` matches files without an extension.
fn matches_extension(file: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| {
        if ext.is_empty() {
            !file.contains('.')
        } else {
            file.ends_with(&format!(".{ext}"))
        }
    })
}
