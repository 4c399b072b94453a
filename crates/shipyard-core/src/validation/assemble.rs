//! Assemblers.

use super::checks::Checks;
use super::unit::{Rules, validate_unit};
use crate::activation::{Active, settle_container};
use crate::context::{Mode, Scope};
use crate::error::ValidationResult;
use crate::merge::Merge;
use crate::model::assemble::{
    ArchiveAssembler, AssemblerBase, AssemblerKind, DEFAULT_IMAGE_NAME, DebAssembler, JavaArchiveAssembler, JlinkAssembler,
    JpackageAssembler, NativeImageAssembler,
};
use crate::model::project::Project;
use crate::model::{ArchiveFormat, Artifact, DistributionType, Executable, Java, Matrix, Model};
use crate::msg;
use crate::outputs;
use crate::platform;
use crate::text::{Blank, default_to};

/// UPX release used when none is configured.
pub const DEFAULT_UPX_VERSION: &str = "4.2.4";

/// Model facts every assembler rule reads.
struct Shared<'m> {
    kind: AssemblerKind,
    project: &'m Project,
    matrix: &'m Matrix,
    swid: &'m [String],
}

impl Shared<'_> {
    fn applies(mode: Mode) -> bool {
        mode.validate_config() || mode.validate_assembly()
    }

    fn filters<'n>(&self, name: &'n str) -> Vec<(Scope, &'n str)> {
        vec![
            (Scope::AssemblerTypes, self.kind.as_str()),
            (Scope::AssemblerNames, name),
        ]
    }

    /// Checks on the fields every assembler has.
    fn base(&self, checks: &mut Checks<'_>, scope: &str, base: &mut AssemblerBase) {
        base.exported.get_or_insert(true);
        if base.stereotype.is_none() {
            base.stereotype = self.project.stereotype;
        }
        default_to(
            &mut base.template_directory,
            format!("src/shipyard/assemblers/{}", base.name),
        );
        if let Some(tag) = base.swid_tag.non_blank() {
            if !self.swid.iter().any(|name| name == tag) {
                checks.error(msg!(
                    "validation_unknown_reference",
                    field = format!("{scope}.swid_tag"),
                    name = tag
                ));
            }
        }
        for (index, artifact) in base.artifacts.iter().enumerate() {
            artifact_checks(checks, &format!("{scope}.artifacts[{index}]"), artifact, false);
        }
        for (index, glob) in base.files.iter().enumerate() {
            checks.not_blank(glob.pattern.as_deref(), &format!("{scope}.files[{index}].pattern"));
        }
    }

    /// Launcher defaults for the Java family.
    fn launcher(&self, name: &str, executable: &mut Executable, java: &mut Java) {
        default_to(&mut executable.name, name);
        default_to(&mut executable.windows_extension, "bat");
        java.merge(self.project.languages.java.clone());
    }
}

/// Path set, and platform known when `platform_required`.
fn artifact_checks(checks: &mut Checks<'_>, field: &str, artifact: &Artifact, platform_required: bool) {
    checks.not_blank(artifact.path.as_deref(), &format!("{field}.path"));
    match artifact.platform.non_blank() {
        Some(token) if !platform::is_supported(token) => {
            checks.error(msg!("validation_unsupported_platform", field = field, platform = token));
        }
        Some(_) => {}
        None if platform_required => {
            checks.error(msg!("validation_must_not_be_blank", field = format!("{field}.platform")));
        }
        None => {}
    }
}

/// Every JDK listed once per platform.
fn distinct_platforms(checks: &mut Checks<'_>, field: &str, jdks: &[Artifact]) {
    let mut seen: Vec<&str> = Vec::new();
    for jdk in jdks {
        if let Some(platform) = jdk.platform.non_blank() {
            if seen.contains(&platform) {
                checks.error(msg!("validation_duplicate_platform", field = field, platform = platform));
            }
            seen.push(platform);
        }
    }
}

fn main_class(checks: &mut Checks<'_>, scope: &str, java: &Java) {
    if java.main_class.is_blank() && java.main_module.is_blank() {
        checks.error(msg!("validation_must_not_be_blank", field = format!("{scope}.java.main_class")));
    }
}

fn formats_or_zip(formats: &mut Vec<ArchiveFormat>) {
    if formats.is_empty() {
        formats.push(ArchiveFormat::Zip);
    }
}

// ──────────────────────────────────────────────
// Per-type rules
// ──────────────────────────────────────────────

macro_rules! assembler_rules {
    ($rules:ident, $unit:ty) => {
        struct $rules<'s, 'm>(&'s Shared<'m>);

        impl Rules for $rules<'_, '_> {
            type Unit = $unit;

            fn applies(&self, mode: Mode) -> bool {
                Shared::applies(mode)
            }

            fn filters<'n>(&self, _unit: &'n $unit, name: &'n str) -> Vec<(Scope, &'n str)> {
                self.0.filters(name)
            }

            fn require(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut $unit) {
                self.require_type(checks, scope, unit);
            }

            fn defaults(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut $unit) {
                self.defaults_type(checks, scope, unit);
            }

            fn shared(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut $unit) {
                self.0.base(checks, scope, &mut unit.base);
            }
        }
    };
}

assembler_rules!(ArchiveRules, ArchiveAssembler);
assembler_rules!(DebRules, DebAssembler);
assembler_rules!(JavaArchiveRules, JavaArchiveAssembler);
assembler_rules!(JlinkRules, JlinkAssembler);
assembler_rules!(JpackageRules, JpackageAssembler);
assembler_rules!(NativeImageRules, NativeImageAssembler);

impl ArchiveRules<'_, '_> {
    fn require_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut ArchiveAssembler) {
        if unit.formats.is_empty() {
            checks.error(msg!("validation_must_not_be_empty", field = format!("{scope}.formats")));
        }
    }

    fn defaults_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut ArchiveAssembler) {
        default_to(&mut unit.archive_name, DEFAULT_IMAGE_NAME);
        unit.distribution_type.get_or_insert(DistributionType::Binary);
        unit.attach_platform.get_or_insert(false);
        if *unit.apply_default_matrix.get_or_insert(false) && unit.matrix.is_empty() {
            unit.matrix = self.0.matrix.clone();
        }
        super::matrix::check(checks, &format!("{scope}.matrix"), &unit.matrix);
    }
}

impl DebRules<'_, '_> {
    fn require_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut DebAssembler) {
        checks.not_blank(unit.executable.as_deref(), &format!("{scope}.executable"));
    }

    fn defaults_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut DebAssembler) {
        let project = self.0.project;
        if let Some(executable) = unit.executable.non_blank().map(str::to_string) {
            default_to(&mut unit.install_path, format!("/opt/{executable}"));
        }
        let control = &mut unit.control;
        if control.package_name.is_blank() {
            control.package_name = project.name.as_deref().map(str::to_lowercase);
        }
        if control.package_version.is_blank() {
            control.package_version.clone_from(&project.version);
        }
        control.package_revision.get_or_insert(1);
        if control.maintainer.is_blank() {
            control.maintainer = project
                .maintainers
                .first()
                .or_else(|| project.authors.first())
                .cloned();
        }
        if control.description.is_blank() {
            control.description.clone_from(&project.description);
        }
        if control.homepage.is_blank() {
            control.homepage.clone_from(&project.links.homepage);
        }
        default_to(&mut control.section, "misc");
        default_to(&mut control.priority, "optional");

        checks.not_blank(control.maintainer.as_deref(), &format!("{scope}.control.maintainer"));
        if let Some(version) = control.package_version.non_blank() {
            if !version.starts_with(|c: char| c.is_ascii_digit()) {
                checks.error(msg!(
                    "validation_deb_version",
                    field = format!("{scope}.control.package_version"),
                    version = version
                ));
            }
        }
        if let Some(name) = control.package_name.non_blank() {
            let valid = name.len() > 1
                && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+-.".contains(c));
            if !valid {
                checks.error(msg!(
                    "validation_deb_package_name",
                    field = format!("{scope}.control.package_name"),
                    name = name
                ));
            }
        }
    }
}

impl JavaArchiveRules<'_, '_> {
    fn require_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut JavaArchiveAssembler) {
        checks.not_blank(unit.main_jar.path.as_deref(), &format!("{scope}.main_jar.path"));
    }

    fn defaults_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut JavaArchiveAssembler) {
        default_to(&mut unit.archive_name, DEFAULT_IMAGE_NAME);
        formats_or_zip(&mut unit.formats);
        self.0.launcher(&unit.base.name, &mut unit.executable, &mut unit.java);
        main_class(checks, scope, &unit.java);
    }
}

impl JlinkRules<'_, '_> {
    fn require_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut JlinkAssembler) {
        checks.not_blank(unit.jdk.path.as_deref(), &format!("{scope}.jdk.path"));
        checks.not_blank(unit.main_jar.path.as_deref(), &format!("{scope}.main_jar.path"));
        if unit.target_jdks.is_empty() {
            checks.error(msg!("validation_must_not_be_empty", field = format!("{scope}.target_jdks")));
        }
        for (index, jdk) in unit.target_jdks.iter().enumerate() {
            artifact_checks(checks, &format!("{scope}.target_jdks[{index}]"), jdk, true);
        }
        distinct_platforms(checks, &format!("{scope}.target_jdks"), &unit.target_jdks);
    }

    fn defaults_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut JlinkAssembler) {
        default_to(&mut unit.image_name, DEFAULT_IMAGE_NAME);
        unit.copy_jars.get_or_insert(true);
        default_to(&mut unit.jdeps.multi_release, "base");
        unit.jdeps.ignore_missing_deps.get_or_insert(false);
        unit.jdeps.use_wildcard_in_path.get_or_insert(true);
        self.0.launcher(&unit.base.name, &mut unit.executable, &mut unit.java);
        main_class(checks, scope, &unit.java);
    }
}

impl JpackageRules<'_, '_> {
    fn require_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut JpackageAssembler) {
        checks.not_blank(unit.jlink.as_deref(), &format!("{scope}.jlink"));
    }

    fn defaults_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut JpackageAssembler) {
        let project = self.0.project;
        let package = &mut unit.application_package;
        if package.app_name.is_blank() {
            package.app_name.clone_from(&project.name);
        }
        if package.app_version.is_blank() {
            package.app_version = project.version.as_deref().map(numeric_version);
        }
        if package.vendor.is_blank() {
            package.vendor.clone_from(&project.vendor);
        }
        if package.copyright.is_blank() {
            package.copyright.clone_from(&project.copyright);
        }
        unit.attach_platform.get_or_insert(false);
        unit.verbose.get_or_insert(false);
        let app_name = unit.application_package.app_name.clone();
        for (os, default_type, settings) in [
            ("osx", "pkg", &mut unit.osx),
            ("linux", "deb", &mut unit.linux),
            ("windows", "msi", &mut unit.windows),
        ] {
            if settings.types.is_empty() {
                settings.types.push(default_type.to_string());
            }
            if settings.app_name.is_blank() {
                settings.app_name.clone_from(&app_name);
            }
            if let Some(token) = settings.jdk.platform.non_blank() {
                if !platform::is_supported(token) {
                    checks.error(msg!(
                        "validation_unsupported_platform",
                        field = format!("{scope}.{os}.jdk"),
                        platform = token
                    ));
                }
            }
        }
        self.0.launcher(&unit.base.name, &mut unit.executable, &mut unit.java);
    }
}

impl NativeImageRules<'_, '_> {
    fn require_type(&self, checks: &mut Checks<'_>, scope: &str, unit: &mut NativeImageAssembler) {
        checks.not_blank(unit.main_jar.path.as_deref(), &format!("{scope}.main_jar.path"));
        if unit.graal.path.is_blank() && unit.graal_jdks.is_empty() {
            checks.error(msg!("validation_must_not_be_blank", field = format!("{scope}.graal.path")));
        }
        for (index, jdk) in unit.graal_jdks.iter().enumerate() {
            artifact_checks(checks, &format!("{scope}.graal_jdks[{index}]"), jdk, true);
        }
        distinct_platforms(checks, &format!("{scope}.graal_jdks"), &unit.graal_jdks);
    }

    fn defaults_type(&self, checks: &mut Checks<'_>, _scope: &str, unit: &mut NativeImageAssembler) {
        default_to(&mut unit.image_name, DEFAULT_IMAGE_NAME);
        unit.archiving.enabled.get_or_insert(false);
        unit.archiving.format.get_or_insert(ArchiveFormat::Zip);
        if checks.resolve(&mut unit.upx, Active::Never) {
            default_to(&mut unit.upx.version, DEFAULT_UPX_VERSION);
        }
        self.0.launcher(&unit.base.name, &mut unit.executable, &mut unit.java);
    }
}

/// `1.2.3-rc.1` to `1.2.3`; installers reject prerelease suffixes.
fn numeric_version(version: &str) -> String {
    version
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .next()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_string()
}

// ──────────────────────────────────────────────
// Stages
// ──────────────────────────────────────────────

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let assemble = &mut model.assemble;
    let explicit = assemble.active.is_some();
    if !checks.resolve(assemble, Active::Always) {
        return Ok(());
    }
    let swid: Vec<String> = model.swid.keys().cloned().collect();
    let shared_for = |kind| Shared {
        kind,
        project: &model.project,
        matrix: &model.matrix,
        swid: &swid,
    };

    let mut any = false;
    macro_rules! run {
        ($map:ident, $rules:ident, $kind:ident) => {{
            let shared = shared_for(AssemblerKind::$kind);
            let rules = $rules(&shared);
            for (name, unit) in &mut assemble.$map {
                unit.base.name.clone_from(name);
                let scope = format!("assemble.{}.{name}", AssemblerKind::$kind);
                any |= validate_unit(&rules, checks, &scope, name, unit);
            }
        }};
    }
    run!(archive, ArchiveRules, Archive);
    run!(deb, DebRules, Deb);
    run!(java_archive, JavaArchiveRules, JavaArchive);
    run!(jlink, JlinkRules, Jlink);
    run!(jpackage, JpackageRules, Jpackage);
    run!(native_image, NativeImageRules, NativeImage);

    let lifecycle = checks.facts.lifecycle;
    settle_container(assemble, explicit, any, lifecycle);
    Ok(())
}

/// Cross-assembler checks: jpackage/jlink links and exported name clashes.
pub(super) fn post_validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let assemble = &mut model.assemble;

    let mut exported: Vec<(String, AssemblerKind)> = Vec::new();
    for assembler in assemble.all() {
        if !assembler.is_enabled() || !assembler.is_exported() {
            continue;
        }
        let name = assembler.base().name.clone();
        if let Some((_, other)) = exported.iter().find(|(n, _)| *n == name) {
            checks.error(msg!(
                "validation_assembler_name_clash",
                name = name,
                first = other,
                second = assembler.kind()
            ));
        }
        exported.push((name, assembler.kind()));
    }

    let jlinks = assemble.jlink.clone();
    for (name, jpackage) in &mut assemble.jpackage {
        if !jpackage.base.enabled {
            continue;
        }
        let Some(reference) = jpackage.jlink.non_blank().map(str::to_string) else {
            continue;
        };
        let Some(jlink) = jlinks.get(&reference) else {
            checks.error(msg!(
                "validation_unknown_reference",
                field = format!("assemble.jpackage.{name}.jlink"),
                name = reference
            ));
            continue;
        };
        if !jlink.base.enabled {
            checks.error(msg!(
                "validation_jpackage_jlink_disabled",
                jpackage = name,
                jlink = reference
            ));
            continue;
        }
        jpackage.runtime_images = jlink
            .target_jdks
            .iter()
            .filter_map(|jdk| {
                let platform = jdk.platform.non_blank()?;
                let path = outputs::jlink_image(checks.settings, &checks.facts.templates, jlink, platform);
                Some(Artifact::resolved_at(path, Some(platform.to_string())))
            })
            .collect();
        if jpackage.main_jar.path.is_blank() {
            jpackage.main_jar.clone_from(&jlink.main_jar);
        }
        if jpackage.java.main_class.is_blank() {
            jpackage.java.merge(jlink.java.clone());
        }
    }
    Ok(())
}
