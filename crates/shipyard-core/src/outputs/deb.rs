//! Debian package outputs.

use tracing::debug;

use super::{Expected, Inputs};
use crate::model::assemble::DebAssembler;
use crate::platform::debian_architecture;
use crate::text::Blank;

/// `{package}_{version}-{revision}_{arch}.deb`, one per input platform.
///
/// Inputs without a platform produce an `all` package; platforms with no
/// Debian architecture are skipped.
pub(super) fn deb(inputs: &Inputs<'_>, unit: &DebAssembler) -> Vec<Expected> {
    let directory = inputs.settings.assemble_directory("deb", &unit.base.name);
    let control = &unit.control;
    let package = control
        .package_name
        .non_blank()
        .map_or_else(|| unit.base.name.to_lowercase(), str::to_string);
    let version = control
        .package_version
        .non_blank()
        .map(str::to_string)
        .or_else(|| inputs.templates.get("projectVersion").map(str::to_string))
        .unwrap_or_default();
    let revision = control.package_revision.unwrap_or(1);

    // Architecture comes from the declared token; outputs carry the replaced spelling.
    let mut platforms: Vec<Option<&str>> = Vec::new();
    for artifact in &unit.base.artifacts {
        let platform = artifact.platform.non_blank();
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    if platforms.is_empty() {
        platforms.push(None);
    }

    let mut expected = Vec::new();
    for platform in platforms {
        if !inputs.selected(platform) {
            continue;
        }
        let Some(arch) = debian_architecture(platform) else {
            debug!(assembler = %unit.base.name, platform = ?platform, "no debian architecture");
            continue;
        };
        let tagged = platform.map(|p| inputs.rules.apply(p));
        let file = format!("{package}_{version}-{revision}_{arch}.deb");
        expected.push(Expected::new(directory.join(file), tagged.as_deref()));
    }
    expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Artifact;
    use crate::platform::PlatformRules;
    use crate::property::MapSource;
    use crate::template::TemplateContext;
    use crate::validation::checks::tests::settings;
    use camino::Utf8Path;

    fn unit(platforms: &[&str]) -> DebAssembler {
        let mut unit = DebAssembler::default();
        unit.base.name = "tool".into();
        unit.control.package_version = Some("2.1.0".into());
        unit.control.package_revision = Some(3);
        for platform in platforms {
            unit.base.artifacts.push(Artifact {
                path: Some(format!("bin/{platform}/tool")),
                platform: Some((*platform).into()),
                ..Artifact::default()
            });
        }
        unit
    }

    #[test]
    fn architectures_follow_platforms() {
        let settings = settings(Utf8Path::new("/work"), MapSource::new());
        let unit = unit(&["linux-x86_64", "linux-aarch_64", "osx-x86_64"]);
        let inputs = Inputs::for_assembler(&settings, &TemplateContext::new(), &PlatformRules::default(), &unit.base);
        let files: Vec<String> = deb(&inputs, &unit)
            .iter()
            .filter_map(|e| e.path.file_name().map(str::to_string))
            .collect();
        assert_eq!(files, ["tool_2.1.0-3_amd64.deb", "tool_2.1.0-3_arm64.deb"]);
    }

    #[test]
    fn replacements_do_not_hide_architectures() {
        let settings = settings(Utf8Path::new("/work"), MapSource::new());
        let unit = unit(&["linux-x86_64"]);
        let mut rules = PlatformRules::default();
        rules.replacements.insert("x86_64".into(), "amd64".into());
        let inputs = Inputs::for_assembler(&settings, &TemplateContext::new(), &rules, &unit.base);
        let expected = deb(&inputs, &unit);
        assert_eq!(expected.len(), 1);
        assert_eq!(expected[0].path.file_name(), Some("tool_2.1.0-3_amd64.deb"));
        assert_eq!(expected[0].platform.as_deref(), Some("linux-amd64"));
    }

    #[test]
    fn platformless_inputs_build_an_all_package() {
        let settings = settings(Utf8Path::new("/work"), MapSource::new());
        let unit = unit(&[]);
        let inputs = Inputs::for_assembler(&settings, &TemplateContext::new(), &PlatformRules::default(), &unit.base);
        let expected = deb(&inputs, &unit);
        assert_eq!(expected.len(), 1);
        assert!(expected[0].path.as_str().ends_with("assemble/tool/deb/tool_2.1.0-3_all.deb"));
    }
}
