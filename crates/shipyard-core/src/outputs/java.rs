//! jlink, jpackage and native image outputs.

use camino::Utf8PathBuf;
use tracing::warn;

use super::{Expected, Inputs, assembler_templates};
use crate::context::Settings;
use crate::model::ArchiveFormat;
use crate::model::assemble::{JlinkAssembler, JpackageAssembler, NativeImageAssembler};
use crate::template::TemplateContext;

/// Zipped runtime image of `jlink` for one target platform.
pub(crate) fn jlink_image(
    settings: &Settings,
    templates: &TemplateContext,
    jlink: &JlinkAssembler,
    platform: &str,
) -> Utf8PathBuf {
    let inputs = Inputs {
        settings,
        templates: assembler_templates(templates, &jlink.base),
        rules: jlink.base.platform.clone(),
    };
    image_zip(&inputs, jlink, platform)
}

fn image_zip(inputs: &Inputs<'_>, jlink: &JlinkAssembler, platform: &str) -> Utf8PathBuf {
    let name = inputs.image_name(jlink.image_name.as_deref(), jlink.image_name_transform.as_deref());
    inputs
        .settings
        .assemble_directory("jlink", &jlink.base.name)
        .join(format!("{name}-{platform}.zip"))
}

/// One zipped image per selected target JDK.
pub(super) fn jlink(inputs: &Inputs<'_>, unit: &JlinkAssembler) -> Vec<Expected> {
    unit.target_jdks
        .iter()
        .filter_map(|jdk| jdk.effective_platform(&inputs.rules))
        .filter(|platform| inputs.selected(Some(platform.as_str())))
        .map(|platform| Expected::new(image_zip(inputs, unit, &platform), Some(platform.as_str())))
        .collect()
}

/// Installers found in the assembly directory for the host platform.
///
/// jpackage names its files itself, so the directory is scanned for the
/// configured installer types. An empty result points at the directory.
pub(super) fn jpackage(inputs: &Inputs<'_>, unit: &JpackageAssembler) -> Vec<Expected> {
    let directory = inputs.settings.assemble_directory("jpackage", &unit.base.name);
    let host = inputs.settings.host_platform.as_str();
    let types = unit.platform_settings(host).map(|p| p.types.as_slice()).unwrap_or_default();

    let mut found: Vec<Utf8PathBuf> = match directory.read_dir_utf8() {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.path().to_path_buf())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| types.iter().any(|t| t == ext))
            })
            .collect(),
        Err(error) => {
            warn!(%directory, %error, "cannot read jpackage output directory");
            Vec::new()
        }
    };
    found.sort();
    if found.is_empty() {
        return vec![Expected::new(directory, Some(host))];
    }
    found.into_iter().map(|path| Expected::new(path, Some(host))).collect()
}

/// One binary, or archive when archiving is on, per selected GraalVM.
pub(super) fn native_image(inputs: &Inputs<'_>, unit: &NativeImageAssembler) -> Vec<Expected> {
    let directory = inputs.settings.assemble_directory("native-image", &unit.base.name);
    let name = inputs.image_name(unit.image_name.as_deref(), unit.image_name_transform.as_deref());
    let host = inputs.settings.host_platform.clone();
    let platforms: Vec<String> = if unit.graal_jdks.is_empty() {
        vec![unit.graal.effective_platform(&inputs.rules).unwrap_or(host)]
    } else {
        unit.graal_jdks.iter().filter_map(|jdk| jdk.effective_platform(&inputs.rules)).collect()
    };
    let archive = unit
        .archiving
        .enabled
        .unwrap_or(false)
        .then(|| unit.archiving.format.unwrap_or(ArchiveFormat::Zip));

    platforms
        .iter()
        .filter(|platform| inputs.selected(Some(platform.as_str())))
        .map(|platform| {
            let file = match archive {
                Some(format) => format!("{name}-{platform}.{}", format.extension()),
                None if platform.starts_with("windows") => format!("{name}-{platform}.exe"),
                None => format!("{name}-{platform}"),
            };
            Expected::new(directory.join(file), Some(platform.as_str()))
        })
        .collect()
}
