//! Archive and Java archive outputs.

use indexmap::IndexMap;

use super::{Expected, Inputs};
use crate::model::ArchiveFormat;
use crate::model::assemble::{ArchiveAssembler, JavaArchiveAssembler};
use crate::text::{Blank, capitalize};

/// One file per matrix row and format. Rows whose platform is not
/// selected are skipped; rows that render to the same name collapse.
pub(super) fn archive(inputs: &Inputs<'_>, unit: &ArchiveAssembler) -> Vec<Expected> {
    let directory = inputs.settings.assemble_directory("archive", &unit.base.name);
    let rows = if unit.matrix.is_empty() {
        vec![IndexMap::new()]
    } else {
        unit.matrix.expand()
    };
    let attach = unit.attach_platform.unwrap_or(false);

    let mut expected = Vec::new();
    for row in rows {
        let platform = row.get("platform").and_then(|p| p.non_blank()).map(|p| inputs.rules.apply(p));
        if platform.is_some() && !inputs.selected(platform.as_deref()) {
            continue;
        }
        let mut templates = inputs.templates.clone();
        for (key, value) in &row {
            templates.set(format!("matrix{}", capitalize(key)), value.as_str());
        }
        if let Some(platform) = &platform {
            templates.set("platform", platform.as_str());
        }
        let template = unit.archive_name.non_blank().unwrap_or(crate::model::assemble::DEFAULT_IMAGE_NAME);
        let mut name = templates.render(template);
        if let Some(platform) = platform.as_deref().filter(|_| attach) {
            name = format!("{name}-{platform}");
        }
        for format in &unit.formats {
            let file = Expected::new(directory.join(format!("{name}.{}", format.extension())), platform.as_deref());
            if !expected.contains(&file) {
                expected.push(file);
            }
        }
    }
    expected
}

/// One platform-independent archive per format, zip when none is set.
pub(super) fn java_archive(inputs: &Inputs<'_>, unit: &JavaArchiveAssembler) -> Vec<Expected> {
    let directory = inputs.settings.assemble_directory("java-archive", &unit.base.name);
    let name = inputs.image_name(unit.archive_name.as_deref(), None);
    let formats = if unit.formats.is_empty() {
        &[ArchiveFormat::Zip][..]
    } else {
        &unit.formats[..]
    };
    formats
        .iter()
        .map(|format| Expected::new(directory.join(format!("{name}.{}", format.extension())), None))
        .collect()
}
