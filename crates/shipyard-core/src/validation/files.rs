//! Extra release files.

use super::checks::Checks;
use crate::activation::Active;
use crate::error::ValidationResult;
use crate::model::Model;
use crate::msg;

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    let files = &mut model.files;
    if !checks.resolve(files, Active::Always) {
        return Ok(());
    }
    let templates = checks.facts.templates.clone();
    let rules = model.platform.clone();
    for (index, artifact) in files.artifacts.iter_mut().enumerate() {
        let field = format!("files.artifacts[{index}].path");
        if !checks.not_blank(artifact.path.as_deref(), &field) {
            continue;
        }
        let Some(path) = artifact.resolve_path(&templates, checks.basedir(), &rules) else {
            continue;
        };
        if checks.mode.validate_paths() && !path.exists() && !artifact.is_optional() {
            checks.error(msg!("validation_path_missing", field = field, path = path));
        }
        artifact.resolved = Some(path);
    }
    for (index, glob) in files.globs.iter().enumerate() {
        checks.not_blank(glob.pattern.as_deref(), &format!("files.globs[{index}].pattern"));
    }
    Ok(())
}
