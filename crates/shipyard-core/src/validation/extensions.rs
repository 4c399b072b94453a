//! Extensions.

use super::checks::Checks;
use crate::error::ValidationResult;
use crate::model::Model;
use crate::msg;
use crate::text::Blank;

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    for (name, extension) in &mut model.extensions {
        extension.name.clone_from(name);
        if !extension.is_enabled() {
            continue;
        }
        let scope = format!("extensions.{name}");
        if extension.gav.is_blank() && extension.directory.is_blank() {
            checks.error(msg!("validation_extension_source", extension = name));
        }
        checks.existing_path(&format!("{scope}.directory"), extension.directory.as_deref());
        for (index, provider) in extension.providers.iter().enumerate() {
            checks.not_blank(
                provider.provider_type.as_deref(),
                &format!("{scope}.providers[{index}].type"),
            );
        }
    }
    Ok(())
}
