//! The default build matrix.

use super::checks::Checks;
use crate::error::ValidationResult;
use crate::model::{Matrix, Model};
use crate::msg;
use crate::platform;

pub(super) fn validate(checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    check(checks, "matrix", &model.matrix);
    Ok(())
}

/// Shape checks for any matrix, top-level or per assembler.
pub(super) fn check(checks: &mut Checks<'_>, scope: &str, matrix: &Matrix) {
    if !matrix.vars.is_empty() && !matrix.rows.is_empty() {
        checks.warn(msg!("validation_matrix_rows_and_vars", scope = scope));
    }
    for (name, values) in &matrix.vars {
        if values.is_empty() {
            checks.error(msg!("validation_must_not_be_empty", field = format!("{scope}.vars.{name}")));
        }
        if name == "platform" {
            for value in values {
                unsupported(checks, scope, value);
            }
        }
    }
    for (index, row) in matrix.rows.iter().enumerate() {
        if row.is_empty() {
            checks.error(msg!("validation_must_not_be_empty", field = format!("{scope}.rows[{index}]")));
        }
        if let Some(value) = row.get("platform") {
            unsupported(checks, scope, value);
        }
    }
}

fn unsupported(checks: &mut Checks<'_>, scope: &str, value: &str) {
    if !platform::is_supported(value) {
        checks.error(msg!("validation_unsupported_platform", field = scope, platform = value));
    }
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
    fn platform_values_must_be_known() {
        let settings = settings(Utf8Path::new(env!("CARGO_MANIFEST_DIR")), MapSource::new());
        let mut errors = Errors::default();
        let mut checks = Checks::new(&settings, Facts::default(), &mut errors, Mode::Config);

        let mut matrix = Matrix::default();
        matrix.vars.insert("platform".into(), vec!["linux-x86_64".into(), "beos-m68k".into()]);
        check(&mut checks, "matrix", &matrix);

        assert_eq!(errors.configuration_errors().len(), 1);
        assert_eq!(errors.configuration_errors()[0].arg("platform"), Some("beos-m68k"));
    }
}
