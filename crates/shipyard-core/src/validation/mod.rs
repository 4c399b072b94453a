//! Model validation.
//!
//! Validation resolves, defaults and cross-checks the model in place. It
//! runs as an ordered table of stages followed by a shorter table of
//! post-validation stages. Later stages rely on defaults filled by earlier
//! ones (signing before deployers, release before packagers), so the order
//! is part of the contract.
//!
//! A stage never aborts the run: problems are appended to [`Errors`] and an
//! unexpected failure inside a stage is recorded as a configuration error
//! before the next stage starts.

mod announce;
mod assemble;
mod catalog;
pub(crate) mod checks;
mod deploy;
mod distributions;
mod download;
mod extensions;
mod files;
mod hooks;
mod matrix;
mod packagers;
mod project;
mod release;
mod signing;
mod swid;
pub(crate) mod unit;
mod upload;

use tracing::{debug, instrument, trace};

use self::checks::{Checks, Facts};
use crate::context::{Mode, Settings};
use crate::error::ValidationResult;
use crate::errors::Errors;
use crate::model::Model;
use crate::msg;

/// One step of the validation table.
#[derive(Clone, Copy)]
pub(crate) struct Stage {
    /// Name used in logs and stage failure messages.
    pub id: &'static str,
    /// Whether the stage runs for this mode and model.
    pub when: fn(Mode, &Model) -> bool,
    /// The stage itself.
    pub run: fn(&mut Checks<'_>, &mut Model) -> ValidationResult<()>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("id", &self.id).finish_non_exhaustive()
    }
}

const fn always(_: Mode, _: &Model) -> bool {
    true
}

const fn stage(
    id: &'static str,
    run: fn(&mut Checks<'_>, &mut Model) -> ValidationResult<()>,
) -> Stage {
    Stage { id, when: always, run }
}

/// Main validation stages, in order.
pub(crate) const VALIDATION: &[Stage] = &[
    stage("extensions", extensions::validate),
    stage("matrix", matrix::validate),
    stage("hooks", hooks::validate),
    stage("project", project::validate),
    stage("downloaders", download::validate),
    stage("swid", swid::validate),
    stage("assemblers", assemble::validate),
    stage("signing", signing::validate),
    Stage {
        id: "release",
        when: |_, model| model.commit.is_some(),
        run: release::validate,
    },
    stage("checksum", checksum),
    stage("deployers", deploy::validate),
    stage("uploaders", upload::validate),
    stage("packagers", packagers::validate),
    stage("distributions", distributions::validate),
    stage("files", files::validate),
    stage("catalog", catalog::validate),
    stage("announcers", announce::validate),
];

/// Cross-checks run once every unit has its defaults.
pub(crate) const POST_VALIDATION: &[Stage] = &[
    stage("project", project::post_validate),
    Stage {
        id: "assemblers",
        when: |mode, _| mode.validate_config() || mode.validate_assembly(),
        run: assemble::post_validate,
    },
    Stage {
        id: "distributions",
        when: |mode, _| mode.validate_config(),
        run: distributions::post_validate,
    },
    stage("signing", signing::post_validate),
];

/// Stages replayed in assemble mode before assembler outputs are
/// synthesized into distributions.
pub(crate) const ASSEMBLY_SCOPE: &[Stage] = &[
    stage("matrix", matrix::validate),
    stage("project", project::validate),
    stage("swid", swid::validate),
    stage("assemblers", assemble::validate),
];

/// Validate `model` for the run described by `settings`.
#[instrument(skip_all, fields(mode = %settings.mode))]
pub(crate) fn validate(settings: &Settings, model: &mut Model, errors: &mut Errors) {
    run_stages(VALIDATION, settings, settings.mode, model, errors);
    run_stages(POST_VALIDATION, settings, settings.mode, model, errors);
}

/// Run `stages` in order under `mode`.
pub(crate) fn run_stages(
    stages: &[Stage],
    settings: &Settings,
    mode: Mode,
    model: &mut Model,
    errors: &mut Errors,
) {
    for stage in stages {
        if !(stage.when)(mode, model) {
            debug!(stage = stage.id, "stage skipped");
            continue;
        }
        trace!(stage = stage.id, "running stage");
        let facts = Facts::gather(model);
        let outcome = {
            let mut checks = Checks::new(settings, facts, errors, mode);
            (stage.run)(&mut checks, model)
        };
        if let Err(err) = outcome {
            trace!(stage = stage.id, error = ?err, "stage failed");
            errors.configuration(msg!(
                "validation_stage_failed",
                stage = stage.id,
                error = err
            ));
        }
    }
}

fn checksum(_checks: &mut Checks<'_>, model: &mut Model) -> ValidationResult<()> {
    model.checksum.apply_defaults();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order() {
        let ids: Vec<&str> = VALIDATION.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            [
                "extensions",
                "matrix",
                "hooks",
                "project",
                "downloaders",
                "swid",
                "assemblers",
                "signing",
                "release",
                "checksum",
                "deployers",
                "uploaders",
                "packagers",
                "distributions",
                "files",
                "catalog",
                "announcers",
            ]
        );
        let post: Vec<&str> = POST_VALIDATION.iter().map(|s| s.id).collect();
        assert_eq!(post, ["project", "assemblers", "distributions", "signing"]);
    }

    #[test]
    fn release_stage_needs_a_commit() {
        let release = VALIDATION.iter().find(|s| s.id == "release").unwrap();
        let mut model = Model::default();
        assert!(!(release.when)(Mode::Config, &model));
        model.commit = Some(crate::model::Commit::default());
        assert!((release.when)(Mode::Config, &model));
    }

    #[test]
    fn post_stages_follow_the_mode() {
        let assemblers = POST_VALIDATION.iter().find(|s| s.id == "assemblers").unwrap();
        let model = Model::default();
        assert!((assemblers.when)(Mode::Assemble, &model));
        assert!((assemblers.when)(Mode::Full, &model));
        assert!(!(assemblers.when)(Mode::Announce, &model));
    }
}
