//! Read-only snapshots handed to listeners and extension code.
//!
//! A [`ContextView`] owns a copy of the model taken at freeze time, so code
//! holding one can never observe or cause later mutations.

use std::sync::Arc;

use camino::Utf8PathBuf;

use crate::activation::Lifecycle;
use crate::context::{Command, Mode, Settings};
use crate::errors::Errors;
use crate::model::assemble::Assembler;
use crate::model::{Distribution, Model};

/// Frozen run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    /// Base directory.
    pub basedir: Utf8PathBuf,
    /// Output directory.
    pub output_directory: Utf8PathBuf,
    /// Validation mode.
    pub mode: Mode,
    /// Command being run.
    pub command: Command,
    /// Dry run.
    pub dry_run: bool,
    /// Strict mode.
    pub strict: bool,
    /// Host platform.
    pub host_platform: String,
}

/// Immutable projection of a [`Context`](crate::context::Context).
#[derive(Debug, Clone)]
pub struct ContextView {
    run: RunInfo,
    lifecycle: Lifecycle,
    model: Arc<Model>,
    errors: Errors,
}

impl ContextView {
    pub(crate) fn new(settings: &Settings, model: Model, errors: Errors) -> Self {
        Self {
            run: RunInfo {
                basedir: settings.basedir.clone(),
                output_directory: settings.output_directory.clone(),
                mode: settings.mode,
                command: settings.command,
                dry_run: settings.dry_run,
                strict: settings.strict,
                host_platform: settings.host_platform.clone(),
            },
            lifecycle: model.lifecycle(),
            model: Arc::new(model),
            errors,
        }
    }

    /// Run settings.
    pub const fn run(&self) -> &RunInfo {
        &self.run
    }

    /// Release status.
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The model as frozen.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Errors recorded before freezing.
    pub const fn errors(&self) -> &Errors {
        &self.errors
    }

    /// A distribution by name.
    pub fn distribution(&self, name: &str) -> Option<&Distribution> {
        self.model.distributions.get(name)
    }

    /// Enabled distributions in declaration order.
    pub fn enabled_distributions(&self) -> impl Iterator<Item = &Distribution> {
        self.model.distributions.values().filter(|d| d.enabled)
    }

    /// An assembler by name.
    pub fn assembler(&self, name: &str) -> Option<&dyn Assembler> {
        self.model.assemble.find(name)
    }
}
