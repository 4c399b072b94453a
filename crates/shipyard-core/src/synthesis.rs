//! Distributions synthesized from assembler outputs.
//!
//! An exported assembler publishes its outputs as a distribution of the
//! same name. The assembly-side stages are replayed in assemble mode on
//! the model first; when they fail, synthesis is skipped and their
//! problems are reported as warnings, since the configuration itself may
//! still be valid.

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::activation::Active;
use crate::context::{Mode, Settings};
use crate::errors::Errors;
use crate::merge::Merge;
use crate::model::assemble::AssemblerKind;
use crate::model::distribution::Distribution;
use crate::model::{Artifact, Assembler, DistributionType, Executable, Java, Model, Stereotype};
use crate::outputs;
use crate::validation;
use crate::validation::checks::Facts;

/// What one assembler contributes to its distribution.
#[derive(Debug, Clone)]
struct Contribution {
    name: String,
    kind: AssemblerKind,
    distribution_type: DistributionType,
    stereotype: Option<Stereotype>,
    active: Option<Active>,
    executable: Option<Executable>,
    java: Option<Java>,
    outputs: Vec<Artifact>,
    extra_properties: IndexMap<String, String>,
}

impl Contribution {
    fn of(assembler: &dyn Assembler) -> Self {
        let base = assembler.base();
        Self {
            name: base.name.clone(),
            kind: assembler.kind(),
            distribution_type: assembler.distribution_type(),
            stereotype: base.stereotype,
            active: base.active,
            executable: assembler.executable().cloned(),
            java: assembler.java().cloned(),
            outputs: base.outputs.clone(),
            extra_properties: base.extra_properties.clone(),
        }
    }
}

/// Fold exported assembler outputs into `model.distributions`.
#[instrument(skip_all)]
pub(crate) fn synthesize(settings: &Settings, model: &mut Model, errors: &mut Errors) {
    if model.assemble.all().is_empty() {
        return;
    }

    let mut nested = Errors::default();
    validation::run_stages(validation::ASSEMBLY_SCOPE, settings, Mode::Assemble, model, &mut nested);
    if nested.has_errors() {
        debug!("assembly configuration has errors, skipping synthesis");
        errors.extend_as_warnings(nested);
        return;
    }
    let mut resolved = Errors::default();
    outputs::resolve_all(settings, model, &mut resolved);
    errors.extend_as_warnings(nested);
    errors.extend_as_warnings(resolved);

    // Declared artifacts must be comparable by resolved path before folding.
    let templates = Facts::gather(model).templates;
    let global = model.platform.clone();
    for (name, distribution) in &mut model.distributions {
        if distribution.name.is_empty() {
            distribution.name.clone_from(name);
        }
        distribution.resolve_artifacts(&templates, &settings.basedir, &global);
    }

    let contributions: Vec<Contribution> = model
        .assemble
        .all()
        .into_iter()
        .filter(|a| a.is_enabled() && a.is_exported())
        .map(Contribution::of)
        .collect();
    for contribution in contributions {
        fold(&mut model.distributions, contribution);
    }
}

fn fold(distributions: &mut IndexMap<String, Distribution>, contribution: Contribution) {
    let Contribution {
        name,
        kind,
        distribution_type,
        stereotype,
        active,
        executable,
        java,
        outputs,
        extra_properties,
    } = contribution;

    let distribution = distributions
        .entry(name.clone())
        .or_insert_with(|| Distribution::named(name.as_str(), distribution_type));
    distribution.name.clone_from(&name);
    distribution.distribution_type = Some(distribution_type);
    if distribution.stereotype.is_none() {
        distribution.stereotype = stereotype;
    }
    if distribution.active.is_none() {
        distribution.active = active;
    }
    if let Some(executable) = executable {
        distribution.executable.merge(executable);
    }
    if let Some(java) = java {
        distribution.java.merge(java);
    }
    distribution.assembled_by = Some(kind);

    for output in outputs {
        let existing = output
            .resolved
            .as_deref()
            .and_then(|path| distribution.artifact_index(path));
        match existing {
            Some(index) => distribution.artifacts[index].merge(output),
            None => distribution.artifacts.push(output),
        }
    }

    let mut properties = extra_properties;
    properties.extend(std::mem::take(&mut distribution.extra_properties));
    distribution.extra_properties = properties;
    debug!(
        distribution = %name,
        assembler = %kind,
        artifacts = distribution.artifacts.len(),
        "distribution synthesized"
    );
}
