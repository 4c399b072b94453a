//! Assembler outputs.
//!
//! Each assembler type knows where its files land under
//! `<output>/assemble/<name>/<type>/`. Resolution computes the expected
//! paths, keeps the ones present on disk as the assembler's outputs, and
//! records an assembly error for each one that is missing.

mod archive;
mod deb;
mod java;

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

use crate::context::Settings;
use crate::errors::Errors;
use crate::model::assemble::{AssemblerBase, DEFAULT_IMAGE_NAME};
use crate::model::{Artifact, Assembler, Model};
use crate::msg;
use crate::platform::PlatformRules;
use crate::template::TemplateContext;
use crate::text::Blank;
use crate::validation::checks::Facts;

pub(crate) use java::jlink_image;

/// A file an assembler is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expected {
    /// Absolute path.
    pub path: Utf8PathBuf,
    /// Platform the file was built for.
    pub platform: Option<String>,
}

impl Expected {
    fn new(path: Utf8PathBuf, platform: Option<&str>) -> Self {
        Self {
            path,
            platform: platform.map(str::to_string),
        }
    }
}

/// What every resolver needs besides the assembler itself.
pub(crate) struct Inputs<'a> {
    pub settings: &'a Settings,
    pub templates: TemplateContext,
    pub rules: PlatformRules,
}

impl<'a> Inputs<'a> {
    fn for_assembler(settings: &'a Settings, templates: &TemplateContext, global: &PlatformRules, base: &AssemblerBase) -> Self {
        Self {
            settings,
            templates: assembler_templates(templates, base),
            rules: global.layered(&base.platform),
        }
    }

    /// True when `platform` survives the run's platform selection.
    fn selected(&self, platform: Option<&str>) -> bool {
        self.settings.selection.is_selected(platform, &self.rules)
    }

    /// Render a name template, falling back to the shared default.
    fn image_name(&self, template: Option<&str>, transform: Option<&str>) -> String {
        let name = self.templates.render(template.and_then(|t| t.non_blank()).unwrap_or(DEFAULT_IMAGE_NAME));
        match transform.and_then(|t| t.non_blank()) {
            Some(transform) => self.templates.clone().with("imageName", name).render(transform),
            None => name,
        }
    }
}

/// Project facts plus the assembler's name and extra properties.
pub(crate) fn assembler_templates(templates: &TemplateContext, base: &AssemblerBase) -> TemplateContext {
    let mut templates = templates.clone();
    templates.set("distributionName", base.name.as_str());
    for (key, value) in &base.extra_properties {
        templates.set(key.as_str(), value.as_str());
    }
    templates
}

/// Resolve the outputs of every enabled assembler in `model`.
#[instrument(skip_all)]
pub(crate) fn resolve_all(settings: &Settings, model: &mut Model, errors: &mut Errors) {
    let facts = Facts::gather(model);
    let global = model.platform.clone();
    let templates = &facts.templates;
    let assemble = &mut model.assemble;

    resolve_map(errors, &mut assemble.archive, |unit| {
        archive::archive(&Inputs::for_assembler(settings, templates, &global, &unit.base), unit)
    });
    resolve_map(errors, &mut assemble.deb, |unit| {
        deb::deb(&Inputs::for_assembler(settings, templates, &global, &unit.base), unit)
    });
    resolve_map(errors, &mut assemble.java_archive, |unit| {
        archive::java_archive(&Inputs::for_assembler(settings, templates, &global, &unit.base), unit)
    });
    resolve_map(errors, &mut assemble.jlink, |unit| {
        java::jlink(&Inputs::for_assembler(settings, templates, &global, &unit.base), unit)
    });
    resolve_map(errors, &mut assemble.jpackage, |unit| {
        java::jpackage(&Inputs::for_assembler(settings, templates, &global, &unit.base), unit)
    });
    resolve_map(errors, &mut assemble.native_image, |unit| {
        java::native_image(&Inputs::for_assembler(settings, templates, &global, &unit.base), unit)
    });
}

fn resolve_map<A, F>(errors: &mut Errors, map: &mut IndexMap<String, A>, expected: F)
where
    A: Assembler,
    F: Fn(&A) -> Vec<Expected>,
{
    for (name, assembler) in map {
        if !assembler.is_enabled() {
            continue;
        }
        let kind = assembler.kind();
        let mut outputs: Vec<Artifact> = Vec::new();
        for Expected { path, platform } in expected(assembler) {
            if !path.is_file() {
                errors.assembly(msg!("assembly_output_missing", assembler = name, path = &path));
                continue;
            }
            trace!(assembler = %name, %kind, %path, "output found");
            if outputs.iter().all(|a| a.resolved.as_ref() != Some(&path)) {
                outputs.push(Artifact::resolved_at(path, platform));
            }
        }
        debug!(assembler = %name, %kind, outputs = outputs.len(), "outputs resolved");
        assembler.base_mut().outputs = outputs;
    }
}
