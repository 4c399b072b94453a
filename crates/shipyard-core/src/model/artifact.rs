//! Artifacts and file globs.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::merge::Merge;
use crate::merge_fields;
use crate::platform::PlatformRules;
use crate::template::TemplateContext;
use crate::text::Blank;

/// Whether an artifact takes part in the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Not evaluated yet.
    #[default]
    Pending,
    /// Kept by the platform selection.
    Selected,
    /// Dropped by the platform selection.
    Rejected,
}

/// A file that is part of a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artifact {
    /// Path, possibly relative to the base directory and templated.
    pub path: Option<String>,
    /// Target name when the file is renamed on upload.
    pub transform: Option<String>,
    /// Platform token.
    pub platform: Option<String>,
    /// Missing optional artifacts are not errors.
    pub optional: Option<bool>,
    /// Free-form properties, including `skip<Packager>` flags.
    pub extra_properties: IndexMap<String, String>,
    /// Absolute path once resolved.
    #[serde(skip)]
    pub resolved: Option<Utf8PathBuf>,
    /// Platform selection outcome.
    #[serde(skip)]
    pub selection: Selection,
}

impl Merge for Artifact {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [path, transform, platform, optional, extra_properties]);
        if self.resolved.is_none() {
            self.resolved = other.resolved;
        }
        if self.selection == Selection::Pending {
            self.selection = other.selection;
        }
    }
}

impl Artifact {
    /// Artifact for an already resolved file.
    pub fn resolved_at(path: Utf8PathBuf, platform: Option<String>) -> Self {
        Self {
            path: Some(path.to_string()),
            platform,
            resolved: Some(path),
            selection: Selection::Selected,
            ..Self::default()
        }
    }

    /// True when a missing file is acceptable.
    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    /// Platform after replacements.
    pub fn effective_platform(&self, rules: &PlatformRules) -> Option<String> {
        self.platform.non_blank().map(|p| rules.apply(p))
    }

    /// Absolute path: the resolved path when known, else the templated
    /// path expanded with `ctx` and the artifact's platform, joined onto
    /// `basedir` when relative.
    pub fn resolve_path(
        &self,
        ctx: &TemplateContext,
        basedir: &Utf8Path,
        rules: &PlatformRules,
    ) -> Option<Utf8PathBuf> {
        if let Some(resolved) = &self.resolved {
            return Some(resolved.clone());
        }
        let raw = self.path.non_blank()?;
        let mut ctx = ctx.clone();
        if let Some(platform) = self.effective_platform(rules) {
            ctx.set("platform", platform.clone());
            ctx.set("artifactPlatform", platform);
        }
        let rendered = Utf8PathBuf::from(ctx.render(raw));
        Some(if rendered.is_absolute() {
            rendered
        } else {
            basedir.join(rendered)
        })
    }

    /// True when `extra_properties[key]` is `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.extra_properties
            .get(key)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// File name of the path, if any.
    pub fn file_name(&self) -> Option<String> {
        let path = self.resolved.as_ref().map(|p| p.to_string()).or_else(|| self.path.clone())?;
        Utf8Path::new(&path).file_name().map(str::to_string)
    }
}

/// A set of files matched by a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glob {
    /// Glob pattern, e.g. `target/release/*.tar.gz`.
    pub pattern: Option<String>,
    /// Directory the pattern is relative to.
    pub directory: Option<String>,
    /// Platform token for every match.
    pub platform: Option<String>,
}

impl Merge for Glob {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [pattern, directory, platform]);
    }
}
