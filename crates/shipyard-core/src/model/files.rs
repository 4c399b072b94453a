//! Extra files attached to a release.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::artifact::{Artifact, Glob};
use crate::activation::{Active, activatable};
use crate::merge::Merge;
use crate::merge_fields;

/// Extra release files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Files {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Explicit files.
    pub artifacts: Vec<Artifact>,
    /// File globs.
    pub globs: Vec<Glob>,
    /// Free-form properties exposed to templates.
    pub extra_properties: IndexMap<String, String>,
}

impl Merge for Files {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, artifacts, globs, extra_properties]);
    }
}

activatable!(Files);

impl Files {
    /// True when nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.globs.is_empty()
    }
}
