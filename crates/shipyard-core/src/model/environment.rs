//! Property sources declared in configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::merge::Merge;
use crate::merge_fields;

/// Where extra properties come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Variables file (TOML, YAML or JSON), relative to the base directory.
    pub variables: Option<String>,
    /// Inline properties.
    pub properties: IndexMap<String, String>,
}

impl Merge for Environment {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [variables, properties]);
    }
}
