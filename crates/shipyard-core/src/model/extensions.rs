//! Extensions: externally loaded listeners and template functions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::merge::Merge;
use crate::merge_fields;

/// A provider offered by an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    /// Provider type, e.g. a listener type name.
    #[serde(rename = "type")]
    pub provider_type: Option<String>,
    /// Free-form properties passed to the provider.
    pub properties: IndexMap<String, String>,
}

impl Merge for Provider {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [provider_type, properties]);
    }
}

/// An extension, loaded from coordinates or a local directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extension {
    /// Explicit switch; extensions are on unless set to `false`.
    pub enabled: Option<bool>,
    /// Name the extension is registered under.
    #[serde(skip)]
    pub name: String,
    /// `group:artifact:version` coordinates.
    pub gav: Option<String>,
    /// Local directory holding the extension.
    pub directory: Option<String>,
    /// Providers offered.
    pub providers: Vec<Provider>,
}

impl Merge for Extension {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [enabled, gav, directory, providers]);
    }
}

impl Extension {
    /// True unless explicitly disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}
