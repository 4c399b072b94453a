//! SWID tags embedded by assemblers.

use serde::{Deserialize, Serialize};

use crate::activation::{Active, activatable};
use crate::merge::Merge;
use crate::merge_fields;

/// Registration id used when none is configured.
pub const DEFAULT_REGID: &str = "invalid.unavailable";

/// An entity named in a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    /// Entity name.
    pub name: Option<String>,
    /// Registration id.
    pub regid: Option<String>,
    /// Roles, e.g. `tagCreator`, `softwareCreator`.
    pub roles: Vec<String>,
}

impl Merge for Entity {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [name, regid, roles]);
    }
}

/// A SWID tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwidTag {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Name the tag is registered under.
    #[serde(skip)]
    pub name: String,
    /// Unique tag id.
    pub tag_id: Option<String>,
    /// Tag version.
    pub tag_version: Option<u32>,
    /// Directory the tag file is written to.
    pub path: Option<String>,
    /// Language.
    pub lang: Option<String>,
    /// Mark as corpus.
    pub corpus: Option<bool>,
    /// Mark as patch.
    pub patch: Option<bool>,
    /// Entities.
    pub entities: Vec<Entity>,
}

impl Merge for SwidTag {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, tag_id, tag_version, path, lang, corpus, patch, entities]
        );
    }
}

activatable!(SwidTag);
