//! Project metadata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Java, Stereotype};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// How the project version is interpreted.
    pub enum VersionPattern {
        /// Semantic versioning.
        Semver => "SEMVER",
        /// Calendar versioning.
        Calver => "CALVER",
        /// Chronological versioning.
        Chronver => "CHRONVER",
        /// Java runtime version format.
        JavaRuntime => "JAVA_RUNTIME",
        /// Java module version format.
        JavaModule => "JAVA_MODULE",
        /// Anything goes.
        Custom => "CUSTOM",
    }
}

/// Project metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Project name.
    pub name: Option<String>,
    /// Project version.
    pub version: Option<String>,
    /// Version scheme.
    pub version_pattern: Option<VersionPattern>,
    /// Snapshot detection.
    pub snapshot: Snapshot,
    /// One-line description.
    pub description: Option<String>,
    /// Longer description.
    pub long_description: Option<String>,
    /// SPDX license id.
    pub license: Option<String>,
    /// Copyright line.
    pub copyright: Option<String>,
    /// Vendor name.
    pub vendor: Option<String>,
    /// Year the project started.
    pub inception_year: Option<String>,
    /// Authors.
    pub authors: Vec<String>,
    /// Maintainers.
    pub maintainers: Vec<String>,
    /// Tags or keywords.
    pub tags: Vec<String>,
    /// Kind of application.
    pub stereotype: Option<Stereotype>,
    /// Project links.
    pub links: Links,
    /// Language metadata.
    pub languages: Languages,
    /// Free-form properties exposed to templates.
    pub extra_properties: IndexMap<String, String>,
}

impl Merge for Project {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                name,
                version,
                version_pattern,
                snapshot,
                description,
                long_description,
                license,
                copyright,
                vendor,
                inception_year,
                authors,
                maintainers,
                tags,
                stereotype,
                links,
                languages,
                extra_properties,
            ]
        );
    }
}

/// Snapshot detection and labelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Regex matched against the whole version.
    pub pattern: Option<String>,
    /// Tag label used for snapshot releases.
    pub label: Option<String>,
    /// Generate the changelog from the first commit.
    pub full_changelog: Option<bool>,
}

impl Merge for Snapshot {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [pattern, label, full_changelog]);
    }
}

/// Project links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Links {
    /// Homepage.
    pub homepage: Option<String>,
    /// Documentation.
    pub documentation: Option<String>,
    /// License text.
    pub license: Option<String>,
    /// Issue tracker.
    pub bug_tracker: Option<String>,
    /// FAQ.
    pub faq: Option<String>,
    /// Help.
    pub help: Option<String>,
    /// Donations.
    pub donation: Option<String>,
    /// Contact.
    pub contact: Option<String>,
    /// Source browser.
    pub vcs_browser: Option<String>,
}

impl Merge for Links {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [homepage, documentation, license, bug_tracker, faq, help, donation, contact, vcs_browser]
        );
    }
}

impl Links {
    /// Every set link with its field name.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("homepage", &self.homepage),
            ("documentation", &self.documentation),
            ("license", &self.license),
            ("bug_tracker", &self.bug_tracker),
            ("faq", &self.faq),
            ("help", &self.help),
            ("donation", &self.donation),
            ("contact", &self.contact),
            ("vcs_browser", &self.vcs_browser),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// Language-specific metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Languages {
    /// Java.
    pub java: Java,
}

impl Merge for Languages {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [java]);
    }
}
