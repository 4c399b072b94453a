//! SBOM and attestation catalogers.

use serde::{Deserialize, Serialize};

use crate::activation::{Activatable, Active, activatable};
use crate::merge::Merge;
use crate::merge_fields;

/// An SBOM generator run over the distribution artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SbomCataloger {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Tool version.
    pub version: Option<String>,
    /// Output formats, e.g. `JSON`, `XML`.
    pub formats: Vec<String>,
    /// Bundle outputs into one archive.
    pub pack: Pack,
    /// Catalog distribution artifacts.
    pub distributions: Option<bool>,
    /// Catalog extra files.
    pub files: Option<bool>,
}

impl Merge for SbomCataloger {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, version, formats, pack, distributions, files]
        );
    }
}

/// Bundling of SBOM outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pack {
    /// Bundle.
    pub enabled: Option<bool>,
    /// Bundle name template.
    pub name: Option<String>,
}

impl Merge for Pack {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [enabled, name]);
    }
}

/// SBOM generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sbom {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// CycloneDX.
    pub cyclonedx: SbomCataloger,
    /// Syft.
    pub syft: SbomCataloger,
}

impl Merge for Sbom {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, cyclonedx, syft]);
    }
}

/// GitHub artifact attestations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubCataloger {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Attestation file name template.
    pub attestation_name: Option<String>,
    /// Attest distribution artifacts.
    pub distributions: Option<bool>,
    /// Attest extra files.
    pub files: Option<bool>,
}

impl Merge for GithubCataloger {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, attestation_name, distributions, files]
        );
    }
}

/// SLSA provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlsaCataloger {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Attestation file name template.
    pub attestation_name: Option<String>,
    /// Attest distribution artifacts.
    pub distributions: Option<bool>,
    /// Attest extra files.
    pub files: Option<bool>,
}

impl Merge for SlsaCataloger {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, attestation_name, distributions, files]
        );
    }
}

activatable!(SbomCataloger, Sbom, GithubCataloger, SlsaCataloger, Catalog);

/// Every cataloger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// SBOM generators.
    pub sbom: Sbom,
    /// GitHub attestations.
    pub github: GithubCataloger,
    /// SLSA provenance.
    pub slsa: SlsaCataloger,
}

impl Merge for Catalog {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, sbom, github, slsa]);
    }
}

impl Catalog {
    /// True when any cataloger is enabled.
    pub fn any_enabled(&self) -> bool {
        self.sbom.is_enabled() || self.github.is_enabled() || self.slsa.is_enabled()
    }
}
