//! Deployers: publish staged Maven artifacts to repositories.
//!
//! Deployer types differ only in defaults and required fields, so a single
//! [`MavenDeployer`] struct carries every field and [`DeployerKind::handler`]
//! maps each type to its rules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Authorization, UnitBase};
use crate::activation::{Activatable, Active, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Maven deployer types.
    pub enum DeployerKind {
        /// JFrog Artifactory.
        Artifactory => "artifactory",
        /// Azure Artifacts.
        Azure => "azure",
        /// Gitea packages.
        Gitea => "gitea",
        /// GitHub packages.
        Github => "github",
        /// GitLab packages.
        Gitlab => "gitlab",
        /// Sonatype Nexus 2.
        Nexus2 => "nexus2",
        /// Maven Central portal.
        MavenCentral => "maven-central",
    }
}

/// Per-type deployer rules.
#[derive(Debug, Clone, Copy)]
pub struct DeployerHandler {
    /// Type handled.
    pub kind: DeployerKind,
    /// Default URL when none is configured.
    pub default_url: Option<&'static str>,
    /// The URL must be set or resolvable.
    pub requires_url: bool,
    /// Authorization used when none is configured.
    pub default_authorization: Authorization,
    /// A user name is required.
    pub requires_username: bool,
    /// Artifacts are signed unless disabled.
    pub sign_by_default: bool,
    /// Deployments must be verified with pomchecker.
    pub verify_pom: bool,
}

const HANDLERS: [DeployerHandler; 7] = [
    DeployerHandler {
        kind: DeployerKind::Artifactory,
        default_url: None,
        requires_url: true,
        default_authorization: Authorization::Basic,
        requires_username: true,
        sign_by_default: false,
        verify_pom: false,
    },
    DeployerHandler {
        kind: DeployerKind::Azure,
        default_url: None,
        requires_url: true,
        default_authorization: Authorization::Basic,
        requires_username: true,
        sign_by_default: false,
        verify_pom: false,
    },
    DeployerHandler {
        kind: DeployerKind::Gitea,
        default_url: None,
        requires_url: true,
        default_authorization: Authorization::Bearer,
        requires_username: false,
        sign_by_default: false,
        verify_pom: false,
    },
    DeployerHandler {
        kind: DeployerKind::Github,
        default_url: Some("https://maven.pkg.github.com/{{repoOwner}}/{{repoName}}"),
        requires_url: false,
        default_authorization: Authorization::Bearer,
        requires_username: false,
        sign_by_default: false,
        verify_pom: false,
    },
    DeployerHandler {
        kind: DeployerKind::Gitlab,
        default_url: None,
        requires_url: true,
        default_authorization: Authorization::Bearer,
        requires_username: false,
        sign_by_default: false,
        verify_pom: false,
    },
    DeployerHandler {
        kind: DeployerKind::Nexus2,
        default_url: None,
        requires_url: true,
        default_authorization: Authorization::Basic,
        requires_username: true,
        sign_by_default: true,
        verify_pom: true,
    },
    DeployerHandler {
        kind: DeployerKind::MavenCentral,
        default_url: Some("https://central.sonatype.com/api/v1/publisher"),
        requires_url: false,
        default_authorization: Authorization::Bearer,
        requires_username: true,
        sign_by_default: true,
        verify_pom: true,
    },
];

impl DeployerKind {
    /// Rules for this type.
    pub fn handler(self) -> &'static DeployerHandler {
        // `ALL` and `HANDLERS` share the declaration order.
        &HANDLERS[self as usize]
    }
}

/// A Maven deployer of any type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MavenDeployer {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Type, set from the table the deployer is declared in.
    #[serde(skip)]
    pub kind: Option<DeployerKind>,
    /// Repository URL template.
    pub url: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Password or token.
    pub password: Option<String>,
    /// Authorization scheme.
    pub authorization: Option<Authorization>,
    /// Sign artifacts.
    pub sign: Option<bool>,
    /// Require source jars.
    pub source_jar: Option<bool>,
    /// Require javadoc jars.
    pub javadoc_jar: Option<bool>,
    /// Verify POMs.
    pub verify_pom: Option<bool>,
    /// Apply the Maven Central rules regardless of type.
    pub apply_maven_central_rules: Option<bool>,
    /// Local directories holding staged artifacts.
    pub staging_repositories: Vec<String>,
    /// Artifact overrides by coordinates.
    pub artifact_overrides: Vec<ArtifactOverride>,
    /// Nexus staging profile.
    pub staging_profile_id: Option<String>,
    /// Close the staging repository.
    pub close_repository: Option<bool>,
    /// Release the staging repository.
    pub release_repository: Option<bool>,
    /// Status polling retry delay in seconds.
    pub retry_delay: Option<u32>,
    /// Maximum status polling retries.
    pub max_retries: Option<u32>,
}

impl Merge for MavenDeployer {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                url,
                username,
                password,
                authorization,
                sign,
                source_jar,
                javadoc_jar,
                verify_pom,
                apply_maven_central_rules,
                staging_repositories,
                artifact_overrides,
                staging_profile_id,
                close_repository,
                release_repository,
                retry_delay,
                max_retries,
            ]
        );
        if self.kind.is_none() {
            self.kind = other.kind;
        }
    }
}

activatable!(base: MavenDeployer);

impl MavenDeployer {
    /// Type of this deployer.
    pub fn kind(&self) -> DeployerKind {
        self.kind.unwrap_or(DeployerKind::Artifactory)
    }
}

/// Per-artifact overrides of the Maven Central rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactOverride {
    /// Group id.
    pub group_id: Option<String>,
    /// Artifact id.
    pub artifact_id: Option<String>,
    /// Require a source jar.
    pub source_jar: Option<bool>,
    /// Require a javadoc jar.
    pub javadoc_jar: Option<bool>,
    /// Verify the POM.
    pub verify_pom: Option<bool>,
}

impl Merge for ArtifactOverride {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [group_id, artifact_id, source_jar, javadoc_jar, verify_pom]);
    }
}

/// POM verification tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pomchecker {
    /// Tool version.
    pub version: Option<String>,
    /// Fail on warnings.
    pub fail_on_warning: Option<bool>,
    /// Fail on errors.
    pub fail_on_error: Option<bool>,
}

impl Merge for Pomchecker {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [version, fail_on_warning, fail_on_error]);
    }
}

/// Maven deployers, by type and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Maven {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// POM verification tool.
    pub pomchecker: Pomchecker,
    /// Artifactory.
    pub artifactory: IndexMap<String, MavenDeployer>,
    /// Azure Artifacts.
    pub azure: IndexMap<String, MavenDeployer>,
    /// Gitea.
    pub gitea: IndexMap<String, MavenDeployer>,
    /// GitHub.
    pub github: IndexMap<String, MavenDeployer>,
    /// GitLab.
    pub gitlab: IndexMap<String, MavenDeployer>,
    /// Nexus 2.
    pub nexus2: IndexMap<String, MavenDeployer>,
    /// Maven Central.
    pub maven_central: IndexMap<String, MavenDeployer>,
}

impl Merge for Maven {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                active,
                explicit_enabled,
                pomchecker,
                artifactory,
                azure,
                gitea,
                github,
                gitlab,
                nexus2,
                maven_central,
            ]
        );
    }
}

impl Maven {
    /// Deployers of one type.
    pub fn by_kind(&self, kind: DeployerKind) -> &IndexMap<String, MavenDeployer> {
        match kind {
            DeployerKind::Artifactory => &self.artifactory,
            DeployerKind::Azure => &self.azure,
            DeployerKind::Gitea => &self.gitea,
            DeployerKind::Github => &self.github,
            DeployerKind::Gitlab => &self.gitlab,
            DeployerKind::Nexus2 => &self.nexus2,
            DeployerKind::MavenCentral => &self.maven_central,
        }
    }

    /// Deployers of one type, mutably.
    pub fn by_kind_mut(&mut self, kind: DeployerKind) -> &mut IndexMap<String, MavenDeployer> {
        match kind {
            DeployerKind::Artifactory => &mut self.artifactory,
            DeployerKind::Azure => &mut self.azure,
            DeployerKind::Gitea => &mut self.gitea,
            DeployerKind::Github => &mut self.github,
            DeployerKind::Gitlab => &mut self.gitlab,
            DeployerKind::Nexus2 => &mut self.nexus2,
            DeployerKind::MavenCentral => &mut self.maven_central,
        }
    }

    /// True when any deployer is enabled.
    pub fn any_enabled(&self) -> bool {
        DeployerKind::ALL
            .iter()
            .flat_map(|kind| self.by_kind(*kind).values())
            .any(Activatable::is_enabled)
    }
}

/// Every deployer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deploy {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Maven deployers.
    pub maven: Maven,
}

impl Merge for Deploy {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, maven]);
    }
}

activatable!(Deploy, Maven);
