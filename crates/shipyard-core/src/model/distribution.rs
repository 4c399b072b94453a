//! Distributions: named groups of artifacts handed to packagers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::artifact::Artifact;
use super::assemble::AssemblerKind;
use super::packagers::{Brew, Chocolatey, Docker, Jbang, Packager, Packagers, Scoop, Sdkman, Snap, Winget};
use super::{DistributionType, Executable, Java, Stereotype};
use crate::activation::{Active, activatable};
use crate::merge::Merge;
use crate::merge_fields;
use crate::platform::PlatformRules;
use crate::template::TemplateContext;
use crate::text::Blank;

/// A named, typed group of artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Distribution {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Name the distribution is registered under.
    #[serde(skip)]
    pub name: String,
    /// Shape of the artifacts.
    #[serde(rename = "type")]
    pub distribution_type: Option<DistributionType>,
    /// Kind of application.
    pub stereotype: Option<Stereotype>,
    /// Launcher.
    pub executable: Executable,
    /// Java metadata.
    pub java: Java,
    /// Platform replacements for this distribution.
    pub platform: PlatformRules,
    /// Artifacts.
    pub artifacts: Vec<Artifact>,
    /// Tags.
    pub tags: Vec<String>,
    /// Free-form properties exposed to templates.
    pub extra_properties: IndexMap<String, String>,
    /// Homebrew.
    pub brew: Brew,
    /// Chocolatey.
    pub chocolatey: Chocolatey,
    /// Docker.
    pub docker: Docker,
    /// JBang.
    pub jbang: Jbang,
    /// Scoop.
    pub scoop: Scoop,
    /// SDKMAN.
    pub sdkman: Sdkman,
    /// Snapcraft.
    pub snap: Snap,
    /// Winget.
    pub winget: Winget,
    /// Assembler the distribution was synthesized from.
    #[serde(skip)]
    pub assembled_by: Option<AssemblerKind>,
}

impl Merge for Distribution {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                active,
                explicit_enabled,
                distribution_type,
                stereotype,
                executable,
                java,
                platform,
                artifacts,
                tags,
                extra_properties,
                brew,
                chocolatey,
                docker,
                jbang,
                scoop,
                sdkman,
                snap,
                winget,
            ]
        );
        if self.assembled_by.is_none() {
            self.assembled_by = other.assembled_by;
        }
    }
}

activatable!(Distribution);

impl Distribution {
    /// Empty distribution of the given type.
    pub fn named(name: impl Into<String>, distribution_type: DistributionType) -> Self {
        Self {
            name: name.into(),
            distribution_type: Some(distribution_type),
            ..Self::default()
        }
    }

    /// Type, defaulting to [`DistributionType::Binary`].
    pub fn kind(&self) -> DistributionType {
        self.distribution_type.unwrap_or(DistributionType::Binary)
    }

    /// Packagers in a fixed order.
    pub fn packagers(&self) -> [&dyn Packager; 8] {
        [
            &self.brew,
            &self.chocolatey,
            &self.docker,
            &self.jbang,
            &self.scoop,
            &self.sdkman,
            &self.snap,
            &self.winget,
        ]
    }

    /// Packagers, mutably.
    pub fn packagers_mut(&mut self) -> [&mut dyn Packager; 8] {
        [
            &mut self.brew,
            &mut self.chocolatey,
            &mut self.docker,
            &mut self.jbang,
            &mut self.scoop,
            &mut self.sdkman,
            &mut self.snap,
            &mut self.winget,
        ]
    }

    /// Fill packager settings left unset from the root table.
    pub fn inherit_packagers(&mut self, root: &Packagers) {
        let root = root.clone();
        merge_fields!(self, root, [brew, chocolatey, docker, jbang, scoop, sdkman, snap, winget]);
    }

    /// Template values for this distribution on top of `base`.
    pub fn templates(&self, base: &TemplateContext) -> TemplateContext {
        let mut templates = base.clone();
        templates.set("distributionName", self.name.as_str());
        templates.set("distributionType", self.kind().as_str());
        if let Some(executable) = self.executable.name.non_blank() {
            templates.set("distributionExecutableName", executable);
        }
        templates
    }

    /// Fill `resolved` on artifacts that only carry a declared path.
    pub fn resolve_artifacts(
        &mut self,
        base: &TemplateContext,
        basedir: &camino::Utf8Path,
        global: &PlatformRules,
    ) {
        let templates = self.templates(base);
        let rules = global.layered(&self.platform);
        for artifact in self.artifacts.iter_mut().filter(|a| a.resolved.is_none()) {
            artifact.resolved = artifact.resolve_path(&templates, basedir, &rules);
        }
    }

    /// Position of the artifact resolving to `path`, if any.
    pub fn artifact_index(&self, path: &camino::Utf8Path) -> Option<usize> {
        self.artifacts
            .iter()
            .position(|a| a.resolved.as_deref() == Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::{Utf8Path, Utf8PathBuf};

    #[test]
    fn type_comes_from_the_type_key() {
        let dist: Distribution = serde_json::from_str(r#"{"type":"JAVA_BINARY"}"#).unwrap();
        assert_eq!(dist.kind(), DistributionType::JavaBinary);
        assert_eq!(Distribution::default().kind(), DistributionType::Binary);
    }

    #[test]
    fn declared_artifacts_resolve_against_basedir() {
        let mut dist = Distribution::named("app", DistributionType::Binary);
        dist.artifacts.push(Artifact {
            path: Some("build/{{distributionName}}-{{projectVersion}}.zip".into()),
            ..Artifact::default()
        });
        let base = TemplateContext::new().with("projectVersion", "2.0.0");
        dist.resolve_artifacts(&base, Utf8Path::new("/work"), &PlatformRules::default());
        let expected = Utf8PathBuf::from("/work/build/app-2.0.0.zip");
        assert_eq!(dist.artifacts[0].resolved.as_ref(), Some(&expected));
        assert_eq!(dist.artifact_index(&expected), Some(0));
    }

    #[test]
    fn packagers_inherit_root_settings() {
        let mut root = Packagers::default();
        root.scoop.base.repository.name = Some("bucket".into());
        let mut dist = Distribution::named("app", DistributionType::Binary);
        dist.inherit_packagers(&root);
        assert_eq!(dist.scoop.base.repository.name.as_deref(), Some("bucket"));
    }

    #[test]
    fn finds_artifacts_by_resolved_path() {
        let mut dist = Distribution::default();
        dist.artifacts.push(Artifact::resolved_at(Utf8PathBuf::from("/out/a.zip"), None));
        assert_eq!(dist.artifact_index(Utf8Path::new("/out/a.zip")), Some(0));
        assert_eq!(dist.artifact_index(Utf8Path::new("/out/b.zip")), None);
    }
}
