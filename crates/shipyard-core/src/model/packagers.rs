//! Packagers: package-manager manifests generated per distribution.
//!
//! The root `packagers` table holds defaults; each distribution may carry
//! its own table per packager, which inherits from the root one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::release::CommitAuthor;
use super::DistributionType;
use crate::activation::{Active, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;
use crate::text::capitalize;

keyword_enum! {
    /// Supported packagers.
    pub enum PackagerKind {
        /// Homebrew formula or cask.
        Brew => "brew",
        /// Chocolatey package.
        Chocolatey => "chocolatey",
        /// Docker image.
        Docker => "docker",
        /// JBang catalog entry.
        Jbang => "jbang",
        /// Scoop manifest.
        Scoop => "scoop",
        /// SDKMAN candidate.
        Sdkman => "sdkman",
        /// Snapcraft package.
        Snap => "snap",
        /// Winget manifest.
        Winget => "winget",
    }
}

impl PackagerKind {
    /// Artifact extra property that opts an artifact out of this packager,
    /// e.g. `skipScoop`.
    pub fn skip_flag(self) -> String {
        format!("skip{}", capitalize(self.as_str()))
    }
}

/// Settings shared by every packager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerBase {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Failures in this packager do not fail the release.
    pub continue_on_error: Option<bool>,
    /// Download URL template for artifacts.
    pub download_url: Option<String>,
    /// Generate files but do not publish.
    pub skip_publishing: Option<bool>,
    /// Directory holding custom templates.
    pub template_directory: Option<String>,
    /// Template files to leave out.
    pub skip_templates: Vec<String>,
    /// Author of commits to the packager repository.
    pub commit_author: CommitAuthor,
    /// Repository the manifest is published to.
    pub repository: PackagerRepository,
    /// Free-form properties exposed to templates.
    pub extra_properties: IndexMap<String, String>,
}

impl Merge for PackagerBase {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                active,
                explicit_enabled,
                continue_on_error,
                download_url,
                skip_publishing,
                template_directory,
                skip_templates,
                commit_author,
                repository,
                extra_properties,
            ]
        );
    }
}

/// Repository a packager publishes to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerRepository {
    /// Owner.
    pub owner: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Branch.
    pub branch: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Token.
    pub token: Option<String>,
    /// Commit message template.
    pub commit_message: Option<String>,
}

impl Merge for PackagerRepository {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [owner, name, branch, username, token, commit_message]);
    }
}

/// Behavior common to every packager.
pub trait Packager: crate::activation::Activatable {
    /// Which packager this is.
    fn kind(&self) -> PackagerKind;
    /// Shared settings.
    fn base(&self) -> &PackagerBase;
    /// Shared settings, mutably.
    fn base_mut(&mut self) -> &mut PackagerBase;
    /// Distribution types the packager can handle.
    fn supported_types(&self) -> &'static [DistributionType];
    /// Artifact extensions it can consume for `distribution_type`.
    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str];
    /// Operating system the packager targets, if restricted.
    fn target_os(&self) -> Option<&'static str> {
        None
    }
    /// Default repository name, e.g. `homebrew-tap`.
    fn default_repository(&self) -> &'static str;
}

const ARCHIVES: &[&str] = &["zip", "tar.gz", "tgz", "tar.xz", "txz", "tar"];
const JAR: &[&str] = &["jar"];

macro_rules! packager {
    ($ty:ty, $kind:ident, [$($dt:ident),+], $repo:literal, $os:expr, |$t:ident| $exts:expr) => {
        impl Packager for $ty {
            fn kind(&self) -> PackagerKind {
                PackagerKind::$kind
            }
            fn base(&self) -> &PackagerBase {
                &self.base
            }
            fn base_mut(&mut self) -> &mut PackagerBase {
                &mut self.base
            }
            fn supported_types(&self) -> &'static [DistributionType] {
                &[$(DistributionType::$dt),+]
            }
            fn supported_extensions(&self, $t: DistributionType) -> &'static [&'static str] {
                $exts
            }
            fn target_os(&self) -> Option<&'static str> {
                $os
            }
            fn default_repository(&self) -> &'static str {
                $repo
            }
        }
    };
}

/// Homebrew formula or cask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brew {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Formula class name.
    pub formula_name: Option<String>,
    /// One formula covering every platform.
    pub multi_platform: Option<bool>,
    /// Formula dependencies.
    pub dependencies: IndexMap<String, String>,
    /// Livecheck stanza lines.
    pub livecheck: Vec<String>,
    /// Cask settings for native packages.
    pub cask: Cask,
}

/// Homebrew cask settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cask {
    /// Cask token.
    pub name: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// `.pkg` file name.
    pub pkg_name: Option<String>,
    /// `.app` bundle name.
    pub app_name: Option<String>,
}

impl Merge for Cask {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [name, display_name, pkg_name, app_name]);
    }
}

impl Merge for Brew {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, formula_name, multi_platform, dependencies, livecheck, cask]
        );
    }
}

packager!(
    Brew,
    Brew,
    [JavaBinary, Jlink, NativeImage, Binary, SingleJar, NativePackage],
    "homebrew-tap",
    None,
    |t| match t {
        DistributionType::SingleJar => JAR,
        DistributionType::NativePackage => &["dmg", "pkg", "zip"],
        _ => ARCHIVES,
    }
);

/// Chocolatey package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chocolatey {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Package id.
    pub package_name: Option<String>,
    /// Publishing account.
    pub username: Option<String>,
    /// Publishing API key.
    pub api_key: Option<String>,
    /// Package title.
    pub title: Option<String>,
    /// Icon URL.
    pub icon_url: Option<String>,
    /// Push source.
    pub source: Option<String>,
    /// Build on a remote runner.
    pub remote_build: Option<bool>,
}

impl Merge for Chocolatey {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, package_name, username, api_key, title, icon_url, source, remote_build]
        );
    }
}

packager!(
    Chocolatey,
    Chocolatey,
    [JavaBinary, Jlink, NativeImage, Binary, NativePackage],
    "chocolatey-bucket",
    Some("windows"),
    |t| match t {
        DistributionType::NativePackage => &["msi", "exe"],
        _ => &["zip"],
    }
);

/// A registry a Docker image is pushed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerRegistry {
    /// Registry name, e.g. `DEFAULT` or `ghcr.io`.
    pub server_name: Option<String>,
    /// Server address.
    pub server: Option<String>,
    /// Repository name.
    pub repository_name: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
}

impl Merge for DockerRegistry {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [server_name, server, repository_name, username, password]);
    }
}

/// Docker image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Docker {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Base image.
    pub base_image: Option<String>,
    /// Image name templates.
    pub image_names: Vec<String>,
    /// Registries to push to.
    pub registries: Vec<DockerRegistry>,
    /// Image labels.
    pub labels: IndexMap<String, String>,
    /// Extra `docker build` arguments.
    pub build_args: Vec<String>,
    /// Use the local artifact instead of downloading it.
    pub use_local_artifact: Option<bool>,
}

impl Merge for Docker {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, base_image, image_names, registries, labels, build_args, use_local_artifact]
        );
    }
}

packager!(
    Docker,
    Docker,
    [JavaBinary, Jlink, NativeImage, SingleJar, Binary, FlatBinary],
    "docker",
    Some("linux"),
    |t| match t {
        DistributionType::SingleJar => JAR,
        DistributionType::FlatBinary => &[""],
        _ => ARCHIVES,
    }
);

/// JBang catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Jbang {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Catalog alias.
    pub alias: Option<String>,
    /// Script name.
    pub script: Option<String>,
}

impl Merge for Jbang {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, alias, script]);
    }
}

packager!(
    Jbang,
    Jbang,
    [JavaBinary, SingleJar],
    "jbang-catalog",
    None,
    |t| match t {
        DistributionType::SingleJar => JAR,
        _ => &["zip", "tar.gz", "tgz", "jar"],
    }
);

/// Scoop manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoop {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Manifest name.
    pub package_name: Option<String>,
    /// URL checked for new versions.
    pub checkver_url: Option<String>,
    /// URL template for autoupdate.
    pub autoupdate_url: Option<String>,
}

impl Merge for Scoop {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, package_name, checkver_url, autoupdate_url]);
    }
}

packager!(
    Scoop,
    Scoop,
    [JavaBinary, Jlink, NativeImage, Binary, NativePackage],
    "scoop-bucket",
    Some("windows"),
    |t| match t {
        DistributionType::NativePackage => &["msi"],
        _ => &["zip"],
    }
);

keyword_enum! {
    /// SDKMAN release command.
    pub enum SdkmanCommand {
        /// New major version: becomes the default.
        Major => "MAJOR",
        /// Minor version: does not change the default.
        Minor => "MINOR",
    }
}

/// SDKMAN candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sdkman {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Candidate name.
    pub candidate: Option<String>,
    /// Release command.
    pub command: Option<SdkmanCommand>,
    /// API consumer key.
    pub consumer_key: Option<String>,
    /// API consumer token.
    pub consumer_token: Option<String>,
    /// Release notes URL.
    pub release_notes_url: Option<String>,
}

impl Merge for Sdkman {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, candidate, command, consumer_key, consumer_token, release_notes_url]
        );
    }
}

packager!(
    Sdkman,
    Sdkman,
    [JavaBinary, Jlink, NativeImage],
    "sdkman",
    None,
    |_t| &["zip"]
);

keyword_enum! {
    /// Snap grade.
    pub enum SnapGrade {
        /// Stable channel.
        Stable => "stable",
        /// Development channel.
        Devel => "devel",
    }
}

keyword_enum! {
    /// Snap confinement.
    pub enum SnapConfinement {
        /// Strict sandbox.
        Strict => "strict",
        /// Development mode.
        Devmode => "devmode",
        /// Classic, unconfined.
        Classic => "classic",
    }
}

/// Snapcraft package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snap {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Snap name.
    pub package_name: Option<String>,
    /// Base snap, e.g. `core22`.
    #[serde(rename = "base")]
    pub base_snap: Option<String>,
    /// Grade.
    pub grade: Option<SnapGrade>,
    /// Confinement.
    pub confinement: Option<SnapConfinement>,
    /// Exported store login file.
    pub exported_login: Option<String>,
    /// Build on a remote runner.
    pub remote_build: Option<bool>,
    /// Plug names.
    pub plugs: Vec<String>,
    /// Slot names.
    pub slots: Vec<String>,
}

impl Merge for Snap {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, package_name, base_snap, grade, confinement, exported_login, remote_build, plugs, slots]
        );
    }
}

packager!(
    Snap,
    Snap,
    [JavaBinary, Jlink, NativeImage, Binary],
    "snap",
    Some("linux"),
    |_t| &["tar.gz", "tgz", "zip"]
);

/// Winget publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WingetPublisher {
    /// Publisher name.
    pub name: Option<String>,
    /// Publisher URL.
    pub url: Option<String>,
}

impl Merge for WingetPublisher {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [name, url]);
    }
}

/// Winget manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Winget {
    /// Shared settings.
    #[serde(flatten)]
    pub base: PackagerBase,
    /// Package identifier, e.g. `Acme.App`.
    pub package_identifier: Option<String>,
    /// Package name.
    pub package_name: Option<String>,
    /// Publisher.
    pub publisher: WingetPublisher,
    /// Author.
    pub author: Option<String>,
    /// License.
    pub license: Option<String>,
    /// Short alias.
    pub moniker: Option<String>,
    /// Minimum OS version.
    pub minimum_os_version: Option<String>,
    /// MSI product code.
    pub product_code: Option<String>,
}

impl Merge for Winget {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                package_identifier,
                package_name,
                publisher,
                author,
                license,
                moniker,
                minimum_os_version,
                product_code,
            ]
        );
    }
}

packager!(
    Winget,
    Winget,
    [JavaBinary, Jlink, NativeImage, Binary, NativePackage],
    "winget-pkgs",
    Some("windows"),
    |t| match t {
        DistributionType::NativePackage => &["msi", "exe"],
        _ => &["zip"],
    }
);

activatable!(base: Brew, Chocolatey, Docker, Jbang, Scoop, Sdkman, Snap, Winget);

/// Root packager table, inherited by every distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Packagers {
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
}

impl Merge for Packagers {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [brew, chocolatey, docker, jbang, scoop, sdkman, snap, winget]);
    }
}

impl Packagers {
    /// Every packager in a fixed order.
    pub fn all(&self) -> [&dyn Packager; 8] {
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

    /// Every packager, mutably.
    pub fn all_mut(&mut self) -> [&mut dyn Packager; 8] {
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

    /// Fill unset fields of every packager from `root`.
    pub fn inherit(&mut self, root: &Self) {
        self.merge(root.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_flags_are_camel_cased() {
        assert_eq!(PackagerKind::Scoop.skip_flag(), "skipScoop");
        assert_eq!(PackagerKind::Brew.skip_flag(), "skipBrew");
    }

    #[test]
    fn distribution_packagers_inherit_root() {
        let mut root = Packagers::default();
        root.brew.base.repository.owner = Some("acme".into());
        root.brew.formula_name = Some("Root".into());

        let mut own = Packagers::default();
        own.brew.formula_name = Some("Own".into());
        own.inherit(&root);

        assert_eq!(own.brew.formula_name.as_deref(), Some("Own"));
        assert_eq!(own.brew.base.repository.owner.as_deref(), Some("acme"));
    }

    #[test]
    fn jbang_only_handles_java() {
        let jbang = Jbang::default();
        assert!(jbang.supported_types().contains(&DistributionType::SingleJar));
        assert!(!jbang.supported_types().contains(&DistributionType::Binary));
    }
}
