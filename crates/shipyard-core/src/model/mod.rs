//! The release model.
//!
//! One tree describes the project, its release service and every
//! integration unit (assemblers, packagers, announcers...). It is
//! deserialized from configuration with every field optional; validation
//! then fills defaults in place and records what is missing.
//!
//! Fields marked `#[serde(skip)]` are computed during validation (resolved
//! `enabled` flags, assembler outputs) and never come from configuration.

pub mod announce;
pub mod artifact;
pub mod assemble;
pub mod catalog;
pub mod checksum;
pub mod deploy;
pub mod distribution;
pub mod download;
pub mod environment;
pub mod extensions;
pub mod files;
pub mod hooks;
pub mod matrix;
pub mod packagers;
pub mod project;
pub mod release;
pub mod signing;
pub mod swid;
pub mod upload;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::activation::{Active, Lifecycle};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;
use crate::platform::PlatformRules;

pub use announce::Announce;
pub use artifact::{Artifact, Glob, Selection};
pub use assemble::{Assemble, Assembler, AssemblerKind};
pub use catalog::Catalog;
pub use checksum::Checksum;
pub use deploy::Deploy;
pub use distribution::Distribution;
pub use download::Download;
pub use environment::Environment;
pub use extensions::Extension;
pub use files::Files;
pub use hooks::Hooks;
pub use matrix::Matrix;
pub use packagers::Packagers;
pub use project::Project;
pub use release::{Commit, Release};
pub use signing::Signing;
pub use swid::SwidTag;
pub use upload::Upload;

keyword_enum! {
    /// Broad kind of application being released.
    pub enum Stereotype {
        /// Unspecified.
        None => "NONE",
        /// Command line tool.
        Cli => "CLI",
        /// Desktop application.
        Desktop => "DESKTOP",
        /// Web application.
        Web => "WEB",
        /// Mobile application.
        Mobile => "MOBILE",
    }
}

keyword_enum! {
    /// Shape of a distribution's artifacts.
    pub enum DistributionType {
        /// Platform-specific binaries in an archive.
        Binary => "BINARY",
        /// A single bare executable per platform.
        FlatBinary => "FLAT_BINARY",
        /// A Java application launched through a script.
        JavaBinary => "JAVA_BINARY",
        /// A jlink runtime image.
        Jlink => "JLINK",
        /// A GraalVM native image.
        NativeImage => "NATIVE_IMAGE",
        /// An installer such as `.deb`, `.pkg` or `.msi`.
        NativePackage => "NATIVE_PACKAGE",
        /// An executable JAR.
        SingleJar => "SINGLE_JAR",
    }
}

impl DistributionType {
    /// Types that carry Java launch metadata.
    pub const fn is_java(self) -> bool {
        matches!(self, Self::JavaBinary | Self::Jlink | Self::SingleJar | Self::NativeImage)
    }
}

keyword_enum! {
    /// HTTP authorization scheme.
    pub enum Authorization {
        /// No credentials.
        None => "NONE",
        /// Username and password.
        Basic => "BASIC",
        /// Bearer token.
        Bearer => "BEARER",
    }
}

keyword_enum! {
    /// HTTP method for uploads and webhooks.
    pub enum HttpMethod {
        /// POST.
        Post => "POST",
        /// PUT.
        Put => "PUT",
    }
}

keyword_enum! {
    /// Archive container formats.
    pub enum ArchiveFormat {
        /// `.zip`
        Zip => "ZIP",
        /// `.tar`
        Tar => "TAR",
        /// `.tar.gz`
        TarGz => "TAR_GZ",
        /// `.tar.xz`
        TarXz => "TAR_XZ",
        /// `.tar.bz2`
        TarBz2 => "TAR_BZ2",
        /// `.tar.zst`
        TarZst => "TAR_ZST",
        /// `.tgz`
        Tgz => "TGZ",
        /// `.txz`
        Txz => "TXZ",
        /// `.tbz2`
        Tbz2 => "TBZ2",
    }
}

impl ArchiveFormat {
    /// File extension without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarXz => "tar.xz",
            Self::TarBz2 => "tar.bz2",
            Self::TarZst => "tar.zst",
            Self::Tgz => "tgz",
            Self::Txz => "txz",
            Self::Tbz2 => "tbz2",
        }
    }
}

/// Fields shared by announcers, uploaders, downloaders and deployers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitBase {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Name the unit is registered under.
    #[serde(skip)]
    pub name: String,
    /// Connect timeout in seconds.
    pub connect_timeout: Option<u32>,
    /// Read timeout in seconds.
    pub read_timeout: Option<u32>,
    /// Free-form properties exposed to templates.
    pub extra_properties: IndexMap<String, String>,
}

impl Merge for UnitBase {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, connect_timeout, read_timeout, extra_properties]
        );
    }
}

/// Java launch metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Java {
    /// Maven group id.
    pub group_id: Option<String>,
    /// Maven artifact id.
    pub artifact_id: Option<String>,
    /// Target Java version.
    pub version: Option<String>,
    /// Main class.
    pub main_class: Option<String>,
    /// Main module.
    pub main_module: Option<String>,
    /// Part of a multi-module build.
    pub multi_project: Option<bool>,
    /// JVM options for launchers.
    pub jvm_options: Vec<String>,
}

impl Merge for Java {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [group_id, artifact_id, version, main_class, main_module, multi_project, jvm_options]
        );
    }
}

/// Launcher name and per-OS extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Executable {
    /// Launcher name.
    pub name: Option<String>,
    /// Extension on unix, usually empty.
    pub unix_extension: Option<String>,
    /// Extension on windows.
    pub windows_extension: Option<String>,
}

impl Merge for Executable {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [name, unix_extension, windows_extension]);
    }
}

/// The whole release model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    /// Property sources.
    pub environment: Environment,
    /// Project metadata.
    pub project: Project,
    /// Global platform replacements.
    pub platform: PlatformRules,
    /// Release service.
    pub release: Release,
    /// Root packager settings inherited by distributions.
    pub packagers: Packagers,
    /// Announcers.
    pub announce: Announce,
    /// Downloaders.
    pub download: Download,
    /// Assemblers.
    pub assemble: Assemble,
    /// Deployers.
    pub deploy: Deploy,
    /// Uploaders.
    pub upload: Upload,
    /// Checksum settings.
    pub checksum: Checksum,
    /// Signing settings.
    pub signing: Signing,
    /// Extra release files.
    pub files: Files,
    /// SBOM and attestation catalogers.
    pub catalog: Catalog,
    /// Workflow hooks.
    pub hooks: Hooks,
    /// Default build matrix.
    pub matrix: Matrix,
    /// SWID tags by name.
    pub swid: IndexMap<String, SwidTag>,
    /// Distributions by name.
    pub distributions: IndexMap<String, Distribution>,
    /// Extensions by name.
    pub extensions: IndexMap<String, Extension>,
    /// Head commit, when running inside a repository.
    #[serde(skip)]
    pub commit: Option<Commit>,
}

impl Merge for Model {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                environment,
                project,
                platform,
                release,
                packagers,
                announce,
                download,
                assemble,
                deploy,
                upload,
                checksum,
                signing,
                files,
                catalog,
                hooks,
                matrix,
                swid,
                distributions,
                extensions,
            ]
        );
        if self.commit.is_none() {
            self.commit = other.commit;
        }
    }
}

/// Default snapshot pattern.
pub const DEFAULT_SNAPSHOT_PATTERN: &str = ".*-SNAPSHOT";

impl Model {
    /// Release status derived from the project version, the snapshot
    /// pattern and the release service's prerelease pattern.
    pub fn lifecycle(&self) -> Lifecycle {
        let version = self.project.version.as_deref().unwrap_or_default();
        let pattern = self
            .project
            .snapshot
            .pattern
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_SNAPSHOT_PATTERN);
        let snapshot = full_match(pattern, version)
            .unwrap_or_else(|| version.ends_with("-SNAPSHOT"));

        let prerelease_pattern = self
            .release
            .service()
            .and_then(|(_, service)| service.prerelease.pattern.clone())
            .filter(|p| !p.trim().is_empty());
        let prerelease = match prerelease_pattern {
            Some(pattern) => full_match(&pattern, version).unwrap_or(false),
            None => semver::Version::parse(version).is_ok_and(|v| !v.pre.is_empty()),
        };

        Lifecycle {
            snapshot,
            prerelease: prerelease && !snapshot,
        }
    }
}

/// Whole-string regex match; `None` when the pattern does not compile.
pub(crate) fn full_match(pattern: &str, value: &str) -> Option<bool> {
    Regex::new(&format!("^(?:{pattern})$"))
        .ok()
        .map(|re| re.is_match(value))
}
