//! Assemblers: units that build release artifacts locally.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::artifact::{Artifact, Glob};
use super::matrix::Matrix;
use super::{ArchiveFormat, DistributionType, Executable, Java, Stereotype};
use crate::activation::{Active, Activatable, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;
use crate::platform::PlatformRules;

keyword_enum! {
    /// Assembler types, in the order they are processed.
    pub enum AssemblerKind {
        /// Archives of files and binaries.
        Archive => "archive",
        /// Debian packages.
        Deb => "deb",
        /// Java application archives.
        JavaArchive => "java-archive",
        /// jlink runtime images.
        Jlink => "jlink",
        /// jpackage installers.
        Jpackage => "jpackage",
        /// GraalVM native images.
        NativeImage => "native-image",
    }
}

/// Name template shared by archives and images.
pub const DEFAULT_IMAGE_NAME: &str = "{{distributionName}}-{{projectVersion}}";

impl AssemblerKind {
    /// Java-based assemblers carry executable and runtime metadata.
    pub const fn is_java(self) -> bool {
        matches!(self, Self::JavaArchive | Self::Jlink | Self::Jpackage | Self::NativeImage)
    }
}

/// Settings shared by every assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerBase {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Name the assembler is registered under.
    #[serde(skip)]
    pub name: String,
    /// Publish outputs as a distribution of the same name.
    pub exported: Option<bool>,
    /// Kind of application.
    pub stereotype: Option<Stereotype>,
    /// Platform replacements for this assembler.
    pub platform: PlatformRules,
    /// Directory holding custom templates.
    pub template_directory: Option<String>,
    /// Template files to leave out.
    pub skip_templates: Vec<String>,
    /// SWID tag to embed, by name.
    pub swid_tag: Option<String>,
    /// Input artifacts.
    pub artifacts: Vec<Artifact>,
    /// Input file globs.
    pub files: Vec<Glob>,
    /// Free-form properties exposed to templates.
    pub extra_properties: IndexMap<String, String>,
    /// Outputs found on disk.
    #[serde(skip)]
    pub outputs: Vec<Artifact>,
}

impl Merge for AssemblerBase {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                active,
                explicit_enabled,
                exported,
                stereotype,
                platform,
                template_directory,
                skip_templates,
                swid_tag,
                artifacts,
                files,
                extra_properties,
            ]
        );
    }
}

/// Behavior common to every assembler.
pub trait Assembler: Activatable {
    /// Which assembler this is.
    fn kind(&self) -> AssemblerKind;
    /// Shared settings.
    fn base(&self) -> &AssemblerBase;
    /// Shared settings, mutably.
    fn base_mut(&mut self) -> &mut AssemblerBase;
    /// Type of the distribution synthesized from this assembler.
    fn distribution_type(&self) -> DistributionType;
    /// Launcher metadata, for Java-based assemblers.
    fn executable(&self) -> Option<&Executable> {
        None
    }
    /// Runtime metadata, for Java-based assemblers.
    fn java(&self) -> Option<&Java> {
        None
    }
    /// Whether outputs become a distribution.
    fn is_exported(&self) -> bool {
        self.base().exported.unwrap_or(true)
    }
}

/// Archive assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveAssembler {
    /// Shared settings.
    #[serde(flatten)]
    pub base: AssemblerBase,
    /// Archive name template.
    pub archive_name: Option<String>,
    /// Type of the synthesized distribution.
    #[serde(rename = "distribution_type")]
    pub distribution_type: Option<DistributionType>,
    /// Append the platform to the archive name.
    pub attach_platform: Option<bool>,
    /// Formats to produce, in order.
    pub formats: Vec<ArchiveFormat>,
    /// Use the top-level matrix.
    pub apply_default_matrix: Option<bool>,
    /// Own matrix.
    pub matrix: Matrix,
}

impl Merge for ArchiveAssembler {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [base, archive_name, distribution_type, attach_platform, formats, apply_default_matrix, matrix]
        );
    }
}

/// Debian control file fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebControl {
    /// Package name.
    pub package_name: Option<String>,
    /// Package version.
    pub package_version: Option<String>,
    /// Package revision.
    pub package_revision: Option<u32>,
    /// Maintainer.
    pub maintainer: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Section.
    pub section: Option<String>,
    /// Priority.
    pub priority: Option<String>,
    /// Homepage.
    pub homepage: Option<String>,
    /// Dependencies.
    pub depends: Vec<String>,
    /// Virtual packages provided.
    pub provides: Vec<String>,
}

impl Merge for DebControl {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                package_name,
                package_version,
                package_revision,
                maintainer,
                description,
                section,
                priority,
                homepage,
                depends,
                provides,
            ]
        );
    }
}

/// Debian package assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebAssembler {
    /// Shared settings.
    #[serde(flatten)]
    pub base: AssemblerBase,
    /// Executable installed by the package.
    pub executable: Option<String>,
    /// Installation prefix.
    pub install_path: Option<String>,
    /// Control file.
    pub control: DebControl,
}

impl Merge for DebAssembler {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, executable, install_path, control]);
    }
}

/// Java archive assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JavaArchiveAssembler {
    /// Shared settings.
    #[serde(flatten)]
    pub base: AssemblerBase,
    /// Archive name template.
    pub archive_name: Option<String>,
    /// Launcher.
    pub executable: Executable,
    /// Runtime metadata.
    pub java: Java,
    /// Main JAR.
    pub main_jar: Artifact,
    /// Additional JARs.
    pub jars: Vec<Glob>,
    /// Formats to produce, in order.
    pub formats: Vec<ArchiveFormat>,
}

impl Merge for JavaArchiveAssembler {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [base, archive_name, executable, java, main_jar, jars, formats]);
    }
}

/// jdeps settings for jlink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Jdeps {
    /// `--multi-release` value.
    pub multi_release: Option<String>,
    /// `--ignore-missing-deps`.
    pub ignore_missing_deps: Option<bool>,
    /// Use a wildcard class path.
    pub use_wildcard_in_path: Option<bool>,
    /// Extra targets to analyze.
    pub targets: Vec<String>,
}

impl Merge for Jdeps {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [multi_release, ignore_missing_deps, use_wildcard_in_path, targets]
        );
    }
}

/// jlink assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JlinkAssembler {
    /// Shared settings.
    #[serde(flatten)]
    pub base: AssemblerBase,
    /// Image name template.
    pub image_name: Option<String>,
    /// Rename template applied to the image name.
    pub image_name_transform: Option<String>,
    /// JDK running jlink.
    pub jdk: Artifact,
    /// One JDK per target platform.
    pub target_jdks: Vec<Artifact>,
    /// Modules to link; computed by jdeps when empty.
    pub module_names: Vec<String>,
    /// Modules added to the computed set.
    pub additional_module_names: Vec<String>,
    /// Extra jlink arguments.
    pub args: Vec<String>,
    /// Copy JARs into the image.
    pub copy_jars: Option<bool>,
    /// jdeps settings.
    pub jdeps: Jdeps,
    /// Launcher.
    pub executable: Executable,
    /// Runtime metadata.
    pub java: Java,
    /// Main JAR.
    pub main_jar: Artifact,
    /// Additional JARs.
    pub jars: Vec<Glob>,
}

impl Merge for JlinkAssembler {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                image_name,
                image_name_transform,
                jdk,
                target_jdks,
                module_names,
                additional_module_names,
                args,
                copy_jars,
                jdeps,
                executable,
                java,
                main_jar,
                jars,
            ]
        );
    }
}

/// Application metadata for jpackage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationPackage {
    /// Application name.
    pub app_name: Option<String>,
    /// Application version; numeric only.
    pub app_version: Option<String>,
    /// Vendor.
    pub vendor: Option<String>,
    /// Copyright.
    pub copyright: Option<String>,
    /// License file.
    pub license_file: Option<String>,
}

impl Merge for ApplicationPackage {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [app_name, app_version, vendor, copyright, license_file]);
    }
}

/// jpackage launcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Launcher {
    /// Default arguments.
    pub arguments: Vec<String>,
    /// JVM options.
    pub java_options: Vec<String>,
    /// Additional launchers.
    pub launchers: Vec<String>,
}

impl Merge for Launcher {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [arguments, java_options, launchers]);
    }
}

/// Per-OS jpackage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JpackagePlatform {
    /// Installer types, e.g. `pkg`, `deb`, `msi`.
    pub types: Vec<String>,
    /// Application name override.
    pub app_name: Option<String>,
    /// Icon file.
    pub icon: Option<String>,
    /// Installation directory.
    pub install_dir: Option<String>,
    /// Resource directory.
    pub resource_dir: Option<String>,
    /// JDK used on this OS.
    pub jdk: Artifact,
    /// macOS bundle identifier.
    pub package_identifier: Option<String>,
    /// Sign the macOS package.
    pub sign: Option<bool>,
    /// Linux maintainer email.
    pub maintainer: Option<String>,
    /// Linux menu group or Windows start menu group.
    pub menu_group: Option<String>,
    /// Windows upgrade UUID.
    pub upgrade_uuid: Option<String>,
    /// Windows console launcher.
    pub console: Option<bool>,
}

impl Merge for JpackagePlatform {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                types,
                app_name,
                icon,
                install_dir,
                resource_dir,
                jdk,
                package_identifier,
                sign,
                maintainer,
                menu_group,
                upgrade_uuid,
                console,
            ]
        );
    }
}

/// jpackage assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JpackageAssembler {
    /// Shared settings.
    #[serde(flatten)]
    pub base: AssemblerBase,
    /// jlink assembler providing the runtime images.
    pub jlink: Option<String>,
    /// Append the platform to installer names.
    pub attach_platform: Option<bool>,
    /// Verbose jpackage output.
    pub verbose: Option<bool>,
    /// Application metadata.
    pub application_package: ApplicationPackage,
    /// Launcher settings.
    pub launcher: Launcher,
    /// Launcher.
    pub executable: Executable,
    /// Runtime metadata.
    pub java: Java,
    /// Main JAR.
    pub main_jar: Artifact,
    /// Additional JARs.
    pub jars: Vec<Glob>,
    /// macOS settings.
    pub osx: JpackagePlatform,
    /// Linux settings.
    pub linux: JpackagePlatform,
    /// Windows settings.
    pub windows: JpackagePlatform,
    /// Runtime images taken from the jlink assembler.
    #[serde(skip)]
    pub runtime_images: Vec<Artifact>,
}

impl Merge for JpackageAssembler {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                jlink,
                attach_platform,
                verbose,
                application_package,
                launcher,
                executable,
                java,
                main_jar,
                jars,
                osx,
                linux,
                windows,
            ]
        );
    }
}

impl JpackageAssembler {
    /// Settings for the OS part of `platform`.
    pub fn platform_settings(&self, platform: &str) -> Option<&JpackagePlatform> {
        match platform.split('-').next() {
            Some("osx") => Some(&self.osx),
            Some("linux" | "linux_musl") => Some(&self.linux),
            Some("windows") => Some(&self.windows),
            _ => None,
        }
    }
}

/// Archiving of native images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Archiving {
    /// Archive the image.
    pub enabled: Option<bool>,
    /// Archive format.
    pub format: Option<ArchiveFormat>,
}

impl Merge for Archiving {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [enabled, format]);
    }
}

/// UPX compression of native images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upx {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// UPX version.
    pub version: Option<String>,
    /// Extra arguments.
    pub args: Vec<String>,
}

impl Merge for Upx {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, version, args]);
    }
}

activatable!(Upx);

/// GraalVM native image assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeImageAssembler {
    /// Shared settings.
    #[serde(flatten)]
    pub base: AssemblerBase,
    /// Image name template.
    pub image_name: Option<String>,
    /// Rename template applied to the image name.
    pub image_name_transform: Option<String>,
    /// GraalVM running native-image.
    pub graal: Artifact,
    /// One GraalVM per target platform.
    pub graal_jdks: Vec<Artifact>,
    /// Extra native-image arguments.
    pub args: Vec<String>,
    /// GraalVM components to install.
    pub components: Vec<String>,
    /// Archive the resulting binary.
    pub archiving: Archiving,
    /// Compress with UPX.
    pub upx: Upx,
    /// Launcher.
    pub executable: Executable,
    /// Runtime metadata.
    pub java: Java,
    /// Main JAR.
    pub main_jar: Artifact,
    /// Additional JARs.
    pub jars: Vec<Glob>,
}

impl Merge for NativeImageAssembler {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                image_name,
                image_name_transform,
                graal,
                graal_jdks,
                args,
                components,
                archiving,
                upx,
                executable,
                java,
                main_jar,
                jars,
            ]
        );
    }
}

activatable!(
    base: ArchiveAssembler,
    DebAssembler,
    JavaArchiveAssembler,
    JlinkAssembler,
    JpackageAssembler,
    NativeImageAssembler,
);

macro_rules! assembler {
    (@java true, $value:expr) => {
        $value
    };
    (@java false, $value:expr) => {
        None
    };
    ($ty:ty, $kind:ident, |$s:ident| $dist:expr) => {
        assembler!($ty, $kind, |$s| $dist, java: false);
    };
    ($ty:ty, $kind:ident, |$s:ident| $dist:expr, java: $java:tt) => {
        impl Assembler for $ty {
            fn kind(&self) -> AssemblerKind {
                AssemblerKind::$kind
            }
            fn base(&self) -> &AssemblerBase {
                &self.base
            }
            fn base_mut(&mut self) -> &mut AssemblerBase {
                &mut self.base
            }
            fn distribution_type(&self) -> DistributionType {
                let $s = self;
                $dist
            }
            fn executable(&self) -> Option<&Executable> {
                assembler!(@java $java, Some(&self.executable))
            }
            fn java(&self) -> Option<&Java> {
                assembler!(@java $java, Some(&self.java))
            }
        }
    };
}

assembler!(ArchiveAssembler, Archive, |s| s
    .distribution_type
    .unwrap_or(DistributionType::Binary));
assembler!(DebAssembler, Deb, |_s| DistributionType::NativePackage);
assembler!(JavaArchiveAssembler, JavaArchive, |_s| DistributionType::JavaBinary, java: true);
assembler!(JlinkAssembler, Jlink, |_s| DistributionType::Jlink, java: true);
assembler!(JpackageAssembler, Jpackage, |_s| DistributionType::NativePackage, java: true);
assembler!(NativeImageAssembler, NativeImage, |_s| DistributionType::NativeImage, java: true);

/// Every assembler, grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assemble {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Archive assemblers.
    pub archive: IndexMap<String, ArchiveAssembler>,
    /// Debian package assemblers.
    pub deb: IndexMap<String, DebAssembler>,
    /// Java archive assemblers.
    pub java_archive: IndexMap<String, JavaArchiveAssembler>,
    /// jlink assemblers.
    pub jlink: IndexMap<String, JlinkAssembler>,
    /// jpackage assemblers.
    pub jpackage: IndexMap<String, JpackageAssembler>,
    /// Native image assemblers.
    pub native_image: IndexMap<String, NativeImageAssembler>,
}

impl Merge for Assemble {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, archive, deb, java_archive, jlink, jpackage, native_image]
        );
    }
}

activatable!(Assemble);

impl Assemble {
    /// Every assembler: by type in [`AssemblerKind`] order, then by
    /// declaration order.
    pub fn all(&self) -> Vec<&dyn Assembler> {
        let mut all: Vec<&dyn Assembler> = Vec::new();
        all.extend(self.archive.values().map(|a| a as &dyn Assembler));
        all.extend(self.deb.values().map(|a| a as &dyn Assembler));
        all.extend(self.java_archive.values().map(|a| a as &dyn Assembler));
        all.extend(self.jlink.values().map(|a| a as &dyn Assembler));
        all.extend(self.jpackage.values().map(|a| a as &dyn Assembler));
        all.extend(self.native_image.values().map(|a| a as &dyn Assembler));
        all
    }

    /// Every assembler, mutably, in the same order as [`all`](Self::all).
    pub fn all_mut(&mut self) -> Vec<&mut dyn Assembler> {
        let mut all: Vec<&mut dyn Assembler> = Vec::new();
        all.extend(self.archive.values_mut().map(|a| a as &mut dyn Assembler));
        all.extend(self.deb.values_mut().map(|a| a as &mut dyn Assembler));
        all.extend(self.java_archive.values_mut().map(|a| a as &mut dyn Assembler));
        all.extend(self.jlink.values_mut().map(|a| a as &mut dyn Assembler));
        all.extend(self.jpackage.values_mut().map(|a| a as &mut dyn Assembler));
        all.extend(self.native_image.values_mut().map(|a| a as &mut dyn Assembler));
        all
    }

    /// Find an assembler by name in any type.
    pub fn find(&self, name: &str) -> Option<&dyn Assembler> {
        self.all().into_iter().find(|a| a.base().name == name)
    }

    /// True when at least one assembler is enabled.
    pub fn any_enabled(&self) -> bool {
        self.all().iter().any(|a| a.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_follows_kind_order() {
        let mut assemble = Assemble::default();
        assemble.jlink.insert("b".into(), JlinkAssembler::default());
        assemble.archive.insert("a".into(), ArchiveAssembler::default());
        let kinds: Vec<AssemblerKind> = assemble.all().iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, [AssemblerKind::Archive, AssemblerKind::Jlink]);
    }

    #[test]
    fn distribution_types() {
        let archive = ArchiveAssembler::default();
        assert_eq!(archive.distribution_type(), DistributionType::Binary);
        assert_eq!(DebAssembler::default().distribution_type(), DistributionType::NativePackage);
        assert!(JlinkAssembler::default().java().is_some());
        assert!(DebAssembler::default().java().is_none());
    }

    #[test]
    fn jpackage_platform_settings_by_os() {
        let mut jpackage = JpackageAssembler::default();
        jpackage.linux.types = vec!["deb".into()];
        assert_eq!(
            jpackage.platform_settings("linux-x86_64").map(|p| p.types.clone()),
            Some(vec!["deb".to_string()])
        );
        assert!(jpackage.platform_settings("aix").is_none());
    }

    #[test]
    fn kind_parses_kebab_case() {
        assert_eq!("java-archive".parse::<AssemblerKind>().unwrap(), AssemblerKind::JavaArchive);
        assert_eq!("native_image".parse::<AssemblerKind>().unwrap(), AssemblerKind::NativeImage);
    }
}
