//! Platform tokens: `os` or `os-arch`, e.g. `linux-x86_64`, `osx-aarch_64`.
//!
//! Tokens appear on artifacts, matrix rows and the `--select-platform` /
//! `--reject-platform` options. Users may map tokens to their own spelling
//! through `platform.replacements`; the mapped spelling ends up in file
//! names, while compatibility checks consider both spellings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ContextError, ContextResult};
use crate::merge::Merge;
use crate::merge_fields;

/// Operating systems understood in platform tokens.
pub const OPERATING_SYSTEMS: &[&str] = &[
    "aix",
    "hpux",
    "os400",
    "linux",
    "linux_musl",
    "osx",
    "freebsd",
    "openbsd",
    "netbsd",
    "sunos",
    "windows",
    "zos",
];

/// Architectures understood in platform tokens.
pub const ARCHITECTURES: &[&str] = &[
    "x86_64",
    "x86_32",
    "itanium_64",
    "itanium_32",
    "sparc_32",
    "sparc_64",
    "arm_32",
    "aarch_64",
    "aarch64",
    "arm64",
    "mips_32",
    "mipsel_32",
    "mips_64",
    "mipsel_64",
    "ppc_32",
    "ppcle_32",
    "ppc_64",
    "ppcle_64",
    "s390_32",
    "s390_64",
    "riscv",
    "riscv64",
];

/// User-defined platform spellings (`platform.replacements`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformRules {
    /// Token or token part to its replacement, e.g. `osx` -> `darwin`.
    pub replacements: IndexMap<String, String>,
}

impl Merge for PlatformRules {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [replacements]);
    }
}

impl PlatformRules {
    /// Apply replacements: the whole token first, then each part.
    pub fn apply(&self, platform: &str) -> String {
        if let Some(replaced) = self.replacements.get(platform) {
            return replaced.clone();
        }
        let part = |p: &str| self.replacements.get(p).cloned().unwrap_or_else(|| p.to_string());
        match split(platform) {
            (os, Some(arch)) => format!("{}-{}", part(os), part(arch)),
            (os, None) => part(os),
        }
    }

    /// Compatibility that sees through replacements.
    pub fn is_compatible(&self, expected: &str, actual: &str) -> bool {
        is_compatible(expected, actual)
            || is_compatible(&self.apply(expected), &self.apply(actual))
            || self.apply(expected) == actual
            || expected == self.apply(actual)
    }

    /// Rules with `other`'s entries filling gaps in `self`.
    pub fn layered(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.merge(other.clone());
        merged
    }
}

fn split(platform: &str) -> (&str, Option<&str>) {
    match platform.split_once('-') {
        Some((os, arch)) => (os, Some(arch)),
        None => (platform, None),
    }
}

fn canonical_arch(arch: &str) -> &str {
    match arch {
        "aarch64" | "arm64" | "aarch_64" => "aarch_64",
        "riscv" | "riscv64" => "riscv64",
        other => other,
    }
}

/// True for `os` or `os-arch` made of known parts.
pub fn is_supported(platform: &str) -> bool {
    match split(platform.trim()) {
        (os, None) => OPERATING_SYSTEMS.contains(&os),
        (os, Some(arch)) => OPERATING_SYSTEMS.contains(&os) && ARCHITECTURES.contains(&arch),
    }
}

/// `expected` matches `actual` when the operating systems agree and either
/// side omits the architecture or both architectures are the same.
pub fn is_compatible(expected: &str, actual: &str) -> bool {
    let (expected_os, expected_arch) = split(expected);
    let (actual_os, actual_arch) = split(actual);
    if expected_os != actual_os {
        return false;
    }
    match (expected_arch, actual_arch) {
        (Some(a), Some(b)) => canonical_arch(a) == canonical_arch(b),
        _ => true,
    }
}

/// Token for the running host.
pub fn current() -> String {
    let os = match std::env::consts::OS {
        "macos" => "osx",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "aarch64" => "aarch_64",
        "x86" => "x86_32",
        "arm" => "arm_32",
        "powerpc64" => "ppc_64",
        "s390x" => "s390_64",
        other => other,
    };
    format!("{os}-{arch}")
}

/// Debian architecture for an artifact platform.
///
/// A missing platform is `all`; only linux on x86_64 and aarch64 map to a
/// binary architecture. Anything else is not packaged.
pub fn debian_architecture(platform: Option<&str>) -> Option<&'static str> {
    let Some(platform) = platform.filter(|p| !p.trim().is_empty()) else {
        return Some("all");
    };
    match split(platform) {
        ("linux", Some("x86_64")) => Some("amd64"),
        ("linux", Some(arch)) if canonical_arch(arch) == "aarch_64" => Some("arm64"),
        _ => None,
    }
}

/// Platforms kept or dropped for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSelection {
    selected: Vec<String>,
    rejected: Vec<String>,
}

impl PlatformSelection {
    /// Validate and build a selection. Unknown tokens fail fast.
    pub fn new(selected: Vec<String>, rejected: Vec<String>) -> ContextResult<Self> {
        for (tokens, option) in [(&selected, "select-platform"), (&rejected, "reject-platform")] {
            if let Some(bad) = tokens.iter().find(|t| !is_supported(t)) {
                return Err(ContextError::UnsupportedPlatform {
                    platform: bad.clone(),
                    option,
                });
            }
        }
        Ok(Self { selected, rejected })
    }

    /// Selected tokens.
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Rejected tokens.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// True when neither list has entries.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.rejected.is_empty()
    }

    /// Whether an artifact for `platform` takes part in this run.
    ///
    /// Platform-less artifacts always do.
    pub fn is_selected(&self, platform: Option<&str>, rules: &PlatformRules) -> bool {
        let Some(platform) = platform.filter(|p| !p.trim().is_empty()) else {
            return true;
        };
        if self.rejected.iter().any(|r| rules.is_compatible(r, platform)) {
            return false;
        }
        self.selected.is_empty() || self.selected.iter().any(|s| rules.is_compatible(s, platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("linux-x86_64", true)]
    #[case("osx", true)]
    #[case("windows-aarch_64", true)]
    #[case("plan9-x86_64", false)]
    #[case("linux-quantum", false)]
    fn supported_tokens(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(is_supported(token), expected);
    }

    #[rstest]
    #[case("linux", "linux-x86_64", true)]
    #[case("linux-x86_64", "linux", true)]
    #[case("linux-aarch64", "linux-aarch_64", true)]
    #[case("linux-x86_64", "linux-aarch_64", false)]
    #[case("osx-x86_64", "linux-x86_64", false)]
    fn compatibility(#[case] expected: &str, #[case] actual: &str, #[case] result: bool) {
        assert_eq!(is_compatible(expected, actual), result);
    }

    #[rstest]
    #[case(Some("linux-x86_64"), Some("amd64"))]
    #[case(Some("linux-aarch64"), Some("arm64"))]
    #[case(Some("linux-aarch_64"), Some("arm64"))]
    #[case(None, Some("all"))]
    #[case(Some(" "), Some("all"))]
    #[case(Some("osx-x86_64"), None)]
    #[case(Some("linux-ppc_64"), None)]
    fn debian_arch(#[case] platform: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(debian_architecture(platform), expected);
    }

    #[test]
    fn replacements_apply_to_whole_token_then_parts() {
        let mut rules = PlatformRules::default();
        rules.replacements.insert("osx".into(), "darwin".into());
        rules.replacements.insert("linux-x86_64".into(), "linux-amd64".into());
        assert_eq!(rules.apply("osx-aarch_64"), "darwin-aarch_64");
        assert_eq!(rules.apply("linux-x86_64"), "linux-amd64");
        assert_eq!(rules.apply("windows"), "windows");
    }

    #[test]
    fn compatibility_sees_through_replacements() {
        let mut rules = PlatformRules::default();
        rules.replacements.insert("osx".into(), "darwin".into());
        assert!(rules.is_compatible("darwin-x86_64", "osx-x86_64"));
        assert!(!rules.is_compatible("darwin-x86_64", "linux-x86_64"));
    }

    #[test]
    fn selection_rejects_unknown_tokens() {
        let err = PlatformSelection::new(vec!["mars-x86_64".into()], vec![]).unwrap_err();
        assert!(matches!(err, ContextError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn selection_filters_platforms() {
        let rules = PlatformRules::default();
        let selection = PlatformSelection::new(vec!["linux".into()], vec![]).unwrap();
        assert!(selection.is_selected(Some("linux-x86_64"), &rules));
        assert!(!selection.is_selected(Some("osx-x86_64"), &rules));
        assert!(selection.is_selected(None, &rules));

        let rejecting = PlatformSelection::new(vec![], vec!["windows".into()]).unwrap();
        assert!(!rejecting.is_selected(Some("windows-x86_64"), &rules));
        assert!(rejecting.is_selected(Some("osx-x86_64"), &rules));
    }

    #[test]
    fn current_platform_is_supported_on_common_hosts() {
        let host = current();
        if ["linux", "macos", "windows"].contains(&std::env::consts::OS)
            && ["x86_64", "aarch64"].contains(&std::env::consts::ARCH)
        {
            assert!(is_supported(&host), "{host}");
        }
    }
}
