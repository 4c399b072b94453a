//! Checksum generation settings.

use serde::{Deserialize, Serialize};

use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Digest algorithms.
    pub enum Algorithm {
        /// MD2.
        Md2 => "MD2",
        /// MD5.
        Md5 => "MD5",
        /// RIPEMD-160.
        Rmd160 => "RMD160",
        /// SHA-1.
        Sha1 => "SHA_1",
        /// SHA-256.
        Sha256 => "SHA_256",
        /// SHA-384.
        Sha384 => "SHA_384",
        /// SHA-512.
        Sha512 => "SHA_512",
        /// SHA3-224.
        Sha3_224 => "SHA3_224",
        /// SHA3-256.
        Sha3_256 => "SHA3_256",
        /// SHA3-384.
        Sha3_384 => "SHA3_384",
        /// SHA3-512.
        Sha3_512 => "SHA3_512",
    }
}

impl Algorithm {
    /// File extension for individual checksum files, e.g. `sha256`.
    pub fn extension(self) -> String {
        self.as_str().replace('_', "").to_ascii_lowercase()
    }
}

/// Default name of the aggregate checksum file.
pub const DEFAULT_CHECKSUM_NAME: &str = "checksums.txt";

/// Checksum generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checksum {
    /// Aggregate file name template.
    pub name: Option<String>,
    /// Also write one file per artifact and algorithm.
    pub individual: Option<bool>,
    /// Algorithms, in order; defaults to SHA-256.
    pub algorithms: Vec<Algorithm>,
    /// Checksum distribution artifacts.
    pub artifacts: Option<bool>,
    /// Checksum extra files.
    pub files: Option<bool>,
}

impl Merge for Checksum {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [name, individual, algorithms, artifacts, files]);
    }
}

impl Checksum {
    /// Fill defaults: name, SHA-256, and drop duplicate algorithms while
    /// keeping the first occurrence.
    pub fn apply_defaults(&mut self) {
        if self.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            self.name = Some(DEFAULT_CHECKSUM_NAME.to_string());
        }
        if self.algorithms.is_empty() {
            self.algorithms.push(Algorithm::Sha256);
        }
        let mut seen = Vec::new();
        self.algorithms.retain(|a| {
            if seen.contains(a) {
                false
            } else {
                seen.push(*a);
                true
            }
        });
        self.individual.get_or_insert(false);
        self.artifacts.get_or_insert(true);
        self.files.get_or_insert(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_filled_once() {
        let mut checksum = Checksum {
            algorithms: vec![Algorithm::Sha512, Algorithm::Md5, Algorithm::Sha512],
            ..Checksum::default()
        };
        checksum.apply_defaults();
        assert_eq!(checksum.name.as_deref(), Some(DEFAULT_CHECKSUM_NAME));
        assert_eq!(checksum.algorithms, [Algorithm::Sha512, Algorithm::Md5]);

        let before = checksum.clone();
        checksum.apply_defaults();
        assert_eq!(checksum, before);
    }

    #[test]
    fn sha256_when_empty() {
        let mut checksum = Checksum::default();
        checksum.apply_defaults();
        assert_eq!(checksum.algorithms, [Algorithm::Sha256]);
        assert_eq!(Algorithm::Sha256.extension(), "sha256");
        assert_eq!(Algorithm::Sha3_512.extension(), "sha3512");
    }
}
