//! Signing settings.

use serde::{Deserialize, Serialize};

use crate::activation::{Active, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Where signing keys come from.
    pub enum SigningMode {
        /// Armored keys held in properties.
        Memory => "MEMORY",
        /// Key files on disk.
        File => "FILE",
        /// An external `gpg` command.
        Command => "COMMAND",
        /// Sigstore cosign.
        Cosign => "COSIGN",
    }
}

/// External `gpg` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningCommand {
    /// Executable.
    pub executable: Option<String>,
    /// Key name.
    pub key_name: Option<String>,
    /// Home directory.
    pub home_dir: Option<String>,
    /// Public keyring.
    pub public_keyring: Option<String>,
    /// Pass `--no-default-keyring`.
    pub default_keyring: Option<bool>,
    /// Extra arguments.
    pub args: Vec<String>,
}

impl Merge for SigningCommand {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [executable, key_name, home_dir, public_keyring, default_keyring, args]
        );
    }
}

/// Sigstore cosign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cosign {
    /// Tool version.
    pub version: Option<String>,
    /// Private key file.
    pub private_key_file: Option<String>,
    /// Public key file.
    pub public_key_file: Option<String>,
}

impl Merge for Cosign {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [version, private_key_file, public_key_file]);
    }
}

/// Signing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signing {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// ASCII-armor signatures.
    pub armored: Option<bool>,
    /// Key source.
    pub mode: Option<SigningMode>,
    /// Public key (memory) or key file (file).
    pub public_key: Option<String>,
    /// Secret key (memory) or key file (file).
    pub secret_key: Option<String>,
    /// Key passphrase.
    pub passphrase: Option<String>,
    /// Sign distribution artifacts.
    pub artifacts: Option<bool>,
    /// Sign extra files.
    pub files: Option<bool>,
    /// Sign checksum files.
    pub checksums: Option<bool>,
    /// Sign catalogs.
    pub catalogs: Option<bool>,
    /// Verify signatures after signing.
    pub verify: Option<bool>,
    /// External command settings.
    pub command: SigningCommand,
    /// Cosign settings.
    pub cosign: Cosign,
}

impl Merge for Signing {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                active,
                explicit_enabled,
                armored,
                mode,
                public_key,
                secret_key,
                passphrase,
                artifacts,
                files,
                checksums,
                catalogs,
                verify,
                command,
                cosign,
            ]
        );
    }
}

activatable!(Signing);

impl Signing {
    /// Key source, defaulting to memory.
    pub fn mode(&self) -> SigningMode {
        self.mode.unwrap_or(SigningMode::Memory)
    }

    /// Signature file extension.
    pub fn signature_extension(&self) -> &'static str {
        match (self.mode(), self.armored.unwrap_or(false)) {
            (SigningMode::Cosign, _) => "sig",
            (_, true) => "asc",
            (_, false) => "sig",
        }
    }
}
