//! Downloaders: fetch external assets before assembly.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Authorization, UnitBase};
use crate::activation::{Activatable, Active, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Downloader types.
    pub enum DownloaderKind {
        /// FTP.
        Ftp => "ftp",
        /// HTTP(S).
        Http => "http",
        /// SCP over SSH.
        Scp => "scp",
        /// SFTP over SSH.
        Sftp => "sftp",
    }
}

/// A file to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    /// Remote path or URL template.
    pub input: Option<String>,
    /// Local file name template; defaults to the input's file name.
    pub output: Option<String>,
    /// Unpack archives after download.
    pub unpack: Unpack,
}

impl Merge for Asset {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [input, output, unpack]);
    }
}

/// Archive unpacking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unpack {
    /// Unpack.
    pub enabled: Option<bool>,
    /// Drop the archive's root entry.
    pub skip_root_entry: Option<bool>,
}

impl Merge for Unpack {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [enabled, skip_root_entry]);
    }
}

/// A downloader of any type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Downloader {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Type, set from the table the downloader is declared in.
    #[serde(skip)]
    pub kind: Option<DownloaderKind>,
    /// Remote host, for FTP and SSH.
    pub host: Option<String>,
    /// Remote port.
    pub port: Option<u16>,
    /// User name.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// HTTP authorization scheme.
    pub authorization: Option<Authorization>,
    /// Extra HTTP headers.
    pub headers: IndexMap<String, String>,
    /// SSH known hosts file.
    pub known_hosts_file: Option<String>,
    /// SSH public key.
    pub public_key: Option<String>,
    /// SSH private key.
    pub private_key: Option<String>,
    /// SSH key passphrase.
    pub passphrase: Option<String>,
    /// SSH host key fingerprint.
    pub fingerprint: Option<String>,
    /// Files to fetch.
    pub assets: Vec<Asset>,
}

impl Merge for Downloader {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                host,
                port,
                username,
                password,
                authorization,
                headers,
                known_hosts_file,
                public_key,
                private_key,
                passphrase,
                fingerprint,
                assets,
            ]
        );
        if self.kind.is_none() {
            self.kind = other.kind;
        }
    }
}

activatable!(base: Downloader);

impl Downloader {
    /// Type of this downloader.
    pub fn kind(&self) -> DownloaderKind {
        self.kind.unwrap_or(DownloaderKind::Http)
    }
}

/// Every downloader, by type and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Download {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// FTP downloaders.
    pub ftp: IndexMap<String, Downloader>,
    /// HTTP downloaders.
    pub http: IndexMap<String, Downloader>,
    /// SCP downloaders.
    pub scp: IndexMap<String, Downloader>,
    /// SFTP downloaders.
    pub sftp: IndexMap<String, Downloader>,
}

impl Merge for Download {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [active, explicit_enabled, ftp, http, scp, sftp]);
    }
}

activatable!(Download);

impl Download {
    /// Every downloader with its type, in type then declaration order.
    pub fn all_mut(&mut self) -> Vec<(DownloaderKind, &String, &mut Downloader)> {
        let mut all = Vec::new();
        for (kind, map) in [
            (DownloaderKind::Ftp, &mut self.ftp),
            (DownloaderKind::Http, &mut self.http),
            (DownloaderKind::Scp, &mut self.scp),
            (DownloaderKind::Sftp, &mut self.sftp),
        ] {
            all.extend(map.iter_mut().map(|(name, d)| (kind, name, d)));
        }
        all
    }

    /// True when any downloader is enabled.
    pub fn any_enabled(&self) -> bool {
        [&self.ftp, &self.http, &self.scp, &self.sftp]
            .iter()
            .flat_map(|map| map.values())
            .any(Activatable::is_enabled)
    }
}
