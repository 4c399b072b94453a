//! Uploaders: push release artifacts to arbitrary storage.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Authorization, HttpMethod, UnitBase};
use crate::activation::{Activatable, Active, activatable};
use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Uploader types.
    pub enum UploaderKind {
        /// JFrog Artifactory.
        Artifactory => "artifactory",
        /// FTP.
        Ftp => "ftp",
        /// Gitea generic packages.
        Gitea => "gitea",
        /// GitLab generic packages.
        Gitlab => "gitlab",
        /// HTTP PUT/POST.
        Http => "http",
        /// Amazon S3 or compatible.
        S3 => "s3",
        /// SCP over SSH.
        Scp => "scp",
        /// SFTP over SSH.
        Sftp => "sftp",
    }
}

/// Artifactory repository routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactoryRepository {
    /// Repository path.
    pub path: Option<String>,
    /// Only files of these types.
    pub file_types: Vec<String>,
}

impl Merge for ArtifactoryRepository {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [path, file_types]);
    }
}

/// An uploader of any type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Uploader {
    /// Shared settings.
    #[serde(flatten)]
    pub base: UnitBase,
    /// Type, set from the table the uploader is declared in.
    #[serde(skip)]
    pub kind: Option<UploaderKind>,
    /// Upload distribution artifacts.
    pub artifacts: Option<bool>,
    /// Upload extra files.
    pub files: Option<bool>,
    /// Upload signatures.
    pub signatures: Option<bool>,
    /// Upload checksums.
    pub checksums: Option<bool>,
    /// Upload catalogs.
    pub catalogs: Option<bool>,
    /// Target URL template, for HTTP-like uploaders.
    pub upload_url: Option<String>,
    /// Public download URL template.
    pub download_url: Option<String>,
    /// Remote host.
    pub host: Option<String>,
    /// Remote port.
    pub port: Option<u16>,
    /// Remote path template.
    pub path: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Password or token.
    pub password: Option<String>,
    /// HTTP method.
    pub method: Option<HttpMethod>,
    /// HTTP authorization scheme.
    pub authorization: Option<Authorization>,
    /// Extra HTTP headers.
    pub headers: IndexMap<String, String>,
    /// Host of the Artifactory, Gitea or GitLab API.
    pub api_host: Option<String>,
    /// Artifactory repositories.
    pub repositories: Vec<ArtifactoryRepository>,
    /// GitLab project identifier.
    pub project_identifier: Option<String>,
    /// Gitea owner.
    pub owner: Option<String>,
    /// Package name for Gitea and GitLab.
    pub package_name: Option<String>,
    /// Package version for Gitea and GitLab.
    pub package_version: Option<String>,
    /// S3 bucket.
    pub bucket: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// S3 access key id.
    pub access_key_id: Option<String>,
    /// S3 secret key.
    pub secret_key: Option<String>,
    /// S3 session token.
    pub session_token: Option<String>,
    /// S3-compatible endpoint.
    pub endpoint: Option<String>,
    /// SSH known hosts file.
    pub known_hosts_file: Option<String>,
    /// SSH private key.
    pub private_key: Option<String>,
    /// SSH key passphrase.
    pub passphrase: Option<String>,
}

impl Merge for Uploader {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                base,
                artifacts,
                files,
                signatures,
                checksums,
                catalogs,
                upload_url,
                download_url,
                host,
                port,
                path,
                username,
                password,
                method,
                authorization,
                headers,
                api_host,
                repositories,
                project_identifier,
                owner,
                package_name,
                package_version,
                bucket,
                region,
                access_key_id,
                secret_key,
                session_token,
                endpoint,
                known_hosts_file,
                private_key,
                passphrase,
            ]
        );
        if self.kind.is_none() {
            self.kind = other.kind;
        }
    }
}

activatable!(base: Uploader);

impl Uploader {
    /// Type of this uploader.
    pub fn kind(&self) -> UploaderKind {
        self.kind.unwrap_or(UploaderKind::Http)
    }

    /// True when at least one kind of file is uploaded.
    pub fn uploads_anything(&self) -> bool {
        [self.artifacts, self.files, self.signatures, self.checksums, self.catalogs]
            .iter()
            .any(|flag| flag.unwrap_or(true))
    }
}

/// Every uploader, by type and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upload {
    /// Activation policy.
    pub active: Option<Active>,
    /// Resolved activation.
    #[serde(skip)]
    pub enabled: bool,
    /// Explicit `enabled` setting from configuration.
    #[serde(rename = "enabled")]
    pub explicit_enabled: Option<bool>,
    /// Artifactory.
    pub artifactory: IndexMap<String, Uploader>,
    /// FTP.
    pub ftp: IndexMap<String, Uploader>,
    /// Gitea.
    pub gitea: IndexMap<String, Uploader>,
    /// GitLab.
    pub gitlab: IndexMap<String, Uploader>,
    /// HTTP.
    pub http: IndexMap<String, Uploader>,
    /// S3.
    pub s3: IndexMap<String, Uploader>,
    /// SCP.
    pub scp: IndexMap<String, Uploader>,
    /// SFTP.
    pub sftp: IndexMap<String, Uploader>,
}

impl Merge for Upload {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [active, explicit_enabled, artifactory, ftp, gitea, gitlab, http, s3, scp, sftp]
        );
    }
}

activatable!(Upload);

impl Upload {
    fn maps_mut(&mut self) -> [(UploaderKind, &mut IndexMap<String, Uploader>); 8] {
        [
            (UploaderKind::Artifactory, &mut self.artifactory),
            (UploaderKind::Ftp, &mut self.ftp),
            (UploaderKind::Gitea, &mut self.gitea),
            (UploaderKind::Gitlab, &mut self.gitlab),
            (UploaderKind::Http, &mut self.http),
            (UploaderKind::S3, &mut self.s3),
            (UploaderKind::Scp, &mut self.scp),
            (UploaderKind::Sftp, &mut self.sftp),
        ]
    }

    /// Every uploader with its type, in type then declaration order.
    pub fn all_mut(&mut self) -> Vec<(UploaderKind, &String, &mut Uploader)> {
        let mut all = Vec::new();
        for (kind, map) in self.maps_mut() {
            all.extend(map.iter_mut().map(|(name, u)| (kind, name, u)));
        }
        all
    }

    /// True when any uploader is enabled.
    pub fn any_enabled(&self) -> bool {
        [
            &self.artifactory,
            &self.ftp,
            &self.gitea,
            &self.gitlab,
            &self.http,
            &self.s3,
            &self.scp,
            &self.sftp,
        ]
        .iter()
        .flat_map(|map| map.values())
        .any(Activatable::is_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_mut_tags_kinds() {
        let mut upload = Upload::default();
        upload.s3.insert("bucket".into(), Uploader::default());
        upload.ftp.insert("mirror".into(), Uploader::default());
        let kinds: Vec<UploaderKind> = upload.all_mut().into_iter().map(|(k, _, _)| k).collect();
        assert_eq!(kinds, [UploaderKind::Ftp, UploaderKind::S3]);
    }

    #[test]
    fn uploads_everything_by_default() {
        let mut uploader = Uploader::default();
        assert!(uploader.uploads_anything());
        uploader.artifacts = Some(false);
        uploader.files = Some(false);
        uploader.signatures = Some(false);
        uploader.checksums = Some(false);
        uploader.catalogs = Some(false);
        assert!(!uploader.uploads_anything());
    }
}
