//! Release service (GitHub, GitLab, Gitea, Codeberg or generic).

use serde::{Deserialize, Serialize};

use crate::keyword::keyword_enum;
use crate::merge::Merge;
use crate::merge_fields;

keyword_enum! {
    /// Supported release services.
    pub enum ServiceKind {
        /// github.com or GitHub Enterprise.
        Github => "github",
        /// gitlab.com or self-hosted GitLab.
        Gitlab => "gitlab",
        /// Self-hosted Gitea.
        Gitea => "gitea",
        /// codeberg.org.
        Codeberg => "codeberg",
        /// Any git host without a release API.
        Generic => "generic",
    }
}

impl ServiceKind {
    /// Default host name.
    pub const fn default_host(self) -> Option<&'static str> {
        match self {
            Self::Github => Some("github.com"),
            Self::Gitlab => Some("gitlab.com"),
            Self::Codeberg => Some("codeberg.org"),
            Self::Gitea | Self::Generic => None,
        }
    }

    /// Whether releases go through an API that needs a token.
    pub const fn needs_token(self) -> bool {
        !matches!(self, Self::Generic)
    }
}

keyword_enum! {
    /// Release sections refreshed when updating an existing release.
    pub enum UpdateSection {
        /// Title.
        Title => "TITLE",
        /// Body.
        Body => "BODY",
        /// Assets.
        Assets => "ASSETS",
    }
}

keyword_enum! {
    /// Commit sort order in the changelog.
    pub enum Sort {
        /// Oldest first.
        Asc => "ASC",
        /// Newest first.
        Desc => "DESC",
    }
}

/// Release configuration: exactly one service is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Release {
    /// GitHub.
    pub github: Option<GitService>,
    /// GitLab.
    pub gitlab: Option<GitService>,
    /// Gitea.
    pub gitea: Option<GitService>,
    /// Codeberg.
    pub codeberg: Option<GitService>,
    /// Generic git host.
    pub generic: Option<GitService>,
}

impl Merge for Release {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [github, gitlab, gitea, codeberg, generic]);
    }
}

impl Release {
    /// Configured services in declaration order.
    pub fn services(&self) -> Vec<(ServiceKind, &GitService)> {
        [
            (ServiceKind::Github, &self.github),
            (ServiceKind::Gitlab, &self.gitlab),
            (ServiceKind::Gitea, &self.gitea),
            (ServiceKind::Codeberg, &self.codeberg),
            (ServiceKind::Generic, &self.generic),
        ]
        .into_iter()
        .filter_map(|(kind, service)| service.as_ref().map(|s| (kind, s)))
        .collect()
    }

    /// The first configured service.
    pub fn service(&self) -> Option<(ServiceKind, &GitService)> {
        self.services().into_iter().next()
    }

    /// Mutable access to the first configured service.
    pub fn service_mut(&mut self) -> Option<(ServiceKind, &mut GitService)> {
        [
            (ServiceKind::Github, &mut self.github),
            (ServiceKind::Gitlab, &mut self.gitlab),
            (ServiceKind::Gitea, &mut self.gitea),
            (ServiceKind::Codeberg, &mut self.codeberg),
            (ServiceKind::Generic, &mut self.generic),
        ]
        .into_iter()
        .find_map(|(kind, service)| service.as_mut().map(|s| (kind, s)))
    }
}

/// Settings shared by every release service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitService {
    /// Explicit switch; releases are on unless set to `false`.
    pub enabled: Option<bool>,
    /// Host name.
    pub host: Option<String>,
    /// Repository owner.
    pub owner: Option<String>,
    /// Repository name.
    pub name: Option<String>,
    /// API user name.
    pub username: Option<String>,
    /// API token.
    pub token: Option<String>,
    /// API base URL.
    pub api_endpoint: Option<String>,
    /// GitLab project id or path.
    pub project_identifier: Option<String>,
    /// Tag name template.
    pub tag_name: Option<String>,
    /// Previous tag name.
    pub previous_tag_name: Option<String>,
    /// Release title template.
    pub release_name: Option<String>,
    /// Branch the release is cut from.
    pub branch: Option<String>,
    /// Branch to push to.
    pub branch_push: Option<String>,
    /// Sign tags.
    pub sign: Option<bool>,
    /// Skip tagging.
    pub skip_tag: Option<bool>,
    /// Skip the release itself (tag only).
    pub skip_release: Option<bool>,
    /// Delete and recreate an existing release.
    pub overwrite: Option<bool>,
    /// Create as draft.
    pub draft: Option<bool>,
    /// GitHub discussion category.
    pub discussion_category_name: Option<String>,
    /// Update an existing release.
    pub update: Update,
    /// Prerelease detection.
    pub prerelease: Prerelease,
    /// Changelog generation.
    pub changelog: Changelog,
    /// Milestone handling.
    pub milestone: Milestone,
    /// Author of release commits.
    pub commit_author: CommitAuthor,
    /// Connect timeout in seconds.
    pub connect_timeout: Option<u32>,
    /// Read timeout in seconds.
    pub read_timeout: Option<u32>,
    /// Upload distribution artifacts.
    pub artifacts: Option<bool>,
    /// Upload extra files.
    pub files: Option<bool>,
    /// Upload checksums.
    pub checksums: Option<bool>,
    /// Upload signatures.
    pub signatures: Option<bool>,
    /// Upload catalogs.
    pub catalogs: Option<bool>,
}

impl Merge for GitService {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [
                enabled,
                host,
                owner,
                name,
                username,
                token,
                api_endpoint,
                project_identifier,
                tag_name,
                previous_tag_name,
                release_name,
                branch,
                branch_push,
                sign,
                skip_tag,
                skip_release,
                overwrite,
                draft,
                discussion_category_name,
                update,
                prerelease,
                changelog,
                milestone,
                commit_author,
                connect_timeout,
                read_timeout,
                artifacts,
                files,
                checksums,
                signatures,
                catalogs,
            ]
        );
    }
}

impl GitService {
    /// `https://host/owner/name`
    pub fn repo_url(&self) -> Option<String> {
        match (&self.host, &self.owner, &self.name) {
            (Some(host), Some(owner), Some(name)) => Some(format!("https://{host}/{owner}/{name}")),
            _ => None,
        }
    }
}

/// Existing release updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Update {
    /// Update instead of failing on an existing release.
    pub enabled: Option<bool>,
    /// Sections to refresh.
    pub sections: Vec<UpdateSection>,
}

impl Merge for Update {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [enabled, sections]);
    }
}

/// Prerelease detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prerelease {
    /// Mark the release as prerelease.
    pub enabled: Option<bool>,
    /// Regex matched against the version.
    pub pattern: Option<String>,
}

impl Merge for Prerelease {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [enabled, pattern]);
    }
}

/// Changelog generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Changelog {
    /// Generate a changelog.
    pub enabled: Option<bool>,
    /// Commit order.
    pub sort: Option<Sort>,
    /// Use this file instead of generating one.
    pub external: Option<String>,
    /// Inline changelog template.
    pub content: Option<String>,
    /// Template file.
    pub content_template: Option<String>,
    /// Commit format.
    pub format: Option<String>,
    /// Include links.
    pub links: Option<bool>,
    /// Skip merge commits.
    pub skip_merge_commits: Option<bool>,
}

impl Merge for Changelog {
    fn merge(&mut self, other: Self) {
        merge_fields!(
            self,
            other,
            [enabled, sort, external, content, content_template, format, links, skip_merge_commits]
        );
    }
}

/// Milestone handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    /// Close the milestone after release.
    pub close: Option<bool>,
    /// Milestone name template.
    pub name: Option<String>,
}

impl Merge for Milestone {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [close, name]);
    }
}

/// Author of commits made on the user's behalf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    /// Name.
    pub name: Option<String>,
    /// Email.
    pub email: Option<String>,
}

impl Merge for CommitAuthor {
    fn merge(&mut self, other: Self) {
        merge_fields!(self, other, [name, email]);
    }
}

/// Head commit facts supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full hash.
    pub full_hash: String,
    /// Abbreviated hash.
    pub short_hash: String,
    /// Ref name, e.g. `main`.
    pub ref_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_configured_service_wins() {
        let release = Release {
            gitlab: Some(GitService::default()),
            generic: Some(GitService::default()),
            ..Release::default()
        };
        assert_eq!(release.services().len(), 2);
        assert_eq!(release.service().map(|(k, _)| k), Some(ServiceKind::Gitlab));
    }

    #[test]
    fn repo_url_needs_all_parts() {
        let mut service = GitService {
            host: Some("github.com".into()),
            owner: Some("acme".into()),
            ..GitService::default()
        };
        assert!(service.repo_url().is_none());
        service.name = Some("app".into());
        assert_eq!(service.repo_url().as_deref(), Some("https://github.com/acme/app"));
    }
}
