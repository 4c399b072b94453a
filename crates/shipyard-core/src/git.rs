//! Repository facts for the run context.
//!
//! Shells out to `git` so the user's configuration (safe directories,
//! worktrees, alternates) applies. Nothing here writes to the repository.

use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::model::{Commit, Model};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "rev-parse").
        command: String,
        /// Captured stderr.
        stderr: String,
    },
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// What the repository at a directory tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    /// Head commit.
    pub commit: Commit,
    /// Owner and name parsed from the `origin` remote.
    pub origin: Option<(String, String)>,
}

impl Repository {
    /// Fill a blank owner or name of the configured release service from
    /// the `origin` remote.
    pub fn apply_origin(&self, model: &mut Model) {
        let Some((owner, name)) = &self.origin else {
            return;
        };
        if let Some((kind, service)) = model.release.service_mut() {
            if service.owner.as_deref().is_none_or(|o| o.trim().is_empty()) {
                debug!(service = %kind, %owner, "owner taken from origin");
                service.owner = Some(owner.clone());
            }
            if service.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
                service.name = Some(name.clone());
            }
        }
    }
}

/// Inspect the repository containing `dir`.
///
/// Returns `None` outside a repository and for repositories without
/// commits.
#[instrument]
pub fn inspect(dir: &Utf8Path) -> GitResult<Option<Repository>> {
    let full_hash = match git(dir, &["rev-parse", "--verify", "--quiet", "HEAD"]) {
        Ok(hash) => hash,
        Err(GitError::Command { stderr, .. }) => {
            debug!(%stderr, "no head commit");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    let short_hash = git(dir, &["rev-parse", "--short", "HEAD"])?;
    let ref_name = git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    let origin = git(dir, &["remote", "get-url", "origin"])
        .ok()
        .and_then(|url| parse_owner_repo(&url));
    debug!(%full_hash, %ref_name, ?origin, "repository inspected");
    Ok(Some(Repository {
        commit: Commit {
            full_hash,
            short_hash,
            ref_name,
        },
        origin,
    }))
}

/// Parse owner and repo from a git remote URL.
///
/// Handles both HTTPS and SSH formats:
/// - `https://github.com/owner/repo.git`
/// - `git@github.com:owner/repo.git`
pub fn parse_owner_repo(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    let path = match url.strip_prefix("git@") {
        Some(rest) => rest.split_once(':').map(|(_, path)| path),
        None => url
            .split("//")
            .nth(1)
            .and_then(|after_scheme| after_scheme.split_once('/').map(|(_, path)| path)),
    }?;

    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Run a git command in `dir` and return its trimmed stdout.
fn git(dir: &Utf8Path, args: &[&str]) -> GitResult<String> {
    let output = Command::new("git").arg("-C").arg(dir).args(args).output()?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(GitError::Command {
            command: args.first().copied().unwrap_or_default().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::release::GitService;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("https://github.com/acme/app.git", Some(("acme", "app")))]
    #[case("https://gitlab.com/acme/app", Some(("acme", "app")))]
    #[case("git@github.com:acme/app.git", Some(("acme", "app")))]
    #[case("git@codeberg.org:acme/app", Some(("acme", "app")))]
    #[case("https://gitlab.com/group/sub/app.git", None)]
    #[case("not-a-url", None)]
    fn remote_urls(#[case] url: &str, #[case] expected: Option<(&str, &str)>) {
        let parsed = parse_owner_repo(url);
        assert_eq!(
            parsed.as_ref().map(|(o, r)| (o.as_str(), r.as_str())),
            expected
        );
    }

    #[test]
    fn outside_a_repository_there_is_nothing() {
        let tmp = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        // git may be missing entirely on minimal hosts.
        if let Ok(found) = inspect(&dir) {
            assert!(found.is_none());
        }
    }

    #[test]
    fn origin_fills_only_blank_fields() {
        let mut model = Model::default();
        model.release.github = Some(GitService {
            owner: Some("configured".into()),
            name: Some(" ".into()),
            ..GitService::default()
        });
        let repository = Repository {
            commit: Commit::default(),
            origin: Some(("acme".into(), "app".into())),
        };
        repository.apply_origin(&mut model);
        let service = model.release.github.as_ref().unwrap();
        assert_eq!(service.owner.as_deref(), Some("configured"));
        assert_eq!(service.name.as_deref(), Some("app"));
    }
}
