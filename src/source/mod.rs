//! Repository hosting sources.
//!
//! The collector only needs three things from a host: the repositories of an
//! organization, the recursive file tree of one ref, and the raw bytes of one
//! file. [`RepositorySource`] is that seam; [`GitHubSource`] is the
//! production implementation.

pub mod github;

pub use github::{resolve_token, GitHubSource, TOKEN_CREDENTIAL_KEY};

use crate::core::AuditResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One repository of an organization, as listed by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// `owner/repo`
    pub full_name: String,
    pub default_branch: Option<String>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl RepositoryRef {
    pub fn new(full_name: impl Into<String>, default_branch: Option<&str>) -> Self {
        Self {
            full_name: full_name.into(),
            default_branch: default_branch.map(str::to_string),
            archived_at: None,
        }
    }

    pub fn archived(mut self, at: DateTime<Utc>) -> Self {
        self.archived_at = Some(at);
        self
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// The ref to collect from: the default branch, or `fallback` when the
    /// host reports none (or an empty name).
    pub fn resolve_ref(&self, fallback: &str) -> String {
        match self.default_branch.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Blob,
    Tree,
    Other,
}

impl EntryType {
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "blob" => EntryType::Blob,
            "tree" => EntryType::Tree,
            _ => EntryType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub entry_type: EntryType,
}

impl TreeEntry {
    pub fn new(path: impl Into<String>, entry_type: EntryType) -> Self {
        Self {
            path: path.into(),
            entry_type,
        }
    }

    /// Blob whose path ends with `file_name` (literal suffix, any depth)
    pub fn is_blob_ending_with(&self, file_name: &str) -> bool {
        self.entry_type == EntryType::Blob && self.path.ends_with(file_name)
    }
}

/// Recursive listing of one ref
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
    /// The host gave up listing; `entries` is incomplete
    pub truncated: bool,
}

/// A source-control host the corpus is collected from.
///
/// Implementations must report a rejected or missing credential as
/// `AuditError::NotAuthenticated` and a missing repository, ref or file as
/// `AuditError::NotFound`; a truncated listing is not an error.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fail fast with `NotAuthenticated` before any collection starts
    async fn verify_access(&self) -> AuditResult<()>;

    async fn list_repositories(&self, org: &str) -> AuditResult<Vec<RepositoryRef>>;

    async fn get_tree(&self, repo: &str, git_ref: &str) -> AuditResult<Tree>;

    async fn get_raw_content(&self, repo: &str, path: &str, git_ref: &str) -> AuditResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ref_falls_back() {
        let with_branch = RepositoryRef::new("acme/app", Some("develop"));
        let empty = RepositoryRef::new("acme/lib", Some(""));
        let absent = RepositoryRef::new("acme/site", None);

        assert_eq!(with_branch.resolve_ref("main"), "develop");
        assert_eq!(empty.resolve_ref("main"), "main");
        assert_eq!(absent.resolve_ref("trunk"), "trunk");
    }

    #[test]
    fn test_lockfile_suffix_match() {
        let nested = TreeEntry::new("packages/web/package-lock.json", EntryType::Blob);
        let dir = TreeEntry::new("fixtures/package-lock.json", EntryType::Tree);
        let other = TreeEntry::new("package.json", EntryType::Blob);

        assert!(nested.is_blob_ending_with("package-lock.json"));
        assert!(!dir.is_blob_ending_with("package-lock.json"));
        assert!(!other.is_blob_ending_with("package-lock.json"));
    }

    #[test]
    fn test_entry_type_from_api() {
        assert_eq!(EntryType::from_api("blob"), EntryType::Blob);
        assert_eq!(EntryType::from_api("tree"), EntryType::Tree);
        assert_eq!(EntryType::from_api("commit"), EntryType::Other);
    }
}
