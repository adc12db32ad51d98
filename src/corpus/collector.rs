use crate::config::Config;
use crate::core::{AuditError, AuditResult};
use crate::corpus::segment::{CorpusSegment, Provenance, SegmentBody};
use crate::corpus::writer::CorpusWriter;
use crate::report::Summary;
use crate::source::{RepositoryRef, RepositorySource};
use futures::stream::{self, StreamExt};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// What to collect and how
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub org: String,
    pub include_archived: bool,
    pub default_branch_fallback: String,
    pub lockfile_name: String,
    /// Repositories fetched in parallel
    pub concurrency: usize,
}

impl CollectOptions {
    pub fn from_config(config: &Config, org: &str, include_archived: bool) -> Self {
        Self {
            org: org.to_string(),
            include_archived,
            default_branch_fallback: config.default_branch_fallback.clone(),
            lockfile_name: config.lockfile_name.clone(),
            concurrency: config.concurrency,
        }
    }
}

/// Result of visiting one repository
#[derive(Debug)]
enum RepoOutcome {
    TreeUnavailable,
    TreeTruncated,
    NoLockfiles,
    Collected(Vec<CorpusSegment>),
}

/// Walks an organization and feeds lock-file segments to a [`CorpusWriter`].
///
/// Repositories are fetched up to `concurrency` at a time, but their
/// segments reach the writer in listing order, so the corpus is the same
/// as a sequential run's.
pub struct Collector<'a> {
    source: &'a dyn RepositorySource,
    options: CollectOptions,
    cancel: CancellationToken,
}

impl<'a> Collector<'a> {
    pub fn new(source: &'a dyn RepositorySource, options: CollectOptions) -> Self {
        Self {
            source,
            options,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collect every matching lock file of the organization into `writer`.
    ///
    /// Per-repository failures are logged and skipped. `NotAuthenticated`,
    /// a failed listing and cancellation end the run; segments already
    /// written stay in place.
    #[instrument(skip(self, writer), fields(org = %self.options.org))]
    pub async fn collect(&self, writer: &mut CorpusWriter) -> AuditResult<Summary> {
        let mut summary = Summary::new(&self.options.org, writer.path())?;

        let repos = self
            .until_cancelled(self.source.list_repositories(&self.options.org))
            .await??;

        let mut active = Vec::with_capacity(repos.len());
        for repo in repos {
            info!(repo = %repo.full_name, "Found repository");

            if let (Some(at), false) = (repo.archived_at, self.options.include_archived) {
                summary.archived_repos_skipped += 1;
                info!(repo = %repo.full_name, archived_at = %at, "Skipped because archived");
                continue;
            }

            summary.repos_scanned += 1;
            active.push(repo);
        }

        let mut outcomes = stream::iter(active.iter().map(|repo| self.collect_repository(repo)))
            .buffered(self.options.concurrency.max(1));

        while let Some(outcome) = self.until_cancelled(outcomes.next()).await? {
            match outcome? {
                RepoOutcome::TreeUnavailable | RepoOutcome::NoLockfiles => {}
                RepoOutcome::TreeTruncated => summary.trees_truncated_skipped += 1,
                RepoOutcome::Collected(segments) => {
                    for segment in &segments {
                        writer.append(segment)?;
                        summary.files_collected += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn collect_repository(&self, repo: &RepositoryRef) -> AuditResult<RepoOutcome> {
        let name = repo.full_name.as_str();
        let git_ref = repo.resolve_ref(&self.options.default_branch_fallback);

        let tree = match self.source.get_tree(name, &git_ref).await {
            Ok(tree) => tree,
            Err(e @ AuditError::NotAuthenticated(_)) => return Err(e),
            Err(e) => {
                warn!(repo = name, git_ref = %git_ref, error = %e, "Skipping repository: tree fetch failed");
                return Ok(RepoOutcome::TreeUnavailable);
            }
        };

        if tree.truncated {
            warn!(repo = name, git_ref = %git_ref, "Skipping repository: tree listing truncated");
            return Ok(RepoOutcome::TreeTruncated);
        }

        let targets: Vec<_> = tree
            .entries
            .iter()
            .filter(|entry| entry.is_blob_ending_with(&self.options.lockfile_name))
            .collect();

        if targets.is_empty() {
            info!(repo = name, "No {} found", self.options.lockfile_name);
            return Ok(RepoOutcome::NoLockfiles);
        }

        let mut segments = Vec::with_capacity(targets.len());
        for entry in targets {
            let provenance = Provenance::new(name, &entry.path, &git_ref);
            let body = match self.source.get_raw_content(name, &entry.path, &git_ref).await {
                Ok(bytes) => SegmentBody::Content(bytes),
                Err(e @ AuditError::NotAuthenticated(_)) => return Err(e),
                Err(e) => {
                    warn!(file = %provenance, error = %e, "Recording fetch error in corpus");
                    SegmentBody::FetchError(e.to_string())
                }
            };
            segments.push(CorpusSegment::new(provenance, body));
        }

        Ok(RepoOutcome::Collected(segments))
    }

    async fn until_cancelled<T>(&self, fut: impl Future<Output = T>) -> AuditResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AuditError::Cancelled),
            value = fut => Ok(value),
        }
    }
}
