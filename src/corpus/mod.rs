//! The corpus: every collected lock file concatenated into one text file.
//!
//! On disk a corpus is a sequence of segments, each written as
//!
//! ```text
//! // {owner/repo}/{path}@{ref}
//! <raw file bytes, newline-terminated>
//! <blank line>
//! ```
//!
//! A body that could not be fetched is replaced by a single
//! `// ERROR fetching {owner/repo}/{path}@{ref}: {error}` line.

pub mod collector;
pub mod reader;
pub mod segment;
pub mod writer;

pub use collector::{CollectOptions, Collector};
pub use reader::{read_corpus, split_segments};
pub use segment::{header_lines, CorpusSegment, HeaderLine, Provenance, SegmentBody, HEADER_PREFIX};
pub use writer::CorpusWriter;

use crate::core::AuditResult;
use crate::report::Summary;
use crate::source::RepositorySource;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Truncate `out`, collect the organization into it and return the run summary.
///
/// Not atomic: a failed or cancelled run leaves the segments written so far.
pub async fn build_corpus(
    source: &dyn RepositorySource,
    options: CollectOptions,
    out: &Path,
    cancel: CancellationToken,
) -> AuditResult<Summary> {
    let mut writer = CorpusWriter::create(out)?;
    let summary = Collector::new(source, options)
        .with_cancellation(cancel)
        .collect(&mut writer)
        .await?;
    writer.finish()?;
    Ok(summary)
}
