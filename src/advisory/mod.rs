//! Advisory feed handling.
//!
//! An advisory feed is free-form text (an Atom document in practice) that
//! mentions compromised releases inline as `<code>name@version</code>`.
//! [`parser`] pulls those pairs out; [`feed`] knows where the text comes from.

pub mod feed;
pub mod parser;

pub use feed::{AdvisorySource, FileFeed, HttpFeed};
pub use parser::parse_advisories;

use crate::core::AuditResult;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// A package release believed to be compromised
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AdvisoryPair {
    pub package: String,
    pub version: String,
}

impl AdvisoryPair {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for AdvisoryPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.version)
    }
}

/// Fetch the feed once and extract its advisory pairs.
///
/// Any fetch or parse failure aborts; there is no partial list.
pub async fn load_advisories(source: &dyn AdvisorySource) -> AuditResult<Vec<AdvisoryPair>> {
    let raw = source.fetch_feed().await?;
    let pairs = parse_advisories(&raw)?;
    info!(count = pairs.len(), origin = %source.describe(), "loaded advisories");
    Ok(pairs)
}
