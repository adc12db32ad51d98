//! Corpus scanning.
//!
//! For each advisory pair the scanner looks for the literal declaration
//! `"name": "version"` anywhere in the corpus and attributes every hit to the
//! nearest provenance header before it. Results are ordered by advisory,
//! then by position in the corpus.

pub mod index;
pub mod needle;

pub use index::HeaderIndex;
pub use needle::Needle;

use crate::advisory::AdvisoryPair;
use crate::core::{AuditError, AuditResult};
use serde::Serialize;
use tracing::debug;

/// One occurrence of an advisory pair in the corpus
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub pair: AdvisoryPair,
    /// `owner/repo/path@ref` of the enclosing segment
    pub source_file: String,
    /// Byte offset of the match in the corpus
    pub offset: usize,
    /// Position of `pair` in the advisory list that was scanned
    #[serde(skip)]
    pub advisory_index: usize,
}

/// Scanner over one corpus; the header index is built once up front
pub struct CorpusScanner<'a> {
    corpus: &'a [u8],
    index: HeaderIndex,
}

impl<'a> CorpusScanner<'a> {
    pub fn new(corpus: &'a [u8]) -> Self {
        Self {
            corpus,
            index: HeaderIndex::build(corpus),
        }
    }

    pub fn headers(&self) -> &HeaderIndex {
        &self.index
    }

    /// Every occurrence of one pair, in corpus order.
    ///
    /// A match with no header before it means the corpus is damaged; that is
    /// an error, never an "unknown" attribution.
    pub fn scan_pair(&self, pair: &AdvisoryPair, advisory_index: usize) -> AuditResult<Vec<MatchResult>> {
        let needle = Needle::for_pair(pair);

        needle
            .find_all(self.corpus)
            .map(|offset| -> AuditResult<MatchResult> {
                let source_file = self.index.attribute(offset).ok_or_else(|| {
                    AuditError::Corpus(format!(
                        "match for {} at offset {} has no provenance header before it",
                        pair, offset
                    ))
                })?;
                Ok(MatchResult {
                    pair: pair.clone(),
                    source_file: source_file.to_string(),
                    offset,
                    advisory_index,
                })
            })
            .collect()
    }

    /// Scan every pair, keeping advisory order then match order
    pub fn scan(&self, pairs: &[AdvisoryPair]) -> AuditResult<Vec<MatchResult>> {
        let mut results = Vec::new();
        for (i, pair) in pairs.iter().enumerate() {
            let found = self.scan_pair(pair, i)?;
            debug!(advisory = %pair, matches = found.len(), "scanned advisory");
            results.extend(found);
        }
        Ok(results)
    }
}

/// Convenience wrapper: index `corpus` and scan it for `pairs`
pub fn scan_corpus(corpus: &[u8], pairs: &[AdvisoryPair]) -> AuditResult<Vec<MatchResult>> {
    CorpusScanner::new(corpus).scan(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusSegment, Provenance, SegmentBody};

    #[test]
    fn test_attribution_to_preceding_segment() {
        let corpus = b"// acme/a/package-lock.json@main\n\"left-pad\": \"1.3.0\"\n\n\
                       // acme/b/package-lock.json@main\n\"chalk\": \"5.0.0\"\n\n";
        let results = scan_corpus(corpus, &[AdvisoryPair::new("left-pad", "1.3.0")]).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_file, "acme/a/package-lock.json@main");
    }

    #[test]
    fn test_comment_line_in_body_keeps_attribution() {
        let corpus = CorpusSegment::new(
            Provenance::new("acme/app", "package-lock.json", "main"),
            SegmentBody::Content(b"{\n// generated by tool\n\"left-pad\": \"1.3.0\"\n}\n".to_vec()),
        )
        .render();
        let results = scan_corpus(&corpus, &[AdvisoryPair::new("left-pad", "1.3.0")]).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_file, "acme/app/package-lock.json@main");
    }

    #[test]
    fn test_ordering_is_advisory_then_position() {
        let corpus = b"// acme/a/package-lock.json@main\n\"b\": \"2.0.0\"\n\"a\": \"1.0.0\"\n\n\
                       // acme/b/package-lock.json@main\n\"b\": \"2.0.0\"\n\n";
        let pairs = vec![AdvisoryPair::new("b", "2.0.0"), AdvisoryPair::new("a", "1.0.0")];
        let results = scan_corpus(corpus, &pairs).unwrap();

        let summary: Vec<(&str, &str, usize)> = results
            .iter()
            .map(|m| (m.pair.package.as_str(), m.source_file.as_str(), m.advisory_index))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("b", "acme/a/package-lock.json@main", 0),
                ("b", "acme/b/package-lock.json@main", 0),
                ("a", "acme/a/package-lock.json@main", 1),
            ]
        );
    }

    #[test]
    fn test_match_before_any_header_is_fatal() {
        let corpus = b"\"left-pad\": \"1.3.0\"\n// acme/a/package-lock.json@main\n{}\n\n";
        let err = scan_corpus(corpus, &[AdvisoryPair::new("left-pad", "1.3.0")]).unwrap_err();
        assert!(matches!(err, AuditError::Corpus(msg) if msg.contains("no provenance header")));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let corpus = b"// acme/a/package-lock.json@main\n\"Debug\": \"4.4.2\"\n\"debug\": \"4.4.2\"\n\n";
        let pairs = vec![AdvisoryPair::new("debug", "4.4.2")];
        let scanner = CorpusScanner::new(corpus);

        let first = scanner.scan(&pairs).unwrap();
        let second = scanner.scan(&pairs).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_advisories() {
        let corpus = b"// acme/a/package-lock.json@main\n{}\n\n";
        assert!(scan_corpus(corpus, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_pairs_scanned_independently() {
        let corpus = b"// acme/a/package-lock.json@main\n\"chalk\": \"5.6.1\"\n\n";
        let pairs = vec![AdvisoryPair::new("chalk", "5.6.1"), AdvisoryPair::new("chalk", "5.6.1")];
        let results = scan_corpus(corpus, &pairs).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].advisory_index, 0);
        assert_eq!(results[1].advisory_index, 1);
    }

    #[test]
    fn test_error_marker_is_not_a_header() {
        let corpus = b"// acme/a/package-lock.json@main\n\"chalk\": \"5.6.1\"\n\n\
                       // acme/b/package-lock.json@main\n\
                       // ERROR fetching acme/b/package-lock.json@main: HTTP 500\n\n";
        let scanner = CorpusScanner::new(corpus);
        assert_eq!(scanner.headers().len(), 2);
    }
}
