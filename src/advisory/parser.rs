use crate::advisory::AdvisoryPair;
use crate::core::{AuditError, AuditResult};
use regex::Regex;

/// Inline-code mention of a release: a lowercase (optionally scoped) name and
/// a version made of digits and dots only.
const CODE_PAIR_PATTERN: &str = r"<code>([@a-z/-]+)@([0-9.]+)</code>";

/// Extract every `<code>name@version</code>` pair from raw feed text.
///
/// Pairs are sorted by package name; the sort is stable, so versions of one
/// package keep feed order. Duplicates are kept.
pub fn parse_advisories(raw: &str) -> AuditResult<Vec<AdvisoryPair>> {
    let re = Regex::new(CODE_PAIR_PATTERN)
        .map_err(|e| AuditError::Advisory(format!("Invalid advisory pattern: {}", e)))?;

    let mut pairs: Vec<AdvisoryPair> = re
        .captures_iter(raw)
        .filter_map(|cap| match (cap.get(1), cap.get(2)) {
            (Some(name), Some(version)) => Some(AdvisoryPair::new(name.as_str(), version.as_str())),
            _ => None,
        })
        .collect();

    pairs.sort_by(|a, b| a.package.cmp(&b.package));
    Ok(pairs)
}
