use crate::core::{AuditError, AuditResult};
use crate::corpus::segment::{error_marker, header_lines, CorpusSegment, Provenance, SegmentBody};
use std::path::Path;

/// Read a corpus file as raw bytes. Bodies are not required to be UTF-8.
pub fn read_corpus(path: &Path) -> AuditResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Split a corpus back into its segments.
///
/// Rendering the returned segments in order reproduces `corpus` byte for
/// byte. Content before the first header, a segment without its blank
/// separator line, or an unparsable header is a corpus error.
pub fn split_segments(corpus: &[u8]) -> AuditResult<Vec<CorpusSegment>> {
    let headers = header_lines(corpus);

    match headers.first() {
        None if corpus.is_empty() => return Ok(Vec::new()),
        Some(first) if first.start == 0 => {}
        _ => {
            return Err(AuditError::Corpus(
                "content before the first provenance header".to_string(),
            ))
        }
    }

    let mut segments = Vec::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        let text = header.text(corpus);
        let provenance = Provenance::parse(&text)
            .ok_or_else(|| AuditError::Corpus(format!("malformed provenance header '{}'", text)))?;

        let region_end = headers.get(i + 1).map(|next| next.start).unwrap_or(corpus.len());
        let region = &corpus[header.end..region_end];
        let body = region.strip_suffix(b"\n").ok_or_else(|| {
            AuditError::Corpus(format!("segment {} is missing its separator line", provenance))
        })?;
        // The writer always terminates a body with a newline
        if !body.ends_with(b"\n") {
            return Err(AuditError::Corpus(format!(
                "segment {} is missing its separator line",
                provenance
            )));
        }

        let body = match fetch_error_message(&provenance, body) {
            Some(message) => SegmentBody::FetchError(message),
            None => SegmentBody::Content(body.to_vec()),
        };
        segments.push(CorpusSegment::new(provenance, body));
    }

    Ok(segments)
}

fn fetch_error_message(provenance: &Provenance, body: &[u8]) -> Option<String> {
    let line = std::str::from_utf8(body).ok()?;
    let prefix = error_marker(provenance, "");
    // prefix ends with the marker's newline; drop it to compare the line head
    let prefix = prefix.strip_suffix('\n')?;
    let message = line.strip_prefix(prefix)?.strip_suffix('\n')?;

    if message.contains('\n') {
        return None;
    }
    Some(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(segments: &[CorpusSegment]) -> Vec<u8> {
        segments.iter().flat_map(|s| s.render()).collect()
    }

    #[test]
    fn test_round_trip() {
        let segments = vec![
            CorpusSegment::new(
                Provenance::new("acme/app", "package-lock.json", "main"),
                SegmentBody::Content(b"{\n  \"left-pad\": \"1.3.0\"\n}\n".to_vec()),
            ),
            CorpusSegment::new(
                Provenance::new("acme/app", "web/package-lock.json", "main"),
                SegmentBody::FetchError("HTTP 502 Bad Gateway".to_string()),
            ),
            CorpusSegment::new(
                Provenance::new("acme/lib", "package-lock.json", "dev"),
                SegmentBody::Content(vec![0xff, 0xfe, b'\n']),
            ),
        ];
        let corpus = render_all(&segments);

        let parsed = split_segments(&corpus).unwrap();
        assert_eq!(parsed, segments);
        assert_eq!(render_all(&parsed), corpus);
    }

    #[test]
    fn test_body_without_newline_comes_back_terminated() {
        let original = CorpusSegment::new(
            Provenance::new("acme/app", "package-lock.json", "main"),
            SegmentBody::Content(b"{}".to_vec()),
        );
        let corpus = original.render();

        let parsed = split_segments(&corpus).unwrap();
        assert_eq!(parsed[0].body, SegmentBody::Content(b"{}\n".to_vec()));
        assert_eq!(parsed[0].render(), corpus);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(split_segments(b"").unwrap().is_empty());
    }

    #[test]
    fn test_leading_content_rejected() {
        let err = split_segments(b"{}\n// acme/app/package-lock.json@main\n{}\n\n").unwrap_err();
        assert!(matches!(err, AuditError::Corpus(_)));
    }

    #[test]
    fn test_missing_separator_rejected() {
        let err = split_segments(b"// acme/app/package-lock.json@main\n{}\n").unwrap_err();
        assert!(matches!(err, AuditError::Corpus(msg) if msg.contains("separator")));
    }

    #[test]
    fn test_unparsable_first_line_rejected() {
        let err = split_segments(b"// not-a-provenance\n{}\n\n").unwrap_err();
        assert!(matches!(err, AuditError::Corpus(msg) if msg.contains("before the first")));
    }

    #[test]
    fn test_round_trip_with_comment_lines_in_body() {
        let segments = vec![
            CorpusSegment::new(
                Provenance::new("acme/app", "package-lock.json", "main"),
                SegmentBody::Content(b"{\n// generated by tool\n\"left-pad\": \"1.3.0\"\n}\n".to_vec()),
            ),
            CorpusSegment::new(
                Provenance::new("acme/lib", "package-lock.json", "main"),
                SegmentBody::Content(b"{\n\n// see https://example.com\n}\n".to_vec()),
            ),
        ];
        let corpus = render_all(&segments);

        let parsed = split_segments(&corpus).unwrap();
        assert_eq!(parsed, segments);
        assert_eq!(render_all(&parsed), corpus);
    }
}
