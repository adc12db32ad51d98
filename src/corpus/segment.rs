use std::borrow::Cow;
use std::fmt;

/// Every provenance header starts with this marker
pub const HEADER_PREFIX: &str = "// ";

/// Written in place of a body whose content could not be fetched. Starts
/// with [`HEADER_PREFIX`] but is never a header.
pub const ERROR_MARKER_PREFIX: &str = "// ERROR fetching ";

/// Which repository file a segment's body came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Provenance {
    /// `owner/repo`
    pub repository: String,
    pub path: String,
    pub git_ref: String,
}

impl Provenance {
    pub fn new(
        repository: impl Into<String>,
        path: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            path: path.into(),
            git_ref: git_ref.into(),
        }
    }

    /// Parse `owner/repo/path@ref`. The ref is everything after the last `@`;
    /// the repository is the first two path components.
    pub fn parse(text: &str) -> Option<Self> {
        let (location, git_ref) = text.rsplit_once('@')?;
        let mut parts = location.splitn(3, '/');
        let owner = parts.next()?;
        let repo = parts.next()?;
        let path = parts.next()?;

        if owner.is_empty() || repo.is_empty() || path.is_empty() || git_ref.is_empty() {
            return None;
        }

        Some(Self::new(format!("{}/{}", owner, repo), path, git_ref))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.repository, self.path, self.git_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentBody {
    /// Raw bytes exactly as fetched
    Content(Vec<u8>),
    /// The fetch failed with this message
    FetchError(String),
}

/// One collected file: header line, body, blank separator line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSegment {
    pub provenance: Provenance,
    pub body: SegmentBody,
}

impl CorpusSegment {
    pub fn new(provenance: Provenance, body: SegmentBody) -> Self {
        Self { provenance, body }
    }

    /// The exact header line, newline included
    pub fn header(&self) -> String {
        format!("{}{}\n", HEADER_PREFIX, self.provenance)
    }

    /// Render the segment as it appears on disk.
    ///
    /// Content gets a trailing newline when it lacks one; error markers are
    /// kept to a single line.
    pub fn render(&self) -> Vec<u8> {
        let mut out = self.header().into_bytes();

        match &self.body {
            SegmentBody::Content(bytes) => {
                out.extend_from_slice(bytes);
                if !bytes.ends_with(b"\n") {
                    out.push(b'\n');
                }
            }
            SegmentBody::FetchError(message) => {
                out.extend_from_slice(error_marker(&self.provenance, message).as_bytes());
            }
        }

        out.push(b'\n');
        out
    }
}

pub(crate) fn error_marker(provenance: &Provenance, message: &str) -> String {
    let single_line = message.replace(['\r', '\n'], " ");
    format!("{}{}: {}\n", ERROR_MARKER_PREFIX, provenance, single_line)
}

/// Position of one header line inside a corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLine {
    /// Offset of the marker
    pub start: usize,
    /// Offset just past the line's newline (or end of corpus)
    pub end: usize,
}

impl HeaderLine {
    /// Header text without the marker and line terminator
    pub fn text<'a>(&self, corpus: &'a [u8]) -> Cow<'a, str> {
        let line = &corpus[self.start + HEADER_PREFIX.len()..self.end];
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        String::from_utf8_lossy(line)
    }
}

/// Every provenance header in the corpus, in corpus order.
///
/// A header opens the corpus or follows a segment's blank separator line,
/// starts with [`HEADER_PREFIX`] and parses as a [`Provenance`]. Body lines
/// that merely start with the marker are not headers.
pub fn header_lines(corpus: &[u8]) -> Vec<HeaderLine> {
    let mut headers = Vec::new();
    let mut start = 0;

    while start < corpus.len() {
        let end = corpus[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| start + i + 1)
            .unwrap_or(corpus.len());

        let at_boundary = start == 0 || corpus[..start].ends_with(b"\n\n");
        let line = &corpus[start..end];
        if at_boundary
            && line.starts_with(HEADER_PREFIX.as_bytes())
            && !line.starts_with(ERROR_MARKER_PREFIX.as_bytes())
        {
            let header = HeaderLine { start, end };
            if Provenance::parse(&header.text(corpus)).is_some() {
                headers.push(header);
            }
        }
        start = end;
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_format() {
        let segment = CorpusSegment::new(
            Provenance::new("acme/app", "web/package-lock.json", "main"),
            SegmentBody::Content(Vec::new()),
        );
        assert_eq!(segment.header(), "// acme/app/web/package-lock.json@main\n");
    }

    #[test]
    fn test_render_appends_missing_newline() {
        let provenance = Provenance::new("acme/app", "package-lock.json", "main");
        let bare = CorpusSegment::new(provenance.clone(), SegmentBody::Content(b"{}".to_vec()));
        let terminated = CorpusSegment::new(provenance, SegmentBody::Content(b"{}\n".to_vec()));

        let expected = b"// acme/app/package-lock.json@main\n{}\n\n".to_vec();
        assert_eq!(bare.render(), expected);
        assert_eq!(terminated.render(), expected);
    }

    #[test]
    fn test_render_fetch_error_is_one_line() {
        let segment = CorpusSegment::new(
            Provenance::new("acme/app", "package-lock.json", "main"),
            SegmentBody::FetchError("HTTP 502\nbad gateway".to_string()),
        );
        let rendered = String::from_utf8(segment.render()).unwrap();
        assert_eq!(
            rendered,
            "// acme/app/package-lock.json@main\n\
             // ERROR fetching acme/app/package-lock.json@main: HTTP 502 bad gateway\n\n"
        );
    }

    #[test]
    fn test_provenance_parse() {
        let parsed = Provenance::parse("acme/app/packages/a@b/package-lock.json@release/1.x").unwrap();
        assert_eq!(parsed.repository, "acme/app");
        assert_eq!(parsed.path, "packages/a@b/package-lock.json");
        assert_eq!(parsed.git_ref, "release/1.x");
        assert_eq!(parsed.to_string(), "acme/app/packages/a@b/package-lock.json@release/1.x");

        assert!(Provenance::parse("acme/app@main").is_none());
        assert!(Provenance::parse("acme/app/package-lock.json").is_none());
    }

    #[test]
    fn test_header_lines_skip_error_markers_and_mid_line_markers() {
        let corpus = b"// acme/a/package-lock.json@main\n\
                       // ERROR fetching acme/a/package-lock.json@main: boom\n\
                       \n\
                       {\"resolved\": \"https://registry.npmjs.org/x\"} // not a header\n\
                       \n\
                       // acme/b/package-lock.json@dev\r\n";
        let headers = header_lines(corpus);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].start, 0);
        assert_eq!(headers[0].text(corpus), "acme/a/package-lock.json@main");
        assert_eq!(headers[1].text(corpus), "acme/b/package-lock.json@dev");
    }

    #[test]
    fn test_header_without_trailing_newline() {
        let corpus = b"{}\n\n// acme/a/package-lock.json@main";
        let headers = header_lines(corpus);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].end, corpus.len());
        assert_eq!(headers[0].text(corpus), "acme/a/package-lock.json@main");
    }

    #[test]
    fn test_comment_lines_in_body_are_not_headers() {
        let segment = CorpusSegment::new(
            Provenance::new("acme/app", "package-lock.json", "main"),
            SegmentBody::Content(b"{\n// generated by tool\n\"left-pad\": \"1.3.0\"\n}\n".to_vec()),
        );
        let corpus = segment.render();
        let headers = header_lines(&corpus);

        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].text(&corpus), "acme/app/package-lock.json@main");
    }

    #[test]
    fn test_unparsable_line_after_separator_is_not_a_header() {
        let corpus = b"// acme/a/package-lock.json@main\n{\n\n// see https://example.com\n}\n\n";
        let headers = header_lines(corpus);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].start, 0);
    }
}
