use crate::corpus::header_lines;

/// Provenance headers of a corpus, sorted by offset, built once so each
/// match is attributed with a binary search.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    entries: Vec<(usize, String)>,
}

impl HeaderIndex {
    pub fn build(corpus: &[u8]) -> Self {
        let entries = header_lines(corpus)
            .into_iter()
            .map(|line| (line.start, line.text(corpus).into_owned()))
            .collect();
        Self { entries }
    }

    /// Text of the last header starting strictly before `offset`
    pub fn attribute(&self, offset: usize) -> Option<&str> {
        let idx = self.entries.partition_point(|(start, _)| *start < offset);
        idx.checked_sub(1).map(|i| self.entries[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
