use crate::advisory::AdvisoryPair;

/// Literal dependency declaration `"name": "version"`, matched without
/// regard to ASCII case. Never compiled into a pattern: every byte of the
/// advisory, dots included, must appear verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Needle {
    text: String,
}

impl Needle {
    pub fn for_pair(pair: &AdvisoryPair) -> Self {
        Self {
            text: format!("\"{}\": \"{}\"", pair.package, pair.version),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Start offsets of every non-overlapping occurrence, left to right
    pub fn find_all<'h>(&'h self, haystack: &'h [u8]) -> Matches<'h> {
        Matches {
            needle: self.text.as_bytes(),
            haystack,
            pos: 0,
        }
    }
}

pub struct Matches<'h> {
    needle: &'h [u8],
    haystack: &'h [u8],
    pos: usize,
}

impl Iterator for Matches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let first = self.needle.first()?.to_ascii_lowercase();
        let len = self.needle.len();

        while self.pos + len <= self.haystack.len() {
            let skip = self.haystack[self.pos..]
                .iter()
                .position(|b| b.to_ascii_lowercase() == first)?;
            let start = self.pos + skip;

            if start + len > self.haystack.len() {
                self.pos = self.haystack.len();
                return None;
            }
            if self.haystack[start..start + len].eq_ignore_ascii_case(self.needle) {
                self.pos = start + len;
                return Some(start);
            }
            self.pos = start + 1;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needle(name: &str, version: &str) -> Needle {
        Needle::for_pair(&AdvisoryPair::new(name, version))
    }

    #[test]
    fn test_needle_text() {
        assert_eq!(needle("left-pad", "1.3.0").as_str(), r#""left-pad": "1.3.0""#);
    }

    #[test]
    fn test_case_insensitive() {
        let haystack = br#"{"LODASH": "4.17.20", "lodash": "4.17.20"}"#;
        let found: Vec<usize> = needle("lodash", "4.17.20").find_all(haystack).collect();
        assert_eq!(found, vec![1, 22]);
    }

    #[test]
    fn test_dot_is_literal() {
        let haystack = br#""lodash": "4x17x20""#;
        assert_eq!(needle("lodash", "4.17.20").find_all(haystack).count(), 0);
    }

    #[test]
    fn test_version_prefix_does_not_match_longer_version() {
        // the closing quote is part of the needle
        let haystack = br#""chalk": "5.6.10""#;
        assert_eq!(needle("chalk", "5.6.1").find_all(haystack).count(), 0);
    }

    #[test]
    fn test_non_overlapping_left_to_right() {
        let n = Needle { text: "aa".to_string() };
        let found: Vec<usize> = n.find_all(b"aaaaa").collect();
        assert_eq!(found, vec![0, 2]);
    }

    #[test]
    fn test_invalid_utf8_haystack() {
        let mut haystack = vec![0xff, 0xfe];
        haystack.extend_from_slice(br#""debug": "4.4.2""#);
        let found: Vec<usize> = needle("debug", "4.4.2").find_all(&haystack).collect();
        assert_eq!(found, vec![2]);
    }
}
