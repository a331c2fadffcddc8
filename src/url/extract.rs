//! Marker-based URL extraction
//!
//! Candidates are found by plain substring search rather than HTML parsing:
//! a candidate starts at a start marker and runs up to (not including) the
//! first delimiter character after the marker. Matched spans are recorded in
//! a sorted arena of consumed ranges so neither the same marker nor a later
//! one can match those bytes again.

use std::ops::Range;

/// A start marker and the set of characters that terminate a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub start: String,
    pub delimiters: String,
}

impl Pattern {
    pub fn new(start: impl Into<String>, delimiters: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            delimiters: delimiters.into(),
        }
    }

    fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(c)
    }
}

/// Lazy sequence of candidate URLs found in one body
///
/// Patterns are applied in order; each pattern is exhausted before the next
/// one starts. Calling [`extract`] again on the same body restarts the scan.
#[derive(Debug)]
pub struct Extraction<'a> {
    body: &'a str,
    patterns: &'a [Pattern],
    pattern_index: usize,
    cursor: usize,
    /// Sorted, non-overlapping
    consumed: Vec<Range<usize>>,
}

/// Starts extracting candidates from `body` using `patterns`
///
/// # Example
///
/// ```
/// use breadth_crawler::url::{extract, Pattern};
///
/// let patterns = vec![Pattern::new("https://", "\" ")];
/// let body = r#"<a href="https://a.com/x">a</a> https://b.org"#;
/// let found: Vec<&str> = extract(body, &patterns).collect();
/// assert_eq!(found, vec!["https://a.com/x", "https://b.org"]);
/// ```
pub fn extract<'a>(body: &'a str, patterns: &'a [Pattern]) -> Extraction<'a> {
    Extraction {
        body,
        patterns,
        pattern_index: 0,
        cursor: 0,
        consumed: Vec::new(),
    }
}

impl<'a> Extraction<'a> {
    /// The body with every span consumed so far removed
    pub fn residue(&self) -> String {
        let mut residue = String::with_capacity(self.body.len());
        let mut from = 0;
        for span in &self.consumed {
            residue.push_str(&self.body[from..span.start]);
            from = span.end;
        }
        residue.push_str(&self.body[from..]);
        residue
    }

    fn next_match(&mut self, pattern: &Pattern) -> Option<Range<usize>> {
        let body = self.body;
        let mut from = self.cursor;

        while from <= body.len() {
            let begin = from + body[from..].find(pattern.start.as_str())?;
            let marker_end = begin + pattern.start.len();

            // Marker bytes already belong to an earlier match
            if let Some(span) = self.overlapping(begin, marker_end) {
                from = span.end;
                continue;
            }

            // A candidate never runs into a consumed span
            let limit = self.next_consumed_start(marker_end).unwrap_or(body.len());
            let end = body[marker_end..limit]
                .find(|c| pattern.is_delimiter(c))
                .map(|offset| marker_end + offset)
                .unwrap_or(limit);

            self.cursor = end;
            return Some(begin..end);
        }

        None
    }

    fn overlapping(&self, start: usize, end: usize) -> Option<Range<usize>> {
        let index = self.consumed.partition_point(|span| span.end <= start);
        self.consumed
            .get(index)
            .filter(|span| span.start < end)
            .cloned()
    }

    fn next_consumed_start(&self, position: usize) -> Option<usize> {
        let index = self.consumed.partition_point(|span| span.start < position);
        self.consumed.get(index).map(|span| span.start)
    }

    fn consume(&mut self, range: Range<usize>) {
        let index = self.consumed.partition_point(|span| span.start < range.start);
        self.consumed.insert(index, range);
    }
}

impl<'a> Iterator for Extraction<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some(pattern) = self.patterns.get(self.pattern_index) {
            if pattern.start.is_empty() {
                self.pattern_index += 1;
                continue;
            }

            match self.next_match(pattern) {
                Some(range) => {
                    self.consume(range.clone());
                    return Some(&self.body[range]);
                }
                None => {
                    self.pattern_index += 1;
                    self.cursor = 0;
                }
            }
        }

        None
    }
}
