/// Byte-offset spans into program and catalog source text
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A half-open byte range in a source string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Convert to a Range for use with ariadne
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Locate a 1-based line/column pair (as reported by serde_json) in `source`.
    ///
    /// The returned span covers a single character, clamped to the end of the input.
    pub fn from_line_col(source: &str, line: usize, column: usize) -> Self {
        let mut offset = 0;
        for (index, text) in source.split_inclusive('\n').enumerate() {
            if index + 1 == line {
                let col_offset = text
                    .char_indices()
                    .nth(column.saturating_sub(1))
                    .map(|(i, _)| i)
                    .unwrap_or(text.len());
                offset += col_offset;
                let end = (offset + 1).min(source.len());
                return Span::new(offset.min(source.len()), end);
            }
            offset += text.len();
        }
        let end = source.len();
        Span::new(end.saturating_sub(1), end)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span {
            start: range.start,
            end: range.end,
        }
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}
