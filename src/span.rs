//! Source positions: byte spans, line/column locations and the line index
//! used to translate between them.

use serde::Serialize;

/// Byte range of a token or node in the source text.
///
/// `start`/`end` are always present. `range` and `loc` are only filled in by
/// the tree builder when the matching parse options are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            range: None,
            loc: None,
        }
    }

    /// Empty span at a single offset
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Span covering both `self` and `other`
    pub fn cover(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The text this span covers
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// 1-based line, 0-based column (counted in Unicode scalar values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

/// Offsets of every line start, for offset -> (line, column) lookups.
/// Columns are byte distances corrected by the multi-byte characters
/// recorded in `wide_chars`.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    /// `(offset, extra)` for each non-ASCII char, where `extra` counts the
    /// continuation bytes of it and every earlier non-ASCII char
    wide_chars: Vec<(usize, usize)>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut wide_chars = Vec::new();
        let mut extra = 0;
        let mut chars = source.char_indices().peekable();
        while let Some((pos, ch)) = chars.next() {
            if !ch.is_ascii() {
                extra += ch.len_utf8() - 1;
                wide_chars.push((pos, extra));
            }
            match ch {
                '\r' => {
                    if let Some((_, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(pos + 2);
                    } else {
                        line_starts.push(pos + 1);
                    }
                }
                '\n' => line_starts.push(pos + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(pos + ch.len_utf8()),
                _ => {}
            }
        }
        Self {
            line_starts,
            wide_chars,
        }
    }

    /// Continuation bytes of all characters that start before `offset`
    fn extra_bytes_before(&self, offset: usize) -> usize {
        let count = self.wide_chars.partition_point(|&(pos, _)| pos < offset);
        count
            .checked_sub(1)
            .and_then(|last| self.wide_chars.get(last))
            .map_or(0, |&(_, extra)| extra)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset at which the given 1-based line starts
    pub fn line_start(&self, line: u32) -> Option<usize> {
        let index = (line as usize).checked_sub(1)?;
        self.line_starts.get(index).copied()
    }

    pub fn position(&self, source: &str, offset: usize) -> Position {
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line_index).copied().unwrap_or(0);
        let offset = offset.clamp(line_start, source.len().max(line_start));
        let column = (offset - line_start)
            - (self.extra_bytes_before(offset) - self.extra_bytes_before(line_start));
        Position {
            line: line_index as u32 + 1,
            column: column as u32,
        }
    }

    pub fn location(&self, source: &str, start: usize, end: usize) -> SourceLocation {
        SourceLocation {
            start: self.position(source, start),
            end: self.position(source, end),
        }
    }
}
