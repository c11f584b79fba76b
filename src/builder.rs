//! Span stamping for syntax tree nodes
//!
//! Every node the parser closes gets its span from [`NodeBuilder::span`], which
//! adds the optional `range` pair and `loc` line/column record requested by
//! the parse options.

use crate::options::ParseOptions;
use crate::span::{LineIndex, Span};

pub struct NodeBuilder<'a> {
    source: &'a str,
    /// Present only when `loc` output was requested
    lines: Option<LineIndex>,
    ranges: bool,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(source: &'a str, options: &ParseOptions) -> Self {
        Self {
            source,
            lines: options.loc.then(|| LineIndex::new(source)),
            ranges: options.ranges,
        }
    }

    /// Span of a node covering `start..end`
    pub fn span(&self, start: usize, end: usize) -> Span {
        let mut span = Span::new(start, end);
        if self.ranges {
            span.range = Some([start, end]);
        }
        if let Some(lines) = &self.lines {
            span.loc = Some(lines.location(self.source, start, end));
        }
        span
    }

    /// Restamp a span produced elsewhere (a token span, or a span whose end
    /// moved after the node was first built)
    pub fn restamp(&self, span: Span) -> Span {
        self.span(span.start, span.end)
    }
}
