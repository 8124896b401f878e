//! Offset-safe span rewriting.
//!
//! All spans for one scan are computed against one immutable text snapshot.
//! Replacements are then spliced from the highest offset down: each splice
//! only touches content strictly to the right of every still-pending span,
//! so offsets computed against the snapshot stay valid throughout the pass.
//! Forward-order splicing is disallowed; a variable-length replacement would
//! shift every later offset and force recomputation.

/// Half-open `[start, end)` byte range into one document snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl MatchSpan {
    /// Creates a span from half-open byte offsets.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Shifts the span right by `offset` bytes. Used to lift a span found
    /// inside a sub-slice back into document coordinates.
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl From<regex::Match<'_>> for MatchSpan {
    fn from(m: regex::Match<'_>) -> Self {
        Self::new(m.start(), m.end())
    }
}

impl std::fmt::Display for MatchSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A matched span paired with its generated replacement text.
#[derive(Debug, Clone)]
pub struct Rewrite {
    /// Region of the snapshot to replace.
    pub span: MatchSpan,
    /// Text spliced in place of the region.
    pub replacement: String,
}

/// Applies all rewrites to `content`, splicing in descending `start` order.
///
/// Spans must come from one scan over `content` itself and be non-overlapping
/// by construction; input order does not matter.
pub fn apply_rewrites(content: &str, mut rewrites: Vec<Rewrite>) -> String {
    rewrites.sort_by(|a, b| b.span.start.cmp(&a.span.start));
    debug_assert!(
        rewrites
            .windows(2)
            .all(|pair| pair[1].span.end <= pair[0].span.start),
        "rewrite spans must not overlap"
    );

    let mut output = content.to_string();
    for rewrite in rewrites {
        output.replace_range(rewrite.span.start..rewrite.span.end, &rewrite.replacement);
    }
    output
}
