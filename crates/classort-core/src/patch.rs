//! Change sets: positional edits against an immutable buffer.
//!
//! This module implements the single-pass edit machinery for classort:
//! - [`Change`]: a half-open byte range of the original buffer and its replacement
//! - [`ChangeSet`]: an accumulator for the edits produced while walking a tree
//! - [`splice_changes`]: applies a batch of changes in one pass
//!
//! ## Offsets
//!
//! All offsets are UTF-8 byte offsets into the *original* buffer. Changes are
//! never expressed relative to each other; the splicer applies them from the
//! rightmost position backward so that no applied edit shifts an edit that is
//! still pending.
//!
//! ## Overlap Rules
//!
//! - Disjoint and adjacent changes are applied.
//! - A change nested inside another change is superseded by the enclosing
//!   one and dropped. For identical ranges the first supplied change wins.
//! - A zero-width change sitting on the boundary of another change is an
//!   insertion next to it, not a nested change.
//! - Partially overlapping changes are rejected with
//!   [`ClassortError::OverlappingChanges`].
//!
//! Every change is validated against the buffer before anything is applied:
//! out-of-bounds ranges, ranges that split a character, and `before` text
//! that does not match the buffer are all errors.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use tracing::debug;

use crate::error::{ClassortError, Result};
use crate::text::byte_offset_to_position;

// ============================================================================
// Core Types
// ============================================================================

/// Byte offsets into a buffer.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "Span start ({start}) must be <= end ({end})");
        Span { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A single replacement of `[start, end)` in the original buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// The text currently at `[start, end)`.
    pub before: String,
    /// The replacement text.
    pub after: String,
}

impl Change {
    /// Create a change.
    pub fn new(
        start: usize,
        end: usize,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        Change {
            start,
            end,
            before: before.into(),
            after: after.into(),
        }
    }

    /// The range this change replaces.
    pub fn span(&self) -> Span {
        Span {
            start: self.start,
            end: self.end,
        }
    }

    /// Returns true if applying this change leaves the buffer unchanged.
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }

    fn validate(&self, buffer: &str) -> Result<()> {
        let span = self.span();
        if self.start > self.end || self.end > buffer.len() {
            return Err(ClassortError::ChangeOutOfBounds {
                span,
                len: buffer.len(),
            });
        }

        for offset in [self.start, self.end] {
            if !buffer.is_char_boundary(offset) {
                let (line, col) = byte_offset_to_position(buffer, offset);
                return Err(ClassortError::ChangeNotOnCharBoundary { span, line, col });
            }
        }

        let actual = &buffer[self.start..self.end];
        if actual != self.before {
            let (line, col) = byte_offset_to_position(buffer, self.start);
            return Err(ClassortError::ChangeMismatch {
                span,
                expected: self.before.clone(),
                actual: actual.to_string(),
                line,
                col,
            });
        }

        Ok(())
    }
}

// ============================================================================
// ChangeSet
// ============================================================================

/// Changes accumulated against one buffer, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// The changes in the order they were recorded.
    pub changes: Vec<Change>,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        ChangeSet::default()
    }

    /// Record a change. No-op changes are discarded.
    pub fn push(&mut self, change: Change) {
        if !change.is_noop() {
            self.changes.push(change);
        }
    }

    /// Add a change (builder form).
    pub fn with_change(mut self, change: Change) -> Self {
        self.push(change);
        self
    }

    /// Check if this set contains any changes.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Number of recorded changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if no changes are recorded.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Apply every recorded change to `buffer`.
    pub fn apply(&self, buffer: &str) -> Result<String> {
        splice_changes(buffer, &self.changes)
    }
}

impl Extend<Change> for ChangeSet {
    fn extend<I: IntoIterator<Item = Change>>(&mut self, iter: I) {
        for change in iter {
            self.push(change);
        }
    }
}

// ============================================================================
// Splicing
// ============================================================================

/// Apply `changes` to `buffer` in a single backward pass.
///
/// The input order of `changes` does not matter. See the module docs for
/// the overlap rules.
pub fn splice_changes(buffer: &str, changes: &[Change]) -> Result<String> {
    if changes.is_empty() {
        return Ok(buffer.to_string());
    }

    for change in changes {
        change.validate(buffer)?;
    }

    let mut applicable = resolve_nesting(changes)?;

    // Rightmost first. Same-position insertions apply later-supplied first so
    // the final text keeps their supplied order.
    applicable.sort_by_key(|&i| (Reverse(changes[i].end), Reverse(changes[i].start), Reverse(i)));

    let mut out = buffer.to_string();
    for i in applicable {
        let change = &changes[i];
        out.replace_range(change.start..change.end, &change.after);
    }

    Ok(out)
}

/// Drop nested changes and reject partial overlaps.
///
/// Returns indices into `changes` of the changes that survive; they are
/// pairwise disjoint (zero-width changes may touch a neighbour's boundary).
fn resolve_nesting(changes: &[Change]) -> Result<Vec<usize>> {
    let mut order: Vec<usize> = (0..changes.len()).collect();
    // Enclosing changes sort ahead of what they contain.
    order.sort_by_key(|&i| (changes[i].start, Reverse(changes[i].end), i));

    let mut kept = Vec::with_capacity(order.len());
    let mut current: Option<Span> = None;

    for i in order {
        let span = changes[i].span();
        let Some(outer) = current else {
            current = Some(span);
            kept.push(i);
            continue;
        };

        if span.start >= outer.end {
            current = Some(span);
            kept.push(i);
        } else if span.is_empty() && span.start == outer.start {
            // Insertion in front of `outer`.
            kept.push(i);
        } else if span.end <= outer.end {
            debug!(
                nested = %span,
                enclosing = %outer,
                "dropping change superseded by enclosing change"
            );
        } else {
            return Err(ClassortError::OverlappingChanges {
                first: outer,
                second: span,
            });
        }
    }

    Ok(kept)
}
