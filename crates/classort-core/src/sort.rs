//! Canonical reordering of token lists.
//!
//! Two entry points:
//! - [`reorder_tokens`] orders an already-split token sequence.
//! - [`sort_token_list_string`] splits a string, reorders it and reassembles
//!   it, applying the whitespace policy.
//!
//! ## Ordering
//!
//! Tokens are stable-sorted by rank with this total order:
//! 1. The ellipsis tokens `...` and `…` always sort last.
//! 2. Unknown tokens (no rank) sort before every ranked token.
//! 3. Ranked tokens sort ascending; ties keep their original relative order.
//!
//! ## Deduplication
//!
//! When enabled, a token is dropped if an identical *ranked* token was already
//! kept. Unknown tokens are never deduplicated. Removed positions are reported
//! as indices into the sorted sequence.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::rank::{Rank, RankingAdapter, RankingOracle};
use crate::text::{is_blank, is_list_whitespace, TokenList};

/// Marker that identifies interpolated (foreign) content in a token list.
pub const INTERPOLATION_MARKER: &str = "{{";

/// Tokens pinned to the end of every sorted list.
pub const ELLIPSIS_TOKENS: [&str; 2] = ["...", "…"];

/// Returns true for the tokens pinned to the end of the list.
pub fn is_ellipsis(token: &str) -> bool {
    ELLIPSIS_TOKENS.contains(&token)
}

// ============================================================================
// Policy
// ============================================================================

/// Which outer whitespace runs collapse to nothing.
///
/// Inner runs always collapse to a single space under a collapse policy. An
/// outer run collapses to nothing when its flag is set and to a single space
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhitespaceCollapse {
    /// Leading whitespace is removed.
    pub start: bool,
    /// Trailing whitespace is removed.
    pub end: bool,
}

impl WhitespaceCollapse {
    /// Collapse both ends.
    pub const BOTH: WhitespaceCollapse = WhitespaceCollapse {
        start: true,
        end: true,
    };
}

impl Default for WhitespaceCollapse {
    fn default() -> Self {
        WhitespaceCollapse::BOTH
    }
}

/// Flags controlling one sort operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortPolicy {
    /// Drop repeated ranked tokens.
    pub remove_duplicates: bool,
    /// Keep the first token (and its trailing run) in place.
    pub ignore_first: bool,
    /// Keep the last token (and its leading run) in place.
    pub ignore_last: bool,
    /// Whitespace normalization; `None` preserves whitespace verbatim.
    pub collapse_whitespace: Option<WhitespaceCollapse>,
}

impl Default for SortPolicy {
    fn default() -> Self {
        SortPolicy {
            remove_duplicates: true,
            ignore_first: false,
            ignore_last: false,
            collapse_whitespace: Some(WhitespaceCollapse::BOTH),
        }
    }
}

impl SortPolicy {
    /// Set duplicate removal.
    pub fn with_remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = remove;
        self
    }

    /// Pin the first token.
    pub fn with_ignore_first(mut self, ignore: bool) -> Self {
        self.ignore_first = ignore;
        self
    }

    /// Pin the last token.
    pub fn with_ignore_last(mut self, ignore: bool) -> Self {
        self.ignore_last = ignore;
        self
    }

    /// Set the whitespace policy.
    pub fn with_collapse(mut self, collapse: Option<WhitespaceCollapse>) -> Self {
        self.collapse_whitespace = collapse;
        self
    }
}

// ============================================================================
// Reordering
// ============================================================================

/// Result of [`reorder_tokens`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reordered<'a> {
    /// Surviving tokens in canonical order.
    pub tokens: Vec<&'a str>,
    /// Positions dropped as duplicates, as indices into the sorted sequence.
    pub removed_indices: BTreeSet<usize>,
}

fn compare_ranked(a: &(&str, Option<Rank>), b: &(&str, Option<Rank>)) -> Ordering {
    match (is_ellipsis(a.0), is_ellipsis(b.0)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        // None < Some: unknown tokens float to the front.
        (false, false) => a.1.cmp(&b.1),
    }
}

/// Sort `tokens` by rank and optionally drop duplicates. No pinning.
fn sort_ranked<'a, O: RankingOracle>(
    tokens: &[&'a str],
    remove_duplicates: bool,
    adapter: &RankingAdapter<O>,
) -> Reordered<'a> {
    let ranks = adapter.ranks(tokens);
    let mut pairs: Vec<(&'a str, Option<Rank>)> = tokens
        .iter()
        .map(|t| (*t, ranks.get(t).cloned().flatten()))
        .collect();
    pairs.sort_by(compare_ranked);

    let mut removed_indices = BTreeSet::new();
    if !remove_duplicates {
        return Reordered {
            tokens: pairs.into_iter().map(|(t, _)| t).collect(),
            removed_indices,
        };
    }

    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(pairs.len());
    for (index, (token, rank)) in pairs.into_iter().enumerate() {
        if seen.contains(token) {
            removed_indices.insert(index);
            continue;
        }
        if rank.is_some() {
            seen.insert(token);
        }
        kept.push(token);
    }

    Reordered {
        tokens: kept,
        removed_indices,
    }
}

/// Put `tokens` into canonical order.
///
/// Honors `remove_duplicates`, `ignore_first` and `ignore_last`; whitespace
/// flags do not apply to a bare token sequence. A pinned first token shifts
/// `removed_indices` by one so they index the full sorted sequence.
pub fn reorder_tokens<'a, O: RankingOracle>(
    tokens: &[&'a str],
    policy: &SortPolicy,
    adapter: &RankingAdapter<O>,
) -> Reordered<'a> {
    let mut middle = tokens;

    let mut first = None;
    if policy.ignore_first {
        if let Some((head, rest)) = middle.split_first() {
            first = Some(*head);
            middle = rest;
        }
    }

    let mut last = None;
    if policy.ignore_last {
        if let Some((tail, rest)) = middle.split_last() {
            last = Some(*tail);
            middle = rest;
        }
    }

    let sorted = sort_ranked(middle, policy.remove_duplicates, adapter);
    let offset = usize::from(first.is_some());

    let mut out = Vec::with_capacity(sorted.tokens.len() + 2);
    out.extend(first);
    out.extend(sorted.tokens);
    out.extend(last);

    Reordered {
        tokens: out,
        removed_indices: sorted.removed_indices.into_iter().map(|i| i + offset).collect(),
    }
}

// ============================================================================
// String Sorting
// ============================================================================

/// Replace a leading whitespace run of `s` with `with`.
fn replace_leading_whitespace(s: &str, with: &str) -> String {
    let trimmed = s.trim_start_matches(is_list_whitespace);
    if trimmed.len() == s.len() {
        s.to_string()
    } else {
        format!("{with}{trimmed}")
    }
}

/// Replace a trailing whitespace run of `s` with `with`.
fn replace_trailing_whitespace(s: &str, with: &str) -> String {
    let trimmed = s.trim_end_matches(is_list_whitespace);
    if trimmed.len() == s.len() {
        s.to_string()
    } else {
        format!("{trimmed}{with}")
    }
}

/// Sort a whitespace-separated token list string.
///
/// Strings containing the interpolation marker `{{` are foreign content and
/// come back unchanged. A blank string collapses to a single space under a
/// collapse policy.
pub fn sort_token_list_string<O: RankingOracle>(
    s: &str,
    policy: &SortPolicy,
    adapter: &RankingAdapter<O>,
) -> String {
    if s.is_empty() {
        return String::new();
    }

    if s.contains(INTERPOLATION_MARKER) {
        debug!(value = s, "skipping token list with interpolation marker");
        return s.to_string();
    }

    let collapse = policy.collapse_whitespace;
    if collapse.is_some() && is_blank(s) {
        return " ".to_string();
    }

    let list = TokenList::split(s);
    let mut tokens: Vec<&str> = list.tokens;
    let mut whitespace: Vec<&str> = match collapse {
        Some(_) => vec![" "; list.whitespace.len()],
        None => list.whitespace,
    };

    let mut prefix = String::new();
    if policy.ignore_first {
        if !tokens.is_empty() {
            prefix.push_str(tokens.remove(0));
        }
        if !whitespace.is_empty() {
            prefix.push_str(whitespace.remove(0));
        }
    }

    let mut suffix = String::new();
    if policy.ignore_last {
        if let Some(token) = tokens.pop() {
            // A list ending in whitespace carries one run past its last token.
            let trailing = if whitespace.len() > tokens.len() {
                whitespace.pop()
            } else {
                None
            };
            if let Some(run) = whitespace.pop() {
                suffix.push_str(run);
            }
            suffix.push_str(token);
            suffix.extend(trailing);
        }
    }

    let sorted = sort_ranked(&tokens, policy.remove_duplicates, adapter);

    // Drop the run in front of each removed token.
    let whitespace: Vec<&str> = whitespace
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !sorted.removed_indices.contains(&(i + 1)))
        .map(|(_, run)| run)
        .collect();

    let mut result = crate::text::join(&sorted.tokens, &whitespace);

    if let Some(collapse) = collapse {
        let start = if collapse.start { "" } else { " " };
        let end = if collapse.end { "" } else { " " };
        prefix = replace_trailing_whitespace(&prefix, " ");
        suffix = replace_leading_whitespace(&suffix, " ");
        suffix = replace_trailing_whitespace(&suffix, end);
        result = replace_leading_whitespace(&result, start);
        result = replace_trailing_whitespace(&result, end);
    }

    format!("{prefix}{result}{suffix}")
}
