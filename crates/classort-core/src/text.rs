//! Token-list splitting and text position utilities.
//!
//! A token list is a string of opaque tokens separated by runs of ASCII
//! whitespace (space, tab, newline, form feed, carriage return). Splitting
//! keeps every whitespace run verbatim so that joining the pieces back
//! together reproduces the input byte-for-byte:
//!
//! ```
//! use classort_core::text::TokenList;
//!
//! let list = TokenList::split("  flex\tp-4 ");
//! assert_eq!(list.tokens, vec!["", "flex", "p-4"]);
//! assert_eq!(list.whitespace, vec!["  ", "\t", " "]);
//! assert_eq!(list.join(), "  flex\tp-4 ");
//! ```
//!
//! ## Shape
//!
//! Leading whitespace produces a leading empty token. A trailing empty token
//! is never produced, so `whitespace.len()` is either `tokens.len()` (the list
//! ends in whitespace) or `tokens.len() - 1`.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**

/// Whitespace characters that separate tokens.
pub const LIST_WHITESPACE: [char; 5] = [' ', '\t', '\n', '\r', '\x0C'];

/// Returns true if `c` separates tokens in a token list.
pub fn is_list_whitespace(c: char) -> bool {
    LIST_WHITESPACE.contains(&c)
}

/// Returns true if `s` is non-empty and made only of separator whitespace.
pub fn is_blank(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_list_whitespace)
}

// ============================================================================
// Token Lists
// ============================================================================

/// A token list split into tokens and the whitespace runs between them.
///
/// `whitespace[i]` is the run that follows `tokens[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList<'a> {
    /// Tokens in source order. May start with an empty token.
    pub tokens: Vec<&'a str>,
    /// Whitespace runs; `whitespace[i]` trails `tokens[i]`.
    pub whitespace: Vec<&'a str>,
}

impl<'a> TokenList<'a> {
    /// Split `s` on maximal whitespace runs.
    pub fn split(s: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut whitespace = Vec::new();
        let mut rest = s;

        loop {
            let token_end = rest.find(is_list_whitespace).unwrap_or(rest.len());
            tokens.push(&rest[..token_end]);
            rest = &rest[token_end..];
            if rest.is_empty() {
                break;
            }

            let run_end = rest
                .find(|c: char| !is_list_whitespace(c))
                .unwrap_or(rest.len());
            whitespace.push(&rest[..run_end]);
            rest = &rest[run_end..];
        }

        if tokens.last() == Some(&"") {
            tokens.pop();
        }

        TokenList { tokens, whitespace }
    }

    /// Reassemble the list. Inverse of [`TokenList::split`].
    pub fn join(&self) -> String {
        join(&self.tokens, &self.whitespace)
    }

    /// Number of tokens (including a leading empty token, if any).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the list has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Join tokens with their trailing whitespace runs.
///
/// Each token is followed by the run at the same index, if there is one.
pub fn join<S: AsRef<str>, W: AsRef<str>>(tokens: &[S], whitespace: &[W]) -> String {
    let capacity = tokens.iter().map(|t| t.as_ref().len()).sum::<usize>()
        + whitespace.iter().map(|w| w.as_ref().len()).sum::<usize>();
    let mut out = String::with_capacity(capacity);
    for (i, token) in tokens.iter().enumerate() {
        out.push_str(token.as_ref());
        if let Some(run) = whitespace.get(i) {
            out.push_str(run.as_ref());
        }
    }
    out
}

// ============================================================================
// Positions
// ============================================================================

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// Columns count Unicode scalar values, not bytes. Offsets past the end of
/// `content` clamp to the end.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
