//! Core infrastructure for classort.
//!
//! This crate provides format-agnostic infrastructure for putting token lists
//! (class attributes, string literals, at-rule parameters) into canonical order:
//! - Tokenizer/detokenizer for whitespace-separated lists
//! - Ranking adapter over an external ordering oracle
//! - List reordering with dedup and whitespace-collapse policy
//! - Change sets and the splicer that applies them to a buffer
//! - Attribute/function name matching from exact names and patterns
//! - A generic walker for loosely-typed trees
//! - Sort options and their precedence resolution
//! - Error types

pub mod error;
pub mod matcher;
pub mod options;
pub mod patch;
pub mod rank;
pub mod sort;
pub mod text;
pub mod walk;
