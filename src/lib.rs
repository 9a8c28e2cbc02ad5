//! Classort: canonical ordering for class-list attributes
//!
//! Reorders whitespace-separated class lists found in markup, script and
//! stylesheet trees according to an external ranking oracle, and splices the
//! rewritten text back into the source.

// Core engine - re-exported from classort-core
pub use classort_core::error;
pub use classort_core::matcher;
pub use classort_core::options;
pub use classort_core::patch;
pub use classort_core::rank;
pub use classort_core::sort;
pub use classort_core::text;
pub use classort_core::walk;

pub use classort_core::error::{ClassortError, Result};
pub use classort_core::matcher::{Matcher, ParserKind};
pub use classort_core::patch::{splice_changes, Change, ChangeSet};
pub use classort_core::rank::{RankingAdapter, RankingOracle, StaticOracle};
pub use classort_core::sort::{reorder_tokens, sort_token_list_string, SortPolicy};
pub use classort_core::walk::visit;

pub mod session;

// Dialect adapters
pub mod jsx;
