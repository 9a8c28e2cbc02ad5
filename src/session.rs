//! Per-invocation format session.
//!
//! A [`FormatSession`] carries everything one format operation needs: the
//! resolved options, the ranking adapter, and the name matcher for the
//! session's dialect. The matcher is built lazily on first use and lives only
//! as long as the session; nothing is cached across invocations, so two
//! documents formatted concurrently with different per-file options never
//! share rule sets.

use std::cell::OnceCell;

use classort_core::error::Result;
use classort_core::matcher::{Matcher, ParserKind};
use classort_core::options::{OptionOverrides, ResolvedOptions, SiteOptions, SortOptions};
use classort_core::rank::{ParasiteRule, RankingAdapter, RankingOracle};
use classort_core::sort::{reorder_tokens, sort_token_list_string, Reordered, SortPolicy};

/// State for formatting one document.
pub struct FormatSession<O> {
    parser: ParserKind,
    options: ResolvedOptions,
    adapter: RankingAdapter<O>,
    matcher: OnceCell<Matcher>,
}

impl<O: RankingOracle> FormatSession<O> {
    /// Create a session with already-resolved options.
    pub fn new(parser: ParserKind, oracle: O, options: ResolvedOptions) -> Self {
        FormatSession {
            parser,
            options,
            adapter: RankingAdapter::new(oracle),
            matcher: OnceCell::new(),
        }
    }

    /// Create a session from a project options blob plus per-call overrides.
    pub fn from_json_options(
        parser: ParserKind,
        oracle: O,
        project_json: &str,
        overrides: &OptionOverrides,
    ) -> Result<Self> {
        let project = SortOptions::from_json(project_json)?;
        let options = ResolvedOptions::resolve(Some(&project), overrides);
        Ok(FormatSession::new(parser, oracle, options))
    }

    /// Replace the parasite rule of the ranking adapter.
    pub fn with_parasites(mut self, parasites: ParasiteRule) -> Self {
        self.adapter = self.adapter.with_parasites(parasites);
        self
    }

    /// The session's dialect.
    pub fn parser(&self) -> ParserKind {
        self.parser
    }

    /// The resolved options.
    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// The ranking adapter.
    pub fn adapter(&self) -> &RankingAdapter<O> {
        &self.adapter
    }

    /// The name matcher, built on first use.
    pub fn matcher(&self) -> &Matcher {
        self.matcher.get_or_init(|| {
            Matcher::for_parser(
                self.parser,
                &self.options.attributes.value,
                &self.options.functions.value,
            )
        })
    }

    /// The policy for a sort site.
    pub fn policy(&self, site: SiteOptions) -> SortPolicy {
        self.options.policy_for(site)
    }

    /// Sort a token-list string at a site.
    pub fn sort_class_string(&self, s: &str, site: SiteOptions) -> String {
        sort_token_list_string(s, &self.policy(site), &self.adapter)
    }

    /// Reorder an already-split token sequence at a site.
    pub fn reorder<'t>(&self, tokens: &[&'t str], site: SiteOptions) -> Reordered<'t> {
        reorder_tokens(tokens, &self.policy(site), &self.adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classort_core::rank::StaticOracle;

    fn oracle() -> StaticOracle {
        StaticOracle::from_order(["flex", "p-4", "text-sm"])
    }

    #[test]
    fn session_sorts_with_defaults() {
        let session = FormatSession::new(ParserKind::Html, oracle(), ResolvedOptions::default());
        assert_eq!(
            session.sort_class_string(" text-sm  flex ", SiteOptions::default()),
            "flex text-sm"
        );
    }

    #[test]
    fn session_honors_project_options() {
        let session = FormatSession::from_json_options(
            ParserKind::Html,
            oracle(),
            r#"{"tailwindPreserveWhitespace": true, "tailwindPreserveDuplicates": true}"#,
            &OptionOverrides::default(),
        )
        .unwrap();
        assert_eq!(
            session.sort_class_string(" p-4  flex p-4", SiteOptions::default()),
            " flex  p-4 p-4"
        );
    }

    #[test]
    fn session_matcher_uses_configured_names() {
        let session = FormatSession::from_json_options(
            ParserKind::Vue,
            oracle(),
            r#"{"tailwindAttributes": ["tw"], "tailwindFunctions": ["/^cx$/"]}"#,
            &OptionOverrides::default(),
        )
        .unwrap();
        let matcher = session.matcher();
        assert!(matcher.has_static_attr("tw"));
        assert!(matcher.has_dynamic_attr(":tw"));
        assert!(matcher.has_function("cx"));
        assert!(std::ptr::eq(matcher, session.matcher()));
    }

    #[test]
    fn overrides_replace_project_lists() {
        let overrides = OptionOverrides {
            functions: Some(vec!["tw".to_string()]),
            ..Default::default()
        };
        let session = FormatSession::from_json_options(
            ParserKind::Jsx,
            oracle(),
            r#"{"tailwindFunctions": ["clsx"]}"#,
            &overrides,
        )
        .unwrap();
        assert!(session.matcher().has_function("tw"));
        assert!(!session.matcher().has_function("clsx"));
    }

    #[test]
    fn bad_options_fail_session_creation() {
        let result = FormatSession::from_json_options(
            ParserKind::Html,
            oracle(),
            "not json",
            &OptionOverrides::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn session_reorders_token_slices() {
        let session = FormatSession::new(ParserKind::Html, oracle(), ResolvedOptions::default());
        let out = session.reorder(&["text-sm", "flex", "flex"], SiteOptions::default());
        assert_eq!(out.tokens, vec!["flex", "text-sm"]);
    }
}
