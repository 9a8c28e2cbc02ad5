//! Attribute and function name matching.
//!
//! A [`Matcher`] decides whether a tree location is in scope for sorting. It is
//! built once per format invocation from the dialect's default names plus the
//! user's attribute and function lists, where each entry is either a literal
//! name or a `/pattern/flags` regular expression literal.
//!
//! ## Lookups
//!
//! Each lookup tests exact-set membership first, then evaluates compiled
//! patterns in registration order and stops at the first match.
//!
//! ## Dynamic Attributes
//!
//! Some dialects bind attribute values to expressions with a naming
//! convention (`:class` in Vue, `[class]` in Angular). Every static name
//! registered for such a dialect derives its dynamic counterparts, and a
//! dynamic lookup that finds no direct rule strips the binding syntax and
//! re-checks the static rules.
//!
//! ## Malformed Patterns
//!
//! A pattern that fails to compile is logged and kept as a never-matching
//! rule; the remaining rules are unaffected.

use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::error::PatternError;

// ============================================================================
// Name Rules
// ============================================================================

/// A configured name: either literal or a regular expression literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRule {
    /// Matches exactly this name.
    Literal(String),
    /// A `/source/flags` regular expression literal.
    Pattern { source: String, flags: String },
}

impl NameRule {
    /// Parse a configured entry.
    ///
    /// An entry is a pattern when it starts with `/` and has a later closing
    /// `/`; everything after the closing slash is the flag string.
    pub fn parse(entry: &str) -> Self {
        if let Some(body) = entry.strip_prefix('/') {
            if let Some(close) = body.rfind('/') {
                return NameRule::Pattern {
                    source: body[..close].to_string(),
                    flags: body[close + 1..].to_string(),
                };
            }
        }
        NameRule::Literal(entry.to_string())
    }
}

/// A compiled pattern rule.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    flags: String,
    regex: Option<Regex>,
}

impl CompiledPattern {
    /// Compile a pattern. Malformed patterns compile to a never-matching rule.
    pub fn new(source: &str, flags: &str) -> Self {
        let regex = match compile_pattern(source, flags) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(error = %err, "ignoring malformed name pattern");
                None
            }
        };
        CompiledPattern {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
        }
    }

    /// Test a name against this pattern.
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(name))
    }

    /// Returns true if the pattern failed to compile.
    pub fn is_malformed(&self) -> bool {
        self.regex.is_none()
    }

    /// Returns true if the pattern ignores case.
    pub fn is_case_insensitive(&self) -> bool {
        self.flags.contains('i')
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Compile `/source/flags` into a [`Regex`].
///
/// Supported flags: `i` (ignore case), `m` (multi-line), `s` (dot matches
/// newline). `u`, `g` and `y` are accepted and have no effect on a test.
pub fn compile_pattern(source: &str, flags: &str) -> Result<Regex, PatternError> {
    let mut builder = RegexBuilder::new(source);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'u' | 'g' | 'y' => {}
            other => {
                return Err(PatternError::UnsupportedFlag {
                    pattern: format!("/{source}/{flags}"),
                    flag: other,
                })
            }
        }
    }
    builder.build().map_err(|e| PatternError::InvalidRegex {
        pattern: format!("/{source}/{flags}"),
        message: e.to_string(),
    })
}

// ============================================================================
// Rule Sets
// ============================================================================

/// Exact names plus ordered patterns.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    exact: HashSet<String>,
    patterns: Vec<CompiledPattern>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Add a literal name.
    pub fn add_exact(&mut self, name: impl Into<String>) {
        self.exact.insert(name.into());
    }

    /// Add a pattern, compiled now.
    pub fn add_pattern(&mut self, source: &str, flags: &str) {
        self.patterns.push(CompiledPattern::new(source, flags));
    }

    /// Check membership: exact names first, then patterns in order.
    pub fn matches(&self, name: &str) -> bool {
        self.exact.contains(name) || self.patterns.iter().any(|p| p.is_match(name))
    }

    /// Check exact membership only.
    pub fn contains_exact(&self, name: &str) -> bool {
        self.exact.contains(name)
    }

    /// Registered exact names.
    pub fn exact_names(&self) -> impl Iterator<Item = &str> {
        self.exact.iter().map(String::as_str)
    }

    /// Registered patterns in order.
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }
}

// ============================================================================
// Parser Kinds
// ============================================================================

/// Host dialect, which determines default names and binding syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    /// Plain HTML.
    Html,
    /// Vue single-file components (`:attr`, `v-bind:attr`).
    Vue,
    /// Angular templates (`[attr]`).
    Angular,
    /// Svelte components.
    Svelte,
    /// Astro components.
    Astro,
    /// JavaScript/TypeScript with JSX.
    Jsx,
}

impl ParserKind {
    /// Parse a host parser name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" | "lwc" => Some(ParserKind::Html),
            "vue" => Some(ParserKind::Vue),
            "angular" => Some(ParserKind::Angular),
            "svelte" => Some(ParserKind::Svelte),
            "astro" => Some(ParserKind::Astro),
            "babel" | "babel-flow" | "babel-ts" | "flow" | "typescript" | "acorn" | "meriyah"
            | "espree" | "oxc" | "oxc-ts" | "jsx" => Some(ParserKind::Jsx),
            _ => None,
        }
    }

    /// Default names this dialect always sorts.
    pub fn defaults(&self) -> Customizations {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match self {
            ParserKind::Html | ParserKind::Svelte => Customizations {
                static_attrs: names(&["class"]),
                ..Default::default()
            },
            ParserKind::Jsx => Customizations {
                static_attrs: names(&["class", "className"]),
                ..Default::default()
            },
            ParserKind::Vue => Customizations {
                static_attrs: names(&["class"]),
                dynamic_attrs: names(&[":class", "v-bind:class"]),
                ..Default::default()
            },
            ParserKind::Angular => Customizations {
                static_attrs: names(&["class"]),
                dynamic_attrs: names(&["[ngClass]"]),
                ..Default::default()
            },
            ParserKind::Astro => Customizations {
                static_attrs: names(&["class", "className"]),
                dynamic_attrs: names(&["class:list", "className"]),
                ..Default::default()
            },
        }
    }

    /// Dynamic names derived from a static attribute name.
    pub fn derive_dynamic(&self, name: &str) -> Vec<String> {
        match self {
            ParserKind::Vue => vec![format!(":{name}"), format!("v-bind:{name}")],
            ParserKind::Angular => vec![format!("[{name}]")],
            _ => Vec::new(),
        }
    }

    /// Strip this dialect's binding syntax, if `name` uses it.
    pub fn strip_binding<'n>(&self, name: &'n str) -> Option<&'n str> {
        match self {
            ParserKind::Vue => name
                .strip_prefix("v-bind:")
                .or_else(|| name.strip_prefix(':')),
            ParserKind::Angular => name.strip_prefix('[').and_then(|n| n.strip_suffix(']')),
            _ => None,
        }
    }

    /// Returns true if `name` is written in this dialect's dynamic form.
    fn looks_dynamic(&self, name: &str) -> bool {
        match self {
            ParserKind::Vue => name.starts_with(':') || name.starts_with("v-"),
            ParserKind::Angular => self.strip_binding(name).is_some(),
            _ => false,
        }
    }

    /// Classify a user-configured literal attribute.
    fn register(&self, attr: &str) -> Registration {
        if let Some(stripped) = self.strip_binding(attr) {
            return Registration::Static(stripped.to_string());
        }
        if *self == ParserKind::Vue && attr.starts_with("v-") {
            return Registration::Dynamic(attr.to_string());
        }
        Registration::Static(attr.to_string())
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserKind::Html => "html",
            ParserKind::Vue => "vue",
            ParserKind::Angular => "angular",
            ParserKind::Svelte => "svelte",
            ParserKind::Astro => "astro",
            ParserKind::Jsx => "jsx",
        };
        write!(f, "{name}")
    }
}

enum Registration {
    Static(String),
    Dynamic(String),
}

/// Built-in names for a dialect, before user configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customizations {
    /// Attributes whose literal values are sorted.
    pub static_attrs: Vec<String>,
    /// Attributes whose values are expressions.
    pub dynamic_attrs: Vec<String>,
    /// Functions whose string arguments are sorted.
    pub functions: Vec<String>,
}

// ============================================================================
// Matcher
// ============================================================================

/// Decides whether attribute and function names are in scope for sorting.
#[derive(Debug, Clone)]
pub struct Matcher {
    parser: ParserKind,
    static_attrs: RuleSet,
    dynamic_attrs: RuleSet,
    functions: RuleSet,
}

impl Matcher {
    /// Build a matcher for `parser` from its defaults and user entries.
    pub fn build(
        parser: ParserKind,
        defaults: &Customizations,
        attributes: &[String],
        functions: &[String],
    ) -> Self {
        let mut static_attrs = RuleSet::new();
        let mut dynamic_attrs = RuleSet::new();
        let mut fn_rules = RuleSet::new();

        for name in &defaults.static_attrs {
            static_attrs.add_exact(name.as_str());
        }
        for name in &defaults.dynamic_attrs {
            dynamic_attrs.add_exact(name.as_str());
        }
        for name in &defaults.functions {
            fn_rules.add_exact(name.as_str());
        }

        for entry in attributes {
            match NameRule::parse(entry) {
                NameRule::Pattern { source, flags } => static_attrs.add_pattern(&source, &flags),
                NameRule::Literal(name) => match parser.register(&name) {
                    Registration::Static(name) => static_attrs.add_exact(name),
                    Registration::Dynamic(name) => dynamic_attrs.add_exact(name),
                },
            }
        }

        let derived: Vec<String> = static_attrs
            .exact_names()
            .flat_map(|name| parser.derive_dynamic(name))
            .collect();
        for name in derived {
            dynamic_attrs.add_exact(name);
        }

        for entry in functions {
            match NameRule::parse(entry) {
                NameRule::Pattern { source, flags } => fn_rules.add_pattern(&source, &flags),
                NameRule::Literal(name) => fn_rules.add_exact(name),
            }
        }

        debug!(
            parser = %parser,
            static_attrs = static_attrs.exact.len(),
            dynamic_attrs = dynamic_attrs.exact.len(),
            functions = fn_rules.exact.len(),
            patterns = static_attrs.patterns.len() + fn_rules.patterns.len(),
            "built name matcher"
        );

        Matcher {
            parser,
            static_attrs,
            dynamic_attrs,
            functions: fn_rules,
        }
    }

    /// Build a matcher using the dialect's own defaults.
    pub fn for_parser(parser: ParserKind, attributes: &[String], functions: &[String]) -> Self {
        Matcher::build(parser, &parser.defaults(), attributes, functions)
    }

    /// The dialect this matcher was built for.
    pub fn parser(&self) -> ParserKind {
        self.parser
    }

    /// Is `name` an attribute whose literal value is sorted?
    pub fn has_static_attr(&self, name: &str) -> bool {
        if self.parser.looks_dynamic(name) {
            return false;
        }
        self.static_attrs.matches(name)
    }

    /// Is `name` an attribute whose expression value is sorted?
    pub fn has_dynamic_attr(&self, name: &str) -> bool {
        if self.dynamic_attrs.matches(name) {
            return true;
        }
        match self.parser.strip_binding(name) {
            Some(stripped) => self.static_attrs.matches(stripped),
            None => false,
        }
    }

    /// Is `name` a function whose string arguments are sorted?
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.matches(name)
    }

    /// The static attribute rules.
    pub fn static_rules(&self) -> &RuleSet {
        &self.static_attrs
    }

    /// The dynamic attribute rules.
    pub fn dynamic_rules(&self) -> &RuleSet {
        &self.dynamic_attrs
    }

    /// The function rules.
    pub fn function_rules(&self) -> &RuleSet {
        &self.functions
    }
}
