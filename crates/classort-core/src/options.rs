//! Sort options and their resolution into per-site policies.
//!
//! Options arrive as the host's configuration blob (camelCase keys) and are
//! layered with a fixed precedence:
//!
//! 1. Site overrides (highest)
//! 2. Project configuration
//! 3. Built-in defaults
//!
//! The resolved options then produce one [`SortPolicy`] per sort site.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sort::{SortPolicy, WhitespaceCollapse};

// ============================================================================
// Options
// ============================================================================

/// User-facing sort options, as written in project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortOptions {
    /// Extra attribute names (or `/pattern/flags`) whose values are sorted.
    pub tailwind_attributes: Vec<String>,
    /// Function names (or `/pattern/flags`) whose string arguments are sorted.
    pub tailwind_functions: Vec<String>,
    /// Keep whitespace verbatim.
    pub tailwind_preserve_whitespace: bool,
    /// Keep duplicate tokens.
    pub tailwind_preserve_duplicates: bool,
}

impl SortOptions {
    /// Parse options from a JSON configuration blob. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From project configuration.
    ProjectConfig = 1,
    /// From a per-call override.
    SiteOverride = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// Per-call overrides of the project options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    /// Replaces the attribute list.
    pub attributes: Option<Vec<String>>,
    /// Replaces the function list.
    pub functions: Option<Vec<String>>,
    /// Replaces `tailwindPreserveWhitespace`.
    pub preserve_whitespace: Option<bool>,
    /// Replaces `tailwindPreserveDuplicates`.
    pub preserve_duplicates: Option<bool>,
}

/// Options with precedence information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Attribute names and patterns.
    pub attributes: ConfigValue<Vec<String>>,
    /// Function names and patterns.
    pub functions: ConfigValue<Vec<String>>,
    /// Whitespace preservation.
    pub preserve_whitespace: ConfigValue<bool>,
    /// Duplicate preservation.
    pub preserve_duplicates: ConfigValue<bool>,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        ResolvedOptions {
            attributes: ConfigValue::new(Vec::new(), ConfigSource::Default),
            functions: ConfigValue::new(Vec::new(), ConfigSource::Default),
            preserve_whitespace: ConfigValue::new(false, ConfigSource::Default),
            preserve_duplicates: ConfigValue::new(false, ConfigSource::Default),
        }
    }
}

impl ResolvedOptions {
    /// Resolve options from all sources.
    pub fn resolve(project: Option<&SortOptions>, overrides: &OptionOverrides) -> Self {
        let mut resolved = ResolvedOptions::default();

        if let Some(project) = project {
            resolved.apply(
                Some(project.tailwind_attributes.clone()),
                Some(project.tailwind_functions.clone()),
                Some(project.tailwind_preserve_whitespace),
                Some(project.tailwind_preserve_duplicates),
                ConfigSource::ProjectConfig,
            );
        }

        resolved.apply(
            overrides.attributes.clone(),
            overrides.functions.clone(),
            overrides.preserve_whitespace,
            overrides.preserve_duplicates,
            ConfigSource::SiteOverride,
        );

        resolved
    }

    fn apply(
        &mut self,
        attributes: Option<Vec<String>>,
        functions: Option<Vec<String>>,
        preserve_whitespace: Option<bool>,
        preserve_duplicates: Option<bool>,
        source: ConfigSource,
    ) {
        if let Some(value) = attributes {
            self.attributes = self.attributes.clone().merge(ConfigValue::new(value, source));
        }
        if let Some(value) = functions {
            self.functions = self.functions.clone().merge(ConfigValue::new(value, source));
        }
        if let Some(value) = preserve_whitespace {
            self.preserve_whitespace = self
                .preserve_whitespace
                .clone()
                .merge(ConfigValue::new(value, source));
        }
        if let Some(value) = preserve_duplicates {
            self.preserve_duplicates = self
                .preserve_duplicates
                .clone()
                .merge(ConfigValue::new(value, source));
        }
    }

    /// Build the policy for one sort site.
    ///
    /// Preserved whitespace disables collapsing and preserved duplicates
    /// disable dedup, whatever the site asked for.
    pub fn policy_for(&self, site: SiteOptions) -> SortPolicy {
        SortPolicy {
            remove_duplicates: site.remove_duplicates && !self.preserve_duplicates.value,
            ignore_first: site.ignore_first,
            ignore_last: site.ignore_last,
            collapse_whitespace: if self.preserve_whitespace.value {
                None
            } else {
                site.collapse_whitespace
            },
        }
    }
}

/// What a sort site asks for before the resolved options are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteOptions {
    /// Drop repeated ranked tokens.
    pub remove_duplicates: bool,
    /// Pin the first token.
    pub ignore_first: bool,
    /// Pin the last token.
    pub ignore_last: bool,
    /// Whitespace normalization at this site.
    pub collapse_whitespace: Option<WhitespaceCollapse>,
}

impl Default for SiteOptions {
    fn default() -> Self {
        let policy = SortPolicy::default();
        SiteOptions {
            remove_duplicates: policy.remove_duplicates,
            ignore_first: policy.ignore_first,
            ignore_last: policy.ignore_last,
            collapse_whitespace: policy.collapse_whitespace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_parse_camel_case_and_ignore_unknown_keys() {
        let options = SortOptions::from_json(
            r#"{
                "tailwindAttributes": ["myClass", "/^data-tw/"],
                "tailwindFunctions": ["clsx"],
                "tailwindPreserveWhitespace": true,
                "printWidth": 80
            }"#,
        )
        .unwrap();
        assert_eq!(options.tailwind_attributes, vec!["myClass", "/^data-tw/"]);
        assert_eq!(options.tailwind_functions, vec!["clsx"]);
        assert!(options.tailwind_preserve_whitespace);
        assert!(!options.tailwind_preserve_duplicates);
    }

    #[test]
    fn invalid_options_are_reported() {
        assert!(SortOptions::from_json(r#"{"tailwindFunctions": 3}"#).is_err());
    }

    #[test]
    fn config_value_merge_prefers_higher_source() {
        let default = ConfigValue::new(1, ConfigSource::Default);
        let project = ConfigValue::new(2, ConfigSource::ProjectConfig);
        assert_eq!(default.clone().merge(project.clone()).value, 2);
        assert_eq!(project.merge(default).value, 2);
    }

    #[test]
    fn resolve_layers_sources() {
        let project = SortOptions {
            tailwind_functions: vec!["clsx".to_string()],
            tailwind_preserve_duplicates: true,
            ..Default::default()
        };
        let overrides = OptionOverrides {
            preserve_duplicates: Some(false),
            ..Default::default()
        };
        let resolved = ResolvedOptions::resolve(Some(&project), &overrides);

        assert_eq!(resolved.functions.value, vec!["clsx"]);
        assert_eq!(resolved.functions.source, ConfigSource::ProjectConfig);
        assert!(!resolved.preserve_duplicates.value);
        assert_eq!(resolved.preserve_duplicates.source, ConfigSource::SiteOverride);
        assert_eq!(resolved.attributes.source, ConfigSource::Default);
    }

    #[test]
    fn policy_respects_preservation_flags() {
        let project = SortOptions {
            tailwind_preserve_whitespace: true,
            tailwind_preserve_duplicates: true,
            ..Default::default()
        };
        let resolved = ResolvedOptions::resolve(Some(&project), &OptionOverrides::default());
        let policy = resolved.policy_for(SiteOptions {
            ignore_first: true,
            ..Default::default()
        });
        assert!(!policy.remove_duplicates);
        assert!(policy.ignore_first);
        assert_eq!(policy.collapse_whitespace, None);
    }

    #[test]
    fn default_policy_matches_sort_default() {
        let resolved = ResolvedOptions::resolve(None, &OptionOverrides::default());
        assert_eq!(resolved.policy_for(SiteOptions::default()), SortPolicy::default());
    }
}
