//! Ranking oracle interface and the adapter that wraps it.
//!
//! The oracle is an external collaborator: given a set of tokens it returns a
//! relative order for each one, or `None` when it does not recognize the
//! token. The [`RankingAdapter`] normalizes whatever the oracle returns into
//! exactly one rank per distinct requested token:
//!
//! - tokens missing from the response are unknown (`None`)
//! - tokens the oracle returns but were not requested are ignored
//! - an oracle error degrades every token to unknown
//! - parasite tokens the oracle cannot rank are anchored to a bucket floor
//!
//! Parasite tokens (by default `group` and `peer`) exist only to enable other
//! tokens' behavior. Anchoring them to the lowest rank of the `components`
//! bucket makes them sort next to the content they modify instead of floating
//! to the front with the unknown tokens.

use num_bigint::BigInt;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

use crate::error::{ClassortError, OracleError};

/// A totally ordered rank assigned to a token by the oracle.
///
/// Ranks are arbitrary-precision: oracles that encode variant combinations as
/// bit masks produce values well past 128 bits. Serialized as a plain JSON
/// number of any length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(pub BigInt);

impl Rank {
    /// Create a rank.
    pub fn new(value: impl Into<BigInt>) -> Self {
        Rank(value.into())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let number: Number = self
            .0
            .to_string()
            .parse()
            .map_err(<S::Error as ser::Error>::custom)?;
        number.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = Number::deserialize(deserializer)?;
        number
            .to_string()
            .parse::<BigInt>()
            .map(Rank)
            .map_err(|_| de::Error::custom(format!("rank must be an integer, got {number}")))
    }
}

/// The external service that orders tokens.
pub trait RankingOracle {
    /// Rank a set of distinct tokens.
    ///
    /// The response may be in any order and may omit tokens; callers must not
    /// rely on either.
    fn class_order(&self, tokens: &[&str]) -> Result<Vec<(String, Option<Rank>)>, OracleError>;

    /// The lowest rank of a named bucket, if the oracle knows the bucket.
    fn bucket_floor(&self, bucket: &str) -> Option<Rank>;
}

impl<T: RankingOracle + ?Sized> RankingOracle for &T {
    fn class_order(&self, tokens: &[&str]) -> Result<Vec<(String, Option<Rank>)>, OracleError> {
        (**self).class_order(tokens)
    }

    fn bucket_floor(&self, bucket: &str) -> Option<Rank> {
        (**self).bucket_floor(bucket)
    }
}

// ============================================================================
// Parasite Tokens
// ============================================================================

/// Default parasite tokens.
pub const DEFAULT_PARASITES: &[&str] = &["group", "peer"];

/// Bucket whose floor anchors parasite tokens by default.
pub const DEFAULT_PARASITE_BUCKET: &str = "components";

/// Tokens that borrow the floor rank of a bucket when the oracle cannot rank them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParasiteRule {
    tokens: HashSet<String>,
    bucket: String,
}

impl ParasiteRule {
    /// Create a rule anchoring `tokens` to the floor of `bucket`.
    pub fn new<I, S>(tokens: I, bucket: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParasiteRule {
            tokens: tokens.into_iter().map(Into::into).collect(),
            bucket: bucket.into(),
        }
    }

    /// The default rule (`group`, `peer` -> `components`) under a class prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        ParasiteRule::new(
            DEFAULT_PARASITES.iter().map(|t| format!("{prefix}{t}")),
            DEFAULT_PARASITE_BUCKET,
        )
    }

    /// A rule that matches nothing.
    pub fn none() -> Self {
        ParasiteRule::new(Vec::<String>::new(), DEFAULT_PARASITE_BUCKET)
    }

    /// Check if `token` is a parasite under this rule.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    /// The anchoring bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl Default for ParasiteRule {
    fn default() -> Self {
        ParasiteRule::with_prefix("")
    }
}

// ============================================================================
// Ranking Adapter
// ============================================================================

/// Wraps a [`RankingOracle`] and normalizes its answers.
pub struct RankingAdapter<O> {
    oracle: O,
    parasites: ParasiteRule,
}

impl<O: RankingOracle> RankingAdapter<O> {
    /// Wrap `oracle` with the default parasite rule.
    pub fn new(oracle: O) -> Self {
        RankingAdapter {
            oracle,
            parasites: ParasiteRule::default(),
        }
    }

    /// Replace the parasite rule.
    pub fn with_parasites(mut self, parasites: ParasiteRule) -> Self {
        self.parasites = parasites;
        self
    }

    /// The wrapped oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Rank every distinct token in `tokens`.
    ///
    /// The returned map has exactly one entry per distinct input token. The
    /// oracle is not consulted for an empty input.
    pub fn ranks<'t>(&self, tokens: &[&'t str]) -> HashMap<&'t str, Option<Rank>> {
        let mut seen = HashSet::with_capacity(tokens.len());
        let distinct: Vec<&'t str> = tokens.iter().copied().filter(|t| seen.insert(*t)).collect();
        if distinct.is_empty() {
            return HashMap::new();
        }

        let mut answered: HashMap<String, Option<Rank>> = HashMap::with_capacity(distinct.len());
        match self.oracle.class_order(&distinct) {
            Ok(pairs) => {
                for (token, rank) in pairs {
                    answered.entry(token).or_insert(rank);
                }
            }
            Err(err) => {
                warn!(error = %err, tokens = distinct.len(), "ranking oracle failed; treating tokens as unknown");
            }
        }

        let mut anchor: Option<Option<Rank>> = None;
        distinct
            .into_iter()
            .map(|token| {
                let mut rank = answered.get(token).cloned().flatten();
                if rank.is_none() && self.parasites.contains(token) {
                    rank = anchor
                        .get_or_insert_with(|| self.oracle.bucket_floor(self.parasites.bucket()))
                        .clone();
                }
                (token, rank)
            })
            .collect()
    }
}

// ============================================================================
// Static Oracle
// ============================================================================

/// A table-driven oracle: a fixed rank per token plus bucket floors.
///
/// Useful for hosts that precompute an ordering, and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticOracle {
    /// Rank per known token.
    #[serde(default)]
    pub ranks: HashMap<String, Rank>,
    /// Lowest rank per named bucket.
    #[serde(default)]
    pub buckets: HashMap<String, Rank>,
}

impl StaticOracle {
    /// Create an empty oracle (every token unknown).
    pub fn new() -> Self {
        StaticOracle::default()
    }

    /// Rank tokens by their position in `order`, starting at zero.
    pub fn from_order<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ranks = order
            .into_iter()
            .enumerate()
            .map(|(i, token)| (token.into(), Rank::new(i)))
            .collect();
        StaticOracle {
            ranks,
            buckets: HashMap::new(),
        }
    }

    /// Parse an oracle table from JSON: `{"ranks": {...}, "buckets": {...}}`.
    pub fn from_json(json: &str) -> Result<Self, ClassortError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the rank of a token.
    pub fn with_rank(mut self, token: impl Into<String>, rank: impl Into<BigInt>) -> Self {
        self.ranks.insert(token.into(), Rank::new(rank));
        self
    }

    /// Set the floor of a bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>, floor: impl Into<BigInt>) -> Self {
        self.buckets.insert(bucket.into(), Rank::new(floor));
        self
    }
}

impl RankingOracle for StaticOracle {
    fn class_order(&self, tokens: &[&str]) -> Result<Vec<(String, Option<Rank>)>, OracleError> {
        Ok(tokens
            .iter()
            .map(|t| (t.to_string(), self.ranks.get(*t).cloned()))
            .collect())
    }

    fn bucket_floor(&self, bucket: &str) -> Option<Rank> {
        self.buckets.get(bucket).cloned()
    }
}
