//! Courier code normalization.
//!
//! Users rarely type the exact slug AfterShip expects: they write `iMile`,
//! `i mile`, `imilie` or `Australia Post`. [`Normalizer`] maps that input to
//! a slug from the live courier listing, or explains what the user might
//! have meant.
//!
//! Resolution order:
//! 1. Aliases, looked up by the trimmed lowercase input and then by its
//!    [`canonicalize`]d form.
//! 2. The canonical form, then the lowercase input, as a listed slug.
//! 3. Otherwise, fuzzy suggestions from the listing.

use std::collections::{BTreeMap, BTreeSet};

use lazy_regex::regex;
use tracing::{debug, instrument};

pub mod similarity;

/// Common ways of writing courier slugs, mapped to the slug itself.
pub const ALIASES: &[(&str, &str)] = &[
    ("cainiao", "cainiao"),
    ("cainiao-global", "cainiao"),
    ("cainiaoglobal", "cainiao"),
    ("imile", "imile"),
    ("imili", "imile"),
    ("imilie", "imile"),
    ("i-mile", "imile"),
    ("i mile", "imile"),
    ("australia-post", "australia-post"),
    ("australian-post", "australia-post"),
    ("auspost", "australia-post"),
    ("australia post", "australia-post"),
    ("australian post", "australia-post"),
];

/// Couriers accepted even when the live listing omits them.
///
/// AfterShip's courier listing is scoped to the account and has been seen
/// to leave out couriers that are nonetheless accepted by `POST /trackings`.
pub const TRUSTED: &[&str] = &["cainiao", "imile", "australia-post"];

/// Minimum similarity for a listed slug to be suggested.
pub const SIMILARITY_CUTOFF: f64 = 0.55;

/// Maximum number of fuzzy suggestions, before trusted couriers are added.
pub const MAX_SUGGESTIONS: usize = 5;

/// Result of normalizing courier input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalized {
    /// The input maps to this slug.
    Resolved(String),

    /// The input maps to nothing; these slugs are close.
    ///
    /// Suggestions are sorted and unique. An empty list means nothing was
    /// close enough to suggest.
    Unresolved { suggestions: Vec<String> },
}

impl Normalized {
    /// The resolved slug, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Resolved(code) => Some(code),
            Self::Unresolved { .. } => None,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::Resolved(_) => &[],
            Self::Unresolved { suggestions } => suggestions,
        }
    }
}

/// Maps free-form courier input to AfterShip courier slugs.
///
/// The tables are fixed at construction; build one at startup and share it.
#[derive(Clone, Debug)]
pub struct Normalizer {
    aliases: BTreeMap<&'static str, &'static str>,
    trusted: BTreeSet<&'static str>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ALIASES.iter().copied(), TRUSTED.iter().copied())
    }
}

impl Normalizer {
    /// Create a normalizer with custom tables.
    pub fn new(
        aliases: impl IntoIterator<Item = (&'static str, &'static str)>,
        trusted: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            aliases: aliases.into_iter().collect(),
            trusted: trusted.into_iter().collect(),
        }
    }

    /// Whether the slug is accepted without appearing in the listing.
    pub fn is_trusted(&self, slug: &str) -> bool {
        self.trusted.contains(slug)
    }

    /// Normalize `raw` against the set of listed courier slugs.
    #[instrument(skip(self, valid), fields(valid = valid.len()))]
    pub fn normalize(&self, raw: &str, valid: &BTreeSet<String>) -> Normalized {
        let clean = raw.trim().to_lowercase();
        if clean.is_empty() {
            return Normalized::Unresolved {
                suggestions: Vec::new(),
            };
        }

        let canonical = canonicalize(&clean);
        for key in [clean.as_str(), canonical.as_str()] {
            if let Some(slug) = self.resolve_alias(key, valid) {
                debug!(key, slug, "resolved alias");
                return Normalized::Resolved(slug.to_string());
            }
        }

        for candidate in [&canonical, &clean] {
            if valid.contains(candidate) {
                return Normalized::Resolved(candidate.clone());
            }
        }

        let suggestions = self.suggest(&canonical, valid);
        debug!(?suggestions, "no courier matched");
        Normalized::Unresolved { suggestions }
    }

    /// The alias target for `key`, if the target is listed or trusted.
    fn resolve_alias(&self, key: &str, valid: &BTreeSet<String>) -> Option<&'static str> {
        self.aliases
            .get(key)
            .copied()
            .filter(|slug| valid.contains(*slug) || self.is_trusted(slug))
    }

    /// Fuzzy matches from the listing, plus any listed trusted courier that
    /// shares the input's first three characters.
    ///
    /// Listed trusted couriers are also added whenever the canonical input is
    /// itself an alias key.
    fn suggest(&self, canonical: &str, valid: &BTreeSet<String>) -> Vec<String> {
        let mut suggestions = similarity::close_matches(
            canonical,
            valid.iter().map(String::as_str),
            MAX_SUGGESTIONS,
            SIMILARITY_CUTOFF,
        )
        .into_iter()
        .map(String::from)
        .collect::<BTreeSet<_>>();

        let prefix = canonical.get(..3).unwrap_or(canonical);
        let is_alias = self.aliases.contains_key(canonical);
        for &slug in &self.trusted {
            if valid.contains(slug) && (slug.starts_with(prefix) || is_alias) {
                suggestions.insert(slug.to_string());
            }
        }

        suggestions.into_iter().collect()
    }
}

/// Lowercase the input and collapse every run of characters outside
/// `[a-z0-9]` into a single hyphen, trimming hyphens from both ends.
pub fn canonicalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    regex!(r"[^a-z0-9]+")
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
