//! Courier listing types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The `data` payload of `GET /couriers`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct CourierList {
    #[serde(default)]
    pub couriers: Vec<Courier>,
}

impl CourierList {
    /// The set of courier slugs, trimmed and lowercased.
    ///
    /// Couriers without a slug are skipped.
    pub fn slugs(&self) -> BTreeSet<String> {
        self.couriers
            .iter()
            .filter_map(|courier| courier.slug.as_deref())
            .map(|slug| slug.trim().to_lowercase())
            .filter(|slug| !slug.is_empty())
            .collect()
    }
}

/// A single courier as listed by AfterShip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Courier {
    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}
