//! Core data models for parkfinder
//!
//! This module contains the site and state-index types, the HTML extraction
//! functions, and the clients for nps.gov and the places API.

pub mod extract;
pub mod nps;
pub mod places;

pub use extract::{extract_site, extract_site_urls, extract_state_index, ExtractError};
pub use nps::{NpsClient, NpsError};
pub use places::{NearbyPlace, PlacesClient, PlacesError};

use std::collections::BTreeMap;

/// Placeholder used when a detail page has no designation
pub const NO_CATEGORY: &str = "no category";
/// Placeholder used when a detail page has no title
pub const NO_NAME: &str = "no name";
/// Placeholder used when neither locality nor region is present
pub const NO_ADDRESS: &str = "no address";
/// Placeholder for a missing locality when the region is present
pub const NO_LOCALITY: &str = "no locality";
/// Placeholder for a missing region when the locality is present
pub const NO_REGION: &str = "no region";

/// A national site parsed from its detail page
///
/// Every field falls back to a placeholder string when the page omits it,
/// except `postal_code` and `phone` which are required by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// Designation such as "National Park" or "National Lakeshore"
    pub category: String,
    /// Name of the site (e.g. "Isle Royale")
    pub name: String,
    /// "Locality, Region" (e.g. "Houghton, MI")
    pub address: String,
    /// Postal code, also the cache key for places lookups
    pub postal_code: String,
    /// Contact phone number
    pub phone: String,
}

impl Site {
    /// One-line summary used in listings: `name (category): address postal_code`
    pub fn info(&self) -> String {
        format!(
            "{} ({}): {} {}",
            self.name, self.category, self.address, self.postal_code
        )
    }
}

/// Mapping from lowercase state name to the absolute URL of its listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateIndex {
    states: BTreeMap<String, String>,
}

impl StateIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state, lower-casing its name
    pub fn insert(&mut self, name: &str, url: impl Into<String>) {
        self.states.insert(name.trim().to_lowercase(), url.into());
    }

    /// Finds the listing URL for a state name, ignoring case and surrounding whitespace
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.states
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Number of states in the index
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterates over `(state name, url)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.states.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
