//! nps.gov page fetching
//!
//! Fetches the home page, state listing pages and site detail pages through
//! the response cache, then hands the HTML to the extractors.

use reqwest::{Client, Url};
use thiserror::Error;

use super::extract::{extract_site, extract_site_urls, extract_state_index, ExtractError};
use super::{Site, StateIndex};
use crate::cache::{CacheError, CacheStore, CachedValue};

/// Base URL of the National Park Service website
pub const NPS_BASE_URL: &str = "https://www.nps.gov";

/// Path of the home page holding the state dropdown
const HOME_PAGE: &str = "index.htm";

/// Errors that can occur when fetching or parsing nps.gov pages
#[derive(Debug, Error)]
pub enum NpsError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The page did not have the expected structure
    #[error("Failed to extract page data: {0}")]
    Extract(#[from] ExtractError),

    /// The fetched page could not be written to the cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// The configured base URL is not a valid URL
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Client for the pages of the National Park Service website
#[derive(Debug, Clone)]
pub struct NpsClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL that relative links are resolved against
    base_url: Url,
}

impl NpsClient {
    /// Creates a client for https://www.nps.gov
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            base_url: Url::parse(NPS_BASE_URL).expect("NPS_BASE_URL is a valid URL"),
        }
    }

    /// Creates a client against a different site root (a mirror, or a mock server in tests)
    pub fn with_base_url(base_url: &str) -> Result<Self, NpsError> {
        let base_url = Url::parse(base_url).map_err(|e| NpsError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http_client: Client::new(),
            base_url,
        })
    }

    /// URL of the home page, also its cache key
    pub fn home_url(&self) -> Result<String, NpsError> {
        self.base_url
            .join(HOME_PAGE)
            .map(String::from)
            .map_err(|e| NpsError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns the body of `url`, from the cache when present
    ///
    /// On a miss the page is fetched, stored under its URL and the cache is
    /// persisted before returning. Error responses are not cached.
    pub async fn fetch_page(&self, url: &str, cache: &mut CacheStore) -> Result<String, NpsError> {
        if let Some(body) = cache.get(url).and_then(CachedValue::as_text) {
            tracing::info!(%url, "using cache");
            return Ok(body.to_string());
        }

        tracing::info!(%url, "fetching");
        let body = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        cache.insert(url, CachedValue::RawText(body.clone()))?;
        Ok(body)
    }

    /// Builds the state index from the home page
    pub async fn state_index(&self, cache: &mut CacheStore) -> Result<StateIndex, NpsError> {
        let url = self.home_url()?;
        let html = self.fetch_page(&url, cache).await?;
        Ok(extract_state_index(&html, &self.base_url)?)
    }

    /// Fetches and parses a single site detail page
    pub async fn site(&self, site_url: &str, cache: &mut CacheStore) -> Result<Site, NpsError> {
        let html = self.fetch_page(site_url, cache).await?;
        Ok(extract_site(&html)?)
    }

    /// Fetches a state's listing page and every site on it, in listing order
    pub async fn sites_for_state(
        &self,
        state_url: &str,
        cache: &mut CacheStore,
    ) -> Result<Vec<Site>, NpsError> {
        let html = self.fetch_page(state_url, cache).await?;
        let site_urls = extract_site_urls(&html, &self.base_url)?;
        tracing::debug!(%state_url, count = site_urls.len(), "found sites");

        let mut sites = Vec::with_capacity(site_urls.len());
        for site_url in &site_urls {
            sites.push(self.site(site_url, cache).await?);
        }
        Ok(sites)
    }
}

impl Default for NpsClient {
    fn default() -> Self {
        Self::new()
    }
}
