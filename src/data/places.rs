//! MapQuest radius search client
//!
//! Looks up points of interest near a postal code. Responses are cached under
//! the postal code and persisted as soon as they arrive.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::cache::{CacheError, CacheStore, CachedValue};

/// Endpoint of the MapQuest radius search API
pub const MAPQUEST_RADIUS_URL: &str = "http://www.mapquestapi.com/search/v2/radius";

/// Search radius around the origin, in miles
const SEARCH_RADIUS: u32 = 10;

/// Maximum number of places returned per lookup
const MAX_MATCHES: u32 = 10;

/// Errors that can occur when looking up nearby places
#[derive(Debug, Error)]
pub enum PlacesError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response could not be decoded into places
    #[error("Failed to parse places response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response could not be written to the cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// A lookup needed the network but no API key is configured
    #[error("No MapQuest API key configured (set MAPQUEST_API_KEY or pass --api-key)")]
    MissingApiKey,
}

/// Response from the radius search API
#[derive(Debug, Deserialize)]
struct RadiusResponse {
    #[serde(rename = "searchResults", default)]
    search_results: Vec<NearbyPlace>,
    #[serde(default)]
    info: Option<ResponseInfo>,
}

/// Status block the API attaches to every response
#[derive(Debug, Deserialize)]
struct ResponseInfo {
    #[serde(default)]
    messages: Vec<String>,
}

/// A single place from the search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NearbyPlace {
    /// Name of the place
    #[serde(default)]
    pub name: Option<String>,
    /// Address and classification details
    #[serde(default)]
    pub fields: Option<PlaceFields>,
}

/// Detail fields of a place
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlaceFields {
    /// Street address
    #[serde(default)]
    pub address: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Business category name
    #[serde(default)]
    pub group_sic_code_name: Option<String>,
}

/// Returns the value unless it is absent or blank
fn present(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl NearbyPlace {
    fn field(&self, pick: impl Fn(&PlaceFields) -> Option<&String>) -> Option<&str> {
        present(self.fields.as_ref().and_then(pick))
    }

    /// Display line: `- name (category): address, city`
    pub fn summary(&self) -> String {
        format!(
            "- {} ({}): {}, {}",
            present(self.name.as_ref()).unwrap_or("no name"),
            self.field(|f| f.group_sic_code_name.as_ref())
                .unwrap_or("no category"),
            self.field(|f| f.address.as_ref()).unwrap_or("no address"),
            self.field(|f| f.city.as_ref()).unwrap_or("no city"),
        )
    }
}

/// Client for the MapQuest radius search API
#[derive(Debug, Clone)]
pub struct PlacesClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Endpoint (allows override for testing)
    base_url: String,
    /// MapQuest consumer key
    api_key: Option<String>,
}

impl PlacesClient {
    /// Creates a client for the public MapQuest endpoint
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(MAPQUEST_RADIUS_URL, api_key)
    }

    /// Creates a client against a custom endpoint
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Returns the raw search response for a postal code
    ///
    /// A cached JSON response is returned without touching the network. On a
    /// miss the API is queried, and the decoded body is cached under the postal
    /// code and persisted.
    pub async fn nearby(
        &self,
        postal_code: &str,
        cache: &mut CacheStore,
    ) -> Result<serde_json::Value, PlacesError> {
        if let Some(value) = cache.get(postal_code).and_then(CachedValue::as_json) {
            tracing::info!(%postal_code, "using cache");
            return Ok(value.clone());
        }

        let api_key = self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)?;

        tracing::info!(%postal_code, "fetching");
        let radius = SEARCH_RADIUS.to_string();
        let max_matches = MAX_MATCHES.to_string();
        let value: serde_json::Value = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("key", api_key),
                ("origin", postal_code),
                ("radius", radius.as_str()),
                ("maxMatches", max_matches.as_str()),
                ("ambiguities", "ignore"),
                ("outFormat", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        cache.insert(postal_code, CachedValue::Json(value.clone()))?;
        Ok(value)
    }

    /// Looks up the places near a postal code
    pub async fn nearby_places(
        &self,
        postal_code: &str,
        cache: &mut CacheStore,
    ) -> Result<Vec<NearbyPlace>, PlacesError> {
        let value = self.nearby(postal_code, cache).await?;
        parse_places(value)
    }
}

/// Decodes the `searchResults` of a radius search response
pub fn parse_places(value: serde_json::Value) -> Result<Vec<NearbyPlace>, PlacesError> {
    let response: RadiusResponse = serde_json::from_value(value)?;

    if let Some(info) = &response.info {
        for message in &info.messages {
            tracing::warn!(%message, "places API message");
        }
    }

    Ok(response.search_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_cache() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheStore::open(temp_dir.path().join("cache.json"));
        (cache, temp_dir)
    }

    fn radius_response_json() -> serde_json::Value {
        json!({
            "info": { "statuscode": 0, "messages": [] },
            "searchResults": [
                {
                    "name": "Keweenaw Brewing Co",
                    "fields": {
                        "address": "408 Shelden Ave",
                        "city": "Houghton",
                        "group_sic_code_name": "Eating & Drinking Places"
                    }
                },
                {
                    "name": "Houghton County Airport",
                    "fields": { "address": "", "city": "Hancock" }
                }
            ]
        })
    }

    #[test]
    fn test_summary_with_all_fields() {
        let places = parse_places(radius_response_json()).unwrap();
        assert_eq!(
            places[0].summary(),
            "- Keweenaw Brewing Co (Eating & Drinking Places): 408 Shelden Ave, Houghton"
        );
    }

    #[test]
    fn test_summary_blank_and_missing_fields_use_placeholders() {
        let places = parse_places(radius_response_json()).unwrap();
        assert_eq!(
            places[1].summary(),
            "- Houghton County Airport (no category): no address, Hancock"
        );
    }

    #[test]
    fn test_summary_without_fields_block() {
        let place = NearbyPlace {
            name: None,
            fields: None,
        };
        assert_eq!(
            place.summary(),
            "- no name (no category): no address, no city"
        );
    }

    #[test]
    fn test_parse_places_without_search_results_is_empty() {
        let value = json!({ "info": { "statuscode": 400, "messages": ["Illegal argument"] } });
        let places = parse_places(value).unwrap();
        assert!(places.is_empty());
    }

    #[test]
    fn test_parse_places_rejects_wrong_shape() {
        let result = parse_places(json!({ "searchResults": "nope" }));
        assert!(matches!(result, Err(PlacesError::Parse(_))));
    }

    #[tokio::test]
    async fn test_nearby_sends_all_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/v2/radius"))
            .and(query_param("key", "test-key"))
            .and(query_param("origin", "49931"))
            .and(query_param("radius", "10"))
            .and(query_param("maxMatches", "10"))
            .and(query_param("ambiguities", "ignore"))
            .and(query_param("outFormat", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(radius_response_json()))
            .expect(1)
            .mount(&server)
            .await;
        let (mut cache, _temp_dir) = create_test_cache();
        let client = PlacesClient::with_base_url(
            format!("{}/search/v2/radius", server.uri()),
            Some("test-key".to_string()),
        );

        let value = client.nearby("49931", &mut cache).await.unwrap();

        assert_eq!(value, radius_response_json());
    }

    #[tokio::test]
    async fn test_nearby_persists_under_postal_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(radius_response_json()))
            .expect(1)
            .mount(&server)
            .await;
        let (mut cache, _temp_dir) = create_test_cache();
        let client = PlacesClient::with_base_url(server.uri(), Some("k".to_string()));

        client.nearby("49931", &mut cache).await.unwrap();

        let on_disk = CacheStore::load(cache.path());
        assert_eq!(
            on_disk.get("49931").and_then(CachedValue::as_json),
            Some(&radius_response_json())
        );
    }

    #[tokio::test]
    async fn test_nearby_hit_skips_network_and_needs_no_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;
        let (mut cache, _temp_dir) = create_test_cache();
        cache
            .insert("49931", CachedValue::Json(radius_response_json()))
            .unwrap();
        let client = PlacesClient::with_base_url(server.uri(), None);

        let places = client.nearby_places("49931", &mut cache).await.unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name.as_deref(), Some("Keweenaw Brewing Co"));
    }

    #[tokio::test]
    async fn test_nearby_miss_without_key_is_error() {
        let (mut cache, _temp_dir) = create_test_cache();
        let client = PlacesClient::with_base_url("http://127.0.0.1:9", None);

        let result = client.nearby("49931", &mut cache).await;

        assert!(matches!(result, Err(PlacesError::MissingApiKey)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_text_entry_under_postal_code_is_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(radius_response_json()))
            .expect(1)
            .mount(&server)
            .await;
        let (mut cache, _temp_dir) = create_test_cache();
        cache
            .insert("49931", CachedValue::RawText("stale".to_string()))
            .unwrap();
        let client = PlacesClient::with_base_url(server.uri(), Some("k".to_string()));

        let places = client.nearby_places("49931", &mut cache).await.unwrap();

        assert_eq!(places.len(), 2);
        assert!(cache.get("49931").and_then(CachedValue::as_json).is_some());
    }
}
