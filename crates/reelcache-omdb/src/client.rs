//! HTTP client for OMDb.

use crate::config::OmdbConfig;
use crate::error::{OmdbError, OmdbResult, DEFAULT_API_ERROR, DEFAULT_NOT_FOUND};
use crate::models::{MovieDetails, RawMovie, RawSearch, SearchQuery, SearchResults};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout, covering the whole round trip.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// Enable gzip decompression.
    pub gzip: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("reelcache/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 10,
            gzip: true,
        }
    }
}

/// Build a configured HTTP client.
pub fn build_client(config: &HttpConfig) -> OmdbResult<Client> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .gzip(config.gzip)
        .build()
        .map_err(OmdbError::ClientBuild)
}

/// OMDb API client.
///
/// Cheap to share behind an `Arc`; the underlying connection pool is reused
/// across requests.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    /// Create a client. A missing API key is logged, not rejected.
    pub fn new(config: OmdbConfig) -> OmdbResult<Self> {
        if config.api_key.is_none() {
            warn!("OMDB_API_KEY is not set; OMDb will reject requests");
        }

        Ok(Self {
            http: build_client(&config.http)?,
            api_url: config.api_url,
            api_key: config.api_key,
        })
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Search titles.
    pub async fn search(&self, query: &SearchQuery) -> OmdbResult<SearchResults> {
        let raw: RawSearch = self.request(query.params()).await?;
        Ok(SearchResults::from_raw(raw, &query.page))
    }

    /// Look a movie up by IMDb id. `plot` is `short` or `full`.
    pub async fn movie_by_id(&self, imdb_id: &str, plot: &str) -> OmdbResult<MovieDetails> {
        let raw: RawMovie = self
            .request(vec![("i", imdb_id.to_string()), ("plot", plot.to_string())])
            .await?;
        Ok(raw.into())
    }

    /// Look a movie up by exact title.
    pub async fn movie_by_title(
        &self,
        title: &str,
        year: Option<&str>,
        plot: &str,
    ) -> OmdbResult<MovieDetails> {
        let mut params = vec![("t", title.to_string()), ("plot", plot.to_string())];
        if let Some(year) = year {
            params.push(("y", year.to_string()));
        }

        let raw: RawMovie = self.request(params).await?;
        Ok(raw.into())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        params: Vec<(&'static str, String)>,
    ) -> OmdbResult<T> {
        let mut query = Vec::with_capacity(params.len() + 1);
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }
        query.extend(params);

        debug!(url = %self.api_url, "Requesting OMDb");

        let response = self
            .http
            .get(&self.api_url)
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        let json: Option<Value> = serde_json::from_slice(&body).ok();

        debug!(status = status.as_u16(), "OMDb responded");

        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(error_message)
                .unwrap_or(DEFAULT_API_ERROR)
                .to_string();
            return Err(OmdbError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json = json.ok_or_else(|| OmdbError::InvalidResponse("body is not JSON".into()))?;

        // OMDb reports lookup failures in-band with a 200.
        if json.get("Response").and_then(Value::as_str) == Some("False") {
            let message = error_message(&json).unwrap_or(DEFAULT_NOT_FOUND).to_string();
            return Err(OmdbError::NotFound(message));
        }

        serde_json::from_value(json).map_err(|e| OmdbError::InvalidResponse(e.to_string()))
    }
}

fn error_message(body: &Value) -> Option<&str> {
    body.get("Error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}

fn transport_error(e: reqwest::Error) -> OmdbError {
    warn!(error = %e, timeout = e.is_timeout(), "OMDb request failed");
    OmdbError::Unavailable(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("reelcache/"));
        assert!(config.gzip);
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_client_without_key() {
        let client = OmdbClient::new(OmdbConfig::default()).unwrap();
        assert_eq!(client.api_url(), "https://www.omdbapi.com/");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(&json!({"Error": "Movie not found!"})),
            Some("Movie not found!")
        );
        assert_eq!(error_message(&json!({"Error": ""})), None);
        assert_eq!(error_message(&json!({"Response": "False"})), None);
    }
}
