use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::CatalogError;
use crate::types::{
    ArtworkKind, ArtworkQuery, ArtworkResponse, Artwork, BatchEntry, Envelope, GAME_NOT_FOUND,
    GameInfo,
};

const BASE_URL: &str = "https://www.steamgriddb.com/api/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The raw catalog operations the resolver fans out to.
///
/// `fetch_artwork` must answer in the catalog's cardinality-dependent
/// shape: [`ArtworkResponse::Flat`] when the query has one id,
/// [`ArtworkResponse::Nested`] with one entry per id otherwise.
#[allow(async_fn_in_trait)]
pub trait ArtworkFetch {
    async fn fetch_artwork(
        &self,
        kind: ArtworkKind,
        query: &ArtworkQuery,
    ) -> Result<ArtworkResponse, CatalogError>;

    async fn fetch_game(&self, id_type: &str, id: &str) -> Result<GameInfo, CatalogError>;

    async fn search_game(&self, term: &str) -> Result<Vec<GameInfo>, CatalogError>;
}

/// HTTP client for the SteamGridDB v2 API.
pub struct SteamGridDbApi {
    http: reqwest::Client,
    base_url: Url,
}

impl SteamGridDbApi {
    /// Build a client authenticating with `api_key`.
    pub fn new(api_key: &str) -> Result<Self, CatalogError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CatalogError::InvalidCredentials(
                "no API key configured".to_string(),
            ));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            CatalogError::InvalidCredentials("API key contains invalid characters".to_string())
        })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("gridport/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        let base_url = Url::parse(BASE_URL)
            .map_err(|e| CatalogError::Config(format!("invalid base URL: {e}")))?;

        Ok(Self { http, base_url })
    }

    /// Point the client at a different API root (mirrors, local test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, CatalogError> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::Config(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(self)
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Config("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        log::debug!("GET {}", url);
        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CatalogError::InvalidCredentials(
                "API key rejected".to_string(),
            ));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimit);
        }

        let envelope: Envelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(CatalogError::Api(format!(
                    "Failed to parse response: {e}. Response: {}",
                    preview(&text)
                )));
            }
            Err(_) if status == StatusCode::NOT_FOUND => {
                return Err(CatalogError::NotFound { errors: Vec::new() });
            }
            Err(_) => {
                return Err(CatalogError::ServerError {
                    status: status.as_u16(),
                    message: preview(&text),
                });
            }
        };

        if !envelope.success || !status.is_success() {
            if status == StatusCode::NOT_FOUND
                || envelope.errors.iter().any(|e| e == GAME_NOT_FOUND)
            {
                return Err(CatalogError::NotFound {
                    errors: envelope.errors,
                });
            }
            return Err(CatalogError::ServerError {
                status: status.as_u16(),
                message: envelope.errors.join("; "),
            });
        }

        envelope
            .data
            .ok_or_else(|| CatalogError::Api("response has no data".to_string()))
    }
}

impl ArtworkFetch for SteamGridDbApi {
    async fn fetch_artwork(
        &self,
        kind: ArtworkKind,
        query: &ArtworkQuery,
    ) -> Result<ArtworkResponse, CatalogError> {
        let ids = query.joined_ids();
        let url = self.endpoint(&[kind.endpoint(), &query.id_type, &ids])?;
        let mut params = Vec::new();
        if !query.dimensions.is_empty() {
            params.push(("dimensions", query.dimensions.join(",")));
        }

        if query.ids.len() == 1 {
            let data: Vec<Artwork> = self.get(url, &params).await?;
            Ok(ArtworkResponse::Flat(data))
        } else {
            let entries: Vec<BatchEntry> = self.get(url, &params).await?;
            Ok(ArtworkResponse::Nested(entries))
        }
    }

    async fn fetch_game(&self, id_type: &str, id: &str) -> Result<GameInfo, CatalogError> {
        let url = self.endpoint(&["games", id_type, id])?;
        self.get(url, &[]).await
    }

    async fn search_game(&self, term: &str) -> Result<Vec<GameInfo>, CatalogError> {
        let url = self.endpoint(&["search", "autocomplete", term])?;
        self.get(url, &[]).await
    }
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = SteamGridDbApi::new("  ").err().unwrap();
        assert!(matches!(err, CatalogError::InvalidCredentials(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn endpoint_joins_ids_with_commas() {
        let api = SteamGridDbApi::new("key").unwrap();
        let url = api.endpoint(&["grids", "egs", "1234,5555"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.steamgriddb.com/api/v2/grids/egs/1234,5555"
        );
    }

    #[test]
    fn endpoint_encodes_search_terms() {
        let api = SteamGridDbApi::new("key")
            .unwrap()
            .with_base_url("http://localhost:8080/api/v2/")
            .unwrap();
        let url = api.endpoint(&["search", "autocomplete", "Half-Life: Alyx"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/v2/search/autocomplete/Half-Life:%20Alyx"
        );
    }
}
