use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use bw_core::{Error, RawCandidate, Result, SearchQuery, SearchService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";
const MAX_TEXT_CHARACTERS: usize = 3000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(skip_serializing_if = "no_domains")]
    include_domains: &'a [String],
    contents: Contents,
}

fn no_domains(domains: &&[String]) -> bool {
    domains.is_empty()
}

#[derive(Serialize)]
struct Contents {
    text: TextOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawCandidate>,
}

/// Client for the Exa neural search API.
pub struct ExaSearch {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl ExaSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client: Arc::new(client),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn request<'a>(&self, query: &'a SearchQuery) -> SearchRequest<'a> {
        SearchRequest {
            query: &query.query,
            num_results: query.num_results,
            include_domains: &query.include_domains,
            contents: Contents {
                text: TextOptions {
                    max_characters: MAX_TEXT_CHARACTERS,
                },
            },
        }
    }
}

impl fmt::Debug for ExaSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExaSearch")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SearchService for ExaSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>> {
        debug!(query = %query.query, domains = query.include_domains.len(), "Search request");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&self.request(query))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!("Search API error ({}): {}", status, body)));
        }

        Ok(response.json::<SearchResponse>().await?.results)
    }
}
