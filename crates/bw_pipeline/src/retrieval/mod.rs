//! Search fan-out. Every category is queried at once; the whole fetch races
//! a timeout and falls back to placeholder articles, so retrieval always
//! returns something.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use bw_core::{Article, Clock, RawCandidate, SearchQuery, SearchService, SystemClock};
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use tracing::{info, warn};
use url::Url;

pub mod exa;
mod placeholder;

pub use exa::ExaSearch;
pub use placeholder::placeholder_articles;

/// One slice of the fan-out, restricted to a set of domains.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub domains: Vec<String>,
}

impl Category {
    pub fn new(name: &str, domains: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }
}

pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "left",
            &["cnn.com", "msnbc.com", "nytimes.com", "washingtonpost.com", "theguardian.com"],
        ),
        Category::new(
            "center",
            &["reuters.com", "apnews.com", "bbc.com", "npr.org", "thehill.com"],
        ),
        Category::new(
            "right",
            &["foxnews.com", "nypost.com", "washingtonexaminer.com", "dailywire.com", "nationalreview.com"],
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub categories: Vec<Category>,
    pub results_per_category: usize,
    pub timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            results_per_category: 5,
            timeout: Duration::from_secs(20),
        }
    }
}

pub struct NewsRetriever {
    search: Arc<dyn SearchService>,
    config: RetrievalConfig,
    clock: Arc<dyn Clock>,
}

impl NewsRetriever {
    pub fn new(search: Arc<dyn SearchService>, config: RetrievalConfig) -> Self {
        Self {
            search,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Articles for `query`, de-duplicated by URL. Never empty.
    pub async fn retrieve(&self, query: &str) -> Vec<Article> {
        // Dropping the fetch on timeout cancels every in-flight search.
        match tokio::time::timeout(self.config.timeout, self.fetch(query)).await {
            Ok(articles) if !articles.is_empty() => articles,
            Ok(_) => {
                warn!(query, "Search returned nothing, serving placeholder articles");
                placeholder_articles(query, self.clock.now())
            }
            Err(_) => {
                warn!(
                    query,
                    timeout_secs = self.config.timeout.as_secs_f64(),
                    "Search timed out, serving placeholder articles"
                );
                placeholder_articles(query, self.clock.now())
            }
        }
    }

    async fn fetch(&self, query: &str) -> Vec<Article> {
        let mut candidates = self.fan_out(query).await;
        if candidates.is_empty() {
            info!(query, "Category search found nothing, retrying without domain filter");
            candidates = self.search_category(query, None).await;
        }

        let now = self.clock.now();
        dedup_by_url(candidates)
            .into_iter()
            .filter_map(|candidate| to_article(candidate, now))
            .collect()
    }

    async fn fan_out(&self, query: &str) -> Vec<RawCandidate> {
        let searches = self
            .config
            .categories
            .iter()
            .map(|category| self.search_category(query, Some(category)));
        join_all(searches).await.into_iter().flatten().collect()
    }

    async fn search_category(&self, query: &str, category: Option<&Category>) -> Vec<RawCandidate> {
        let request = SearchQuery {
            query: query.to_string(),
            include_domains: category.map(|c| c.domains.clone()).unwrap_or_default(),
            num_results: self.config.results_per_category,
        };
        let name = category.map(|c| c.name.as_str()).unwrap_or("unfiltered");
        match self.search.search(&request).await {
            Ok(results) => {
                info!(category = name, count = results.len(), "Search category returned");
                results
            }
            Err(e) => {
                warn!(category = name, error = %e, "Search category failed");
                Vec::new()
            }
        }
    }
}

/// Keep the first candidate for each URL; drop candidates without one.
pub fn dedup_by_url(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| match candidate.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => seen.insert(url.to_string()),
            _ => false,
        })
        .collect()
}

/// Turn a raw candidate into an article; `None` when it has no URL.
pub fn to_article(candidate: RawCandidate, retrieved_at: DateTime<Utc>) -> Option<Article> {
    let url = candidate.url?.trim().to_string();
    if url.is_empty() {
        return None;
    }
    let source = source_label(&url);
    let published_at = candidate
        .published_date
        .as_deref()
        .and_then(parse_published)
        .unwrap_or(retrieved_at);

    Some(Article {
        title: candidate
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string()),
        content: candidate.text.unwrap_or_default(),
        source,
        published_at,
        author: candidate.author.filter(|a| !a.trim().is_empty()),
        image: candidate.image.filter(|i| !i.trim().is_empty()),
        url,
    })
}

/// Host of the URL without a leading `www.`.
pub fn source_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        })
}
