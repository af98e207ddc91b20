use async_trait::async_trait;
use crate::types::RawCandidate;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    /// Restrict results to these domains. Empty means unrestricted.
    pub include_domains: Vec<String>,
    pub num_results: usize,
}

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run a query and return raw candidates in ranking order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawCandidate>>;
}
