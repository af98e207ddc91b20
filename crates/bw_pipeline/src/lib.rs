use std::sync::Arc;
use bw_core::{AnalyzedArticle, CacheStore, LanguageModel, SearchService};
use bw_inference::{BiasAnalyzer, Config, SummaryGenerator};
use tracing::{error, info};

pub mod processor;
pub mod retrieval;

pub use processor::ArticleProcessor;
pub use retrieval::{Category, ExaSearch, NewsRetriever, RetrievalConfig};

/// Query in, analyzed articles out.
pub struct Pipeline {
    retriever: NewsRetriever,
    processor: ArticleProcessor,
}

impl Pipeline {
    pub fn new(retriever: NewsRetriever, processor: ArticleProcessor) -> Self {
        Self { retriever, processor }
    }

    /// Wire the full stack from its collaborators and configuration.
    pub fn build(
        search: Arc<dyn SearchService>,
        model: Arc<dyn LanguageModel>,
        cache: Arc<dyn CacheStore>,
        inference: &Config,
        retrieval: RetrievalConfig,
        concurrency: usize,
    ) -> Self {
        let analyzer = BiasAnalyzer::from_config(model.clone(), cache.clone(), inference);
        let summaries = SummaryGenerator::new(model, cache).with_ttl(inference.article_ttl);
        let processor = ArticleProcessor::new(Arc::new(analyzer), Arc::new(summaries))
            .with_concurrency(concurrency);
        Self::new(NewsRetriever::new(search, retrieval), processor)
    }

    pub fn processor(&self) -> &ArticleProcessor {
        &self.processor
    }

    /// Retrieve, analyze and return every article that processed cleanly.
    pub async fn run(&self, query: &str) -> Vec<AnalyzedArticle> {
        let articles = self.retriever.retrieve(query).await;
        info!(query, count = articles.len(), "🔍 Retrieved articles");

        let mut analyzed = Vec::with_capacity(articles.len());
        for result in self.processor.process_batch(articles).await {
            match result {
                Ok(article) => analyzed.push(article),
                Err(e) => error!(error = %e, "Dropping article that failed processing"),
            }
        }
        info!(query, count = analyzed.len(), "✨ Analysis complete");
        analyzed
    }
}

pub mod prelude {
    pub use super::{ArticleProcessor, NewsRetriever, Pipeline, RetrievalConfig};
    pub use bw_core::{AnalyzedArticle, Article, Error, Result};
}
