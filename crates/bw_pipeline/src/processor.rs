use std::fmt;
use std::sync::Arc;
use bw_core::{AnalyzedArticle, Article, Clock, Error, Result, SystemClock};
use bw_inference::{BiasAnalyzer, SummaryGenerator};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 5;

/// Runs bias assessment and summary generation for articles.
#[derive(Clone)]
pub struct ArticleProcessor {
    analyzer: Arc<BiasAnalyzer>,
    summaries: Arc<SummaryGenerator>,
    semaphore: Arc<Semaphore>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ArticleProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleProcessor")
            .field("analyzer", &self.analyzer)
            .field("summaries", &self.summaries)
            .field("available_permits", &self.semaphore.available_permits())
            .finish()
    }
}

impl ArticleProcessor {
    pub fn new(analyzer: Arc<BiasAnalyzer>, summaries: Arc<SummaryGenerator>) -> Self {
        Self {
            analyzer,
            summaries,
            semaphore: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Assess and summarize one article concurrently, then merge.
    ///
    /// A failed summary is replaced by a placeholder; the bias cascade always
    /// yields an assessment.
    pub async fn process(&self, article: Article) -> Result<AnalyzedArticle> {
        if article.url.trim().is_empty() {
            return Err(Error::InvalidArticle(format!(
                "Article \"{}\" has no URL",
                article.title
            )));
        }

        info!(url = %article.url, "📰 Processing article");
        let (bias, summary) = tokio::join!(
            self.analyzer.assess(&article),
            self.summaries.summarize(&article)
        );
        let summary = summary.unwrap_or_else(|e| {
            warn!(url = %article.url, error = %e, "Summary failed, using placeholder");
            SummaryGenerator::placeholder(&article)
        });
        info!(
            url = %article.url,
            score = bias.bias_score,
            label = %bias.bias_label,
            tier = %bias.attribution,
            "✅ Article processed"
        );

        Ok(AnalyzedArticle {
            article,
            bias,
            summary,
            processed_at: self.clock.now(),
        })
    }

    /// Process every article in its own task. Results keep input order and a
    /// failure (or panic) in one article does not affect the others.
    pub async fn process_batch(&self, articles: Vec<Article>) -> Vec<Result<AnalyzedArticle>> {
        let handles: Vec<_> = articles
            .into_iter()
            .map(|article| {
                let processor = self.clone();
                tokio::spawn(async move {
                    let _permit = processor
                        .semaphore
                        .clone()
                        .acquire_owned()
                        .await
                        .map_err(|e| Error::External(e.into()))?;
                    processor.process(article).await
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| match joined {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "Article task aborted");
                    Err(Error::External(anyhow::anyhow!("Article task aborted: {}", e)))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bw_core::{Attribution, CompletionRequest, LanguageModel, ManualClock};
    use bw_inference::bias::NoTieBreak;
    use bw_inference::models::OfflineModel;
    use bw_storage::{MemoryCache, DEFAULT_TTL};
    use chrono::Utc;

    /// Scores directly, summarizes, and panics on articles mentioning PANIC.
    struct NewsroomModel;

    #[async_trait]
    impl LanguageModel for NewsroomModel {
        fn name(&self) -> &str {
            "newsroom"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            if request.user.contains("PANIC") {
                panic!("model exploded");
            }
            if request.user.starts_with("Analyze the political bias") {
                Ok(r#"{"biasScore": 64, "confidence": 0.7, "reasoning": "Emphasises enforcement."}"#.to_string())
            } else {
                Ok("Officials announced a new policy.".to_string())
            }
        }
    }

    fn processor(model: Arc<dyn LanguageModel>) -> ArticleProcessor {
        let cache = Arc::new(MemoryCache::new(DEFAULT_TTL));
        let analyzer = BiasAnalyzer::new(model.clone(), cache.clone())
            .with_tie_breaker(Arc::new(NoTieBreak));
        ArticleProcessor::new(
            Arc::new(analyzer),
            Arc::new(SummaryGenerator::new(model, cache)),
        )
    }

    fn article(url: &str, content: &str) -> Article {
        Article {
            url: url.to_string(),
            title: "Policy update".to_string(),
            content: content.to_string(),
            source: "example.com".to_string(),
            published_at: Utc::now(),
            author: Some("Reporter".to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_process_merges_bias_and_summary() {
        let clock = Arc::new(ManualClock::default());
        let processor = processor(Arc::new(NewsroomModel)).with_clock(clock.clone());
        let analyzed = processor
            .process(article("https://example.com/1", "The policy changes enforcement."))
            .await
            .unwrap();

        assert_eq!(analyzed.article.url, "https://example.com/1");
        assert_eq!(analyzed.bias.attribution, Attribution::Direct);
        assert_eq!(analyzed.bias.bias_score, 64.0);
        assert_eq!(analyzed.summary.text, "Officials announced a new policy.");
        assert!(!analyzed.summary.placeholder);
        assert_eq!(analyzed.processed_at, clock.now());
    }

    #[tokio::test]
    async fn test_offline_model_degrades_gracefully() {
        let processor = processor(Arc::new(OfflineModel));
        let analyzed = processor
            .process(article("https://example.com/1", "Lawmakers debated tax cuts and border security."))
            .await
            .unwrap();
        assert_eq!(analyzed.bias.attribution, Attribution::Keyword);
        assert!(analyzed.summary.placeholder);
        assert_eq!(analyzed.summary.text, "Lawmakers debated tax cuts and border security.");
    }

    #[tokio::test]
    async fn test_article_without_url_is_rejected() {
        let processor = processor(Arc::new(OfflineModel));
        let result = processor.process(article("  ", "body")).await;
        assert!(matches!(result, Err(Error::InvalidArticle(_))));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let processor = processor(Arc::new(NewsroomModel)).with_concurrency(2);
        let results = processor
            .process_batch(vec![
                article("https://example.com/1", "First story."),
                article("", "No URL."),
                article("https://example.com/3", "PANIC in the newsroom."),
                article("https://example.com/4", "Fourth story."),
            ])
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().article.url, "https://example.com/1");
        assert!(matches!(results[1], Err(Error::InvalidArticle(_))));
        assert!(matches!(results[2], Err(Error::External(_))));
        assert_eq!(results[3].as_ref().unwrap().article.url, "https://example.com/4");
    }
}
