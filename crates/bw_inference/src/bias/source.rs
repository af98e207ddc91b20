use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use bw_core::keys::normalize_source;
use bw_core::storage::{load, store};
use bw_core::{
    clamp_confidence, clamp_score, BiasLabel, CacheStore, Error, LanguageModel, Result,
    SourceReputation, DEFAULT_CONFIDENCE, NEUTRAL_SCORE,
};
use bw_storage::SOURCE_TTL;
use tracing::{debug, info, warn};
use crate::normalize::parse_structured;
use super::prompts::{reputation_request, PROMPT_VERSION};
use super::BiasReply;

/// Long-lived, per-outlet bias estimate.
pub struct SourceReputationEstimator {
    model: Arc<dyn LanguageModel>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl fmt::Debug for SourceReputationEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceReputationEstimator")
            .field("model", &self.model.name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SourceReputationEstimator {
    pub fn new(model: Arc<dyn LanguageModel>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            model,
            cache,
            ttl: SOURCE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache_key(source: &str) -> String {
        format!("bias:{}:source:{}", PROMPT_VERSION, normalize_source(source))
    }

    /// Cached reputation for `source`, asking the model on a miss.
    pub async fn estimate(&self, source: &str) -> Result<SourceReputation> {
        if normalize_source(source).is_empty() {
            return Err(Error::Inference("Source label is empty".to_string()));
        }

        let key = Self::cache_key(source);
        match load::<SourceReputation>(self.cache.as_ref(), &key).await {
            Ok(Some(reputation)) => {
                debug!(source, "Source reputation cache hit");
                return Ok(reputation);
            }
            Ok(None) => {}
            Err(e) => warn!(source, error = %e, "Source reputation cache read failed"),
        }

        info!(source, model = self.model.name(), "Estimating source reputation");
        let reply = self.model.complete(&reputation_request(source)).await?;
        let reply: BiasReply = parse_structured(&reply)?;
        let reliability = reply.reliability_tag();

        let bias_score = clamp_score(reply.bias_score.unwrap_or(NEUTRAL_SCORE));
        let reputation = SourceReputation {
            source: source.to_string(),
            bias_score,
            bias_label: BiasLabel::from_score(bias_score),
            confidence: clamp_confidence(reply.confidence.unwrap_or(DEFAULT_CONFIDENCE)),
            reasoning: reply
                .reasoning
                .unwrap_or_else(|| "No reasoning provided for source.".to_string()),
            reliability: reliability.unwrap_or_else(|| "Unknown".to_string()),
            indicators: reply.indicators,
        };

        if let Err(e) = store(self.cache.as_ref(), &key, &reputation, Some(self.ttl)).await {
            warn!(source, error = %e, "Failed to cache source reputation");
        }
        Ok(reputation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use bw_core::{CompletionRequest, ManualClock};
    use bw_storage::MemoryCache;

    #[derive(Default)]
    struct CountingModel {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn setup(reply: &str) -> (SourceReputationEstimator, Arc<CountingModel>, Arc<ManualClock>) {
        let model = Arc::new(CountingModel {
            reply: reply.to_string(),
            ..Default::default()
        });
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(MemoryCache::with_clock(Duration::from_secs(1800), clock.clone()));
        (SourceReputationEstimator::new(model.clone(), cache), model, clock)
    }

    #[test]
    fn test_cache_key_normalizes_source() {
        assert_eq!(
            SourceReputationEstimator::cache_key("Fox News"),
            SourceReputationEstimator::cache_key("fox news")
        );
        assert!(SourceReputationEstimator::cache_key("Fox News").ends_with(":source:foxnews"));
    }

    #[tokio::test]
    async fn test_reputation_is_cached_for_hours() {
        let (estimator, model, clock) = setup(
            r#"{"biasScore": 130, "confidence": 0.9, "reasoning": "Owned by a partisan group", "reliability": "Mixed", "indicators": ["ownership"]}"#,
        );

        let first = estimator.estimate("Example Times").await.unwrap();
        assert_eq!(first.bias_score, 100.0);
        assert_eq!(first.bias_label, BiasLabel::HighlyConservative);
        assert_eq!(first.reliability, "Mixed");
        assert_eq!(first.indicators, vec!["ownership"]);

        clock.advance(chrono::Duration::hours(5));
        let second = estimator.estimate("example times").await.unwrap();
        assert_eq!(second, first);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::hours(20));
        estimator.estimate("Example Times").await.unwrap();
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_fields_get_defaults() {
        let (estimator, _model, _clock) = setup("```json\n{}\n```");
        let reputation = estimator.estimate("example.com").await.unwrap();
        assert_eq!(reputation.bias_score, 50.0);
        assert_eq!(reputation.confidence, 0.5);
        assert_eq!(reputation.reliability, "Unknown");
    }

    #[tokio::test]
    async fn test_malformed_reply_propagates() {
        let (estimator, _model, _clock) = setup("I cannot rate this outlet.");
        assert!(matches!(
            estimator.estimate("example.com").await,
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_source_is_rejected() {
        let (estimator, model, _clock) = setup("{}");
        assert!(estimator.estimate(" - ").await.is_err());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }
}
