use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use bw_core::keys::content_key;
use bw_core::storage::{load, store};
use bw_core::{
    Article, Attribution, BiasAssessment, CacheStore, LanguageModel, DEFAULT_CONFIDENCE,
    NEUTRAL_SCORE,
};
use bw_storage::DEFAULT_TTL;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};
use crate::normalize::parse_structured;
use crate::Config;
use super::keywords::KeywordScorer;
use super::prompts::{content_against_source_request, direct_request, PROMPT_VERSION};
use super::source::SourceReputationEstimator;
use super::tiebreak::{TieBreakMode, TieBreaker};
use super::{BiasReply, TierError, TierResult};

/// Entry point of the bias cascade: direct, then source+content, then keyword.
///
/// Every public method returns an assessment. Tier failures are logged and
/// turned into a fall through to the next tier.
pub struct BiasAnalyzer {
    model: Arc<dyn LanguageModel>,
    cache: Arc<dyn CacheStore>,
    reputation: SourceReputationEstimator,
    keywords: KeywordScorer,
    article_ttl: Duration,
}

impl fmt::Debug for BiasAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiasAnalyzer")
            .field("model", &self.model.name())
            .field("reputation", &self.reputation)
            .field("keywords", &self.keywords)
            .field("article_ttl", &self.article_ttl)
            .finish()
    }
}

impl BiasAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            reputation: SourceReputationEstimator::new(model.clone(), cache.clone()),
            keywords: KeywordScorer::new(TieBreakMode::default().build()),
            model,
            cache,
            article_ttl: DEFAULT_TTL,
        }
    }

    pub fn from_config(
        model: Arc<dyn LanguageModel>,
        cache: Arc<dyn CacheStore>,
        config: &Config,
    ) -> Self {
        Self::new(model, cache)
            .with_ttls(config.article_ttl, config.source_ttl)
            .with_tie_breaker(config.tie_break.build())
    }

    pub fn with_ttls(mut self, article_ttl: Duration, source_ttl: Duration) -> Self {
        self.article_ttl = article_ttl;
        self.reputation = self.reputation.with_ttl(source_ttl);
        self
    }

    pub fn with_tie_breaker(mut self, tie_breaker: Arc<dyn TieBreaker>) -> Self {
        self.keywords = KeywordScorer::new(tie_breaker);
        self
    }

    /// Score one article, degrading through the tiers as needed.
    pub async fn assess(&self, article: &Article) -> BiasAssessment {
        match self.try_direct(article).await {
            Ok(assessment) => return assessment,
            Err(e) => warn!(url = %article.url, error = %e, "Falling back to source assessment"),
        }
        self.assess_via_source(&article.source, &article.title, &article.content)
            .await
    }

    /// Source reputation refined by the article; keyword scoring if that fails.
    pub async fn assess_via_source(&self, source: &str, title: &str, content: &str) -> BiasAssessment {
        match self.try_source_and_content(source, title, content).await {
            Ok(assessment) => return assessment,
            Err(e) => warn!(source, error = %e, "Falling back to keyword assessment"),
        }
        self.assess_by_keywords(title, content, source).await
    }

    /// Terminal tier. Never fails.
    pub async fn assess_by_keywords(&self, title: &str, content: &str, source: &str) -> BiasAssessment {
        let key = format!(
            "bias:{}:keyword:{}",
            PROMPT_VERSION,
            content_key(&[source, title, content])
        );
        if let Some(cached) = self.cached::<BiasAssessment>(&key).await {
            return cached;
        }
        let assessment = self.keywords.assess(title, content, source);
        self.remember(&key, &assessment, self.article_ttl).await;
        assessment
    }

    /// Direct-tier key. A blank body says nothing about the article, so the
    /// title and source stand in for it.
    pub fn direct_cache_key(article: &Article) -> String {
        let digest = if article.content.trim().is_empty() {
            content_key(&[&article.source, &article.title, &article.content])
        } else {
            content_key(&[&article.content])
        };
        format!("bias:{}:direct:{}", PROMPT_VERSION, digest)
    }

    async fn try_direct(&self, article: &Article) -> TierResult<BiasAssessment> {
        let tier = Attribution::Direct;
        let key = Self::direct_cache_key(article);
        if let Some(cached) = self.cached::<BiasAssessment>(&key).await {
            return Ok(cached);
        }

        info!(url = %article.url, model = self.model.name(), "Scoring article directly");
        let request = direct_request(&article.title, &article.source, &article.content);
        let reply = self
            .model
            .complete(&request)
            .await
            .map_err(|e| TierError::new(tier, e))?;
        let reply: BiasReply = parse_structured(&reply).map_err(|e| TierError::new(tier, e))?;
        let reliability = reply.reliability_tag();

        let mut assessment = BiasAssessment::new(
            reply.bias_score.unwrap_or(NEUTRAL_SCORE),
            reply.confidence.unwrap_or(DEFAULT_CONFIDENCE),
            reply
                .reasoning
                .unwrap_or_else(|| "No reasoning provided.".to_string()),
            reply.indicators,
            tier,
        );
        assessment.source_reliability = reliability;

        self.remember(&key, &assessment, self.article_ttl).await;
        Ok(assessment)
    }

    async fn try_source_and_content(
        &self,
        source: &str,
        title: &str,
        content: &str,
    ) -> TierResult<BiasAssessment> {
        let tier = Attribution::SourceContent;
        let digest = if content.trim().is_empty() {
            content_key(&[source, title, content])
        } else {
            content_key(&[source, content])
        };
        let key = format!("bias:{}:source-content:{}", PROMPT_VERSION, digest);
        if let Some(cached) = self.cached::<BiasAssessment>(&key).await {
            return Ok(cached);
        }

        let reputation = self
            .reputation
            .estimate(source)
            .await
            .map_err(|e| TierError::new(tier, e))?;

        info!(source, "Checking article against source pattern");
        let request = content_against_source_request(&reputation, title, content);
        let reply = self
            .model
            .complete(&request)
            .await
            .map_err(|e| TierError::new(tier, e))?;
        let reply: BiasReply = parse_structured(&reply).map_err(|e| TierError::new(tier, e))?;

        let reasoning = format!(
            "Source pattern: {} Article: {}",
            reputation.reasoning,
            reply
                .reasoning
                .as_deref()
                .unwrap_or("No article-specific reasoning provided.")
        );
        let mut indicators = reputation.indicators.clone();
        indicators.extend(reply.indicators);

        let assessment = BiasAssessment::new(
            reply.bias_score.unwrap_or(reputation.bias_score),
            reply.confidence.unwrap_or(reputation.confidence),
            reasoning,
            indicators,
            tier,
        )
        .with_source_reliability(reputation.reliability);

        self.remember(&key, &assessment, self.article_ttl).await;
        Ok(assessment)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match load(self.cache.as_ref(), key).await {
            Ok(Some(value)) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed");
                None
            }
        }
    }

    async fn remember<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Duration) {
        if let Err(e) = store(self.cache.as_ref(), key, value, Some(ttl)).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }
}
