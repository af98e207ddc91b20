use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use bw_core::keys::content_key;
use bw_core::storage::{load, store};
use bw_core::{Article, CacheStore, CompletionRequest, Error, LanguageModel, Result, Summary};
use bw_storage::DEFAULT_TTL;
use tracing::{debug, warn};
use crate::util::{leading_words, truncate_to_char_boundary};

const MAX_CONTENT_BYTES: usize = 6000;
const PLACEHOLDER_WORDS: usize = 30;

const SUMMARY_SYSTEM: &str = "You are a neutral news editor. Summarize articles factually in 3-4 sentences. \
Do not add opinion, do not adopt the article's framing, and attribute claims to whoever made them.";

pub struct SummaryGenerator {
    model: Arc<dyn LanguageModel>,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl fmt::Debug for SummaryGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryGenerator")
            .field("model", &self.model.name())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SummaryGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            model,
            cache,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// One model call per distinct article text; failures are returned.
    pub async fn summarize(&self, article: &Article) -> Result<Summary> {
        let key = format!("summary:{}", content_key(&[&article.title, &article.content]));
        match load::<Summary>(self.cache.as_ref(), &key).await {
            Ok(Some(summary)) => {
                debug!(url = %article.url, "Summary cache hit");
                return Ok(summary);
            }
            Ok(None) => {}
            Err(e) => warn!(url = %article.url, error = %e, "Summary cache read failed"),
        }

        let request = CompletionRequest::new(
            SUMMARY_SYSTEM,
            format!(
                "Title: {}\nSource: {}\n\nContent:\n{}\n\nSummary:",
                article.title,
                article.source,
                truncate_to_char_boundary(&article.content, MAX_CONTENT_BYTES)
            ),
        )
        .max_tokens(300)
        .temperature(0.3);

        let text = self.model.complete(&request).await?.trim().to_string();
        if text.is_empty() {
            return Err(Error::Inference("Model returned an empty summary".to_string()));
        }

        let summary = Summary {
            text,
            placeholder: false,
        };
        if let Err(e) = store(self.cache.as_ref(), &key, &summary, Some(self.ttl)).await {
            warn!(url = %article.url, error = %e, "Failed to cache summary");
        }
        Ok(summary)
    }

    /// Extractive stand-in used when the model call fails.
    pub fn placeholder(article: &Article) -> Summary {
        let lead = leading_words(&article.content, PLACEHOLDER_WORDS);
        let text = if lead.is_empty() {
            format!("Summary unavailable for \"{}\".", article.title)
        } else if article.content.split_whitespace().count() > PLACEHOLDER_WORDS {
            format!("{}...", lead)
        } else {
            lead
        };
        Summary {
            text,
            placeholder: true,
        }
    }
}
