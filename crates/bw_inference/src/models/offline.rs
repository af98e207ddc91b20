use async_trait::async_trait;
use bw_core::{CompletionRequest, Error, LanguageModel, Result};

/// Stand-in used when no model is configured. Every call fails, so the bias
/// cascade settles on the keyword tier and summaries on the extractive lead.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineModel;

#[async_trait]
impl LanguageModel for OfflineModel {
    fn name(&self) -> &str {
        "offline"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        Err(Error::Inference("No language model configured".to_string()))
    }
}
