//! Bias scoring cascade.
//!
//! Three tiers, each tried only when the previous one fails:
//! a direct model score of the article, a source reputation refined by a
//! second pass over the article, and a deterministic keyword scorer.

use bw_core::Attribution;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

pub mod analyzer;
pub mod keywords;
pub mod prompts;
pub mod source;
pub mod tiebreak;

pub use analyzer::BiasAnalyzer;
pub use keywords::{KeywordScorer, KeywordSignals};
pub use source::SourceReputationEstimator;
pub use tiebreak::{FixedTieBreak, Lean, NoTieBreak, RandomTieBreak, TieBreakMode, TieBreaker};

/// Why a tier could not produce an assessment.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{tier} tier failed: {reason}")]
pub struct TierError {
    pub tier: Attribution,
    pub reason: String,
}

impl TierError {
    pub fn new(tier: Attribution, reason: impl ToString) -> Self {
        Self {
            tier,
            reason: reason.to_string(),
        }
    }
}

pub type TierResult<T> = std::result::Result<T, TierError>;

/// Structured reply shared by every scoring prompt. Every field is optional;
/// callers substitute defaults for whatever is missing.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BiasReply {
    #[serde(default, deserialize_with = "lenient_number")]
    pub bias_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub indicators: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source_reliability: Option<String>,
    /// Key the reputation prompt asks for; some replies carry both.
    #[serde(default, deserialize_with = "lenient_text")]
    pub reliability: Option<String>,
}

impl BiasReply {
    /// Reliability tag under either key, `sourceReliability` first.
    pub fn reliability_tag(&self) -> Option<String> {
        self.source_reliability
            .clone()
            .or_else(|| self.reliability.clone())
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }))
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::String(_) | Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    })
}
