use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NEUTRAL_SCORE: f64 = 50.0;
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Source URL, unique within one result set
    pub url: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub author: Option<String>,
    pub image: Option<String>,
}

/// Record as returned by the retrieval service, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    pub url: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub published_date: Option<String>,
    pub author: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiasLabel {
    #[serde(rename = "Highly Liberal")]
    HighlyLiberal,
    #[serde(rename = "Liberal")]
    Liberal,
    #[serde(rename = "Neutral/Centrist")]
    NeutralCentrist,
    #[serde(rename = "Conservative")]
    Conservative,
    #[serde(rename = "Highly Conservative")]
    HighlyConservative,
}

impl BiasLabel {
    /// Map a score onto the five fixed bands: 0-20, 21-40, 41-60, 61-80, 81-100.
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score <= 20.0 {
            Self::HighlyLiberal
        } else if score <= 40.0 {
            Self::Liberal
        } else if score <= 60.0 {
            Self::NeutralCentrist
        } else if score <= 80.0 {
            Self::Conservative
        } else {
            Self::HighlyConservative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighlyLiberal => "Highly Liberal",
            Self::Liberal => "Liberal",
            Self::NeutralCentrist => "Neutral/Centrist",
            Self::Conservative => "Conservative",
            Self::HighlyConservative => "Highly Conservative",
        }
    }
}

impl fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cascade tier produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribution {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "source+content")]
    SourceContent,
    #[serde(rename = "keyword")]
    Keyword,
}

impl Attribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::SourceContent => "source+content",
            Self::Keyword => "keyword",
        }
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasAssessment {
    /// 0 is strongly left-leaning, 100 strongly right-leaning
    pub bias_score: f64,
    pub bias_label: BiasLabel,
    pub confidence: f64,
    pub reasoning: String,
    pub indicators: Vec<String>,
    pub attribution: Attribution,
    pub source_reliability: Option<String>,
}

impl BiasAssessment {
    /// Build an assessment with score and confidence forced into range and the
    /// label derived from the clamped score.
    pub fn new(
        bias_score: f64,
        confidence: f64,
        reasoning: impl Into<String>,
        indicators: Vec<String>,
        attribution: Attribution,
    ) -> Self {
        let bias_score = clamp_score(bias_score);
        Self {
            bias_score,
            bias_label: BiasLabel::from_score(bias_score),
            confidence: clamp_confidence(confidence),
            reasoning: reasoning.into(),
            indicators,
            attribution,
            source_reliability: None,
        }
    }

    pub fn with_source_reliability(mut self, reliability: impl Into<String>) -> Self {
        self.source_reliability = Some(reliability.into());
        self
    }
}

/// Source-level bias estimate, independent of any single article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReputation {
    pub source: String,
    pub bias_score: f64,
    pub bias_label: BiasLabel,
    pub confidence: f64,
    pub reasoning: String,
    pub reliability: String,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    /// Set when the model call failed and `text` is an extractive stand-in
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub bias: BiasAssessment,
    pub summary: Summary,
    pub processed_at: DateTime<Utc>,
}

/// Clamp into [0, 100]. Non-finite input falls back to the neutral score.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        NEUTRAL_SCORE
    }
}

/// Clamp into [0, 1]. Non-finite input falls back to the default confidence.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        DEFAULT_CONFIDENCE
    }
}
