use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use bw_storage::{DEFAULT_TTL, SOURCE_TTL};

pub mod bias;
pub mod models;
pub mod normalize;
pub mod summary;
mod util;

pub use bias::{BiasAnalyzer, TieBreakMode};
pub use models::create_model;
pub use summary::SummaryGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Any OpenAI-compatible chat completions endpoint
    OpenAi,
    /// No model; every call fails and the cascade uses its keyword tier
    Offline,
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" | "deepseek" | "groq" => Ok(Self::OpenAi),
            "offline" | "none" => Ok(Self::Offline),
            other => Err(format!("Unknown model provider: {}", other)),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub article_ttl: Duration,
    pub source_ttl: Duration,
    pub tie_break: TieBreakMode,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("article_ttl", &self.article_ttl)
            .field("source_ttl", &self.source_ttl)
            .field("tie_break", &self.tie_break)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::Offline,
            api_key: None,
            model_name: None,
            base_url: None,
            article_ttl: DEFAULT_TTL,
            source_ttl: SOURCE_TTL,
            tie_break: TieBreakMode::default(),
        }
    }
}

pub mod prelude {
    pub use super::{Config, Provider};
    pub use super::bias::{BiasAnalyzer, KeywordScorer, SourceReputationEstimator, TieBreakMode};
    pub use super::models::create_model;
    pub use super::summary::SummaryGenerator;
    pub use bw_core::{Article, BiasAssessment, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("deepseek".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!("offline".parse::<Provider>().unwrap(), Provider::Offline);
        assert!("ollama".parse::<Provider>().is_err());
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = Config {
            api_key: Some("sk-live".to_string()),
            ..Config::default()
        };
        assert!(!format!("{:?}", config).contains("sk-live"));
    }
}
