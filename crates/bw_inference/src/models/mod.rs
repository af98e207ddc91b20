use std::sync::Arc;
use bw_core::{Error, LanguageModel, Result};
use crate::{Config, Provider};

pub mod offline;
pub mod openai;

pub use offline::OfflineModel;
pub use openai::OpenAiCompatModel;

/// Build the language model described by `config`.
pub fn create_model(config: &Config) -> Result<Arc<dyn LanguageModel>> {
    match config.provider {
        Provider::Offline => Ok(Arc::new(OfflineModel)),
        Provider::OpenAi => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| Error::Config("An API key is required for the openai provider".to_string()))?;
            let mut model = OpenAiCompatModel::new(api_key);
            if let Some(name) = &config.model_name {
                model = model.with_model(name.clone());
            }
            if let Some(url) = &config.base_url {
                model = model.with_base_url(url.clone());
            }
            Ok(Arc::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_requires_api_key() {
        let config = Config {
            provider: Provider::OpenAi,
            ..Config::default()
        };
        let err = create_model(&config).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Configuration error: An API key is required for the openai provider"
        );

        let config = Config {
            provider: Provider::OpenAi,
            api_key: Some("test-key".to_string()),
            ..Config::default()
        };
        assert_eq!(create_model(&config).unwrap().name(), "openai-compatible");
    }

    #[test]
    fn test_offline_needs_nothing() {
        assert_eq!(create_model(&Config::default()).unwrap().name(), "offline");
    }
}
