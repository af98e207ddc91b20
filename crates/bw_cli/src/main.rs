use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use bw_core::{Article, CacheStore, Error, LanguageModel, Result};
use bw_inference::{create_model, BiasAnalyzer, Config, Provider, SummaryGenerator, TieBreakMode};
use bw_pipeline::{ArticleProcessor, ExaSearch, NewsRetriever, Pipeline, RetrievalConfig};
use bw_storage::{create_cache, CacheConfig};
use clap::Parser;
use tracing::info;

mod logging;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number is seconds
        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds += num;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Score the political bias of news coverage", long_about = None)]
struct Cli {
    /// Language model provider: openai (any compatible endpoint) or offline
    #[arg(long, env = "BW_LLM_PROVIDER", default_value = "openai")]
    provider: String,
    #[arg(long, env = "BW_LLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "BW_LLM_BASE_URL")]
    base_url: Option<String>,
    #[arg(long, env = "BW_LLM_MODEL")]
    model: Option<String>,
    #[arg(long, env = "BW_SEARCH_API_KEY", hide_env_values = true)]
    search_api_key: Option<String>,
    #[arg(long, env = "BW_SEARCH_BASE_URL")]
    search_base_url: Option<String>,
    #[arg(long, default_value = "memory")]
    cache: String,
    /// Tie-break for signal-free keyword scoring: random, off, or a probability
    #[arg(long, default_value = "random")]
    tie_break: TieBreakMode,
    /// Lifetime of per-article results (e.g. 30m)
    #[arg(long, default_value = "30m")]
    article_ttl: HumanDuration,
    /// Lifetime of source reputations (e.g. 1d)
    #[arg(long, default_value = "1d")]
    source_ttl: HumanDuration,
    /// Give up on search after this long and serve placeholders
    #[arg(long, default_value = "20s")]
    search_timeout: HumanDuration,
    #[arg(long, default_value_t = 5)]
    results_per_category: usize,
    #[arg(long, default_value_t = 5)]
    concurrency: usize,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Search the news for a query and analyze every result
    Search { query: String },
    /// Analyze a single article
    Analyze {
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        source: String,
        /// Read the article body from this file instead of --content
        #[arg(long, conflicts_with = "content")]
        file: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

impl Cli {
    fn inference_config(&self) -> Result<Config> {
        let mut provider = Provider::from_str(&self.provider).map_err(Error::Config)?;
        if provider == Provider::OpenAi && self.api_key.is_none() {
            info!("No model API key configured, running offline (keyword scoring only)");
            provider = Provider::Offline;
        }
        Ok(Config {
            provider,
            api_key: self.api_key.clone(),
            model_name: self.model.clone(),
            base_url: self.base_url.clone(),
            article_ttl: self.article_ttl.0,
            source_ttl: self.source_ttl.0,
            tie_break: self.tie_break,
        })
    }

    fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            results_per_category: self.results_per_category,
            timeout: self.search_timeout.0,
            ..RetrievalConfig::default()
        }
    }

    fn search_service(&self) -> Result<ExaSearch> {
        let key = self
            .search_api_key
            .clone()
            .ok_or_else(|| Error::Config("A search API key is required (BW_SEARCH_API_KEY)".to_string()))?;
        let search = ExaSearch::new(key);
        Ok(match &self.search_base_url {
            Some(url) => search.with_base_url(url.clone()),
            None => search,
        })
    }
}

fn processor(model: Arc<dyn LanguageModel>, cache: Arc<dyn CacheStore>, config: &Config, concurrency: usize) -> ArticleProcessor {
    let analyzer = BiasAnalyzer::from_config(model.clone(), cache.clone(), config);
    let summaries = SummaryGenerator::new(model, cache).with_ttl(config.article_ttl);
    ArticleProcessor::new(Arc::new(analyzer), Arc::new(summaries)).with_concurrency(concurrency)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = cli.inference_config()?;
    let model = create_model(&config)?;
    info!("🧠 Language model ready (using {})", model.name());

    let cache = create_cache(
        &cli.cache,
        &CacheConfig {
            default_ttl: config.article_ttl,
        },
    )?;
    info!("💾 Cache ready (using {})", cli.cache);

    let processor = processor(model, cache, &config, cli.concurrency);

    match &cli.command {
        Commands::Search { query } => {
            let retriever = NewsRetriever::new(Arc::new(cli.search_service()?), cli.retrieval_config());
            let pipeline = Pipeline::new(retriever, processor);
            let analyzed = pipeline.run(query).await;
            println!("{}", serde_json::to_string_pretty(&analyzed)?);
        }
        Commands::Analyze {
            url,
            title,
            source,
            file,
            content,
        } => {
            let content = match file {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => content.clone().unwrap_or_default(),
            };
            let article = Article {
                url: url.clone(),
                title: title.clone(),
                content,
                source: source.clone(),
                published_at: chrono::Utc::now(),
                author: None,
                image: None,
            };
            let analyzed = processor.process(article).await?;
            println!("{}", serde_json::to_string_pretty(&analyzed)?);
        }
        Commands::Serve { addr } => {
            let retriever = NewsRetriever::new(Arc::new(cli.search_service()?), cli.retrieval_config());
            let state = bw_web::AppState {
                pipeline: Arc::new(Pipeline::new(retriever, processor)),
            };
            bw_web::serve(state, addr).await?;
        }
    }

    Ok(())
}
