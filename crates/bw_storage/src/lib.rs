use std::sync::Arc;
use std::time::Duration;
use bw_core::{CacheStore, Clock, Error, Result, SystemClock};

pub mod backends;

pub use backends::*;

/// Per-article results live for tens of minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

/// Source reputations live for a day.
pub const SOURCE_TTL: Duration = Duration::from_secs(86400);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
        }
    }
}

/// Build a cache backend by name.
pub fn create_cache(kind: &str, config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
    create_cache_with_clock(kind, config, Arc::new(SystemClock))
}

pub fn create_cache_with_clock(
    kind: &str,
    config: &CacheConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn CacheStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryCache::with_clock(config.default_ttl, clock))),
        other => Err(Error::Config(format!("Unknown cache backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::{create_cache, CacheConfig, DEFAULT_TTL, SOURCE_TTL};
    pub use super::backends::*;
}
