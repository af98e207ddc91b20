pub mod clock;
pub mod error;
pub mod keys;
pub mod models;
pub mod search;
pub mod storage;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use models::{CompletionRequest, LanguageModel};
pub use search::{SearchQuery, SearchService};
pub use storage::CacheStore;
pub use types::*;
