use std::sync::Arc;
use bw_pipeline::Pipeline;

pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}
