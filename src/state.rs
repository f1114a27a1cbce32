use readmore_backend::config::SearchConfig;
use readmore_backend::search::ContentIndex;
use std::sync::Arc;

/// Shared state of the HTTP content API / 服务共享状态
pub struct AppState {
    pub index: Arc<dyn ContentIndex>,
    pub search: SearchConfig,
}

impl AppState {
    pub fn new(index: Arc<dyn ContentIndex>, search: SearchConfig) -> Self {
        Self { index, search }
    }
}
