use crate::config::Config;
use crate::layout::{page_config, PageConfig};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    /// Page geometry built once from `PAPER_SIZE`.
    pub page_config: PageConfig,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let page_config = page_config(config.paper_size);
        Self {
            config,
            page_config,
        }
    }
}
