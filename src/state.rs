use crate::config::settings::AppConfig;
use crate::infrastructure::media::engine::MediaEngine;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub engine: MediaEngine,
}

impl AppState {
    pub fn new(config: AppConfig, engine: MediaEngine) -> Self {
        Self { config, engine }
    }
}
