use std::sync::Arc;

use super::auth::SessionStore;
use crate::config::{Config, ConfigError, Secret};
use crate::observability::Metrics;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<Pipeline>,
    pub sessions: Arc<SessionStore>,
    pub metrics: Arc<Metrics>,
    pub access_key: Secret,
}

impl AppState {
    /// Fails when no access key is configured; the web surface never runs open.
    pub fn new(config: Config, pipeline: Pipeline) -> Result<Self, ConfigError> {
        let access_key = config.access_key()?.clone();

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            sessions: Arc::new(SessionStore::new()),
            metrics: Arc::new(Metrics::new()),
            access_key,
        })
    }
}
