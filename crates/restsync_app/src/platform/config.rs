use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use restsync_engine::{AggregatorSettings, StorePolicy, TransportSettings};
use serde::{Deserialize, Serialize};
use sync_logging::sync_info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub base_url: Option<String>,
    pub policy: StorePolicy,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_bytes: u64,
    /// `None` or `Some(0)` leave the page fan-out unbounded.
    pub max_concurrency: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            base_url: None,
            policy: StorePolicy::default(),
            connect_timeout_ms: transport.connect_timeout.as_millis() as u64,
            request_timeout_ms: transport.request_timeout.as_millis() as u64,
            max_bytes: transport.max_bytes,
            max_concurrency: None,
        }
    }
}

impl AppConfig {
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_bytes: self.max_bytes,
        }
    }

    pub fn aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            max_concurrency: self.max_concurrency.and_then(NonZeroUsize::new),
        }
    }
}

pub(crate) fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            sync_info!("No config at {:?}; using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {:?}", path));
        }
    };

    let config: AppConfig =
        ron::from_str(&content).with_context(|| format!("parsing config {:?}", path))?;
    sync_info!("Loaded config from {:?}", path);
    Ok(config)
}
