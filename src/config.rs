use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Full URL of the chain-data endpoint, e.g. http://localhost:3000/getChainData
    pub chain_data_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_max_block_size")]
    pub max_block_size: u64,
    /// Number of block-time deltas averaged for avgBlockTime.
    #[serde(default = "default_block_time_window")]
    pub block_time_window: usize,
    /// Number of enriched snapshots kept in the rolling history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_block_size: default_max_block_size(),
            block_time_window: default_block_time_window(),
            history_capacity: default_history_capacity(),
        }
    }
}

fn default_max_block_size() -> u64 {
    30_000_000
}

fn default_block_time_window() -> usize {
    10
}

fn default_history_capacity() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_persistence_enabled")]
    pub enabled: bool,
    #[serde(default = "default_persistence_path")]
    pub path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: default_persistence_enabled(),
            path: default_persistence_path(),
        }
    }
}

fn default_persistence_enabled() -> bool {
    true
}

fn default_persistence_path() -> String {
    "data/processed_data.json".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (snapshots processed, fetch failures) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.upstream.chain_data_url.is_empty(),
            "upstream.chain_data_url must be non-empty"
        );
        anyhow::ensure!(
            self.upstream.request_timeout_secs > 0,
            "upstream.request_timeout_secs must be > 0, got {}",
            self.upstream.request_timeout_secs
        );
        anyhow::ensure!(
            self.aggregation.max_block_size > 0,
            "aggregation.max_block_size must be > 0, got {}",
            self.aggregation.max_block_size
        );
        anyhow::ensure!(
            self.aggregation.block_time_window > 0,
            "aggregation.block_time_window must be > 0, got {}",
            self.aggregation.block_time_window
        );
        anyhow::ensure!(
            self.aggregation.history_capacity > 0,
            "aggregation.history_capacity must be > 0, got {}",
            self.aggregation.history_capacity
        );
        anyhow::ensure!(
            !self.persistence.path.is_empty(),
            "persistence.path must be non-empty"
        );
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
