use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug)]
pub struct ScribeConfig {
    #[serde(default = "defaults::journal_dir")]
    pub journal_dir: String,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
    /// Producer step period in 100 µs ticks.
    #[serde(default = "defaults::producer_period_ticks")]
    pub producer_period_ticks: u32,
    /// Total records the demo producer emits before stopping.
    #[serde(default = "defaults::record_count")]
    pub record_count: u64,
    #[serde(default = "defaults::fsync_on_commit")]
    pub fsync_on_commit: bool,
    #[serde(default = "defaults::max_batch_bytes")]
    pub max_batch_bytes: usize,
    #[serde(default = "defaults::rotate_bytes")]
    pub rotate_bytes: u64,
    /// Heartbeat staleness alarm threshold, in ticks.
    #[serde(default = "defaults::heartbeat_stale_ticks")]
    pub heartbeat_stale_ticks: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

mod defaults {
    pub fn journal_dir() -> String {
        "/tmp/scribe_journal".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn producer_period_ticks() -> u32 {
        10 // 1 ms
    }

    pub fn record_count() -> u64 {
        100_000
    }

    pub fn fsync_on_commit() -> bool {
        false
    }

    pub fn max_batch_bytes() -> usize {
        16 * 1024
    }

    pub fn rotate_bytes() -> u64 {
        64 * 1024 * 1024
    }

    pub fn heartbeat_stale_ticks() -> u32 {
        10_000 // 1 s
    }
}

impl Default for ScribeConfig {
    fn default() -> Self {
        toml::from_str("").expect("defaults must deserialize")
    }
}

impl ScribeConfig {
    pub fn load(path: impl AsRef<Path> + ToString) -> Result<Self, ConfigError> {
        let toml_to_str = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: ScribeConfig = toml::from_str(&toml_to_str)?;
        Ok(config)
    }
}
