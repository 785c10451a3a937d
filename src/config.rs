use crate::engine::PositionEncoder;

pub const DEFAULT_NUM_SKIP: usize = 12;
pub const DEFAULT_LOG_FILTER: &str = "pgn_posgraph=info";

/// Indexing configuration parsed from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Separates a reachable-square term from its weight.
    pub payload_delim: char,
    /// Full moves at the start of every game left out of the index.
    pub num_skip: usize,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            payload_delim: lookup("PGN_PAYLOAD_DELIM")
                .and_then(|v| v.chars().next())
                .unwrap_or(defaults.payload_delim),
            num_skip: lookup("PGN_NUM_SKIP")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.num_skip),
            log_filter: lookup("RUST_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }

    /// Encoder writing with this configuration's payload delimiter.
    pub fn encoder(&self) -> PositionEncoder {
        PositionEncoder::new(self.payload_delim)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            payload_delim: PositionEncoder::DEFAULT_DELIMITER,
            num_skip: DEFAULT_NUM_SKIP,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
