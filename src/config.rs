//! Transport bootstrap configuration, read from the environment

use std::env;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where the stream lives and what the two programs bind to
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Comma separated bootstrap servers
    pub brokers: String,

    /// Stream the producer writes and the consumer reads
    pub source_topic: String,

    /// Stream receiving orders that exhausted their retries
    pub dlq_topic: String,

    /// Consumer group of the pipeline
    pub group_id: String,

    /// Port of the /metrics and /health endpoints
    pub metrics_port: u16,

    /// Pause between two produced orders
    pub produce_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            source_topic: "orders".to_string(),
            dlq_topic: "orders-dlq".to_string(),
            group_id: "order-analytics-group".to_string(),
            metrics_port: 9090,
            produce_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(brokers) = lookup("ORDER_STREAM_BROKERS") {
            config.brokers = brokers;
        }

        if let Some(topic) = lookup("ORDER_STREAM_SOURCE_TOPIC") {
            config.source_topic = topic;
        }

        if let Some(topic) = lookup("ORDER_STREAM_DLQ_TOPIC") {
            config.dlq_topic = topic;
        }

        if let Some(group) = lookup("ORDER_STREAM_GROUP_ID") {
            config.group_id = group;
        }

        if let Some(port) = lookup("ORDER_STREAM_METRICS_PORT") {
            config.metrics_port = port.parse().map_err(|e| ConfigError::Invalid {
                var: "ORDER_STREAM_METRICS_PORT",
                reason: format!("{e}"),
            })?;
        }

        if let Some(ms) = lookup("ORDER_STREAM_PRODUCE_INTERVAL_MS") {
            let ms: u64 = ms.parse().map_err(|e| ConfigError::Invalid {
                var: "ORDER_STREAM_PRODUCE_INTERVAL_MS",
                reason: format!("{e}"),
            })?;
            config.produce_interval = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let non_empty = [
            ("ORDER_STREAM_BROKERS", &self.brokers),
            ("ORDER_STREAM_SOURCE_TOPIC", &self.source_topic),
            ("ORDER_STREAM_DLQ_TOPIC", &self.dlq_topic),
            ("ORDER_STREAM_GROUP_ID", &self.group_id),
        ];
        for (var, value) in non_empty {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var,
                    reason: "must not be empty".to_string(),
                });
            }
        }

        if self.source_topic == self.dlq_topic {
            return Err(ConfigError::Invalid {
                var: "ORDER_STREAM_DLQ_TOPIC",
                reason: "dead-letter topic must differ from the source topic".to_string(),
            });
        }

        Ok(())
    }
}
