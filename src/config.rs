use std::time::Duration;

use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(default = "localhost:9092")]
    pub kafka_hosts: String,

    #[envconfig(default = "false")]
    pub kafka_tls: bool,

    // Required by rdkafka even though the tail consumer never joins a group
    #[envconfig(default = "kafka-inspector")]
    pub kafka_consumer_group: String,

    // Timeout for individual metadata/watermark queries
    #[envconfig(default = "5000")]
    pub metadata_timeout_ms: u64,

    // Timeout for each poll call; the fetch deadline is re-checked in between
    #[envconfig(default = "1000")]
    pub poll_timeout_ms: u64,

    // Max duration of one whole tail fetch
    #[envconfig(default = "20")]
    pub fetch_timeout_secs: u64,

    #[envconfig(default = "5")]
    pub admin_timeout_secs: u64,

    // Max wait for one publish delivery confirmation
    #[envconfig(default = "10")]
    pub publish_timeout_secs: u64,

    #[envconfig(default = "10")]
    pub default_count_per_partition: i64,

    #[envconfig(default = "1000")]
    pub max_count_per_partition: i64,

    #[envconfig(from = "BIND_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "BIND_PORT", default = "3030")]
    pub port: u16,

    #[envconfig(default = "true")]
    pub export_prometheus: bool,
}

impl Config {
    pub fn init_with_defaults() -> Result<Self, envconfig::Error> {
        Self::init_from_env()
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn admin_timeout(&self) -> Duration {
        Duration::from_secs(self.admin_timeout_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
