// Kafka module - watermark-planned tail fetching, publishing and topic
// administration
pub mod admin;
pub mod collector;
pub mod config;
pub mod consumer;
pub mod error;
pub mod planner;
pub mod producer;
pub mod tail_fetcher;
pub mod types;

// Public API
pub use admin::{AdminError, TopicAdmin, TopicSummary};
pub use config::ClientConfigBuilder;
pub use error::TailFetchError;
pub use producer::{DeliveryReport, PublishError, RecordPublisher};
pub use tail_fetcher::TailFetcher;
pub use types::{PartitionWatermarks, RecordHeader, TailRecord};
