pub mod api;
pub mod config;
pub mod kafka;
pub mod router;

pub use config::Config;
pub use kafka::{RecordPublisher, TailFetchError, TailFetcher, TailRecord, TopicAdmin};
