use std::time::Duration;

use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("failed to create admin client: {0}")]
    ClientCreation(#[source] KafkaError),

    #[error("metadata fetch failed: {0}")]
    Metadata(#[source] KafkaError),

    #[error("topic '{0}' already exists")]
    TopicAlreadyExists(String),

    #[error("admin operation failed for topic '{topic}': {code}")]
    Operation { topic: String, code: RDKafkaErrorCode },

    #[error(transparent)]
    Kafka(#[from] KafkaError),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TopicSummary {
    pub name: String,
    pub partition_count: usize,
}

/// Topic administration over the broker admin API.
///
/// A client is created per operation and dropped when it returns, matching
/// the connection lifecycle of the tail consumer.
#[derive(Clone)]
pub struct TopicAdmin {
    config: ClientConfig,
    operation_timeout: Duration,
}

impl TopicAdmin {
    pub fn new(config: ClientConfig, operation_timeout: Duration) -> Self {
        Self {
            config,
            operation_timeout,
        }
    }

    fn client(&self) -> Result<AdminClient<DefaultClientContext>, AdminError> {
        self.config.create().map_err(AdminError::ClientCreation)
    }

    /// All topics known to the cluster with their partition counts.
    pub fn list_topics(&self) -> Result<Vec<TopicSummary>, AdminError> {
        let client = self.client()?;
        let metadata = client
            .inner()
            .fetch_metadata(None, self.operation_timeout)
            .map_err(AdminError::Metadata)?;

        let mut topics: Vec<TopicSummary> = metadata
            .topics()
            .iter()
            .map(|t| TopicSummary {
                name: t.name().to_string(),
                partition_count: t.partitions().len(),
            })
            .collect();
        topics.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(topics)
    }

    pub async fn create_topic(
        &self,
        topic: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), AdminError> {
        let client = self.client()?;
        let new_topic = NewTopic::new(
            topic,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );
        let opts = AdminOptions::new().operation_timeout(Some(self.operation_timeout));

        let results = client.create_topics(&[new_topic], &opts).await?;
        for result in results {
            match result {
                Ok(name) => info!(topic = name, "created topic"),
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    return Err(AdminError::TopicAlreadyExists(name));
                }
                Err((name, code)) => {
                    return Err(AdminError::Operation { topic: name, code });
                }
            }
        }

        Ok(())
    }

    pub async fn delete_topic(&self, topic: &str) -> Result<(), AdminError> {
        let client = self.client()?;
        let opts = AdminOptions::new().operation_timeout(Some(self.operation_timeout));

        let results = client.delete_topics(&[topic], &opts).await?;
        for result in results {
            match result {
                Ok(name) => info!(topic = name, "deleted topic"),
                Err((name, code)) => {
                    return Err(AdminError::Operation { topic: name, code });
                }
            }
        }

        Ok(())
    }
}
