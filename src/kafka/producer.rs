use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use thiserror::Error;
use tracing::info;

use super::types::RecordHeader;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("failed to create producer: {0}")]
    ClientCreation(#[source] KafkaError),

    #[error("delivery to topic '{topic}' failed: {source}")]
    Delivery {
        topic: String,
        #[source]
        source: KafkaError,
    },
}

/// Where the broker placed a published record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub partition: i32,
    pub offset: i64,
}

/// Publishes single records, letting the broker pick the partition.
///
/// A producer is created per publish and dropped once delivery is confirmed,
/// matching the connection lifecycle of the tail consumer and the admin
/// client.
#[derive(Clone)]
pub struct RecordPublisher {
    config: ClientConfig,
    delivery_timeout: Duration,
}

impl RecordPublisher {
    pub fn new(config: ClientConfig, delivery_timeout: Duration) -> Self {
        Self {
            config,
            delivery_timeout,
        }
    }

    /// Publish one record and wait for the broker's delivery confirmation.
    pub async fn publish(
        &self,
        topic: &str,
        key: &str,
        value: &str,
        headers: &[RecordHeader],
    ) -> Result<DeliveryReport, PublishError> {
        let producer: FutureProducer = self
            .config
            .create()
            .map_err(PublishError::ClientCreation)?;

        let mut record = FutureRecord::to(topic).key(key).payload(value);
        if !headers.is_empty() {
            let mut owned = OwnedHeaders::new();
            for header in headers {
                owned = owned.insert(Header {
                    key: &header.key,
                    value: header.value.as_deref(),
                });
            }
            record = record.headers(owned);
        }

        let (partition, offset) = producer
            .send(record, Timeout::After(self.delivery_timeout))
            .await
            .map_err(|(e, _)| PublishError::Delivery {
                topic: topic.to_string(),
                source: e,
            })?;

        info!(topic, partition, offset, "published record");
        Ok(DeliveryReport { partition, offset })
    }
}
