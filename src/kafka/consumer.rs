use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Headers, Message};
use rdkafka::{Offset, TopicPartitionList};
use tracing::warn;

use super::error::{is_timeout, TailFetchError};
use super::types::{PartitionWatermarks, RecordHeader, TailRecord};

/// One event out of the reader's poll call.
#[derive(Debug)]
pub enum ReaderEvent {
    Record(TailRecord),
    EndOfPartition(i32),
    /// Unrecoverable broker error; the operation must abort
    Fatal(KafkaError),
    /// Transient broker error; logged by the poll loop and ignored
    NonFatal(KafkaError),
}

/// The broker-facing capability the tail-fetch engine drives.
///
/// Mirrors the consumed collaborator surface: watermark metadata, direct
/// partition assignment, and a polled event stream. Closing is dropping.
/// The production implementation wraps one `BaseConsumer`; tests script a
/// fake.
pub trait TailConsumer {
    fn list_partitions_with_watermarks(
        &self,
        topic: &str,
        timeout: Duration,
    ) -> Result<Vec<PartitionWatermarks>, TailFetchError>;

    fn assign(&self, topic: &str, offsets: &[(i32, i64)]) -> Result<(), TailFetchError>;

    fn poll(&self, timeout: Duration) -> Option<ReaderEvent>;
}

/// rdkafka-backed tail consumer, created fresh for each fetch invocation.
///
/// A fresh consumer per call guarantees fresh metadata (no stale cached
/// watermarks) and that the connection is closed on every exit path when the
/// value is dropped.
pub struct KafkaTailConsumer {
    inner: BaseConsumer,
}

impl KafkaTailConsumer {
    pub fn new(config: &ClientConfig) -> Result<Self, TailFetchError> {
        let inner: BaseConsumer = config.create().map_err(TailFetchError::ConsumerCreation)?;
        Ok(Self { inner })
    }
}

impl TailConsumer for KafkaTailConsumer {
    fn list_partitions_with_watermarks(
        &self,
        topic: &str,
        timeout: Duration,
    ) -> Result<Vec<PartitionWatermarks>, TailFetchError> {
        let metadata = self
            .inner
            .fetch_metadata(Some(topic), timeout)
            .map_err(|e| {
                if is_timeout(&e) {
                    TailFetchError::MetadataTimeout {
                        topic: topic.to_string(),
                        source: e,
                    }
                } else {
                    TailFetchError::Metadata {
                        topic: topic.to_string(),
                        source: e,
                    }
                }
            })?;

        let topic_metadata = metadata
            .topics()
            .iter()
            .find(|t| t.name() == topic)
            .ok_or_else(|| TailFetchError::TopicNotFound(topic.to_string()))?;

        // Brokers auto-create missing topics in some configurations and answer
        // with a topic-level error instead of omitting the entry.
        if topic_metadata.error().is_some() {
            return Err(TailFetchError::TopicNotFound(topic.to_string()));
        }

        let mut partitions = Vec::with_capacity(topic_metadata.partitions().len());
        for partition in topic_metadata.partitions() {
            if let Some(err) = partition.error() {
                warn!(
                    topic,
                    partition = partition.id(),
                    error = ?err,
                    "skipping partition with metadata error"
                );
                continue;
            }

            match self.inner.fetch_watermarks(topic, partition.id(), timeout) {
                Ok((low, high)) => {
                    partitions.push(PartitionWatermarks::new(partition.id(), low, high));
                }
                Err(e) => {
                    // Process the remaining partitions; a single unreachable
                    // leader should not fail the whole fetch.
                    warn!(
                        topic,
                        partition = partition.id(),
                        error = %e,
                        "failed to query watermarks, skipping partition"
                    );
                }
            }
        }

        Ok(partitions)
    }

    fn assign(&self, topic: &str, offsets: &[(i32, i64)]) -> Result<(), TailFetchError> {
        let mut tpl = TopicPartitionList::new();
        for &(partition, offset) in offsets {
            tpl.add_partition_offset(topic, partition, Offset::Offset(offset))
                .map_err(TailFetchError::AssignmentFailed)?;
        }

        self.inner
            .assign(&tpl)
            .map_err(TailFetchError::AssignmentFailed)
    }

    fn poll(&self, timeout: Duration) -> Option<ReaderEvent> {
        match self.inner.poll(timeout)? {
            Ok(message) => Some(ReaderEvent::Record(to_tail_record(&message))),
            Err(KafkaError::PartitionEOF(partition)) => {
                Some(ReaderEvent::EndOfPartition(partition))
            }
            Err(e) if super::error::is_fatal(&e) => Some(ReaderEvent::Fatal(e)),
            Err(e) => Some(ReaderEvent::NonFatal(e)),
        }
    }
}

fn to_tail_record(message: &BorrowedMessage<'_>) -> TailRecord {
    let headers = message
        .headers()
        .map(|headers| {
            (0..headers.count())
                .map(|i| {
                    let header = headers.get(i);
                    RecordHeader {
                        key: header.key.to_string(),
                        value: header
                            .value
                            .map(|v| String::from_utf8_lossy(v).into_owned()),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    TailRecord {
        topic: message.topic().to_string(),
        partition: message.partition(),
        offset: message.offset(),
        timestamp_ms: message.timestamp().to_millis(),
        key: message
            .key()
            .map(|k| String::from_utf8_lossy(k).into_owned()),
        value: message
            .payload()
            .map(|v| String::from_utf8_lossy(v).into_owned()),
        headers,
    }
}
