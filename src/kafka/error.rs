use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use thiserror::Error;

/// Errors that abort a tail fetch.
///
/// These are the only failures callers ever see from the engine. A fetch that
/// hits the overall deadline with partitions still pending is a success with
/// partial results, not an error.
#[derive(Error, Debug)]
pub enum TailFetchError {
    /// Failed to create the underlying consumer
    #[error("failed to create consumer: {0}")]
    ConsumerCreation(#[source] KafkaError),

    /// Topic is absent from broker metadata, or carries a topic-level error
    #[error("topic '{0}' not found in broker metadata")]
    TopicNotFound(String),

    /// Broker did not answer the metadata query within the timeout
    #[error("timed out fetching metadata for topic '{topic}'")]
    MetadataTimeout {
        topic: String,
        #[source]
        source: KafkaError,
    },

    /// Metadata query failed for a reason other than a timeout
    #[error("metadata fetch failed for topic '{topic}': {source}")]
    Metadata {
        topic: String,
        #[source]
        source: KafkaError,
    },

    /// Failed to assign the consumer to the planned offsets
    #[error("failed to assign partitions: {0}")]
    AssignmentFailed(#[source] KafkaError),

    /// Broker signaled an unrecoverable error while polling; partial results
    /// are discarded
    #[error("fatal broker error while polling: {0}")]
    FatalBroker(#[source] KafkaError),
}

impl TailFetchError {
    /// Error type tag for metrics
    pub fn error_type(&self) -> &'static str {
        match self {
            TailFetchError::ConsumerCreation(_) => "consumer_creation",
            TailFetchError::TopicNotFound(_) => "topic_not_found",
            TailFetchError::MetadataTimeout { .. } => "metadata_timeout",
            TailFetchError::Metadata { .. } => "metadata",
            TailFetchError::AssignmentFailed(_) => "assignment_failed",
            TailFetchError::FatalBroker(_) => "fatal_broker",
        }
    }
}

/// Whether a poll-time error means the whole operation must abort.
///
/// librdkafka reports unrecoverable consumer states through the dedicated
/// fatal variant; authentication failures never heal on retry either.
pub fn is_fatal(err: &KafkaError) -> bool {
    match err {
        KafkaError::MessageConsumptionFatal(_) => true,
        KafkaError::Global(code) => matches!(
            code,
            RDKafkaErrorCode::Authentication | RDKafkaErrorCode::Fatal
        ),
        _ => false,
    }
}

/// Whether a metadata-path error is a broker timeout.
pub fn is_timeout(err: &KafkaError) -> bool {
    match err {
        KafkaError::MetadataFetch(code)
        | KafkaError::Global(code)
        | KafkaError::MessageConsumption(code) => matches!(
            code,
            RDKafkaErrorCode::RequestTimedOut | RDKafkaErrorCode::OperationTimedOut
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(is_fatal(&KafkaError::Global(
            RDKafkaErrorCode::Authentication
        )));
        assert!(is_fatal(&KafkaError::Global(RDKafkaErrorCode::Fatal)));
        assert!(!is_fatal(&KafkaError::Global(
            RDKafkaErrorCode::BrokerTransportFailure
        )));
        assert!(!is_fatal(&KafkaError::MessageConsumption(
            RDKafkaErrorCode::OperationTimedOut
        )));
        assert!(!is_fatal(&KafkaError::PartitionEOF(0)));
    }

    #[test]
    fn timeout_classification() {
        assert!(is_timeout(&KafkaError::MetadataFetch(
            RDKafkaErrorCode::RequestTimedOut
        )));
        assert!(is_timeout(&KafkaError::Global(
            RDKafkaErrorCode::OperationTimedOut
        )));
        assert!(!is_timeout(&KafkaError::MetadataFetch(
            RDKafkaErrorCode::AllBrokersDown
        )));
    }
}
