use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::kafka::{AdminError, PublishError, TailFetchError, TailRecord};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    TailFetch(#[from] TailFetchError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("count must be between 1 and {0}")]
    InvalidCount(i64),

    #[error("num_partitions and replication_factor must be positive")]
    InvalidTopicSpec,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::TailFetch(TailFetchError::TopicNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::TailFetch(TailFetchError::MetadataTimeout { .. }) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ApiError::TailFetch(_) => StatusCode::BAD_GATEWAY,

            ApiError::Admin(AdminError::TopicAlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Admin(_) => StatusCode::BAD_GATEWAY,

            ApiError::Publish(_) => StatusCode::BAD_GATEWAY,

            ApiError::InvalidCount(_) | ApiError::InvalidTopicSpec => StatusCode::BAD_REQUEST,

            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct TailResponse {
    pub topic: String,
    pub count_per_partition: i64,
    pub returned: usize,
    pub records: Vec<TailRecord>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct PartitionInfo {
    pub id: i32,
    pub low_watermark: i64,
    pub high_watermark: i64,
}

#[derive(Debug, Serialize)]
pub struct TopicDescription {
    pub topic: String,
    pub partitions: Vec<PartitionInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::TailFetch(TailFetchError::TopicNotFound("t".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Admin(AdminError::TopicAlreadyExists("t".to_string())),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Publish(PublishError::Delivery {
                    topic: "t".to_string(),
                    source: rdkafka::error::KafkaError::MessageProduction(
                        rdkafka::types::RDKafkaErrorCode::MessageTimedOut,
                    ),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::InvalidCount(1000), StatusCode::BAD_REQUEST),
            (
                ApiError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
