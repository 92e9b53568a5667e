use std::time::Instant;

use axum::body::Body;
use axum::extract::{MatchedPath, Path, Query, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::{ApiError, PartitionInfo, PublishResponse, TailResponse, TopicDescription};
use crate::config::Config;
use crate::kafka::{RecordHeader, RecordPublisher, TailFetcher, TopicAdmin, TopicSummary};

#[derive(Clone)]
pub struct AppState {
    pub fetcher: TailFetcher,
    pub admin: TopicAdmin,
    pub publisher: RecordPublisher,
    pub config: Config,
}

pub fn router(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/_readiness", get(index))
        .route("/_liveness", get(|| std::future::ready("ok")))
        .route(
            "/metrics",
            get(move || match metrics {
                Some(ref recorder_handle) => std::future::ready(recorder_handle.render()),
                None => std::future::ready("no metrics recorder installed".to_owned()),
            }),
        )
        .route("/api/topics", get(list_topics).post(create_topic))
        .route(
            "/api/topics/:topic",
            get(describe_topic).delete(delete_topic),
        )
        .route(
            "/api/topics/:topic/records",
            get(tail_records).post(publish_record),
        )
        .layer(axum::middleware::from_fn(track_requests))
        .with_state(state)
}

async fn index() -> &'static str {
    "kafka inspector service"
}

async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let method = req.method().to_string();

    let response = next.run(req).await;

    let labels = [
        ("method", method),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_requests_duration_seconds", &labels).record(start.elapsed().as_secs_f64());

    response
}

async fn list_topics(State(state): State<AppState>) -> Result<Json<Vec<TopicSummary>>, ApiError> {
    let admin = state.admin.clone();
    let topics = tokio::task::spawn_blocking(move || admin.list_topics())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(topics))
}

#[derive(Debug, Deserialize)]
struct CreateTopicRequest {
    name: String,
    #[serde(default = "default_partitions")]
    num_partitions: i32,
    #[serde(default = "default_replication")]
    replication_factor: i32,
}

fn default_partitions() -> i32 {
    1
}

fn default_replication() -> i32 {
    1
}

async fn create_topic(
    State(state): State<AppState>,
    Json(req): Json<CreateTopicRequest>,
) -> Result<&'static str, ApiError> {
    if req.num_partitions <= 0 || req.replication_factor <= 0 {
        return Err(ApiError::InvalidTopicSpec);
    }

    state
        .admin
        .create_topic(&req.name, req.num_partitions, req.replication_factor)
        .await?;

    Ok("created")
}

async fn delete_topic(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<&'static str, ApiError> {
    state.admin.delete_topic(&topic).await?;
    Ok("deleted")
}

async fn describe_topic(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Json<TopicDescription>, ApiError> {
    let fetcher = state.fetcher.clone();
    let topic_for_fetch = topic.clone();
    let partitions = tokio::task::spawn_blocking(move || fetcher.describe_topic(&topic_for_fetch))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(TopicDescription {
        topic,
        partitions: partitions
            .into_iter()
            .map(|wm| PartitionInfo {
                id: wm.id,
                low_watermark: wm.low,
                high_watermark: wm.high,
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
struct PublishRequest {
    key: Option<String>,
    value: String,
    #[serde(default)]
    headers: Vec<PublishHeader>,
}

#[derive(Debug, Deserialize)]
struct PublishHeader {
    key: String,
    value: Option<String>,
}

/// Publish one record to the topic; the broker picks the partition. A missing
/// key gets a generated one so the record is still traceable.
async fn publish_record(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    let key = req.key.unwrap_or_else(|| Uuid::now_v7().to_string());
    let headers: Vec<RecordHeader> = req
        .headers
        .into_iter()
        .map(|h| RecordHeader {
            key: h.key,
            value: h.value,
        })
        .collect();

    info!(topic, key, "publish requested");

    let report = state
        .publisher
        .publish(&topic, &key, &req.value, &headers)
        .await?;

    Ok(Json(PublishResponse {
        topic,
        partition: report.partition,
        offset: report.offset,
    }))
}

#[derive(Debug, Deserialize)]
struct TailParams {
    count: Option<i64>,
}

/// Fetch roughly the most recent `count` records from every partition.
///
/// A fetch that hits the overall deadline still answers 200 with whatever was
/// collected; only metadata/assignment/fatal-broker failures become errors.
async fn tail_records(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Query(params): Query<TailParams>,
) -> Result<Json<TailResponse>, ApiError> {
    let count = params
        .count
        .unwrap_or(state.config.default_count_per_partition);
    if count < 1 || count > state.config.max_count_per_partition {
        return Err(ApiError::InvalidCount(state.config.max_count_per_partition));
    }

    info!(topic, count, "tail fetch requested");

    let fetcher = state.fetcher.clone();
    let overall_timeout = state.config.fetch_timeout();
    let topic_for_fetch = topic.clone();
    let records = tokio::task::spawn_blocking(move || {
        fetcher.fetch_tail(&topic_for_fetch, count, overall_timeout)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(TailResponse {
        topic,
        count_per_partition: count,
        returned: records.len(),
        records,
    }))
}
