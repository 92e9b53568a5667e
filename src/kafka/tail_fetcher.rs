//! Bounded multi-partition tail fetch.
//!
//! Given a topic and a desired record count per partition, returns roughly the
//! most recent N records from every partition in bounded wall-clock time. The
//! engine never scans the full log and never joins a consumer group: it plans
//! seek offsets from a one-time watermark snapshot, assigns the consumer
//! directly, and polls until every partition is satisfied or exhausted, or the
//! overall deadline passes. A deadline with partitions still pending is a
//! partial success, not an error.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use rdkafka::config::ClientConfig;
use tracing::{debug, info, warn};

use super::collector::ResultCollector;
use super::consumer::{KafkaTailConsumer, ReaderEvent, TailConsumer};
use super::error::TailFetchError;
use super::planner::plan;
use super::types::{FetchPlan, PartitionWatermarks, TailRecord};

/// Metric name for tail fetch duration histogram
pub const TAIL_FETCH_DURATION_HISTOGRAM: &str = "inspector_tail_fetch_duration_ms";
/// Metric name for tail fetch errors counter
pub const TAIL_FETCH_ERROR_COUNTER: &str = "inspector_tail_fetch_errors";

/// Per-partition progress within one fetch operation.
///
/// `Satisfied` and `Exhausted` are terminal: once either is reached, no
/// further records are accepted for that partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollPhase {
    Pending { collected: i64 },
    Satisfied,
    Exhausted,
}

impl PollPhase {
    fn is_terminal(&self) -> bool {
        !matches!(self, PollPhase::Pending { .. })
    }
}

/// One-shot tail fetcher over an assign-only consumer.
///
/// Cheap to clone; each `fetch_tail` call creates a fresh consumer that is
/// dropped on every exit path, so connections are never shared or pooled
/// across calls.
#[derive(Clone)]
pub struct TailFetcher {
    config: ClientConfig,
    metadata_timeout: Duration,
    poll_timeout: Duration,
}

impl TailFetcher {
    /// The metadata timeout bounds the partition/watermark queries; the poll
    /// timeout bounds each individual poll call so the loop can re-check the
    /// overall deadline between broker responses.
    pub fn new(config: ClientConfig, metadata_timeout: Duration, poll_timeout: Duration) -> Self {
        Self {
            config,
            metadata_timeout,
            poll_timeout,
        }
    }

    /// Fetch approximately the most recent `count_per_partition` records from
    /// every partition of `topic`, bounded by `overall_timeout`.
    pub fn fetch_tail(
        &self,
        topic: &str,
        count_per_partition: i64,
        overall_timeout: Duration,
    ) -> Result<Vec<TailRecord>, TailFetchError> {
        let start = Instant::now();

        let result = KafkaTailConsumer::new(&self.config).and_then(|consumer| {
            self.fetch_with(&consumer, topic, count_per_partition, overall_timeout)
        });

        match &result {
            Ok(records) => {
                debug!(topic, returned = records.len(), "tail fetch finished");
            }
            Err(e) => {
                counter!(
                    TAIL_FETCH_ERROR_COUNTER,
                    "topic" => topic.to_string(),
                    "error_type" => e.error_type()
                )
                .increment(1);
            }
        }
        histogram!(TAIL_FETCH_DURATION_HISTOGRAM, "topic" => topic.to_string())
            .record(start.elapsed().as_millis() as f64);

        result
    }

    /// Snapshot of per-partition watermarks, as served by the describe API.
    pub fn describe_topic(&self, topic: &str) -> Result<Vec<PartitionWatermarks>, TailFetchError> {
        let consumer = KafkaTailConsumer::new(&self.config)?;
        consumer.list_partitions_with_watermarks(topic, self.metadata_timeout)
    }

    fn fetch_with<C: TailConsumer>(
        &self,
        consumer: &C,
        topic: &str,
        count_per_partition: i64,
        overall_timeout: Duration,
    ) -> Result<Vec<TailRecord>, TailFetchError> {
        let partitions =
            consumer.list_partitions_with_watermarks(topic, self.metadata_timeout)?;
        if partitions.is_empty() {
            info!(topic, "topic has no partitions, returning empty result");
            return Ok(Vec::new());
        }

        let plans = plan(&partitions, count_per_partition);
        if plans.is_empty() {
            info!(topic, "no partition has records to fetch");
            return Ok(Vec::new());
        }

        let offsets: Vec<(i32, i64)> = plans
            .iter()
            .map(|(&partition, p)| (partition, p.seek_offset))
            .collect();
        consumer.assign(topic, &offsets)?;
        debug!(topic, assignments = ?offsets, "assigned tail consumer");

        self.poll_loop(consumer, topic, &plans, overall_timeout)
    }

    fn poll_loop<C: TailConsumer>(
        &self,
        consumer: &C,
        topic: &str,
        plans: &BTreeMap<i32, FetchPlan>,
        overall_timeout: Duration,
    ) -> Result<Vec<TailRecord>, TailFetchError> {
        let mut states: BTreeMap<i32, PollPhase> = plans
            .keys()
            .map(|&p| (p, PollPhase::Pending { collected: 0 }))
            .collect();
        let mut collector = ResultCollector::new();

        let start = Instant::now();
        while states.values().any(|s| !s.is_terminal()) && start.elapsed() < overall_timeout {
            let Some(event) = consumer.poll(self.poll_timeout) else {
                // Quiet broker; loop around to re-check the deadline.
                continue;
            };

            match event {
                ReaderEvent::Record(record) => {
                    accept_record(record, plans, &mut states, &mut collector);
                }
                ReaderEvent::EndOfPartition(partition) => {
                    // Terminal even when the quota was not met: the partition
                    // simply holds fewer records than requested.
                    if let Some(state) = states.get_mut(&partition) {
                        debug!(topic, partition, "reached end of partition");
                        *state = PollPhase::Exhausted;
                    }
                }
                ReaderEvent::Fatal(e) => {
                    return Err(TailFetchError::FatalBroker(e));
                }
                ReaderEvent::NonFatal(e) => {
                    warn!(topic, error = %e, "non-fatal consumer error, continuing");
                }
            }
        }

        if states.values().any(|s| !s.is_terminal()) {
            let expected: Vec<(i32, i64)> =
                plans.iter().map(|(&p, plan)| (p, plan.expected)).collect();
            warn!(
                topic,
                collected = collector.len(),
                states = ?states,
                expected = ?expected,
                "tail fetch hit overall deadline, returning partial result"
            );
        }

        Ok(collector.into_sorted())
    }
}

fn accept_record(
    record: TailRecord,
    plans: &BTreeMap<i32, FetchPlan>,
    states: &mut BTreeMap<i32, PollPhase>,
    collector: &mut ResultCollector,
) {
    let partition = record.partition;
    let (Some(plan), Some(state)) = (plans.get(&partition), states.get_mut(&partition)) else {
        // Direct assignment should make this impossible.
        warn!(partition, "record from unplanned partition, ignoring");
        return;
    };

    let PollPhase::Pending { collected } = *state else {
        debug!(
            partition,
            offset = record.offset,
            "record for terminal partition, ignoring"
        );
        return;
    };

    // Bound against the plan-time watermark: records produced after planning
    // must not inflate the result.
    if record.offset >= plan.high {
        debug!(
            partition,
            offset = record.offset,
            high = plan.high,
            "record at or beyond plan-time high watermark, ignoring"
        );
        return;
    }

    collector.push(record);
    let collected = collected + 1;
    *state = if collected >= plan.expected {
        PollPhase::Satisfied
    } else {
        PollPhase::Pending { collected }
    };
}
