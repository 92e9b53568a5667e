use serde::Serialize;

/// Low/high watermark snapshot for one partition, taken once at plan time.
///
/// `low` is the oldest retained offset, `high` is one past the newest. The
/// snapshot is deliberately not refreshed while polling: records produced
/// after planning must not inflate the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionWatermarks {
    pub id: i32,
    pub low: i64,
    pub high: i64,
}

impl PartitionWatermarks {
    pub fn new(id: i32, low: i64, high: i64) -> Self {
        Self { id, low, high }
    }
}

/// Computed fetch window for one partition.
///
/// Invariants: `low <= seek_offset`, `expected = high - seek_offset > 0`.
/// Partitions with nothing to fetch never get a plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    pub seek_offset: i64,
    pub expected: i64,
    /// High watermark captured at plan time; the accept bound during polling.
    pub high: i64,
}

/// A fully materialized record as returned to callers.
///
/// Key, value and header values are decoded lossily as UTF-8, matching what
/// the inspection UI displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TailRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub timestamp_ms: Option<i64>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub headers: Vec<RecordHeader>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordHeader {
    pub key: String,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_record_serializes_for_the_api() {
        let record = TailRecord {
            topic: "orders".to_string(),
            partition: 2,
            offset: 41,
            timestamp_ms: Some(1_700_000_000_000),
            key: Some("order-7".to_string()),
            value: Some(r#"{"total": 12}"#.to_string()),
            headers: vec![RecordHeader {
                key: "trace-id".to_string(),
                value: Some("abc".to_string()),
            }],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["topic"], "orders");
        assert_eq!(json["partition"], 2);
        assert_eq!(json["offset"], 41);
        assert_eq!(json["headers"][0]["key"], "trace-id");
    }
}
