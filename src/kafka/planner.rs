use std::collections::BTreeMap;

use super::types::{FetchPlan, PartitionWatermarks};

/// Compute the per-partition fetch window for a tail fetch.
///
/// For each partition the ideal start is `high - count_per_partition`, clamped
/// to the low watermark and to zero. Partitions with nothing to fetch (empty,
/// or fully truncated below the window) are excluded entirely: they get no
/// assignment and are never polled.
pub fn plan(
    partitions: &[PartitionWatermarks],
    count_per_partition: i64,
) -> BTreeMap<i32, FetchPlan> {
    let mut plans = BTreeMap::new();

    for wm in partitions {
        let target_start = wm.high - count_per_partition;
        let seek_offset = target_start.max(wm.low).max(0);
        let expected = (wm.high - seek_offset).max(0);

        if expected == 0 {
            continue;
        }

        plans.insert(
            wm.id,
            FetchPlan {
                seek_offset,
                expected,
                high: wm.high,
            },
        );
    }

    plans
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0, 50, 20, 30, 20; "full window inside retained range")]
    #[test_case(0, 10, 20, 0, 10; "partition holds fewer than requested")]
    #[test_case(40, 50, 20, 40, 10; "window clamped to low watermark")]
    #[test_case(0, 1, 1, 0, 1; "single record")]
    #[test_case(100, 250, 50, 200, 50; "compacted log with nonzero low")]
    fn plans_single_partition(low: i64, high: i64, count: i64, seek: i64, expected: i64) {
        let plans = plan(&[PartitionWatermarks::new(0, low, high)], count);

        let p = plans.get(&0).expect("partition should be planned");
        assert_eq!(p.seek_offset, seek);
        assert_eq!(p.expected, expected);
        assert_eq!(p.high, high);
    }

    #[test_case(0, 0; "empty partition")]
    #[test_case(50, 50; "fully truncated partition")]
    fn excludes_partition_with_nothing_to_fetch(low: i64, high: i64) {
        let plans = plan(&[PartitionWatermarks::new(0, low, high)], 20);
        assert!(plans.is_empty());
    }

    #[test]
    fn zero_partitions_is_empty_plan() {
        assert!(plan(&[], 20).is_empty());
    }

    #[test]
    fn worked_example_from_mixed_topic() {
        // Partition 0 holds 50 records, partition 1 only 10; ask for 20 each.
        let plans = plan(
            &[
                PartitionWatermarks::new(0, 0, 50),
                PartitionWatermarks::new(1, 0, 10),
            ],
            20,
        );

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[&0].seek_offset, 30);
        assert_eq!(plans[&0].expected, 20);
        assert_eq!(plans[&1].seek_offset, 0);
        assert_eq!(plans[&1].expected, 10);
        assert_eq!(plans.values().map(|p| p.expected).sum::<i64>(), 30);
    }

    #[test]
    fn mixed_empty_and_nonempty_partitions() {
        let plans = plan(
            &[
                PartitionWatermarks::new(0, 0, 0),
                PartitionWatermarks::new(1, 3, 7),
            ],
            5,
        );

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[&1].seek_offset, 3);
        assert_eq!(plans[&1].expected, 4);
    }

    #[test]
    fn expected_never_exceeds_requested_count() {
        let plans = plan(&[PartitionWatermarks::new(0, 0, 1_000_000)], 100);
        assert_eq!(plans[&0].expected, 100);
        assert_eq!(plans[&0].seek_offset, 999_900);
    }
}
