use super::types::TailRecord;

/// Accumulates accepted records and materializes the final ordered list.
///
/// The output order is partition-descending, then offset-descending. Callers
/// depend on it; do not change it to something more intuitive without a
/// product decision.
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: Vec<TailRecord>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TailRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_sorted(mut self) -> Vec<TailRecord> {
        self.records.sort_by(|a, b| {
            b.partition
                .cmp(&a.partition)
                .then(b.offset.cmp(&a.offset))
        });
        self.records
    }
}
