//! Bounded recent-history logs
//!
//! Each generation mode keeps its own newest-first log of at most
//! [`HISTORY_CAPACITY`] records in the shared list store. Appends go through
//! the store's atomic push-and-trim, so concurrent writers never evict more
//! than the overflow.

use crate::models::{HistoryKind, HistoryRecord};
use crate::store::ListStore;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, warn};

pub const HISTORY_CAPACITY: usize = 50;

#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn ListStore>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    /// Record `record` at the head of its kind's log, evicting the oldest
    /// entries beyond capacity. Returns the log length afterwards.
    pub async fn append(&self, record: &HistoryRecord) -> Result<usize> {
        let kind = record.kind();
        let encoded = record.encode()?;

        let length = self
            .store
            .push_capped(kind.store_key(), encoded, HISTORY_CAPACITY)
            .await?;

        debug!("Appended {} history record (log length {})", kind.as_str(), length);
        Ok(length)
    }

    /// Up to `limit` records (default and maximum [`HISTORY_CAPACITY`]),
    /// newest first. Entries that cannot be decoded are skipped and logged.
    pub async fn read_recent(
        &self,
        kind: HistoryKind,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRecord>> {
        let limit = limit.unwrap_or(HISTORY_CAPACITY).min(HISTORY_CAPACITY);
        let key = kind.store_key();
        let raw = self.store.range(key, limit).await?;
        let total = raw.len();

        let records: Vec<HistoryRecord> = raw
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match decode_entry(kind, entry) {
                Ok(record) => Some(record),
                Err(reason) => {
                    warn!("Skipping history entry {} in {}: {}", index, key, reason);
                    None
                }
            })
            .collect();

        if records.len() < total {
            warn!(
                "Read {} of {} entries from {}; {} could not be decoded",
                records.len(),
                total,
                key,
                total - records.len()
            );
        }

        Ok(records)
    }

    /// Empty one log. Clearing an empty log is a no-op.
    pub async fn clear(&self, kind: HistoryKind) -> Result<()> {
        self.store.delete(&[kind.store_key()]).await?;
        debug!("Cleared {} history", kind.as_str());
        Ok(())
    }

    /// Empty both logs with a single store command.
    pub async fn clear_all(&self) -> Result<()> {
        let keys = HistoryKind::ALL.map(HistoryKind::store_key);
        self.store.delete(&keys).await?;
        debug!("Cleared all history");
        Ok(())
    }
}

fn decode_entry(kind: HistoryKind, entry: &str) -> std::result::Result<HistoryRecord, String> {
    let record = HistoryRecord::decode(entry).map_err(|e| e.to_string())?;
    if record.kind() != kind {
        return Err(format!("found a {} record", record.kind().as_str()));
    }
    Ok(record)
}
