//! Draining world-state cursors into normalized result lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use lpl_state::{HistoryCursor, KeyModification, KeyValue, KeyValueCursor, StateCursor, StateResult};

use crate::error::LedgerResult;

/// A current record returned by a range scan or predicate query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryRecord {
    pub key: String,
    /// The stored value parsed as JSON, or the raw text when it is not JSON.
    pub record: Value,
}

/// One past write to a key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    pub value: Value,
}

/// Owns a cursor and closes it exactly once: explicitly through
/// [`CursorGuard::release`], or on drop if the drain stopped early.
pub struct CursorGuard<'a, T> {
    cursor: Option<Box<dyn StateCursor<Item = T> + 'a>>,
}

impl<'a, T> CursorGuard<'a, T> {
    pub fn new(cursor: Box<dyn StateCursor<Item = T> + 'a>) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    pub fn next_item(&mut self) -> StateResult<Option<T>> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.next_item(),
            None => Ok(None),
        }
    }

    /// Close the cursor, reporting any failure.
    pub fn release(mut self) -> StateResult<()> {
        match self.cursor.take() {
            Some(mut cursor) => cursor.close(),
            None => Ok(()),
        }
    }
}

impl<T> Drop for CursorGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            if let Err(e) = cursor.close() {
                warn!(error = %e, "failed to close cursor after aborted drain");
            }
        }
    }
}

/// Drain a key/value cursor into `{Key, Record}` entries.
pub fn collect_records(cursor: KeyValueCursor<'_>) -> LedgerResult<Vec<QueryRecord>> {
    drain(cursor, |KeyValue { key, value }| {
        Some(QueryRecord {
            record: parse_value(&key, &value)?,
            key,
        })
    })
}

/// Drain a history cursor into `{TxId, Timestamp, Value}` entries.
pub fn collect_history(cursor: HistoryCursor<'_>) -> LedgerResult<Vec<HistoryEntry>> {
    drain(cursor, |modification: KeyModification| {
        Some(HistoryEntry {
            value: parse_value(&modification.tx_id, &modification.value)?,
            tx_id: modification.tx_id,
            timestamp: modification.timestamp,
        })
    })
}

fn drain<T, U>(
    cursor: Box<dyn StateCursor<Item = T> + '_>,
    mut normalize: impl FnMut(T) -> Option<U>,
) -> LedgerResult<Vec<U>> {
    let mut guard = CursorGuard::new(cursor);
    let mut results = Vec::new();
    while let Some(item) = guard.next_item()? {
        if let Some(entry) = normalize(item) {
            results.push(entry);
        }
    }
    guard.release()?;
    Ok(results)
}

/// `None` for empty values, which carry no record.
fn parse_value(origin: &str, bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => {
            trace!(origin, "collected entry");
            Some(value)
        }
        Err(e) => {
            warn!(origin, error = %e, "stored value is not JSON; keeping raw text");
            Some(Value::String(String::from_utf8_lossy(bytes).into_owned()))
        }
    }
}
