use chrono::{DateTime, Utc};

use crate::error::StateResult;
use crate::types::{KeyModification, KeyValue};

/// A lazily evaluated result set returned by the world state.
///
/// Cursors hold backend resources (iterators, snapshots) until closed.
/// Callers must call [`StateCursor::close`] exactly once when done, whether or
/// not the cursor was drained.
pub trait StateCursor {
    type Item;

    /// Fetch the next entry. `Ok(None)` means the cursor is exhausted.
    fn next_item(&mut self) -> StateResult<Option<Self::Item>>;

    /// Release the cursor's resources.
    fn close(&mut self) -> StateResult<()>;
}

/// Cursor over current `{key, value}` pairs.
pub type KeyValueCursor<'a> = Box<dyn StateCursor<Item = KeyValue> + 'a>;

/// Cursor over the past values of a single key.
pub type HistoryCursor<'a> = Box<dyn StateCursor<Item = KeyModification> + 'a>;

/// The world-state ledger: a key-value space with range scans, predicate
/// queries and per-key history.
///
/// Implementations must satisfy these invariants:
/// - `get_state` of an absent key is `Ok(None)`, never an error.
/// - `put_state` fully replaces the value under the key.
/// - Range and history cursors yield entries in key order and write order
///   respectively.
/// - Conflict detection between concurrent invocations is the
///   implementation's responsibility; callers never lock.
pub trait WorldState: Send + Sync {
    /// Read the current value under `key`.
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Write `value` under `key`.
    fn put_state(&self, key: &str, value: &[u8]) -> StateResult<()>;

    /// Scan `[start_key, end_key)`. An empty bound is open-ended.
    fn state_by_range(&self, start_key: &str, end_key: &str) -> StateResult<KeyValueCursor<'_>>;

    /// Execute a predicate query of the form `{"selector": {...}}`.
    ///
    /// Only state databases with rich-query support implement this; others
    /// return [`crate::StateError::Unsupported`].
    fn query_result(&self, query: &str) -> StateResult<KeyValueCursor<'_>>;

    /// Every value ever written under `key`, oldest first.
    fn history_for_key(&self, key: &str) -> StateResult<HistoryCursor<'_>>;

    /// Timestamp of the invocation currently executing. All peers see the
    /// same value for the same invocation.
    fn tx_timestamp(&self) -> DateTime<Utc>;

    /// Whether a non-empty value is stored under `key`.
    fn state_exists(&self, key: &str) -> StateResult<bool> {
        Ok(self
            .get_state(key)?
            .is_some_and(|value| !value.is_empty()))
    }
}
