use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StateError, StateResult};
use crate::selector::QueryString;
use crate::traits::{HistoryCursor, KeyValueCursor, StateCursor, WorldState};
use crate::types::{KeyModification, KeyValue, VecCursor};

/// In-memory world state for tests, local simulation and embedding.
///
/// Every write is applied immediately and recorded in the key's history under
/// a fresh transaction id. Predicate queries are evaluated by scanning the
/// keyspace and parsing each value as JSON.
pub struct InMemoryWorldState {
    inner: RwLock<StateInner>,
    open_cursors: Arc<AtomicUsize>,
}

#[derive(Default)]
struct StateInner {
    current: BTreeMap<String, Vec<u8>>,
    history: HashMap<String, Vec<KeyModification>>,
    fixed_timestamp: Option<DateTime<Utc>>,
    read_only: bool,
    rich_queries_disabled: bool,
}

impl InMemoryWorldState {
    /// Create a new empty world state.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StateInner::default()),
            open_cursors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Pin [`WorldState::tx_timestamp`] (and history timestamps) to `at`.
    pub fn with_fixed_timestamp(self, at: DateTime<Utc>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.fixed_timestamp = Some(at);
        }
        self
    }

    /// Behave like a state database without rich-query support.
    pub fn without_rich_queries(self) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.rich_queries_disabled = true;
        }
        self
    }

    /// Reject (or accept again) all writes.
    pub fn set_read_only(&self, read_only: bool) -> StateResult<()> {
        self.write()?.read_only = read_only;
        Ok(())
    }

    /// Change the pinned invocation timestamp.
    pub fn set_timestamp(&self, at: DateTime<Utc>) -> StateResult<()> {
        self.write()?.fixed_timestamp = Some(at);
        Ok(())
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.current.len()).unwrap_or(0)
    }

    /// Returns `true` if no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn read(&self) -> StateResult<RwLockReadGuard<'_, StateInner>> {
        self.inner
            .read()
            .map_err(|_| StateError::Backend("world state lock poisoned".into()))
    }

    fn write(&self) -> StateResult<RwLockWriteGuard<'_, StateInner>> {
        self.inner
            .write()
            .map_err(|_| StateError::Backend("world state lock poisoned".into()))
    }

    fn cursor<T: 'static>(&self, items: Vec<T>) -> Box<dyn StateCursor<Item = T>> {
        Box::new(VecCursor::tracked(items, Arc::clone(&self.open_cursors)))
    }
}

impl Default for InMemoryWorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState for InMemoryWorldState {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(self.read()?.current.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StateResult<()> {
        if key.is_empty() {
            return Err(StateError::EmptyKey);
        }
        let mut inner = self.write()?;
        if inner.read_only {
            return Err(StateError::ReadOnly);
        }
        let modification = KeyModification {
            tx_id: Uuid::now_v7().simple().to_string(),
            timestamp: inner.fixed_timestamp.unwrap_or_else(Utc::now),
            value: value.to_vec(),
            is_delete: false,
        };
        debug!(key, tx_id = %modification.tx_id, len = value.len(), "put state");
        inner.current.insert(key.to_string(), value.to_vec());
        inner
            .history
            .entry(key.to_string())
            .or_default()
            .push(modification);
        Ok(())
    }

    fn state_by_range(&self, start_key: &str, end_key: &str) -> StateResult<KeyValueCursor<'_>> {
        let inner = self.read()?;
        let lower = if start_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start_key.to_string())
        };
        let upper = if end_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end_key.to_string())
        };
        // BTreeMap::range panics on an inverted range.
        let inverted = !start_key.is_empty() && !end_key.is_empty() && start_key >= end_key;
        let items = if inverted {
            Vec::new()
        } else {
            inner
                .current
                .range::<String, _>((lower, upper))
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        };
        Ok(self.cursor(items))
    }

    fn query_result(&self, query: &str) -> StateResult<KeyValueCursor<'_>> {
        let inner = self.read()?;
        if inner.rich_queries_disabled {
            return Err(StateError::Unsupported("rich queries"));
        }
        let query = QueryString::from_json(query)?;
        let items = inner
            .current
            .iter()
            .filter(|(_, value)| {
                serde_json::from_slice::<serde_json::Value>(value)
                    .map(|record| query.selector.matches(&record))
                    .unwrap_or(false)
            })
            .map(|(key, value)| KeyValue {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        Ok(self.cursor(items))
    }

    fn history_for_key(&self, key: &str) -> StateResult<HistoryCursor<'_>> {
        let items = self.read()?.history.get(key).cloned().unwrap_or_default();
        Ok(self.cursor(items))
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.read()
            .ok()
            .and_then(|inner| inner.fixed_timestamp)
            .unwrap_or_else(Utc::now)
    }
}

impl std::fmt::Debug for InMemoryWorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWorldState")
            .field("key_count", &self.len())
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}
