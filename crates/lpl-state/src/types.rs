use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{StateError, StateResult};
use crate::traits::StateCursor;

/// A current entry in the world state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// One historical write to a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: String,
    pub timestamp: DateTime<Utc>,
    pub value: Vec<u8>,
    pub is_delete: bool,
}

/// A cursor over a pre-materialized result set.
///
/// Optionally reports open/close to a shared counter so backends can track
/// unreleased cursors.
pub struct VecCursor<T> {
    items: std::vec::IntoIter<T>,
    closed: bool,
    open_counter: Option<Arc<AtomicUsize>>,
}

impl<T> VecCursor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
            closed: false,
            open_counter: None,
        }
    }

    /// Create a cursor that increments `counter` now and decrements it on close.
    pub fn tracked(items: Vec<T>, counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            items: items.into_iter(),
            closed: false,
            open_counter: Some(counter),
        }
    }
}

impl<T> StateCursor for VecCursor<T> {
    type Item = T;

    fn next_item(&mut self) -> StateResult<Option<T>> {
        if self.closed {
            return Err(StateError::CursorClosed);
        }
        Ok(self.items.next())
    }

    fn close(&mut self) -> StateResult<()> {
        if self.closed {
            return Err(StateError::CursorClosed);
        }
        self.closed = true;
        if let Some(counter) = &self.open_counter {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
