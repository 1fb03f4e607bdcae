//! Stateless helpers shared by the contract and transaction ledgers.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use lpl_state::{QueryString, Selector, WorldState};

use crate::collector::{collect_history, collect_records, HistoryEntry};
use crate::config::{LedgerConfig, QueryMode};
use crate::error::{LedgerError, LedgerResult};

/// Execute a predicate query and return the matching records.
///
/// In [`QueryMode::RangeScan`] the whole keyspace is scanned and the selector
/// is evaluated here instead of by the state database.
pub fn get_query_result_for_query_string(
    state: &dyn WorldState,
    config: &LedgerConfig,
    query: &QueryString,
) -> LedgerResult<Vec<Value>> {
    let records = match config.query_mode {
        QueryMode::Rich => collect_records(state.query_result(&query.to_json()?)?)?,
        QueryMode::RangeScan => collect_records(state.state_by_range("", "")?)?
            .into_iter()
            .filter(|entry| query.selector.matches(&entry.record))
            .collect(),
    };
    debug!(mode = ?config.query_mode, selector = ?query.selector, hits = records.len(), "query executed");
    Ok(records.into_iter().map(|entry| entry.record).collect())
}

/// Every record of the given `docType`.
pub fn get_all_data(
    state: &dyn WorldState,
    config: &LedgerConfig,
    doc_type: &str,
) -> LedgerResult<Vec<Value>> {
    get_query_result_for_query_string(state, config, &QueryString::new(Selector::doc_type(doc_type)))
}

/// All past values of `key`, oldest first.
pub fn get_history_for_key(state: &dyn WorldState, key: &str) -> LedgerResult<Vec<HistoryEntry>> {
    collect_history(state.history_for_key(key)?)
}

/// Serialize an operation result for the caller.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> LedgerResult<String> {
    serde_json::to_string(value).map_err(LedgerError::serialization)
}
