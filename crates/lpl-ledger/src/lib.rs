//! Ledger logic for the Loyalty Points Ledger (LPL).
//!
//! This crate holds the business rules layered over a [`lpl_state::WorldState`]:
//! - [`ContractLedger`]: contract creation with identifier assignment, lookups,
//!   predicate queries and history
//! - [`TransactionLedger`]: member transactions priced under their governing
//!   contract, status updates, lookups, predicate queries and history
//! - Cursor draining into `{Key, Record}` / `{TxId, Timestamp, Value}` entries
//! - Error classification into `{statusCode, message}` response envelopes
//! - [`OperationRegistry`] / [`Dispatcher`]: the named operation surface with
//!   its read/write classification

pub mod collector;
pub mod common;
pub mod config;
pub mod contract;
pub mod error;
pub mod registry;
pub mod response;
pub mod transaction;
pub mod validation;

pub use collector::{collect_history, collect_records, CursorGuard, HistoryEntry, QueryRecord};
pub use common::{get_all_data, get_history_for_key, get_query_result_for_query_string};
pub use config::{LedgerConfig, QueryMode};
pub use contract::{ContractLedger, GoverningRate};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use registry::{
    Dispatcher, OperationKind, OperationRegistry, OperationSpec, Param, ParamShape, ReturnShape,
};
pub use response::{prepare_error_message, Response, GENERIC_FAILURE_MESSAGE};
pub use transaction::TransactionLedger;
pub use validation::{ContractRequest, TransactionRequest};
