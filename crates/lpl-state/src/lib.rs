//! World-state boundary for the Loyalty Points Ledger.
//!
//! The ledger core never talks to a storage engine directly. Everything it
//! persists or reads goes through the [`WorldState`] trait: point reads and
//! writes, range scans, predicate queries and per-key history, each returning
//! a [`StateCursor`] that must be closed after use.
//!
//! # Backends
//!
//! - [`InMemoryWorldState`] -- `BTreeMap`-backed state for tests, simulation
//!   and embedding
//!
//! # Design Rules
//!
//! 1. Absence is a value (`Ok(None)`), not an error.
//! 2. Predicates are complete [`QueryString`] documents, never partially
//!    assembled paths.
//! 3. The state never interprets values except to evaluate predicates.
//! 4. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod selector;
pub mod traits;
pub mod types;

pub use error::{StateError, StateResult};
pub use memory::InMemoryWorldState;
pub use selector::{QueryString, Selector};
pub use traits::{HistoryCursor, KeyValueCursor, StateCursor, WorldState};
pub use types::{KeyModification, KeyValue, VecCursor};
