//! Foundation types for the Loyalty Points Ledger (LPL).
//!
//! This crate provides the identifiers, record shapes and point arithmetic
//! shared by every other LPL crate.
//!
//! # Key Types
//!
//! - [`Contract`] -- program/merchant agreement fixing the currency-per-point rate
//! - [`MemberTransaction`] -- member purchase with its accrued points
//! - [`TransactionStatus`] -- `INITIALIZED` → `ACCRUED` | `FAILED`
//! - [`ContractId`] -- composite `{programId}/{merchantId}/{year}/{sequence}` key
//! - [`DocType`] -- record discriminator used by predicate queries

pub mod contract;
pub mod doc;
pub mod error;
pub mod ids;
pub mod points;
pub mod transaction;

pub use contract::{Contract, DEFAULT_CONTRACT_TYPE};
pub use doc::{canonical_json, DocType};
pub use error::TypeError;
pub use ids::{ContractId, MemberId, MerchantId, MerchantStoreId, ProgramId, TransactionId};
pub use points::{accrue_points, POINT_SCALE};
pub use transaction::{MemberTransaction, TransactionStatus};

pub use rust_decimal::Decimal;
