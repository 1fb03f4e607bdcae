use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::doc::DocType;
use crate::ids::{ContractId, MerchantId, ProgramId};

/// Contract type assigned when a payload does not name one.
pub const DEFAULT_CONTRACT_TYPE: &str = "default";

/// An agreement between a loyalty program and a merchant fixing the
/// currency-per-point rate used to accrue member points.
///
/// Contracts are written once and never modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub doc_type: DocType,
    pub identifier: ContractId,
    pub program_id: ProgramId,
    pub merchant_id: MerchantId,
    /// Currency per point.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub cpp: Decimal,
    pub contract_type: String,
    pub valid_from: DateTime<Utc>,
    pub valid_upto: DateTime<Utc>,
}
