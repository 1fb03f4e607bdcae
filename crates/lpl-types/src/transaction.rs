use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::doc::DocType;
use crate::error::TypeError;
use crate::ids::{MemberId, MerchantId, MerchantStoreId, ProgramId, TransactionId};

/// Accrual lifecycle of a member transaction.
///
/// `Initialized` is the only initial state; `Accrued` and `Failed` are
/// terminal by convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Initialized,
    #[serde(alias = "ACCURED")]
    Accrued,
    Failed,
}

impl TransactionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "INITIALIZED",
            Self::Accrued => "ACCRUED",
            Self::Failed => "FAILED",
        }
    }

    /// Transitions permitted by the strict lifecycle. Re-applying the current
    /// status is always allowed.
    pub fn can_transition_to(&self, next: Self) -> bool {
        *self == next || matches!((self, next), (Self::Initialized, Self::Accrued | Self::Failed))
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = TypeError;

    /// Accepts the bare name (`ACCRUED`, case-insensitive) or its JSON
    /// serialized form (`"ACCRUED"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(trimmed);
        match bare.to_ascii_uppercase().as_str() {
            "INITIALIZED" => Ok(Self::Initialized),
            "ACCRUED" | "ACCURED" => Ok(Self::Accrued),
            "FAILED" => Ok(Self::Failed),
            _ => Err(TypeError::UnknownStatus(s.to_string())),
        }
    }
}

/// A purchase made by a program member at a merchant store, with the points
/// it accrues under the governing contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTransaction {
    pub doc_type: DocType,
    pub identifier: TransactionId,
    pub member_id: MemberId,
    pub member_tier: String,
    pub program_id: ProgramId,
    pub merchant_id: MerchantId,
    pub merchant_store_id: MerchantStoreId,
    pub location: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub currency: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub currency_to_usd_rate: Decimal,
    /// Kept as text so the fixed number of places survives.
    #[serde(alias = "pointToBeIncurred")]
    pub point_to_be_accrued: Decimal,
    pub status: TransactionStatus,
}
