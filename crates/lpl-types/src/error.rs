use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid contract identifier {0:?}: expected programId/merchantId/year/sequence")]
    InvalidContractId(String),

    #[error("unknown transaction status: {0}")]
    UnknownStatus(String),

    #[error("currency-per-point rate must be positive, got {0}")]
    NonPositiveRate(String),

    #[error("point computation overflowed")]
    Overflow,

    #[error("serialization error: {0}")]
    Serialization(String),
}
