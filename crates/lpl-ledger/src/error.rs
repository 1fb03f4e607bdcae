use std::fmt;

use lpl_state::StateError;
use lpl_types::DocType;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("the {doc_type} {identifier} does not exist")]
    NotFound {
        doc_type: DocType,
        identifier: String,
    },

    #[error("the {doc_type} {identifier} already exists")]
    AlreadyExists {
        doc_type: DocType,
        identifier: String,
    },

    #[error("no contract between program {program_id} and merchant {merchant_id} exists")]
    NoContract { program_id: u64, merchant_id: u64 },

    #[error("contract {contract} has unusable currency-per-point rate {cpp}")]
    InvalidRate { contract: String, cpp: String },

    #[error("{0}")]
    Domain(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Classification of a [`LedgerError`] used to pick a response code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    AlreadyExists,
    NoContract,
    InvalidRate,
    Domain,
    Unauthorized,
    Unexpected,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NoContract { .. } => ErrorKind::NoContract,
            Self::InvalidRate { .. } => ErrorKind::InvalidRate,
            Self::Domain(_) => ErrorKind::Domain,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::State(_) | Self::Serialization(_) | Self::Config(_) => ErrorKind::Unexpected,
        }
    }

    pub(crate) fn invalid(message: impl fmt::Display) -> Self {
        Self::InvalidInput(message.to_string())
    }

    pub(crate) fn serialization(err: impl fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl ErrorKind {
    /// Business-rule failures the caller can act on, as opposed to malformed
    /// input, missing credentials or internal faults.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::AlreadyExists | Self::NoContract | Self::InvalidRate | Self::Domain
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
