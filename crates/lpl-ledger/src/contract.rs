use std::str::FromStr;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use lpl_state::{QueryString, Selector, WorldState};
use lpl_types::{canonical_json, Contract, ContractId, DocType, MerchantId, ProgramId};

use crate::collector::HistoryEntry;
use crate::common;
use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::validation::ContractRequest;

/// Contract records: program/merchant agreements fixing the
/// currency-per-point rate.
///
/// Contracts are written once by [`ContractLedger::create_contract`] and never
/// modified.
#[derive(Clone, Copy)]
pub struct ContractLedger<'a> {
    state: &'a dyn WorldState,
    config: &'a LedgerConfig,
}

impl<'a> ContractLedger<'a> {
    pub fn new(state: &'a dyn WorldState, config: &'a LedgerConfig) -> Self {
        Self { state, config }
    }

    /// Validate `payload`, assign the next identifier for its program/merchant
    /// pair and persist the contract.
    pub fn create_contract(&self, payload: &str) -> LedgerResult<Contract> {
        let request = ContractRequest::parse(payload)?;
        if self.config.validate_validity_window && request.valid_from > request.valid_upto {
            return Err(LedgerError::invalid(format!(
                "validFrom {} is after validUpto {}",
                request.valid_from.to_rfc3339(),
                request.valid_upto.to_rfc3339()
            )));
        }

        let existing = self
            .query_contracts_by_program_and_merchant(request.program_id, request.merchant_id)?
            .len();
        let identifier = ContractId::new(
            request.program_id,
            request.merchant_id,
            self.state.tx_timestamp().year(),
            existing as u64 + 1,
        );
        let key = identifier.to_string();
        if self.state.state_exists(&key)? {
            return Err(LedgerError::AlreadyExists {
                doc_type: DocType::Contract,
                identifier: key,
            });
        }

        let contract = Contract {
            doc_type: DocType::Contract,
            identifier,
            program_id: request.program_id,
            merchant_id: request.merchant_id,
            cpp: request.cpp,
            contract_type: request
                .contract_type
                .unwrap_or_else(|| self.config.default_contract_type.clone()),
            valid_from: request.valid_from,
            valid_upto: request.valid_upto,
        };
        let bytes = canonical_json(&contract).map_err(LedgerError::serialization)?;
        self.state.put_state(&key, &bytes)?;
        debug!(identifier = %key, cpp = %contract.cpp, "contract created");
        Ok(contract)
    }

    /// The stored JSON of a contract, exactly as persisted.
    pub fn read_contract(&self, identifier: &str) -> LedgerResult<String> {
        match self.state.get_state(identifier)? {
            Some(bytes) if !bytes.is_empty() => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            _ => Err(LedgerError::NotFound {
                doc_type: DocType::Contract,
                identifier: identifier.to_string(),
            }),
        }
    }

    pub fn contract_exists(&self, identifier: &str) -> LedgerResult<bool> {
        Ok(self.state.state_exists(identifier)?)
    }

    /// Every record with the given `docType`; an empty filter means contracts.
    pub fn get_all_contracts(&self, doc_type: &str) -> LedgerResult<Vec<Value>> {
        let doc_type = if doc_type.trim().is_empty() {
            DocType::Contract.as_str()
        } else {
            doc_type
        };
        common::get_all_data(self.state, self.config, doc_type)
    }

    pub fn query_contracts_by_merchant(&self, merchant_id: MerchantId) -> LedgerResult<Vec<Value>> {
        self.query(Selector::doc_type(DocType::Contract.as_str()).with("merchantId", merchant_id.get()))
    }

    pub fn query_contracts_by_program(&self, program_id: ProgramId) -> LedgerResult<Vec<Value>> {
        self.query(Selector::doc_type(DocType::Contract.as_str()).with("programId", program_id.get()))
    }

    pub fn query_contracts_by_program_and_merchant(
        &self,
        program_id: ProgramId,
        merchant_id: MerchantId,
    ) -> LedgerResult<Vec<Value>> {
        self.query(
            Selector::doc_type(DocType::Contract.as_str())
                .with("programId", program_id.get())
                .with("merchantId", merchant_id.get()),
        )
    }

    /// The rate of the contract governing a program/merchant pair: the first
    /// record the world state returns for the pair. `None` when there is none.
    ///
    /// Only `identifier` and `cpp` are read, so records written in older
    /// layouts still govern.
    pub fn governing_rate(
        &self,
        program_id: ProgramId,
        merchant_id: MerchantId,
    ) -> LedgerResult<Option<GoverningRate>> {
        self.query_contracts_by_program_and_merchant(program_id, merchant_id)?
            .into_iter()
            .next()
            .map(|record| GoverningRate::from_record(&record))
            .transpose()
    }

    pub fn get_contract_history(&self, identifier: &str) -> LedgerResult<Vec<HistoryEntry>> {
        common::get_history_for_key(self.state, identifier)
    }

    fn query(&self, selector: Selector) -> LedgerResult<Vec<Value>> {
        common::get_query_result_for_query_string(self.state, self.config, &QueryString::new(selector))
    }
}

/// Identifier and currency-per-point rate of a governing contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoverningRate {
    pub contract: String,
    pub cpp: Decimal,
}

impl GoverningRate {
    /// Read from a stored record. `cpp` may be a JSON number or numeric
    /// text; anything else is an [`LedgerError::InvalidRate`].
    fn from_record(record: &Value) -> LedgerResult<Self> {
        let contract = match record.get("identifier") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => "<unidentified>".to_string(),
        };
        let raw = record.get("cpp").cloned().unwrap_or(Value::Null);
        let source = match &raw {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.trim().to_string()),
            _ => None,
        };
        let cpp = source.and_then(|text| {
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        });
        match cpp {
            Some(cpp) => Ok(Self { contract, cpp }),
            None => Err(LedgerError::InvalidRate {
                contract,
                cpp: raw.to_string(),
            }),
        }
    }
}
