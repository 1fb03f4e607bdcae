use serde_json::Value;
use tracing::debug;

use lpl_state::{QueryString, Selector, WorldState};
use lpl_types::{
    accrue_points, canonical_json, DocType, MemberId, MemberTransaction, MerchantId,
    MerchantStoreId, ProgramId, TransactionStatus, TypeError,
};

use crate::collector::HistoryEntry;
use crate::common;
use crate::config::LedgerConfig;
use crate::contract::ContractLedger;
use crate::error::{LedgerError, LedgerResult};
use crate::validation::TransactionRequest;

/// Member transaction records and their accrual status.
///
/// Resolves the governing contract through an in-process [`ContractLedger`]
/// over the same world state.
#[derive(Clone, Copy)]
pub struct TransactionLedger<'a> {
    state: &'a dyn WorldState,
    config: &'a LedgerConfig,
    contracts: ContractLedger<'a>,
}

impl<'a> TransactionLedger<'a> {
    pub fn new(state: &'a dyn WorldState, config: &'a LedgerConfig) -> Self {
        Self {
            state,
            config,
            contracts: ContractLedger::new(state, config),
        }
    }

    /// Validate `payload`, price it under the governing contract and persist
    /// it as `INITIALIZED`.
    ///
    /// When several contracts govern the pair, the first one returned by the
    /// world state is used.
    pub fn create_transaction(&self, payload: &str) -> LedgerResult<MemberTransaction> {
        let request = TransactionRequest::parse(payload)?;
        let key = request.identifier.as_str();
        if self.transaction_exists(key)? {
            return Err(LedgerError::AlreadyExists {
                doc_type: DocType::Transaction,
                identifier: key.to_string(),
            });
        }

        let Some(rate) = self
            .contracts
            .governing_rate(request.program_id, request.merchant_id)?
        else {
            return Err(LedgerError::NoContract {
                program_id: request.program_id.get(),
                merchant_id: request.merchant_id.get(),
            });
        };

        let points = accrue_points(
            request.amount,
            request.currency_to_usd_rate,
            rate.cpp,
            self.config.point_scale,
        )
        .map_err(|e| match e {
            TypeError::NonPositiveRate(_) => LedgerError::InvalidRate {
                contract: rate.contract.clone(),
                cpp: rate.cpp.to_string(),
            },
            other => LedgerError::invalid(other),
        })?;

        let transaction = MemberTransaction {
            doc_type: DocType::Transaction,
            identifier: request.identifier.clone(),
            member_id: request.member_id,
            member_tier: request.member_tier,
            program_id: request.program_id,
            merchant_id: request.merchant_id,
            merchant_store_id: request.merchant_store_id,
            location: request.location,
            amount: request.amount,
            currency: request.currency,
            currency_to_usd_rate: request.currency_to_usd_rate,
            point_to_be_accrued: points,
            status: TransactionStatus::Initialized,
        };
        let bytes = canonical_json(&transaction).map_err(LedgerError::serialization)?;
        self.state.put_state(transaction.identifier.as_str(), &bytes)?;
        debug!(
            identifier = %transaction.identifier,
            contract = %rate.contract,
            points = %points,
            "transaction created"
        );
        Ok(transaction)
    }

    /// Replace the status of a stored transaction, leaving every other field
    /// as stored. Returns the record as written.
    pub fn update_status(&self, identifier: &str, status: &str) -> LedgerResult<Value> {
        let not_found = || LedgerError::NotFound {
            doc_type: DocType::Transaction,
            identifier: identifier.to_string(),
        };
        let bytes = self
            .state
            .get_state(identifier)?
            .filter(|bytes| !bytes.is_empty())
            .ok_or_else(not_found)?;
        let mut record: Value = serde_json::from_slice(&bytes).map_err(LedgerError::serialization)?;
        if record.get("docType").and_then(Value::as_str) != Some(DocType::Transaction.as_str()) {
            return Err(not_found());
        }

        let next: TransactionStatus = status.parse().map_err(LedgerError::invalid)?;
        if self.config.enforce_status_transitions {
            let current = record
                .get("status")
                .and_then(Value::as_str)
                .and_then(|current| current.parse::<TransactionStatus>().ok())
                .ok_or_else(|| {
                    LedgerError::Domain(format!("transaction {identifier} has no recognized status"))
                })?;
            if !current.can_transition_to(next) {
                return Err(LedgerError::Domain(format!(
                    "transaction {identifier} cannot move from {current} to {next}"
                )));
            }
        }

        let Some(fields) = record.as_object_mut() else {
            return Err(not_found());
        };
        fields.insert("status".into(), Value::String(next.as_str().into()));
        let bytes = canonical_json(&record).map_err(LedgerError::serialization)?;
        self.state.put_state(identifier, &bytes)?;
        debug!(identifier, status = %next, "transaction status updated");
        Ok(record)
    }

    /// The stored JSON of a transaction, exactly as persisted.
    pub fn read_transaction(&self, identifier: &str) -> LedgerResult<String> {
        match self.state.get_state(identifier)? {
            Some(bytes) if !bytes.is_empty() => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            _ => Err(LedgerError::NotFound {
                doc_type: DocType::Transaction,
                identifier: identifier.to_string(),
            }),
        }
    }

    pub fn transaction_exists(&self, identifier: &str) -> LedgerResult<bool> {
        Ok(self.state.state_exists(identifier)?)
    }

    /// Every record with the given `docType`; an empty filter means
    /// transactions.
    pub fn get_all_transactions(&self, doc_type: &str) -> LedgerResult<Vec<Value>> {
        let doc_type = if doc_type.trim().is_empty() {
            DocType::Transaction.as_str()
        } else {
            doc_type
        };
        common::get_all_data(self.state, self.config, doc_type)
    }

    pub fn query_transactions_by_merchant(&self, merchant_id: MerchantId) -> LedgerResult<Vec<Value>> {
        self.query("merchantId", merchant_id.get().into())
    }

    /// Transactions of a member. An integer identifier also matches records
    /// that store `memberId` as a JSON number.
    pub fn query_transactions_by_member(&self, member_id: &MemberId) -> LedgerResult<Vec<Value>> {
        let mut forms = vec![Value::from(member_id.as_str())];
        if let Ok(number) = member_id.as_str().trim().parse::<u64>() {
            forms.push(number.into());
        }
        let selector = Selector::doc_type(DocType::Transaction.as_str()).with_any("memberId", forms);
        common::get_query_result_for_query_string(self.state, self.config, &QueryString::new(selector))
    }

    pub fn query_transactions_by_program(&self, program_id: ProgramId) -> LedgerResult<Vec<Value>> {
        self.query("programId", program_id.get().into())
    }

    pub fn query_transactions_by_merchant_store(
        &self,
        merchant_store_id: MerchantStoreId,
    ) -> LedgerResult<Vec<Value>> {
        self.query("merchantStoreId", merchant_store_id.get().into())
    }

    pub fn get_transaction_history(&self, identifier: &str) -> LedgerResult<Vec<HistoryEntry>> {
        common::get_history_for_key(self.state, identifier)
    }

    fn query(&self, field: &str, value: Value) -> LedgerResult<Vec<Value>> {
        let selector = Selector::doc_type(DocType::Transaction.as_str()).with(field, value);
        common::get_query_result_for_query_string(self.state, self.config, &QueryString::new(selector))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::json;

    use lpl_state::InMemoryWorldState;
    use lpl_types::{Contract, ContractId, Decimal};

    use super::*;
    use crate::config::QueryMode;
    use crate::error::ErrorKind;

    fn state() -> InMemoryWorldState {
        InMemoryWorldState::new().with_fixed_timestamp(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap())
    }

    fn seed_contract(state: &InMemoryWorldState, config: &LedgerConfig, cpp: u32) {
        let body = json!({
            "programId": 1,
            "merchantId": 101,
            "cpp": cpp,
            "validFrom": "2024-01-01",
            "validUpto": "2024-12-31",
        });
        ContractLedger::new(state, config)
            .create_contract(&body.to_string())
            .unwrap();
    }

    fn stored(ledger: &TransactionLedger<'_>, identifier: &str) -> MemberTransaction {
        serde_json::from_str(&ledger.read_transaction(identifier).unwrap()).unwrap()
    }

    fn put_record(state: &InMemoryWorldState, key: &str, record: Value) {
        state.put_state(key, record.to_string().as_bytes()).unwrap();
    }

    fn payload(identifier: &str) -> Value {
        json!({
            "identifier": identifier,
            "memberId": "m-42",
            "memberTier": "gold",
            "programId": 1,
            "merchantId": 101,
            "merchantStoreId": 7,
            "location": "Pune",
            "amount": 100,
            "currency": "USD",
            "currencyToUsdRate": 1,
        })
    }

    // --- creation -------------------------------------------------------

    #[test]
    fn accrues_points_at_contract_rate() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);

        let tx = ledger.create_transaction(&payload("tx-1").to_string()).unwrap();
        assert_eq!(tx.point_to_be_accrued.to_string(), "50.00");
        assert_eq!(tx.status, TransactionStatus::Initialized);

        let stored: Value = serde_json::from_str(&ledger.read_transaction("tx-1").unwrap()).unwrap();
        assert_eq!(stored["pointToBeAccrued"], "50.00");
        assert_eq!(stored["amount"], 100.0);
        assert_eq!(stored["currencyToUsdRate"], 1.0);
        assert_eq!(stored["status"], "INITIALIZED");
        assert_eq!(stored["docType"], "transaction");
    }

    #[test]
    fn converts_currency_before_pricing() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 3);
        let mut body = payload("tx-inr");
        body["amount"] = json!(1000);
        body["currency"] = json!("INR");
        body["currencyToUsdRate"] = json!("0.012");
        let tx = TransactionLedger::new(&state, &config)
            .create_transaction(&body.to_string())
            .unwrap();
        // 12 USD / 3 per point
        assert_eq!(tx.point_to_be_accrued, dec!(4.00));
    }

    #[test]
    fn point_scale_follows_config() {
        let state = state();
        let config = LedgerConfig {
            point_scale: 0,
            ..LedgerConfig::default()
        };
        seed_contract(&state, &config, 3);
        let tx = TransactionLedger::new(&state, &config)
            .create_transaction(&payload("tx-1").to_string())
            .unwrap();
        assert_eq!(tx.point_to_be_accrued.to_string(), "33");
    }

    #[test]
    fn no_contract_for_pair() {
        let state = state();
        let config = LedgerConfig::default();
        let err = TransactionLedger::new(&state, &config)
            .create_transaction(&payload("tx-1").to_string())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoContract);
        assert_eq!(
            err.to_string(),
            "no contract between program 1 and merchant 101 exists"
        );
        assert!(state.is_empty());
    }

    #[test]
    fn zero_rate_contract_is_invalid_rate() {
        let state = state();
        let config = LedgerConfig::default();
        // Contracts with cpp = 0 cannot be created through the ledger, but may
        // already be present in the world state.
        let contract = Contract {
            doc_type: DocType::Contract,
            identifier: ContractId::new(ProgramId(1), MerchantId(101), 2024, 1),
            program_id: ProgramId(1),
            merchant_id: MerchantId(101),
            cpp: Decimal::ZERO,
            contract_type: "default".into(),
            valid_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            valid_upto: Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap(),
        };
        state
            .put_state("1/101/2024/1", &canonical_json(&contract).unwrap())
            .unwrap();

        let ledger = TransactionLedger::new(&state, &config);
        let err = ledger.create_transaction(&payload("tx-1").to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRate);
        assert!(!ledger.transaction_exists("tx-1").unwrap());
    }

    #[test]
    fn duplicate_identifier_is_rejected() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();

        let mut again = payload("tx-1");
        again["amount"] = json!(500);
        let err = ledger.create_transaction(&again.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(stored(&ledger, "tx-1").amount, dec!(100));
    }

    #[test]
    fn first_governing_contract_wins() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        seed_contract(&state, &config, 4);
        let tx = TransactionLedger::new(&state, &config)
            .create_transaction(&payload("tx-1").to_string())
            .unwrap();
        // "1/101/2024/1" sorts first.
        assert_eq!(tx.point_to_be_accrued, dec!(50));
    }

    #[test]
    fn invalid_payload_writes_nothing() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let mut body = payload("tx-1");
        body["location"] = json!("");
        let err = TransactionLedger::new(&state, &config)
            .create_transaction(&body.to_string())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "location is required");
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn contract_in_older_layout_still_governs() {
        let state = state();
        let config = LedgerConfig::default();
        put_record(
            &state,
            "1/101/2023/1",
            json!({
                "docType": "contract", "identifier": "1/101/2023/1",
                "programId": 1, "merchantId": 101, "cpp": 2,
                "validFrom": "2023-01-01", "validUpto": "2023-12-31",
                "contractType": "default",
            }),
        );
        let tx = TransactionLedger::new(&state, &config)
            .create_transaction(&payload("tx-1").to_string())
            .unwrap();
        assert_eq!(tx.point_to_be_accrued.to_string(), "50.00");
    }

    #[test]
    fn later_malformed_contract_is_not_read() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        put_record(
            &state,
            "1/101/2024/2",
            json!({"docType": "contract", "programId": 1, "merchantId": 101, "validFrom": 20240101}),
        );
        let tx = TransactionLedger::new(&state, &config)
            .create_transaction(&payload("tx-1").to_string())
            .unwrap();
        assert_eq!(tx.point_to_be_accrued, dec!(50));
    }

    #[test]
    fn contract_without_rate_is_invalid_rate() {
        let state = state();
        let config = LedgerConfig::default();
        put_record(
            &state,
            "1/101/2023/1",
            json!({"docType": "contract", "identifier": "1/101/2023/1", "programId": 1, "merchantId": 101}),
        );
        let ledger = TransactionLedger::new(&state, &config);
        let err = ledger.create_transaction(&payload("tx-1").to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRate);
        assert_eq!(crate::response::prepare_error_message(&err).status_code, 422);
        assert!(!ledger.transaction_exists("tx-1").unwrap());
    }

    // --- status ---------------------------------------------------------

    #[test]
    fn update_status_changes_only_status() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();
        let before: Value = serde_json::from_str(&ledger.read_transaction("tx-1").unwrap()).unwrap();

        let updated = ledger.update_status("tx-1", "ACCRUED").unwrap();
        assert_eq!(updated["status"], "ACCRUED");

        let after: Value = serde_json::from_str(&ledger.read_transaction("tx-1").unwrap()).unwrap();
        let (before, after) = (before.as_object().unwrap(), after.as_object().unwrap());
        assert_eq!(before.len(), after.len());
        for (field, value) in before {
            if field == "status" {
                assert_eq!(after[field], "ACCRUED");
            } else {
                assert_eq!(&after[field], value, "{field} changed");
            }
        }
    }

    #[test]
    fn status_accepts_serialized_and_legacy_forms() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();

        assert_eq!(ledger.update_status("tx-1", "\"FAILED\"").unwrap()["status"], "FAILED");
        assert_eq!(ledger.update_status("tx-1", "ACCURED").unwrap()["status"], "ACCRUED");
        let err = ledger.update_status("tx-1", "SETTLED").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(stored(&ledger, "tx-1").status, TransactionStatus::Accrued);
    }

    #[test]
    fn lenient_lifecycle_allows_any_move() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();
        ledger.update_status("tx-1", "FAILED").unwrap();
        assert_eq!(ledger.update_status("tx-1", "INITIALIZED").unwrap()["status"], "INITIALIZED");
    }

    #[test]
    fn strict_lifecycle_rejects_leaving_terminal_state() {
        let state = state();
        let config = LedgerConfig {
            enforce_status_transitions: true,
            ..LedgerConfig::default()
        };
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();
        ledger.update_status("tx-1", "ACCRUED").unwrap();
        ledger.update_status("tx-1", "ACCRUED").unwrap();

        let err = ledger.update_status("tx-1", "FAILED").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(stored(&ledger, "tx-1").status, TransactionStatus::Accrued);
    }

    #[test]
    fn update_status_of_missing_or_foreign_record() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        assert_eq!(
            ledger.update_status("tx-404", "ACCRUED").unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ledger.update_status("1/101/2024/1", "ACCRUED").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn failed_update_leaves_record_untouched() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();

        state.set_read_only(true).unwrap();
        let err = ledger.update_status("tx-1", "ACCRUED").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(stored(&ledger, "tx-1").status, TransactionStatus::Initialized);
    }

    #[test]
    fn legacy_point_field_survives_status_update() {
        let state = state();
        let config = LedgerConfig::default();
        let legacy = json!({
            "docType": "transaction", "identifier": "tx-old", "memberId": "m1",
            "memberTier": "silver", "programId": 1, "merchantId": 101,
            "merchantStoreId": 3, "location": "Goa", "amount": "10",
            "currency": "USD", "currencyToUsdRate": "1",
            "pointToBeIncurred": "5", "status": "INITIALIZED"
        });
        state.put_state("tx-old", legacy.to_string().as_bytes()).unwrap();

        let updated = TransactionLedger::new(&state, &config)
            .update_status("tx-old", "ACCRUED")
            .unwrap();
        let stored: Value = serde_json::from_slice(&state.get_state("tx-old").unwrap().unwrap()).unwrap();
        assert_eq!(updated, stored);
        assert_eq!(stored["pointToBeIncurred"], "5");
        assert_eq!(stored["status"], "ACCRUED");
        let decoded: MemberTransaction = serde_json::from_value(stored).unwrap();
        assert_eq!(decoded.point_to_be_accrued, dec!(5));
    }

    #[test]
    fn status_update_of_record_in_older_layout() {
        let state = state();
        let config = LedgerConfig::default();
        put_record(
            &state,
            "tx-old",
            json!({
                "docType": "transaction", "identifier": "tx-old", "memberId": 42,
                "programId": 1, "merchantId": 101, "amount": 10,
                "pointToBeIncurred": 5, "status": "ACCURED",
            }),
        );
        let ledger = TransactionLedger::new(&state, &config);
        let updated = ledger.update_status("tx-old", "FAILED").unwrap();
        assert_eq!(updated["status"], "FAILED");
        assert_eq!(updated["memberId"], 42);
        assert!(updated.get("memberTier").is_none());

        let strict = LedgerConfig {
            enforce_status_transitions: true,
            ..LedgerConfig::default()
        };
        put_record(&state, "tx-odd", json!({"docType": "transaction", "status": "SETTLED"}));
        let err = TransactionLedger::new(&state, &strict)
            .update_status("tx-odd", "ACCRUED")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    // --- reads ----------------------------------------------------------

    #[test]
    fn exists_before_and_after_create() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        assert!(!ledger.transaction_exists("tx-1").unwrap());
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();
        assert!(ledger.transaction_exists("tx-1").unwrap());
        assert_eq!(ledger.read_transaction("tx-2").unwrap_err().kind(), ErrorKind::NotFound);
    }

    fn seeded_queries(config: &LedgerConfig) -> InMemoryWorldState {
        let state = state();
        seed_contract(&state, config, 2);
        let ledger = TransactionLedger::new(&state, config);
        for (id, member, store) in [("tx-1", "m-1", 7), ("tx-2", "m-1", 8), ("tx-3", "m-2", 7)] {
            let mut body = payload(id);
            body["memberId"] = json!(member);
            body["merchantStoreId"] = json!(store);
            ledger.create_transaction(&body.to_string()).unwrap();
        }
        state
    }

    #[test]
    fn predicate_queries() {
        let config = LedgerConfig::default();
        let state = seeded_queries(&config);
        let ledger = TransactionLedger::new(&state, &config);

        assert_eq!(ledger.query_transactions_by_member(&MemberId::new("m-1")).unwrap().len(), 2);
        assert_eq!(
            ledger.query_transactions_by_merchant_store(MerchantStoreId(7)).unwrap().len(),
            2
        );
        assert_eq!(ledger.query_transactions_by_merchant(MerchantId(101)).unwrap().len(), 3);
        assert_eq!(ledger.query_transactions_by_program(ProgramId(1)).unwrap().len(), 3);
        assert!(ledger.query_transactions_by_program(ProgramId(2)).unwrap().is_empty());
        assert_eq!(ledger.get_all_transactions("").unwrap().len(), 3);
        assert_eq!(ledger.get_all_transactions("contract").unwrap().len(), 1);
    }

    #[test]
    fn member_query_matches_numeric_member_ids() {
        let config = LedgerConfig::default();
        let state = seeded_queries(&config);
        put_record(
            &state,
            "tx-old",
            json!({"docType": "transaction", "identifier": "tx-old", "memberId": 42}),
        );
        let mut body = payload("tx-4");
        body["memberId"] = json!("42");
        TransactionLedger::new(&state, &config)
            .create_transaction(&body.to_string())
            .unwrap();

        for mode in [QueryMode::Rich, QueryMode::RangeScan] {
            let config = LedgerConfig {
                query_mode: mode,
                ..LedgerConfig::default()
            };
            let ledger = TransactionLedger::new(&state, &config);
            let hits = ledger.query_transactions_by_member(&MemberId::new("42")).unwrap();
            let ids: Vec<&str> = hits.iter().map(|r| r["identifier"].as_str().unwrap()).collect();
            assert_eq!(ids, vec!["tx-4", "tx-old"], "{mode:?}");
            assert_eq!(
                ledger.query_transactions_by_member(&MemberId::new("m-2")).unwrap().len(),
                1
            );
        }
    }

    #[test]
    fn range_scan_mode_gives_same_answers() {
        let rich = LedgerConfig::default();
        let scan = LedgerConfig {
            query_mode: QueryMode::RangeScan,
            ..LedgerConfig::default()
        };
        let state = seeded_queries(&rich);
        let by_rich = TransactionLedger::new(&state, &rich)
            .query_transactions_by_member(&MemberId::new("m-2"))
            .unwrap();
        let by_scan = TransactionLedger::new(&state, &scan)
            .query_transactions_by_member(&MemberId::new("m-2"))
            .unwrap();
        assert_eq!(by_rich, by_scan);
        assert_eq!(by_scan[0]["identifier"], "tx-3");
    }

    #[test]
    fn history_tracks_every_write() {
        let state = state();
        let config = LedgerConfig::default();
        seed_contract(&state, &config, 2);
        let ledger = TransactionLedger::new(&state, &config);
        ledger.create_transaction(&payload("tx-1").to_string()).unwrap();
        ledger.update_status("tx-1", "FAILED").unwrap();
        ledger.update_status("tx-1", "ACCRUED").unwrap();

        let history = ledger.get_transaction_history("tx-1").unwrap();
        let statuses: Vec<&str> = history
            .iter()
            .map(|entry| entry.value["status"].as_str().unwrap())
            .collect();
        assert_eq!(statuses, vec!["INITIALIZED", "FAILED", "ACCRUED"]);
        assert_eq!(state.open_cursors(), 0);
    }
}
