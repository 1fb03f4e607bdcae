//! Decoding of create payloads into typed requests.
//!
//! Required fields are checked in a fixed order and the first failure is
//! reported. A field that is absent, `null`, `false`, `0` or `""` counts as
//! missing.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use lpl_types::{MemberId, MerchantId, MerchantStoreId, ProgramId, TransactionId};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};

/// A validated `CreateContract` payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractRequest {
    pub program_id: ProgramId,
    pub merchant_id: MerchantId,
    pub cpp: Decimal,
    pub contract_type: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_upto: DateTime<Utc>,
}

impl ContractRequest {
    pub fn parse(payload: &str) -> LedgerResult<Self> {
        let fields = object(payload)?;
        Ok(Self {
            program_id: ProgramId(positive_integer(&fields, "programId")?),
            merchant_id: MerchantId(positive_integer(&fields, "merchantId")?),
            cpp: positive_decimal(&fields, "cpp")?,
            valid_from: date_time(&fields, "validFrom")?,
            valid_upto: date_time(&fields, "validUpto")?,
            contract_type: match fields.get("contractType") {
                Some(value) if !is_falsy(value) => Some(text(&fields, "contractType")?),
                _ => None,
            },
        })
    }
}

/// A validated `CreateTransaction` payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub identifier: TransactionId,
    pub member_id: MemberId,
    pub member_tier: String,
    pub program_id: ProgramId,
    pub merchant_id: MerchantId,
    pub merchant_store_id: MerchantStoreId,
    pub location: String,
    pub amount: Decimal,
    pub currency: String,
    pub currency_to_usd_rate: Decimal,
}

impl TransactionRequest {
    pub fn parse(payload: &str) -> LedgerResult<Self> {
        let fields = object(payload)?;
        Ok(Self {
            identifier: TransactionId(required_text(&fields, "identifier")?),
            member_id: MemberId(required_text(&fields, "memberId")?),
            member_tier: required_text(&fields, "memberTier")?,
            program_id: ProgramId(positive_integer(&fields, "programId")?),
            merchant_id: MerchantId(positive_integer(&fields, "merchantId")?),
            merchant_store_id: MerchantStoreId(positive_integer(&fields, "merchantStoreId")?),
            location: required_text(&fields, "location")?,
            amount: positive_decimal(&fields, "amount")?,
            currency: required_text(&fields, "currency")?,
            currency_to_usd_rate: positive_decimal(&fields, "currencyToUsdRate")?,
        })
    }
}

fn object(payload: &str) -> LedgerResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(LedgerError::invalid("payload must be a JSON object")),
        Err(e) => Err(LedgerError::invalid(format!("payload is not valid JSON: {e}"))),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn required<'a>(fields: &'a Map<String, Value>, field: &str) -> LedgerResult<&'a Value> {
    match fields.get(field) {
        Some(value) if !is_falsy(value) => Ok(value),
        _ => Err(LedgerError::invalid(format!("{field} is required"))),
    }
}

/// Text of a present field; numbers are accepted and rendered as text.
fn text(fields: &Map<String, Value>, field: &str) -> LedgerResult<String> {
    match fields.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(LedgerError::invalid(format!("{field} must be a string"))),
    }
}

fn required_text(fields: &Map<String, Value>, field: &str) -> LedgerResult<String> {
    required(fields, field)?;
    text(fields, field)
}

fn positive_integer(fields: &Map<String, Value>, field: &str) -> LedgerResult<u64> {
    let value = required(fields, field)?;
    let number = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_i64().filter(|v| *v < 0).map(|_| 0)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|v| u64::try_from(v).unwrap_or(0)),
        _ => None,
    };
    match number {
        Some(0) => Err(LedgerError::invalid(format!("{field} must be positive"))),
        Some(n) => Ok(n),
        None => Err(LedgerError::invalid(format!("{field} must be a positive integer"))),
    }
}

fn positive_decimal(fields: &Map<String, Value>, field: &str) -> LedgerResult<Decimal> {
    let value = required(fields, field)?;
    let source = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(LedgerError::invalid(format!("{field} must be a number"))),
    };
    let number = Decimal::from_str(&source)
        .or_else(|_| Decimal::from_scientific(&source))
        .map_err(|_| LedgerError::invalid(format!("{field} must be a number")))?;
    if number <= Decimal::ZERO {
        return Err(LedgerError::invalid(format!("{field} must be positive")));
    }
    Ok(number.normalize())
}

/// RFC 3339 date-time, or a bare `YYYY-MM-DD` date taken as midnight UTC.
fn date_time(fields: &Map<String, Value>, field: &str) -> LedgerResult<DateTime<Utc>> {
    let value = required(fields, field)?;
    let invalid = || LedgerError::invalid(format!("{field} must be an RFC 3339 date-time"));
    let Value::String(raw) = value else {
        return Err(invalid());
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(invalid)
}
