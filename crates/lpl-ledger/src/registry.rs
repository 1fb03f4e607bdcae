use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use lpl_state::WorldState;
use lpl_types::{MemberId, MerchantId, MerchantStoreId, ProgramId};

use crate::common::to_json_string;
use crate::config::LedgerConfig;
use crate::contract::ContractLedger;
use crate::error::{LedgerError, LedgerResult};
use crate::response::{prepare_error_message, Response};
use crate::transaction::TransactionLedger;

// ---------------------------------------------------------------------------
// Operation metadata
// ---------------------------------------------------------------------------

/// Whether an operation writes to the world state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Writes; must be ordered and committed by the ledger.
    Submit,
    /// Read-only.
    Evaluate,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => f.write_str("submit"),
            Self::Evaluate => f.write_str("evaluate"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamShape {
    /// A JSON object payload.
    Json,
    Text,
    /// A non-negative integer in decimal text.
    Integer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnShape {
    Record,
    Records,
    Boolean,
    History,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: &'static str,
    pub shape: ParamShape,
    pub optional: bool,
}

const fn required(name: &'static str, shape: ParamShape) -> Param {
    Param {
        name,
        shape,
        optional: false,
    }
}

const fn optional(name: &'static str, shape: ParamShape) -> Param {
    Param {
        name,
        shape,
        optional: true,
    }
}

type Handler = fn(&Invocation<'_>) -> LedgerResult<String>;

/// A callable operation: its name, classification, parameters, return shape
/// and the routine that executes it.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct OperationSpec {
    pub name: &'static str,
    pub kind: OperationKind,
    pub params: &'static [Param],
    pub returns: ReturnShape,
    pub description: &'static str,
    #[serde(skip)]
    handler: Handler,
}

impl OperationSpec {
    fn required_params(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }
}

/// Arguments of a single invocation, bound to the ledgers it may touch.
pub struct Invocation<'a> {
    contracts: ContractLedger<'a>,
    transactions: TransactionLedger<'a>,
    spec: &'a OperationSpec,
    args: &'a [String],
}

impl Invocation<'_> {
    /// Text argument at `index`; absent optional arguments are empty.
    fn text(&self, index: usize) -> &str {
        self.args.get(index).map(String::as_str).unwrap_or_default()
    }

    fn integer(&self, index: usize) -> LedgerResult<u64> {
        let raw = self.text(index).trim();
        raw.parse().map_err(|_| {
            let name = self.spec.params.get(index).map_or("argument", |p| p.name);
            LedgerError::invalid(format!("{name} must be a non-negative integer, got {raw:?}"))
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

const ID: &[Param] = &[required("identifier", ParamShape::Text)];
const DOC_TYPE: &[Param] = &[optional("docType", ParamShape::Text)];
const PAYLOAD: &[Param] = &[required("payload", ParamShape::Json)];
const PROGRAM: &[Param] = &[required("programId", ParamShape::Integer)];
const MERCHANT: &[Param] = &[required("merchantId", ParamShape::Integer)];
const PROGRAM_AND_MERCHANT: &[Param] = &[
    required("programId", ParamShape::Integer),
    required("merchantId", ParamShape::Integer),
];
const MERCHANT_STORE: &[Param] = &[required("merchantStoreId", ParamShape::Integer)];
const MEMBER: &[Param] = &[required("memberId", ParamShape::Text)];
const STATUS_UPDATE: &[Param] = &[
    required("identifier", ParamShape::Text),
    required("status", ParamShape::Text),
];

/// Every operation the ledger exposes, keyed by name.
#[derive(Clone, Debug)]
pub struct OperationRegistry {
    operations: BTreeMap<&'static str, OperationSpec>,
}

impl OperationRegistry {
    /// The contract and transaction operations.
    pub fn standard() -> Self {
        Self {
            operations: STANDARD_OPERATIONS.iter().map(|spec| (spec.name, *spec)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.get(name)
    }

    /// Operations in name order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationSpec> {
        self.operations.values()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

const STANDARD_OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "CreateContract",
        kind: OperationKind::Submit,
        params: PAYLOAD,
        returns: ReturnShape::Record,
        description: "Create a contract between a program and a merchant",
        handler: |inv| to_json_string(&inv.contracts.create_contract(inv.text(0))?),
    },
    OperationSpec {
        name: "ReadContract",
        kind: OperationKind::Evaluate,
        params: ID,
        returns: ReturnShape::Record,
        description: "Fetch a contract by identifier",
        handler: |inv| inv.contracts.read_contract(inv.text(0)),
    },
    OperationSpec {
        name: "ContractExists",
        kind: OperationKind::Evaluate,
        params: ID,
        returns: ReturnShape::Boolean,
        description: "Whether a contract with the identifier exists",
        handler: |inv| to_json_string(&inv.contracts.contract_exists(inv.text(0))?),
    },
    OperationSpec {
        name: "GetAllContracts",
        kind: OperationKind::Evaluate,
        params: DOC_TYPE,
        returns: ReturnShape::Records,
        description: "All records of a docType (contracts by default)",
        handler: |inv| to_json_string(&inv.contracts.get_all_contracts(inv.text(0))?),
    },
    OperationSpec {
        name: "QueryContractsByMerchant",
        kind: OperationKind::Evaluate,
        params: MERCHANT,
        returns: ReturnShape::Records,
        description: "Contracts of a merchant",
        handler: |inv| {
            to_json_string(&inv.contracts.query_contracts_by_merchant(MerchantId(inv.integer(0)?))?)
        },
    },
    OperationSpec {
        name: "QueryContractsByProgram",
        kind: OperationKind::Evaluate,
        params: PROGRAM,
        returns: ReturnShape::Records,
        description: "Contracts of a program",
        handler: |inv| {
            to_json_string(&inv.contracts.query_contracts_by_program(ProgramId(inv.integer(0)?))?)
        },
    },
    OperationSpec {
        name: "QueryContractsByProgramAndMerchant",
        kind: OperationKind::Evaluate,
        params: PROGRAM_AND_MERCHANT,
        returns: ReturnShape::Records,
        description: "Contracts between a program and a merchant",
        handler: |inv| {
            to_json_string(&inv.contracts.query_contracts_by_program_and_merchant(
                ProgramId(inv.integer(0)?),
                MerchantId(inv.integer(1)?),
            )?)
        },
    },
    OperationSpec {
        name: "GetContractHistory",
        kind: OperationKind::Evaluate,
        params: ID,
        returns: ReturnShape::History,
        description: "Every past value of a contract",
        handler: |inv| to_json_string(&inv.contracts.get_contract_history(inv.text(0))?),
    },
    OperationSpec {
        name: "CreateTransaction",
        kind: OperationKind::Submit,
        params: PAYLOAD,
        returns: ReturnShape::Record,
        description: "Record a member transaction and compute its points",
        handler: |inv| to_json_string(&inv.transactions.create_transaction(inv.text(0))?),
    },
    OperationSpec {
        name: "UpdateStatus",
        kind: OperationKind::Submit,
        params: STATUS_UPDATE,
        returns: ReturnShape::Record,
        description: "Set the accrual status of a transaction",
        handler: |inv| to_json_string(&inv.transactions.update_status(inv.text(0), inv.text(1))?),
    },
    OperationSpec {
        name: "ReadTransaction",
        kind: OperationKind::Evaluate,
        params: ID,
        returns: ReturnShape::Record,
        description: "Fetch a transaction by identifier",
        handler: |inv| inv.transactions.read_transaction(inv.text(0)),
    },
    OperationSpec {
        name: "TransactionExists",
        kind: OperationKind::Evaluate,
        params: ID,
        returns: ReturnShape::Boolean,
        description: "Whether a transaction with the identifier exists",
        handler: |inv| to_json_string(&inv.transactions.transaction_exists(inv.text(0))?),
    },
    OperationSpec {
        name: "GetAllTransactions",
        kind: OperationKind::Evaluate,
        params: DOC_TYPE,
        returns: ReturnShape::Records,
        description: "All records of a docType (transactions by default)",
        handler: |inv| to_json_string(&inv.transactions.get_all_transactions(inv.text(0))?),
    },
    OperationSpec {
        name: "QueryTransactionsByMerchant",
        kind: OperationKind::Evaluate,
        params: MERCHANT,
        returns: ReturnShape::Records,
        description: "Transactions at a merchant",
        handler: |inv| {
            to_json_string(
                &inv.transactions
                    .query_transactions_by_merchant(MerchantId(inv.integer(0)?))?,
            )
        },
    },
    OperationSpec {
        name: "QueryTransactionsByMember",
        kind: OperationKind::Evaluate,
        params: MEMBER,
        returns: ReturnShape::Records,
        description: "Transactions of a member",
        handler: |inv| {
            to_json_string(
                &inv.transactions
                    .query_transactions_by_member(&MemberId::new(inv.text(0)))?,
            )
        },
    },
    OperationSpec {
        name: "QueryTransactionsByProgram",
        kind: OperationKind::Evaluate,
        params: PROGRAM,
        returns: ReturnShape::Records,
        description: "Transactions under a program",
        handler: |inv| {
            to_json_string(
                &inv.transactions
                    .query_transactions_by_program(ProgramId(inv.integer(0)?))?,
            )
        },
    },
    OperationSpec {
        name: "QueryTransactionsByMerchantStore",
        kind: OperationKind::Evaluate,
        params: MERCHANT_STORE,
        returns: ReturnShape::Records,
        description: "Transactions at a merchant store",
        handler: |inv| {
            to_json_string(
                &inv.transactions
                    .query_transactions_by_merchant_store(MerchantStoreId(inv.integer(0)?))?,
            )
        },
    },
    OperationSpec {
        name: "GetTransactionHistory",
        kind: OperationKind::Evaluate,
        params: ID,
        returns: ReturnShape::History,
        description: "Every past value of a transaction",
        handler: |inv| to_json_string(&inv.transactions.get_transaction_history(inv.text(0))?),
    },
];

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Routes named invocations with positional string arguments to the ledgers.
pub struct Dispatcher {
    registry: OperationRegistry,
    config: LedgerConfig,
}

impl Dispatcher {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            registry: OperationRegistry::standard(),
            config,
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Run `name` against `state` and return its JSON result.
    pub fn invoke(&self, state: &dyn WorldState, name: &str, args: &[String]) -> LedgerResult<String> {
        let spec = self
            .registry
            .get(name)
            .ok_or_else(|| LedgerError::invalid(format!("unknown operation {name:?}")))?;
        let (min, max) = (spec.required_params(), spec.params.len());
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(LedgerError::invalid(format!(
                "{name} expects {expected} argument(s), got {}",
                args.len()
            )));
        }

        debug!(operation = name, kind = %spec.kind, args = args.len(), "invoking");
        let invocation = Invocation {
            contracts: ContractLedger::new(state, &self.config),
            transactions: TransactionLedger::new(state, &self.config),
            spec,
            args,
        };
        (spec.handler)(&invocation)
    }

    /// Run `name` and wrap the outcome in a response envelope.
    pub fn respond(&self, state: &dyn WorldState, name: &str, args: &[String]) -> Response {
        match self.invoke(state, name, args) {
            Ok(text) => {
                let data = serde_json::from_str(&text).unwrap_or(Value::String(text));
                Response::ok(data)
            }
            Err(e) => prepare_error_message(&e),
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
