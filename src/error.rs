//! Failure taxonomy for recovery
//!
//! Everything here is fatal to the current startup attempt except the
//! referential soft-miss (delisted market, unregistered asset), which the
//! loaders handle inline by skipping the row and never surfaces as an
//! error. Loaders return a single success/failure outcome - no partial
//! success - and the owning process must not serve traffic after any
//! failure. Errors carry record ids and raw payloads for offline
//! diagnosis; there is no retry at this layer.

use crate::core_types::{LogId, OrderId};
use crate::decimal::DecimalError;
use crate::models::InvalidEnum;
use crate::state::StateError;
use crate::store::StoreError;
use thiserror::Error;

/// Top-level recovery failure.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// Transport/query failure against the backing store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A snapshot order row is well-formed but financially unusable.
    #[error("order {order_id}: field `{field}` does not decode: {source}")]
    OrderField {
        order_id: OrderId,
        field: &'static str,
        source: DecimalError,
    },

    /// A snapshot order row carries an out-of-range type/side value.
    #[error("order {order_id}: {source}")]
    OrderValue { order_id: OrderId, source: InvalidEnum },

    /// A snapshot balance row does not decode at its asset's precision.
    #[error("balance row {row_id} ({asset}): {source}")]
    BalanceField {
        row_id: u64,
        asset: String,
        source: DecimalError,
    },

    /// A snapshot balance row carries an out-of-range balance type.
    #[error("balance row {row_id}: {source}")]
    BalanceValue { row_id: u64, source: InvalidEnum },

    /// An operation-log detail cell is not a method/params document.
    #[error("operation {log_id}: invalid detail data: {detail}")]
    MalformedDetail { log_id: LogId, detail: String },

    /// An operation decoded but could not be validated or applied. The raw
    /// payload rides along for diagnosis.
    #[error("operation {log_id} failed ({detail}): {source}")]
    Operation {
        log_id: LogId,
        detail: String,
        source: OperationError,
    },

    /// A collaborator rejected a snapshot insertion.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Why a single operation-log record could not be replayed.
///
/// Structural variants (unknown method, arity, param type) mean the log is
/// corrupt or from an incompatible build; domain variants mean the record
/// would have been rejected by the original online validation, so its
/// presence in the log is itself a corruption signal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("expected {expected} params, got {got}")]
    ParamCount { expected: usize, got: usize },

    #[error("param {index} must be {expected}")]
    ParamType { index: usize, expected: &'static str },

    #[error("param {index}: {source}")]
    BadDecimal { index: usize, source: DecimalError },

    #[error(transparent)]
    Value(#[from] InvalidEnum),

    #[error("amount must be strictly positive")]
    AmountNotPositive,

    #[error("price must be strictly positive")]
    PriceNotPositive,

    #[error("fee must satisfy 0 <= fee < 1")]
    FeeOutOfRange,

    /// A cancel referenced an order the book does not hold: the snapshot
    /// and the log disagree.
    #[error("cancel of unknown order {order_id} in {market}")]
    OrderNotFound { market: String, order_id: OrderId },

    #[error(transparent)]
    State(#[from] StateError),
}
