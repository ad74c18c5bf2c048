//! Operation-log replay
//!
//! Re-applies every state-mutating request accepted after the snapshot was
//! taken, strictly in ascending log-id order. Each record's detail cell is
//! a `{method, params}` document; the dispatch below maps the method name
//! to a decoder+validator+applier for that operation kind.
//!
//! Validation must match the original online path exactly: an operation
//! that would have been rejected live cannot legally appear in the log, so
//! finding one here is corruption, not something to skip. The only skips
//! are referential (market/asset delisted since the record was written).

use crate::core_types::LogId;
use crate::decimal;
use crate::error::{OperationError, RecoveryError};
use crate::models::{ApplyMode, BalanceType, OrderSide};
use crate::paging::paged_scan;
use crate::state::EngineState;
use crate::store::{OperLogRow, PageSource};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// The structured payload of one operation-log record.
#[derive(Debug, Deserialize)]
struct OperDetail {
    method: String,
    params: Vec<Value>,
}

/// Outcome of one dispatched operation.
#[derive(Debug, PartialEq, Eq)]
enum Applied {
    Done,
    /// Referential soft-miss: success with no effect.
    Skipped,
}

// ============================================================================
// Param decoding helpers
// ============================================================================

fn expect_arity(params: &[Value], expected: usize) -> Result<(), OperationError> {
    if params.len() != expected {
        return Err(OperationError::ParamCount {
            expected,
            got: params.len(),
        });
    }
    Ok(())
}

/// Negative JSON integers are treated as a type mismatch; every id,
/// side, and type field in the log is non-negative.
fn int_param(params: &[Value], index: usize) -> Result<u64, OperationError> {
    params[index]
        .as_u64()
        .ok_or(OperationError::ParamType {
            index,
            expected: "integer",
        })
}

fn str_param<'a>(params: &'a [Value], index: usize) -> Result<&'a str, OperationError> {
    params[index]
        .as_str()
        .ok_or(OperationError::ParamType {
            index,
            expected: "string",
        })
}

fn decimal_param(params: &[Value], index: usize, scale: u32) -> Result<Decimal, OperationError> {
    let text = str_param(params, index)?;
    decimal::decode(text, scale).map_err(|source| OperationError::BadDecimal { index, source })
}

// ============================================================================
// Operation handlers
// ============================================================================

/// `update_balance(user_id, type, asset, business, business_id, change)`
fn apply_update_balance<E: EngineState>(
    state: &mut E,
    params: &[Value],
) -> Result<Applied, OperationError> {
    expect_arity(params, 6)?;
    let user_id = int_param(params, 0)?;
    let balance_type = BalanceType::try_from(int_param(params, 1)?)?;
    let asset = str_param(params, 2)?.to_string();
    let Some(prec) = state.asset_precision(&asset) else {
        return Ok(Applied::Skipped);
    };
    let business = str_param(params, 3)?;
    let business_id = int_param(params, 4)?;
    // Balance changes are signed: deposits and deductions both replay here.
    let change = decimal_param(params, 5, prec)?;

    state.balance_update(
        ApplyMode::Replay,
        user_id,
        balance_type,
        &asset,
        business,
        business_id,
        change,
    )?;
    Ok(Applied::Done)
}

/// `limit_order(user_id, market, side, amount, price, fee)`
fn apply_limit_order<E: EngineState>(
    state: &mut E,
    params: &[Value],
) -> Result<Applied, OperationError> {
    expect_arity(params, 6)?;
    let user_id = int_param(params, 0)?;
    let market_name = str_param(params, 1)?.to_string();
    let Some(market) = state.market(&market_name) else {
        return Ok(Applied::Skipped);
    };
    let side = OrderSide::try_from(int_param(params, 2)?)?;

    let amount = decimal_param(params, 3, market.stock_prec)?;
    if amount <= Decimal::ZERO {
        return Err(OperationError::AmountNotPositive);
    }
    let price = decimal_param(params, 4, market.money_prec)?;
    if price <= Decimal::ZERO {
        return Err(OperationError::PriceNotPositive);
    }
    let fee = decimal_param(params, 5, market.fee_prec)?;
    if fee < Decimal::ZERO || fee >= Decimal::ONE {
        return Err(OperationError::FeeOutOfRange);
    }

    state.put_limit_order(ApplyMode::Replay, &market_name, user_id, side, amount, price, fee)?;
    Ok(Applied::Done)
}

/// `market_order(user_id, market, side, amount, fee)`
fn apply_market_order<E: EngineState>(
    state: &mut E,
    params: &[Value],
) -> Result<Applied, OperationError> {
    expect_arity(params, 5)?;
    let user_id = int_param(params, 0)?;
    let market_name = str_param(params, 1)?.to_string();
    let Some(market) = state.market(&market_name) else {
        return Ok(Applied::Skipped);
    };
    let side = OrderSide::try_from(int_param(params, 2)?)?;

    let amount = decimal_param(params, 3, market.stock_prec)?;
    if amount <= Decimal::ZERO {
        return Err(OperationError::AmountNotPositive);
    }
    let fee = decimal_param(params, 4, market.fee_prec)?;
    if fee < Decimal::ZERO || fee >= Decimal::ONE {
        return Err(OperationError::FeeOutOfRange);
    }

    state.put_market_order(ApplyMode::Replay, &market_name, user_id, side, amount, fee)?;
    Ok(Applied::Done)
}

/// `cancel_order(user_id, market, order_id)`
fn apply_cancel_order<E: EngineState>(
    state: &mut E,
    params: &[Value],
) -> Result<Applied, OperationError> {
    expect_arity(params, 3)?;
    let _user_id = int_param(params, 0)?;
    let market_name = str_param(params, 1)?.to_string();
    if state.market(&market_name).is_none() {
        return Ok(Applied::Skipped);
    }
    let order_id = int_param(params, 2)?;

    // A cancel of an order the book does not hold means the snapshot and
    // the log disagree - fatal, unlike the delisted-market skip above.
    if !state.find_order(&market_name, order_id) {
        return Err(OperationError::OrderNotFound {
            market: market_name,
            order_id,
        });
    }

    state.cancel_order(ApplyMode::Replay, &market_name, order_id)?;
    Ok(Applied::Done)
}

/// Method-name routing. Unknown methods are fatal: the log contains an
/// operation this build does not understand and recovery cannot safely
/// continue past it.
fn dispatch<E: EngineState>(
    state: &mut E,
    method: &str,
    params: &[Value],
) -> Result<Applied, OperationError> {
    match method {
        "update_balance" => apply_update_balance(state, params),
        "limit_order" => apply_limit_order(state, params),
        "market_order" => apply_market_order(state, params),
        "cancel_order" => apply_cancel_order(state, params),
        other => Err(OperationError::UnknownMethod(other.to_string())),
    }
}

// ============================================================================
// Replayer
// ============================================================================

/// Replay the operation log on top of the loaded snapshot.
///
/// Returns the last replayed log id - the resume cursor for the log writer
/// once the engine goes live.
pub async fn load_operations<S, E>(
    source: &S,
    state: &mut E,
    page_size: usize,
) -> Result<LogId, RecoveryError>
where
    S: PageSource<Row = OperLogRow>,
    E: EngineState,
{
    let mut applied = 0usize;
    let mut skipped = 0usize;

    let last_id = paged_scan(source, page_size, |row: OperLogRow| {
        let detail: OperDetail =
            serde_json::from_str(&row.detail).map_err(|_| RecoveryError::MalformedDetail {
                log_id: row.id,
                detail: row.detail.clone(),
            })?;

        match dispatch(state, &detail.method, &detail.params) {
            Ok(Applied::Done) => {
                applied += 1;
                Ok(())
            }
            Ok(Applied::Skipped) => {
                tracing::debug!(log_id = row.id, method = %detail.method, "skipped operation for delisted market/asset");
                skipped += 1;
                Ok(())
            }
            Err(source) => Err(RecoveryError::Operation {
                log_id: row.id,
                detail: row.detail,
                source,
            }),
        }
    })
    .await?;

    tracing::info!(applied, skipped, last_id, "replayed operation log");
    Ok(last_id)
}
