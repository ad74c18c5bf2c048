//! Snapshot loading: markets -> orders -> balances
//!
//! Seeds the base state the operation-log replay builds on. The three
//! phases run in a fixed order because orders and balances reference
//! markets and assets that must already be registered.
//!
//! Referential misses (delisted market, unregistered asset) skip the row;
//! every other failure aborts the whole load. A partially populated order
//! or balance corrupts the book, so there is no per-row recovery.

use crate::decimal;
use crate::error::RecoveryError;
use crate::models::{MarketInfo, Order, OrderSide, OrderType};
use crate::paging::paged_scan;
use crate::state::EngineState;
use crate::store::{BalanceRow, MarketOffsetSource, OrderRow, PageSource};

/// Apply market id-start offsets. Single unpaginated query; offsets for
/// markets no longer configured are dropped.
pub async fn load_markets<M, E>(source: &M, state: &mut E) -> Result<(), RecoveryError>
where
    M: MarketOffsetSource,
    E: EngineState,
{
    let rows = source.fetch_all().await?;
    let mut applied = 0usize;
    let mut skipped = 0usize;

    for row in rows {
        if state.market(&row.market).is_none() {
            tracing::debug!(market = %row.market, "skipping id offset for delisted market");
            skipped += 1;
            continue;
        }
        state.set_market_id_start(&row.market, row.id_start);
        applied += 1;
    }

    tracing::info!(applied, skipped, "loaded market id offsets");
    Ok(())
}

/// Decode one persisted order row at its market's precisions.
///
/// Price/amount/fee scale per market; freeze and the deal_* accumulators
/// are internal ledger units at scale 0. Any decode failure is fatal for
/// the whole load, identified by the failing order id.
fn decode_order(row: OrderRow, market: &MarketInfo) -> Result<Order, RecoveryError> {
    let order_id = row.id;
    let field = |field: &'static str| {
        move |source| RecoveryError::OrderField {
            order_id,
            field,
            source,
        }
    };

    Ok(Order {
        id: row.id,
        order_type: OrderType::try_from(u64::from(row.t))
            .map_err(|source| RecoveryError::OrderValue { order_id, source })?,
        side: OrderSide::try_from(u64::from(row.side))
            .map_err(|source| RecoveryError::OrderValue { order_id, source })?,
        create_time: row.create_time,
        update_time: row.update_time,
        user_id: row.user_id,
        market: row.market,
        price: decimal::decode(&row.price, market.money_prec).map_err(field("price"))?,
        amount: decimal::decode(&row.amount, market.stock_prec).map_err(field("amount"))?,
        fee: decimal::decode(&row.fee, market.fee_prec).map_err(field("fee"))?,
        left: decimal::decode(&row.left, market.stock_prec).map_err(field("left"))?,
        freeze: decimal::decode(&row.freeze, 0).map_err(field("freeze"))?,
        deal_stock: decimal::decode(&row.deal_stock, 0).map_err(field("deal_stock"))?,
        deal_money: decimal::decode(&row.deal_money, 0).map_err(field("deal_money"))?,
        deal_fee: decimal::decode(&row.deal_fee, 0).map_err(field("deal_fee"))?,
    })
}

/// Stream the orders snapshot into the book.
///
/// Insertion is append-only; the originating engine guarantees unique ids,
/// so no duplicate check happens here.
pub async fn load_orders<S, E>(
    source: &S,
    state: &mut E,
    page_size: usize,
) -> Result<(), RecoveryError>
where
    S: PageSource<Row = OrderRow>,
    E: EngineState,
{
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    let cursor = paged_scan(source, page_size, |row: OrderRow| -> Result<(), RecoveryError> {
        let Some(market) = state.market(&row.market) else {
            // Delisted market: its historical orders are irrelevant.
            skipped += 1;
            return Ok(());
        };
        let order = decode_order(row, &market)?;
        state.insert_order(order)?;
        inserted += 1;
        Ok(())
    })
    .await?;

    tracing::info!(inserted, skipped, cursor, "loaded order snapshot");
    Ok(())
}

/// Stream the balances snapshot into the ledger, overwrite semantics.
pub async fn load_balances<S, E>(
    source: &S,
    state: &mut E,
    page_size: usize,
) -> Result<(), RecoveryError>
where
    S: PageSource<Row = BalanceRow>,
    E: EngineState,
{
    let mut loaded = 0usize;
    let mut skipped = 0usize;

    let cursor = paged_scan(source, page_size, |row: BalanceRow| -> Result<(), RecoveryError> {
        let Some(prec) = state.asset_precision(&row.asset) else {
            skipped += 1;
            return Ok(());
        };
        let balance_type = crate::models::BalanceType::try_from(u64::from(row.t))
            .map_err(|source| RecoveryError::BalanceValue { row_id: row.id, source })?;
        let amount = decimal::decode(&row.balance, prec).map_err(|source| {
            RecoveryError::BalanceField {
                row_id: row.id,
                asset: row.asset.clone(),
                source,
            }
        })?;
        state.balance_set(row.user_id, balance_type, &row.asset, amount);
        loaded += 1;
        Ok(())
    })
    .await?;

    tracing::info!(loaded, skipped, cursor, "loaded balance snapshot");
    Ok(())
}
