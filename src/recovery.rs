//! Full startup recovery sequence
//!
//! A startup barrier, not a service: markets -> orders -> balances ->
//! operation log, single-threaded, run to completion before the engine
//! accepts any live traffic. Any failure aborts the attempt; the owning
//! process must not serve with partially loaded state.

use crate::config::TablesConfig;
use crate::core_types::LogId;
use crate::error::RecoveryError;
use crate::oplog::load_operations;
use crate::paging::PAGE_SIZE;
use crate::snapshot::{load_balances, load_markets, load_orders};
use crate::state::EngineState;
use crate::store::{BalanceRow, Db, MarketOffsetSource, OperLogRow, OrderRow, PageSource};
use std::time::Instant;

/// Run the fixed load sequence against arbitrary sources.
///
/// Markets must exist before the orders/balances that reference them, and
/// the snapshot must be fully applied before replay resumes from the log.
/// Returns the last replayed log id (the log writer's resume cursor).
pub async fn run_recovery<M, O, B, L, E>(
    markets: &M,
    orders: &O,
    balances: &B,
    operlog: &L,
    state: &mut E,
    page_size: usize,
) -> Result<LogId, RecoveryError>
where
    M: MarketOffsetSource,
    O: PageSource<Row = OrderRow>,
    B: PageSource<Row = BalanceRow>,
    L: PageSource<Row = OperLogRow>,
    E: EngineState,
{
    load_markets(markets, state).await?;
    load_orders(orders, state, page_size).await?;
    load_balances(balances, state, page_size).await?;
    load_operations(operlog, state, page_size).await
}

/// Recovery against a live MySQL store.
pub struct Recovery<'a> {
    db: &'a Db,
    tables: &'a TablesConfig,
    page_size: usize,
}

impl<'a> Recovery<'a> {
    pub fn new(db: &'a Db, tables: &'a TablesConfig) -> Self {
        Self {
            db,
            tables,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Load the snapshot and replay the operation log into `state`.
    pub async fn run<E: EngineState>(&self, state: &mut E) -> Result<LogId, RecoveryError> {
        let started = Instant::now();
        let last_oper_id = run_recovery(
            &self.db.market_offsets(&self.tables.markets),
            &self.db.table::<OrderRow>(&self.tables.orders),
            &self.db.table::<BalanceRow>(&self.tables.balances),
            &self.db.table::<OperLogRow>(&self.tables.operlog),
            state,
            self.page_size,
        )
        .await?;

        tracing::info!(
            last_oper_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "recovery complete"
        );
        Ok(last_oper_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BalanceType, MarketInfo};
    use crate::store::{BalanceRow, MarketOffsetRow, MemMarketOffsets, MemTable, OperLogRow, OrderRow};
    use crate::testutil::{Call, RecordingState};
    use crate::verify::VerifyState;
    use rust_decimal::Decimal;

    fn snapshot_order_row() -> OrderRow {
        OrderRow {
            id: 1001,
            t: 1,
            side: 2,
            create_time: 1000.0,
            update_time: 1000.0,
            user_id: 7,
            market: "BTCUSD".into(),
            price: "100.50".into(),
            amount: "2.0".into(),
            fee: "0.001".into(),
            left: "1.0".into(),
            freeze: "0".into(),
            deal_stock: "1".into(),
            deal_money: "100".into(),
            deal_fee: "0".into(),
        }
    }

    #[tokio::test]
    async fn test_snapshot_then_replay_insert_precedes_cancel() {
        // One market offset, one snapshot order, one cancel in the log:
        // the book must see the insertion before the cancellation, with
        // id_start applied before either.
        let markets = MemMarketOffsets(vec![MarketOffsetRow {
            market: "BTCUSD".into(),
            id_start: 1000,
        }]);
        let orders = MemTable::new(vec![snapshot_order_row()]);
        let balances = MemTable::new(Vec::<BalanceRow>::new());
        let operlog = MemTable::new(vec![OperLogRow {
            id: 1,
            detail: r#"{"method":"cancel_order","params":[7,"BTCUSD",1001]}"#.into(),
        }]);

        let mut state = RecordingState::new().with_market("BTCUSD", 8, 2, 4);
        let last = run_recovery(&markets, &orders, &balances, &operlog, &mut state, 1000)
            .await
            .unwrap();

        assert_eq!(last, 1);
        assert_eq!(
            state.calls,
            vec![
                Call::SetIdStart {
                    market: "BTCUSD".into(),
                    id_start: 1000
                },
                Call::InsertOrder { order_id: 1001 },
                Call::CancelOrder {
                    market: "BTCUSD".into(),
                    order_id: 1001
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_replay_is_idempotent_from_a_clean_state() {
        // Running the same snapshot + log twice against freshly reset
        // state must produce identical books and balances.
        let markets = MemMarketOffsets(vec![MarketOffsetRow {
            market: "BTCUSD".into(),
            id_start: 1000,
        }]);
        let orders = MemTable::new(vec![snapshot_order_row()]);
        let balances = MemTable::new(vec![BalanceRow {
            id: 1,
            user_id: 7,
            asset: "USD".into(),
            t: 1,
            balance: "5000.00".into(),
        }]);
        let operlog = MemTable::new(vec![
            OperLogRow {
                id: 1,
                detail: r#"{"method":"update_balance","params":[7,1,"USD","deposit",11,"250.00"]}"#
                    .into(),
            },
            OperLogRow {
                id: 2,
                detail:
                    r#"{"method":"limit_order","params":[7,"BTCUSD",1,"0.50000000","101.00","0.0010"]}"#
                        .into(),
            },
            OperLogRow {
                id: 3,
                detail: r#"{"method":"cancel_order","params":[7,"BTCUSD",1001]}"#.into(),
            },
        ]);

        let mut runs = Vec::new();
        for _ in 0..2 {
            let mut state = VerifyState::new();
            state.add_market(
                "BTCUSD",
                MarketInfo {
                    stock_prec: 8,
                    money_prec: 2,
                    fee_prec: 4,
                },
            );
            state.add_asset("USD", 2);

            let last = run_recovery(&markets, &orders, &balances, &operlog, &mut state, 1000)
                .await
                .unwrap();
            assert_eq!(last, 3);
            runs.push((
                state.order_count(),
                state.balance(7, BalanceType::Available, "USD"),
                state.find_order("BTCUSD", 1001),
            ));
        }

        assert_eq!(runs[0], runs[1]);
        // Snapshot order cancelled, replayed limit order resting.
        assert_eq!(runs[0].0, 1);
        assert_eq!(runs[0].1, Decimal::new(525_000, 2));
        assert!(!runs[0].2);
    }

    #[tokio::test]
    async fn test_replayed_limit_order_rests_in_verify_state() {
        let markets = MemMarketOffsets(vec![]);
        let orders = MemTable::new(Vec::<OrderRow>::new());
        let balances = MemTable::new(Vec::<BalanceRow>::new());
        let operlog = MemTable::new(vec![OperLogRow {
            id: 9,
            detail: r#"{"method":"limit_order","params":[3,"BTCUSD",2,"1.0","99.00","0"]}"#.into(),
        }]);

        let mut state = VerifyState::new();
        state.add_market(
            "BTCUSD",
            MarketInfo {
                stock_prec: 8,
                money_prec: 2,
                fee_prec: 4,
            },
        );

        run_recovery(&markets, &orders, &balances, &operlog, &mut state, 1000)
            .await
            .unwrap();

        assert_eq!(state.order_count(), 1);
        assert_eq!(state.market_orders_seen(), 0);
    }
}
