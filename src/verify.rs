//! Dry-run verification state
//!
//! An in-memory [`EngineState`] that does bookkeeping only: it tracks
//! which orders rest in which market, per-bucket balances, and market id
//! offsets, but performs no matching. Replayed limit orders rest with
//! their full amount and market orders consume nothing, so quantities are
//! not economically meaningful - the point is to prove that a snapshot
//! plus log replays cleanly (every reference resolves, every record
//! validates) before the real engine is restarted against it.
//!
//! Replayed orders are numbered from a synthetic sequence seeded by the
//! snapshot's highest order id and the market `id_start` offsets; ids will
//! match the original assignment only when the engine numbered orders from
//! the same sequence.

use crate::core_types::{BusinessId, OrderId, UserId};
use crate::models::{ApplyMode, BalanceType, MarketInfo, Order, OrderSide, OrderType};
use crate::state::{EngineState, StateError};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

struct MarketBook {
    info: MarketInfo,
    id_start: OrderId,
    orders: FxHashMap<OrderId, Order>,
}

/// Bookkeeping-only engine state for `recovery-check` and tests.
#[derive(Default)]
pub struct VerifyState {
    markets: FxHashMap<String, MarketBook>,
    assets: FxHashMap<String, u32>,
    balances: FxHashMap<(UserId, BalanceType, String), Decimal>,
    next_order_id: OrderId,
    market_orders_seen: u64,
}

impl VerifyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a configured market with its decimal scales.
    pub fn add_market(&mut self, name: &str, info: MarketInfo) {
        self.markets.insert(
            name.to_string(),
            MarketBook {
                info,
                id_start: 0,
                orders: FxHashMap::default(),
            },
        );
    }

    /// Register an asset and its balance precision.
    pub fn add_asset(&mut self, name: &str, prec: u32) {
        self.assets.insert(name.to_string(), prec);
    }

    /// Total resting orders across all markets.
    pub fn order_count(&self) -> usize {
        self.markets.values().map(|m| m.orders.len()).sum()
    }

    /// Distinct balance entries.
    pub fn balance_count(&self) -> usize {
        self.balances.len()
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Market orders seen during replay (they never rest).
    pub fn market_orders_seen(&self) -> u64 {
        self.market_orders_seen
    }

    /// Balance for one (user, bucket, asset), zero if absent.
    pub fn balance(&self, user_id: UserId, balance_type: BalanceType, asset: &str) -> Decimal {
        self.balances
            .get(&(user_id, balance_type, asset.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn id_start(&self, market: &str) -> Option<OrderId> {
        self.markets.get(market).map(|m| m.id_start)
    }

    fn next_id(&mut self) -> OrderId {
        self.next_order_id += 1;
        self.next_order_id
    }
}

impl EngineState for VerifyState {
    fn market(&self, name: &str) -> Option<MarketInfo> {
        self.markets.get(name).map(|m| m.info)
    }

    fn set_market_id_start(&mut self, market: &str, id_start: OrderId) {
        if let Some(book) = self.markets.get_mut(market) {
            book.id_start = id_start;
            self.next_order_id = self.next_order_id.max(id_start);
        }
    }

    fn asset_precision(&self, asset: &str) -> Option<u32> {
        self.assets.get(asset).copied()
    }

    fn insert_order(&mut self, order: Order) -> Result<(), StateError> {
        let book = self
            .markets
            .get_mut(&order.market)
            .ok_or_else(|| StateError::new(format!("no market {}", order.market)))?;
        self.next_order_id = self.next_order_id.max(order.id);
        book.orders.insert(order.id, order);
        Ok(())
    }

    fn put_limit_order(
        &mut self,
        _mode: ApplyMode,
        market: &str,
        user_id: UserId,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Result<(), StateError> {
        let id = self.next_id();
        let book = self
            .markets
            .get_mut(market)
            .ok_or_else(|| StateError::new(format!("no market {market}")))?;
        // No matching: the order rests whole.
        book.orders.insert(
            id,
            Order {
                id,
                order_type: OrderType::Limit,
                side,
                create_time: 0.0,
                update_time: 0.0,
                user_id,
                market: market.to_string(),
                price,
                amount,
                fee,
                left: amount,
                freeze: Decimal::ZERO,
                deal_stock: Decimal::ZERO,
                deal_money: Decimal::ZERO,
                deal_fee: Decimal::ZERO,
            },
        );
        Ok(())
    }

    fn put_market_order(
        &mut self,
        _mode: ApplyMode,
        market: &str,
        _user_id: UserId,
        _side: OrderSide,
        _amount: Decimal,
        _fee: Decimal,
    ) -> Result<(), StateError> {
        if !self.markets.contains_key(market) {
            return Err(StateError::new(format!("no market {market}")));
        }
        // Market orders never rest; count them for the summary.
        self.market_orders_seen += 1;
        Ok(())
    }

    fn find_order(&self, market: &str, order_id: OrderId) -> bool {
        self.markets
            .get(market)
            .is_some_and(|book| book.orders.contains_key(&order_id))
    }

    fn cancel_order(
        &mut self,
        _mode: ApplyMode,
        market: &str,
        order_id: OrderId,
    ) -> Result<(), StateError> {
        let book = self
            .markets
            .get_mut(market)
            .ok_or_else(|| StateError::new(format!("no market {market}")))?;
        book.orders
            .remove(&order_id)
            .ok_or_else(|| StateError::new(format!("order {order_id} not resting in {market}")))?;
        Ok(())
    }

    fn balance_set(
        &mut self,
        user_id: UserId,
        balance_type: BalanceType,
        asset: &str,
        amount: Decimal,
    ) {
        self.balances
            .insert((user_id, balance_type, asset.to_string()), amount);
    }

    fn balance_update(
        &mut self,
        _mode: ApplyMode,
        user_id: UserId,
        balance_type: BalanceType,
        asset: &str,
        _business: &str,
        _business_id: BusinessId,
        change: Decimal,
    ) -> Result<(), StateError> {
        let entry = self
            .balances
            .entry((user_id, balance_type, asset.to_string()))
            .or_insert(Decimal::ZERO);
        *entry += change;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btcusd() -> MarketInfo {
        MarketInfo {
            stock_prec: 8,
            money_prec: 2,
            fee_prec: 4,
        }
    }

    #[test]
    fn test_id_start_only_applies_to_known_markets() {
        let mut state = VerifyState::new();
        state.add_market("BTCUSD", btcusd());

        state.set_market_id_start("BTCUSD", 1000);
        state.set_market_id_start("GONE", 5);

        assert_eq!(state.id_start("BTCUSD"), Some(1000));
        assert_eq!(state.id_start("GONE"), None);
    }

    #[test]
    fn test_limit_orders_rest_and_cancel() {
        let mut state = VerifyState::new();
        state.add_market("BTCUSD", btcusd());
        state.set_market_id_start("BTCUSD", 1000);

        state
            .put_limit_order(
                ApplyMode::Replay,
                "BTCUSD",
                7,
                OrderSide::Bid,
                Decimal::ONE,
                Decimal::new(10050, 2),
                Decimal::ZERO,
            )
            .unwrap();

        // Synthetic ids continue after id_start.
        assert!(state.find_order("BTCUSD", 1001));
        state
            .cancel_order(ApplyMode::Replay, "BTCUSD", 1001)
            .unwrap();
        assert!(!state.find_order("BTCUSD", 1001));
        assert!(state.cancel_order(ApplyMode::Replay, "BTCUSD", 1001).is_err());
    }

    #[test]
    fn test_balance_set_overwrites_update_accumulates() {
        let mut state = VerifyState::new();
        state.add_asset("BTC", 8);

        state.balance_set(7, BalanceType::Available, "BTC", Decimal::new(10, 0));
        state.balance_set(7, BalanceType::Available, "BTC", Decimal::new(3, 0));
        assert_eq!(
            state.balance(7, BalanceType::Available, "BTC"),
            Decimal::new(3, 0)
        );

        state
            .balance_update(
                ApplyMode::Replay,
                7,
                BalanceType::Available,
                "BTC",
                "deposit",
                1,
                Decimal::new(-1, 0),
            )
            .unwrap();
        assert_eq!(
            state.balance(7, BalanceType::Available, "BTC"),
            Decimal::new(2, 0)
        );
    }
}
