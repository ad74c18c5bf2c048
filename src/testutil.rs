//! Test support: a recording `EngineState` fake
//!
//! Captures every collaborator call in order so loader tests can assert
//! both the effects and their sequence.

use crate::core_types::{BusinessId, OrderId, UserId};
use crate::models::{ApplyMode, BalanceType, MarketInfo, Order, OrderSide};
use crate::state::{EngineState, StateError};
use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetIdStart {
        market: String,
        id_start: OrderId,
    },
    InsertOrder {
        order_id: OrderId,
    },
    LimitOrder {
        market: String,
        user_id: UserId,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
        fee: Decimal,
    },
    MarketOrder {
        market: String,
        user_id: UserId,
        side: OrderSide,
        amount: Decimal,
        fee: Decimal,
    },
    CancelOrder {
        market: String,
        order_id: OrderId,
    },
    BalanceSet {
        user_id: UserId,
        balance_type: BalanceType,
        asset: String,
        amount: Decimal,
    },
    BalanceUpdate {
        user_id: UserId,
        balance_type: BalanceType,
        asset: String,
        business: String,
        business_id: BusinessId,
        change: Decimal,
    },
}

#[derive(Default)]
pub struct RecordingState {
    markets: FxHashMap<String, MarketInfo>,
    assets: FxHashMap<String, u32>,
    resting: FxHashMap<String, FxHashSet<OrderId>>,
    pub calls: Vec<Call>,
}

impl RecordingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, name: &str, stock_prec: u32, money_prec: u32, fee_prec: u32) -> Self {
        self.markets.insert(
            name.to_string(),
            MarketInfo {
                stock_prec,
                money_prec,
                fee_prec,
            },
        );
        self
    }

    pub fn with_asset(mut self, name: &str, prec: u32) -> Self {
        self.assets.insert(name.to_string(), prec);
        self
    }

    pub fn with_resting_order(mut self, market: &str, order_id: OrderId) -> Self {
        self.resting.entry(market.to_string()).or_default().insert(order_id);
        self
    }
}

impl EngineState for RecordingState {
    fn market(&self, name: &str) -> Option<MarketInfo> {
        self.markets.get(name).copied()
    }

    fn set_market_id_start(&mut self, market: &str, id_start: OrderId) {
        self.calls.push(Call::SetIdStart {
            market: market.to_string(),
            id_start,
        });
    }

    fn asset_precision(&self, asset: &str) -> Option<u32> {
        self.assets.get(asset).copied()
    }

    fn insert_order(&mut self, order: Order) -> Result<(), StateError> {
        self.resting
            .entry(order.market.clone())
            .or_default()
            .insert(order.id);
        self.calls.push(Call::InsertOrder { order_id: order.id });
        Ok(())
    }

    fn put_limit_order(
        &mut self,
        mode: ApplyMode,
        market: &str,
        user_id: UserId,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Result<(), StateError> {
        assert!(mode.is_replay(), "recovery must place orders in replay mode");
        self.calls.push(Call::LimitOrder {
            market: market.to_string(),
            user_id,
            side,
            amount,
            price,
            fee,
        });
        Ok(())
    }

    fn put_market_order(
        &mut self,
        mode: ApplyMode,
        market: &str,
        user_id: UserId,
        side: OrderSide,
        amount: Decimal,
        fee: Decimal,
    ) -> Result<(), StateError> {
        assert!(mode.is_replay(), "recovery must place orders in replay mode");
        self.calls.push(Call::MarketOrder {
            market: market.to_string(),
            user_id,
            side,
            amount,
            fee,
        });
        Ok(())
    }

    fn find_order(&self, market: &str, order_id: OrderId) -> bool {
        self.resting
            .get(market)
            .is_some_and(|orders| orders.contains(&order_id))
    }

    fn cancel_order(
        &mut self,
        mode: ApplyMode,
        market: &str,
        order_id: OrderId,
    ) -> Result<(), StateError> {
        assert!(mode.is_replay(), "recovery must cancel in replay mode");
        let removed = self
            .resting
            .get_mut(market)
            .is_some_and(|orders| orders.remove(&order_id));
        if !removed {
            return Err(StateError::new(format!(
                "order {order_id} not resting in {market}"
            )));
        }
        self.calls.push(Call::CancelOrder {
            market: market.to_string(),
            order_id,
        });
        Ok(())
    }

    fn balance_set(
        &mut self,
        user_id: UserId,
        balance_type: BalanceType,
        asset: &str,
        amount: Decimal,
    ) {
        self.calls.push(Call::BalanceSet {
            user_id,
            balance_type,
            asset: asset.to_string(),
            amount,
        });
    }

    fn balance_update(
        &mut self,
        mode: ApplyMode,
        user_id: UserId,
        balance_type: BalanceType,
        asset: &str,
        business: &str,
        business_id: BusinessId,
        change: Decimal,
    ) -> Result<(), StateError> {
        assert!(mode.is_replay(), "recovery must update balances in replay mode");
        self.calls.push(Call::BalanceUpdate {
            user_id,
            balance_type,
            asset: asset.to_string(),
            business: business.to_string(),
            business_id,
            change,
        });
        Ok(())
    }
}
