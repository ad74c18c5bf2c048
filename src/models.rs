// models.rs - domain types rebuilt by recovery

use crate::core_types::{OrderId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// A persisted integer did not map to a known enum value.
///
/// The snapshot and log are written by the engine itself, so an out-of-range
/// side/type/balance-kind is corruption, not user input.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {what} value: {value}")]
pub struct InvalidEnum {
    pub what: &'static str,
    pub value: u64,
}

/// Order side. Discriminants follow the persisted wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSide {
    Ask = 1,
    Bid = 2,
}

impl TryFrom<u64> for OrderSide {
    type Error = InvalidEnum;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Ask),
            2 => Ok(Self::Bid),
            _ => Err(InvalidEnum { what: "side", value }),
        }
    }
}

/// Order type. Discriminants follow the persisted wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit = 1,
    Market = 2,
}

impl TryFrom<u64> for OrderType {
    type Error = InvalidEnum;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Limit),
            2 => Ok(Self::Market),
            _ => Err(InvalidEnum { what: "order type", value }),
        }
    }
}

/// Balance bucket a ledger entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceType {
    Available = 1,
    Frozen = 2,
}

impl TryFrom<u64> for BalanceType {
    type Error = InvalidEnum;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Available),
            2 => Ok(Self::Frozen),
            _ => Err(InvalidEnum { what: "balance type", value }),
        }
    }
}

/// How a state mutation is being applied.
///
/// `Replay` tells collaborators to mutate in-memory state only: no new
/// operation-log entry, no external notification. Recovery must be
/// observably silent to everything except the state itself, so the mode
/// is an explicit parameter on every mutation, never ambient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    Live,
    Replay,
}

impl ApplyMode {
    #[inline]
    pub fn is_replay(self) -> bool {
        self == ApplyMode::Replay
    }
}

/// Per-market decimal scales.
///
/// `stock_prec` scales amounts, `money_prec` scales prices and quote
/// values, `fee_prec` scales fee rates. The registry owning the market
/// also tracks `id_start` (lowest order id of the market's snapshot),
/// mutated through [`crate::state::EngineState::set_market_id_start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketInfo {
    pub stock_prec: u32,
    pub money_prec: u32,
    pub fee_prec: u32,
}

/// A fully decoded resting order from the snapshot.
///
/// All nine decimal fields must decode or the whole load aborts - a
/// partially populated order would corrupt the book. Ownership passes to
/// the order-book collaborator on insert; recovery never mutates an order
/// after that.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub order_type: OrderType,
    pub side: OrderSide,
    /// Creation timestamp, fractional seconds.
    pub create_time: f64,
    /// Last-update timestamp, fractional seconds.
    pub update_time: f64,
    pub user_id: UserId,
    pub market: String,
    /// Scaled at the market's money precision.
    pub price: Decimal,
    /// Scaled at the market's stock precision.
    pub amount: Decimal,
    /// Scaled at the market's fee precision.
    pub fee: Decimal,
    /// Remaining unfilled amount, stock precision.
    pub left: Decimal,
    /// Frozen funds in internal ledger units (scale 0).
    pub freeze: Decimal,
    /// Cumulative filled stock, ledger units (scale 0).
    pub deal_stock: Decimal,
    /// Cumulative filled money, ledger units (scale 0).
    pub deal_money: Decimal,
    /// Cumulative charged fee, ledger units (scale 0).
    pub deal_fee: Decimal,
}
