//! Capability interface to the engine state being rebuilt
//!
//! Recovery owns no long-lived state: it is a pure transformation from
//! persisted rows to mutations on collaborator-owned state (order book,
//! balance ledger, market registry). Those collaborators appear here as a
//! single trait so the loaders can be tested against recording fakes and
//! the live engine can plug in unchanged.
//!
//! The registry side is read-mostly: recovery only ever reads market and
//! asset metadata, except for the single `id_start` field it sets during
//! the markets phase.

use crate::core_types::{BusinessId, OrderId, UserId};
use crate::models::{ApplyMode, BalanceType, MarketInfo, Order, OrderSide};
use rust_decimal::Decimal;
use thiserror::Error;

/// A collaborator rejected a state mutation.
///
/// During replay this is always fatal for the current startup attempt:
/// the live path accepted the operation when it was logged, so a rejection
/// now means the rebuilt state has diverged.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct StateError(pub String);

impl StateError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The in-memory trading state recovery writes into.
///
/// Implementations must guarantee that a single-threaded sequence of
/// `ApplyMode::Replay` calls is sufficient to reach a consistent state;
/// recovery is the only writer for its duration and takes no locks.
pub trait EngineState {
    /// Look up a market's decimal scales by name. `None` means the market
    /// is no longer configured (delisted) - a soft miss, never an error.
    fn market(&self, name: &str) -> Option<MarketInfo>;

    /// Record the lowest order id this market's snapshot orders begin from.
    fn set_market_id_start(&mut self, market: &str, id_start: OrderId);

    /// Decimal scale registered for an asset, `None` if unregistered.
    fn asset_precision(&self, asset: &str) -> Option<u32>;

    /// Insert a fully decoded snapshot order into the book. Append-only;
    /// the loader does not check for duplicate ids.
    fn insert_order(&mut self, order: Order) -> Result<(), StateError>;

    /// Place a limit order exactly as the live path would have.
    #[allow(clippy::too_many_arguments)]
    fn put_limit_order(
        &mut self,
        mode: ApplyMode,
        market: &str,
        user_id: UserId,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Result<(), StateError>;

    /// Place a market order exactly as the live path would have. A market
    /// order may legitimately consume nothing (empty opposite book); that
    /// is success, not an error.
    fn put_market_order(
        &mut self,
        mode: ApplyMode,
        market: &str,
        user_id: UserId,
        side: OrderSide,
        amount: Decimal,
        fee: Decimal,
    ) -> Result<(), StateError>;

    /// Whether `order_id` currently rests in `market`'s book.
    fn find_order(&self, market: &str, order_id: OrderId) -> bool;

    /// Cancel a resting order.
    fn cancel_order(&mut self, mode: ApplyMode, market: &str, order_id: OrderId)
    -> Result<(), StateError>;

    /// Overwrite a balance entry (snapshot semantics, not additive).
    fn balance_set(&mut self, user_id: UserId, balance_type: BalanceType, asset: &str, amount: Decimal);

    /// Apply a signed balance change tagged with business/business_id for
    /// idempotent bookkeeping upstream.
    #[allow(clippy::too_many_arguments)]
    fn balance_update(
        &mut self,
        mode: ApplyMode,
        user_id: UserId,
        balance_type: BalanceType,
        asset: &str,
        business: &str,
        business_id: BusinessId,
        change: Decimal,
    ) -> Result<(), StateError>;
}
