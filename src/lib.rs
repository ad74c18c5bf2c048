//! engine-recovery - matching-engine state reconstruction
//!
//! Rebuilds the engine's in-memory trading state (order books, balances,
//! market metadata) from a persisted snapshot plus an append-only
//! operation log, bit-identical to the state held when the log writer
//! stopped. Runs as a startup barrier: single-threaded, to completion,
//! before any live traffic.
//!
//! # Modules
//!
//! - [`core_types`] - Core type aliases (UserId, OrderId, LogId, ...)
//! - [`decimal`] - Fixed-precision decimal codec
//! - [`models`] - Order, sides/types, ApplyMode, MarketInfo
//! - [`state`] - `EngineState` capability trait the loaders write into
//! - [`store`] - Persisted row contracts + MySQL / in-memory sources
//! - [`paging`] - Shared cursor-based paged scan
//! - [`snapshot`] - Markets/orders/balances snapshot loaders
//! - [`oplog`] - Operation dispatch + log replayer
//! - [`recovery`] - The fixed four-phase startup sequence
//! - [`verify`] - Bookkeeping-only state for dry-run verification
//! - [`error`] - Failure taxonomy

// Core types - must be first!
pub mod core_types;

// Leaves
pub mod decimal;
pub mod error;
pub mod models;
pub mod state;

// Store access and loaders
pub mod oplog;
pub mod paging;
pub mod recovery;
pub mod snapshot;
pub mod store;

// Dry-run support
pub mod verify;

// Process plumbing
pub mod config;
pub mod logging;

#[cfg(test)]
pub(crate) mod testutil;

// Convenient re-exports at crate root
pub use config::{AppConfig, TablesConfig};
pub use core_types::{BusinessId, LogId, OrderId, UserId};
pub use error::{OperationError, RecoveryError};
pub use models::{ApplyMode, BalanceType, MarketInfo, Order, OrderSide, OrderType};
pub use recovery::{Recovery, run_recovery};
pub use state::{EngineState, StateError};
pub use store::{Db, MemMarketOffsets, MemTable, PageSource, StoreError};
pub use verify::VerifyState;
