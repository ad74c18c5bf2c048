//! Core types used throughout the crate
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// User ID - globally unique, immutable after assignment.
pub type UserId = u64;

/// Order ID - assigned by the originating engine, monotonically increasing.
/// Recovery never generates order ids, it only re-reads them.
pub type OrderId = u64;

/// Primary id of an operation-log record. Ascending replay order key;
/// gaps are legal (log ids order records, they do not number them).
pub type LogId = u64;

/// Business reference id carried by balance updates for upstream
/// idempotent bookkeeping (e.g. deposit id).
pub type BusinessId = u64;
