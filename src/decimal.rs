//! Fixed-precision decimal codec
//!
//! Every monetary field in the snapshot tables and the operation log is
//! persisted as text and re-read at a caller-supplied scale: order price
//! at the market's money precision, amount at stock precision, fee at fee
//! precision, ledger-internal fields at scale 0. All arithmetic stays in
//! `rust_decimal::Decimal` - a recovered balance must compare bit-exact
//! against what the engine held, so binary floats are never involved.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

/// Highest fractional-digit count `Decimal` can carry.
pub const MAX_SCALE: u32 = 28;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecimalError {
    #[error("invalid decimal literal: {0:?}")]
    Invalid(String),

    #[error("scale {0} exceeds max supported scale {MAX_SCALE}")]
    ScaleTooLarge(u32),
}

/// Decode an ASCII decimal literal at a fixed scale.
///
/// The literal may carry a sign and a fractional part ("-3.25", "100.50",
/// "0"). The result is rescaled to exactly `scale` fractional digits with
/// half-up midpoint rounding, matching the numeric context the live
/// validation path uses. Pure function; whether a failure is fatal or a
/// per-record rejection is the caller's decision.
pub fn decode(text: &str, scale: u32) -> Result<Decimal, DecimalError> {
    if scale > MAX_SCALE {
        return Err(DecimalError::ScaleTooLarge(scale));
    }
    let trimmed = text.trim();
    let value =
        Decimal::from_str(trimmed).map_err(|_| DecimalError::Invalid(trimmed.to_string()))?;
    Ok(value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero))
}
