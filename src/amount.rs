//! Native currency amount conversion.
//!
//! Amounts are accepted as decimal strings in the major unit (ETH) and
//! converted to the minor unit (wei) before they are attached to a
//! transaction.

use ethers::types::U256;
use thiserror::Error;

use crate::error::GatewayError;

/// Decimal places between the major and minor unit.
pub const NATIVE_DECIMALS: usize = 18;

/// Reasons a decimal amount string can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must not be negative")]
    Negative,
    #[error("invalid character {0:?} in amount")]
    InvalidDigit(char),
    #[error("amount has {0} decimal places (max 18)")]
    TooManyDecimals(usize),
    #[error("amount does not fit in 256 bits")]
    Overflow,
}

impl From<AmountError> for GatewayError {
    fn from(e: AmountError) -> Self {
        GatewayError::invalid_input(e.to_string())
    }
}

/// Convert a decimal major-unit string (e.g. `"0.001"`) into minor units.
///
/// More than 18 fractional digits is rejected rather than rounded so that a
/// caller never attaches a different value than the one it asked for.
pub fn parse_native(amount: &str) -> Result<U256, AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidDigit(c));
    }
    if frac.len() > NATIVE_DECIMALS {
        return Err(AmountError::TooManyDecimals(frac.len()));
    }

    let mut digits = String::with_capacity(whole.len() + NATIVE_DECIMALS);
    digits.push_str(if whole.is_empty() { "0" } else { whole });
    digits.push_str(frac);
    digits.extend(std::iter::repeat('0').take(NATIVE_DECIMALS - frac.len()));

    U256::from_dec_str(&digits).map_err(|_| AmountError::Overflow)
}

/// Render minor units as a major-unit decimal string, trailing zeros trimmed.
pub fn format_native(value: U256) -> String {
    let digits = value.to_string();
    let padded = if digits.len() <= NATIVE_DECIMALS {
        format!("{:0>width$}", digits, width = NATIVE_DECIMALS + 1)
    } else {
        digits
    };

    let (whole, frac) = padded.split_at(padded.len() - NATIVE_DECIMALS);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}
