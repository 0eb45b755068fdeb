//! Operand parsing and validation.
//!
//! Every raw operand (REPL input, persisted text) goes through
//! [`parse_operand`] before any operation-specific validation. Values are
//! fixed-precision decimals, never binary floats, so chained arithmetic
//! stays exact for financial-style inputs.
//!
//! # Invariants
//!
//! 1. A value accepted by [`parse_operand`] satisfies `|v| <= max_magnitude`.
//! 2. Accepted values carry at most `precision` fractional digits.
//! 3. [`format_decimal`] output re-parses to an equal value (lossless
//!    round-trip for in-policy values).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};

/// Bounds applied uniformly to both operands of every operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPolicy {
    /// Maximum absolute magnitude an operand may have.
    pub max_magnitude: Decimal,
    /// Fractional digits kept on input; excess digits are rounded away
    /// (banker's rounding).
    pub precision: u32,
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self {
            max_magnitude: Decimal::from(1_000_000_000_000_i64),
            precision: 10,
        }
    }
}

impl InputPolicy {
    #[must_use]
    pub fn new(max_magnitude: Decimal, precision: u32) -> Self {
        Self {
            max_magnitude,
            precision,
        }
    }
}

/// Parse and validate one raw operand under the given policy.
///
/// Leading/trailing whitespace is stripped. Fails with
/// [`CalcError::Validation`] when the text is not a decimal number or its
/// magnitude exceeds the policy bound.
pub fn parse_operand(raw: &str, policy: &InputPolicy) -> Result<Decimal> {
    let trimmed = raw.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|_| CalcError::validation(format!("Invalid number format: {trimmed}")))?;
    check_magnitude(value, policy)?;
    Ok(value.round_dp_with_strategy(policy.precision, RoundingStrategy::MidpointNearestEven))
}

/// Validate an already-decimal value (e.g. parsed from persisted rows).
pub fn check_magnitude(value: Decimal, policy: &InputPolicy) -> Result<()> {
    if value.abs() > policy.max_magnitude {
        return Err(CalcError::validation(format!(
            "Value exceeds maximum allowed: {}",
            policy.max_magnitude
        )));
    }
    Ok(())
}

/// Canonical display form: normalized, trailing zeros stripped.
#[must_use]
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}
