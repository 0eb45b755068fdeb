//! Computation records.
//!
//! A [`Calculation`] is the immutable-after-construction result of applying
//! one operation to two operands. The result field is always derived, at
//! execution time through [`Calculation::evaluate`] and again at
//! deserialization time through [`Calculation::from_row`]. It is never
//! trusted from external input.
//!
//! The wire form is [`CalcRow`]: fixed columns
//! `operation, operand1, operand2, result, timestamp`, operands and result
//! as decimal-preserving text, timestamp as sortable ISO-8601 text.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, Result};
use crate::operation::BinaryOp;
use crate::registry::OpRegistry;
use crate::value::format_decimal;

/// Timestamp wire format. Lexically sortable, sub-second precision kept.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One executed operation: name tag, operands, derived result, timestamp.
#[derive(Debug, Clone)]
pub struct Calculation {
    operation: String,
    operand1: Decimal,
    operand2: Decimal,
    result: Decimal,
    timestamp: NaiveDateTime,
}

impl Calculation {
    /// Execute `op` on the operands and record the outcome.
    ///
    /// Goes through [`BinaryOp::execute`], so operation-specific validation
    /// always runs first; a rejected operand pair never yields a record.
    pub fn evaluate(op: &dyn BinaryOp, operand1: Decimal, operand2: Decimal) -> Result<Self> {
        let result = op.execute(operand1, operand2)?;
        Ok(Self {
            operation: op.name().to_string(),
            operand1,
            operand2,
            result,
            timestamp: Local::now().naive_local(),
        })
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn operand1(&self) -> Decimal {
        self.operand1
    }

    #[must_use]
    pub fn operand2(&self) -> Decimal {
        self.operand2
    }

    #[must_use]
    pub fn result(&self) -> Decimal {
        self.result
    }

    #[must_use]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Serialize to the fixed-column row form.
    #[must_use]
    pub fn to_row(&self) -> CalcRow {
        CalcRow {
            operation: self.operation.clone(),
            operand1: format_decimal(self.operand1),
            operand2: format_decimal(self.operand2),
            result: format_decimal(self.result),
            timestamp: self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Rebuild a record from its row form, recomputing the result through
    /// the operation resolved from `registry`.
    ///
    /// Any missing or unparsable column maps to
    /// [`CalcError::InvalidPersistedData`]. A stored result that disagrees
    /// with the recomputation is logged and replaced by the recomputed value.
    pub fn from_row(row: &CalcRow, registry: &OpRegistry) -> Result<Self> {
        let operand1 = parse_row_decimal("operand1", &row.operand1)?;
        let operand2 = parse_row_decimal("operand2", &row.operand2)?;
        let timestamp = NaiveDateTime::parse_from_str(&row.timestamp, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::from_str(&row.timestamp))
            .map_err(|e| {
                CalcError::persisted(format!("bad timestamp '{}': {e}", row.timestamp))
            })?;

        let op = registry.resolve_display(&row.operation).map_err(|_| {
            CalcError::persisted(format!("unknown operation '{}'", row.operation))
        })?;
        let recomputed = op.execute(operand1, operand2).map_err(|e| {
            CalcError::persisted(format!(
                "stored operands no longer compute for '{}': {e}",
                row.operation
            ))
        })?;

        let stored = parse_row_decimal("result", &row.result)?;
        if stored != recomputed {
            tracing::warn!(
                operation = %row.operation,
                stored = %row.result,
                recomputed = %recomputed,
                "persisted result disagrees with recomputation; keeping recomputed value"
            );
        }

        Ok(Self {
            operation: op.name().to_string(),
            operand1,
            operand2,
            result: recomputed,
            timestamp,
        })
    }
}

fn parse_row_decimal(column: &str, text: &str) -> Result<Decimal> {
    Decimal::from_str(text.trim())
        .map_err(|e| CalcError::persisted(format!("bad {column} '{text}': {e}")))
}

/// Equality excludes the timestamp: two records match iff operation,
/// operands, and result match.
impl PartialEq for Calculation {
    fn eq(&self, other: &Self) -> bool {
        self.operation == other.operation
            && self.operand1 == other.operand1
            && self.operand2 == other.operand2
            && self.result == other.result
    }
}

impl Eq for Calculation {}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) = {}",
            self.operation,
            format_decimal(self.operand1),
            format_decimal(self.operand2),
            format_decimal(self.result)
        )
    }
}

/// Fixed-column wire row for one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalcRow {
    pub operation: String,
    pub operand1: String,
    pub operand2: String,
    pub result: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Addition, Division, Multiplication};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn evaluate_derives_the_result() {
        let calc = Calculation::evaluate(&Addition, dec("5"), dec("3")).unwrap();
        assert_eq!(calc.operation(), "Addition");
        assert_eq!(calc.result(), dec("8"));
    }

    #[test]
    fn evaluate_refuses_invalid_operand_pairs() {
        let err = Calculation::evaluate(&Division, dec("10"), dec("0")).unwrap_err();
        assert!(matches!(err, CalcError::Validation { .. }));
    }

    #[test]
    fn display_renders_call_syntax() {
        let calc = Calculation::evaluate(&Addition, dec("5"), dec("3")).unwrap();
        assert_eq!(calc.to_string(), "Addition(5, 3) = 8");
        let calc = Calculation::evaluate(&Division, dec("10"), dec("2")).unwrap();
        assert_eq!(calc.to_string(), "Division(10, 2) = 5");
    }

    #[test]
    fn equality_ignores_timestamp() {
        let first = Calculation::evaluate(&Addition, dec("5"), dec("3")).unwrap();
        let second = Calculation {
            timestamp: first.timestamp() + chrono::Duration::seconds(90),
            ..first.clone()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn different_operations_are_not_equal() {
        let add = Calculation::evaluate(&Addition, dec("5"), dec("3")).unwrap();
        let mul = Calculation::evaluate(&Multiplication, dec("5"), dec("3")).unwrap();
        assert_ne!(add, mul);
    }

    #[test]
    fn row_round_trip_reproduces_an_equal_record() {
        let registry = OpRegistry::with_builtins();
        let original = Calculation::evaluate(&Addition, dec("5"), dec("3")).unwrap();
        let row = original.to_row();
        assert_eq!(row.operation, "Addition");
        assert_eq!(row.operand1, "5");
        assert_eq!(row.operand2, "3");
        assert_eq!(row.result, "8");

        let restored = Calculation::from_row(&row, &registry).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn from_row_recomputes_rather_than_trusting_the_stored_result() {
        let registry = OpRegistry::with_builtins();
        let row = CalcRow {
            operation: "Multiplication".to_string(),
            operand1: "4".to_string(),
            operand2: "5".to_string(),
            result: "999".to_string(), // tampered
            timestamp: "2024-01-15T10:30:00".to_string(),
        };
        let calc = Calculation::from_row(&row, &registry).unwrap();
        assert_eq!(calc.result(), dec("20"));
    }

    #[test]
    fn from_row_rejects_bad_decimal_text() {
        let registry = OpRegistry::with_builtins();
        let row = CalcRow {
            operation: "Addition".to_string(),
            operand1: "invalid".to_string(),
            operand2: "3".to_string(),
            result: "8".to_string(),
            timestamp: "2024-01-15T10:30:00".to_string(),
        };
        let err = Calculation::from_row(&row, &registry).unwrap_err();
        assert!(matches!(err, CalcError::InvalidPersistedData { .. }));
    }

    #[test]
    fn from_row_rejects_bad_timestamp() {
        let registry = OpRegistry::with_builtins();
        let row = CalcRow {
            operation: "Addition".to_string(),
            operand1: "5".to_string(),
            operand2: "3".to_string(),
            result: "8".to_string(),
            timestamp: "not-a-timestamp".to_string(),
        };
        let err = Calculation::from_row(&row, &registry).unwrap_err();
        assert!(matches!(err, CalcError::InvalidPersistedData { .. }));
    }

    #[test]
    fn from_row_rejects_unknown_operation() {
        let registry = OpRegistry::with_builtins();
        let row = CalcRow {
            operation: "Teleport".to_string(),
            operand1: "5".to_string(),
            operand2: "3".to_string(),
            result: "8".to_string(),
            timestamp: "2024-01-15T10:30:00".to_string(),
        };
        let err = Calculation::from_row(&row, &registry).unwrap_err();
        assert!(matches!(err, CalcError::InvalidPersistedData { .. }));
    }

    #[test]
    fn from_row_accepts_second_precision_timestamps() {
        // Rows written by other tooling may omit fractional seconds.
        let registry = OpRegistry::with_builtins();
        let row = CalcRow {
            operation: "Addition".to_string(),
            operand1: "1".to_string(),
            operand2: "2".to_string(),
            result: "3".to_string(),
            timestamp: "2024-01-15T10:30:00".to_string(),
        };
        let calc = Calculation::from_row(&row, &registry).unwrap();
        assert_eq!(
            calc.timestamp(),
            NaiveDateTime::from_str("2024-01-15T10:30:00").unwrap()
        );
    }
}
