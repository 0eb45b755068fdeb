//! Binary operation strategies.
//!
//! Each operation is a stateless unit struct implementing [`BinaryOp`].
//! The trait splits the contract into a pure precondition check
//! ([`BinaryOp::validate`]) and the arithmetic itself
//! ([`BinaryOp::compute`]); [`BinaryOp::execute`] is a provided method that
//! always validates first, so no caller can reach a computation the
//! validator would reject.
//!
//! Arithmetic faults the validator cannot rule out (decimal overflow,
//! non-finite intermediates in the power/root float fallback) surface as
//! [`CalcError::Computation`] with the original cause description.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

use crate::error::{CalcError, Result};

/// Scale that float-fallback results are rounded back to. Twelve fractional
/// digits sits safely inside f64's ~15 significant digits, so artifacts like
/// `27^(1/3) = 3.0000000000000004` collapse to the exact answer.
const FLOAT_RESULT_SCALE: u32 = 12;

/// One binary arithmetic transform.
///
/// Implementations are stateless; the registry hands out a fresh boxed
/// instance per resolution.
pub trait BinaryOp: Send + Sync {
    /// Display tag, also the stable serialization name of the operation.
    fn name(&self) -> &'static str;

    /// Pure precondition check. The default accepts everything.
    fn validate(&self, _a: Decimal, _b: Decimal) -> Result<()> {
        Ok(())
    }

    /// The arithmetic. Only called with operands that passed `validate`.
    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal>;

    /// Validate, then compute. Provided so the invariant cannot be skipped.
    fn execute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        self.validate(a, b)?;
        self.compute(a, b)
    }
}

fn overflow(op: &str) -> CalcError {
    CalcError::computation(format!("{op} overflowed the decimal range"))
}

/// `base^exp` through f64, for fractional exponents. The result is rounded
/// back to [`FLOAT_RESULT_SCALE`] and normalized.
fn pow_via_f64(base: Decimal, exp: f64, label: &str) -> Result<Decimal> {
    let base = base
        .to_f64()
        .ok_or_else(|| CalcError::computation(format!("{label}: base not representable")))?;
    let raw = base.powf(exp);
    if !raw.is_finite() {
        return Err(CalcError::computation(format!(
            "{label} produced a non-finite value"
        )));
    }
    let value = Decimal::from_f64_retain(raw).ok_or_else(|| overflow(label))?;
    Ok(value
        .round_dp_with_strategy(FLOAT_RESULT_SCALE, RoundingStrategy::MidpointNearestEven)
        .normalize())
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct Addition;

impl BinaryOp for Addition {
    fn name(&self) -> &'static str {
        "Addition"
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_add(b).ok_or_else(|| overflow("addition"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Subtraction;

impl BinaryOp for Subtraction {
    fn name(&self) -> &'static str {
        "Subtraction"
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_sub(b).ok_or_else(|| overflow("subtraction"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Multiplication;

impl BinaryOp for Multiplication {
    fn name(&self) -> &'static str {
        "Multiplication"
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_mul(b).ok_or_else(|| overflow("multiplication"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Division;

impl BinaryOp for Division {
    fn name(&self) -> &'static str {
        "Division"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        if b.is_zero() {
            return Err(CalcError::validation("Division by zero is not allowed"));
        }
        Ok(())
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_div(b).ok_or_else(|| overflow("division"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Power;

impl BinaryOp for Power {
    fn name(&self) -> &'static str {
        "Power"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        if b < Decimal::ZERO {
            return Err(CalcError::validation("Negative exponents are not supported"));
        }
        Ok(())
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        if b.is_integer() {
            // Exact path for whole exponents; exponent 0 yields exactly 1.
            let exp = b
                .to_i64()
                .ok_or_else(|| CalcError::computation("exponent too large"))?;
            return a.checked_powi(exp).ok_or_else(|| overflow("power"));
        }
        let exp = b
            .to_f64()
            .ok_or_else(|| CalcError::computation("power: exponent not representable"))?;
        pow_via_f64(a, exp, "power")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Root;

impl BinaryOp for Root {
    fn name(&self) -> &'static str {
        "Root"
    }

    fn validate(&self, a: Decimal, b: Decimal) -> Result<()> {
        if a < Decimal::ZERO {
            return Err(CalcError::validation(
                "Cannot calculate root of negative number",
            ));
        }
        if b.is_zero() {
            return Err(CalcError::validation("Zero root is undefined"));
        }
        Ok(())
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        let degree = b
            .to_f64()
            .ok_or_else(|| CalcError::computation("root: degree not representable"))?;
        pow_via_f64(a, 1.0 / degree, "root")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Modulus;

impl BinaryOp for Modulus {
    fn name(&self) -> &'static str {
        "Modulus"
    }

    fn validate(&self, a: Decimal, b: Decimal) -> Result<()> {
        if b.is_zero() {
            return Err(CalcError::validation("Modulus by zero is not allowed"));
        }
        if a < Decimal::ZERO {
            return Err(CalcError::validation(
                "Negative dividend not allowed for modulus",
            ));
        }
        Ok(())
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_rem(b).ok_or_else(|| overflow("modulus"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerDivision;

impl BinaryOp for IntegerDivision {
    fn name(&self) -> &'static str {
        "IntegerDivision"
    }

    fn validate(&self, a: Decimal, b: Decimal) -> Result<()> {
        if b.is_zero() {
            return Err(CalcError::validation(
                "Integer division by zero is not allowed",
            ));
        }
        if a < Decimal::ZERO {
            return Err(CalcError::validation(
                "Negative dividend not allowed for integer division",
            ));
        }
        Ok(())
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_div(b)
            .map(|quotient| quotient.floor())
            .ok_or_else(|| overflow("integer division"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Percentage;

impl BinaryOp for Percentage {
    fn name(&self) -> &'static str {
        "Percentage"
    }

    fn validate(&self, _a: Decimal, b: Decimal) -> Result<()> {
        if b.is_zero() {
            return Err(CalcError::validation(
                "Percentage calculation with zero as whole value is not allowed",
            ));
        }
        Ok(())
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_div(b)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| overflow("percentage"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteDifference;

impl BinaryOp for AbsoluteDifference {
    fn name(&self) -> &'static str {
        "AbsoluteDifference"
    }

    fn compute(&self, a: Decimal, b: Decimal) -> Result<Decimal> {
        a.checked_sub(b)
            .map(|diff| diff.abs())
            .ok_or_else(|| overflow("absolute difference"))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn addition_adds() {
        assert_eq!(Addition.execute(dec("10"), dec("5")).unwrap(), dec("15"));
        assert_eq!(Addition.execute(dec("-10"), dec("5")).unwrap(), dec("-5"));
    }

    #[test]
    fn subtraction_subtracts() {
        assert_eq!(Subtraction.execute(dec("5"), dec("10")).unwrap(), dec("-5"));
    }

    #[test]
    fn multiplication_multiplies() {
        assert_eq!(
            Multiplication.execute(dec("-5"), dec("-3")).unwrap(),
            dec("15")
        );
        assert_eq!(
            Multiplication.execute(dec("100"), dec("0")).unwrap(),
            dec("0")
        );
    }

    #[test]
    fn division_divides() {
        assert_eq!(Division.execute(dec("10"), dec("2")).unwrap(), dec("5"));
        let third = Division.execute(dec("10"), dec("3")).unwrap();
        assert!(third > dec("3.33") && third < dec("3.34"));
    }

    #[test]
    fn division_by_zero_fails_validation_for_any_dividend() {
        for a in ["0", "1", "-7", "123456.789"] {
            let err = Division.execute(dec(a), Decimal::ZERO).unwrap_err();
            assert!(matches!(err, CalcError::Validation { .. }), "a = {a}");
        }
    }

    #[test]
    fn power_with_integer_exponent_is_exact() {
        assert_eq!(Power.execute(dec("2"), dec("3")).unwrap(), dec("8"));
        assert_eq!(Power.execute(dec("1.5"), dec("2")).unwrap(), dec("2.25"));
    }

    #[test]
    fn power_with_zero_exponent_is_one() {
        for a in ["5", "0.5", "-3", "12345"] {
            assert_eq!(Power.execute(dec(a), Decimal::ZERO).unwrap(), dec("1"));
        }
    }

    #[test]
    fn power_rejects_negative_exponent() {
        let err = Power.execute(dec("2"), dec("-1")).unwrap_err();
        assert!(err.to_string().contains("Negative exponents"));
    }

    #[test]
    fn power_overflow_is_a_computation_error() {
        let err = Power.execute(dec("999999"), dec("999999")).unwrap_err();
        assert!(matches!(err, CalcError::Computation { .. }));
    }

    #[test]
    fn root_computes_clean_roots() {
        assert_eq!(Root.execute(dec("9"), dec("2")).unwrap(), dec("3"));
        assert_eq!(Root.execute(dec("27"), dec("3")).unwrap(), dec("3"));
    }

    #[test]
    fn root_rejects_negative_radicand_and_zero_degree() {
        assert!(Root.execute(dec("-9"), dec("2")).is_err());
        assert!(Root.execute(dec("9"), dec("0")).is_err());
    }

    #[test]
    fn modulus_takes_remainder() {
        assert_eq!(Modulus.execute(dec("10"), dec("3")).unwrap(), dec("1"));
    }

    #[test]
    fn modulus_preconditions() {
        assert!(Modulus.execute(dec("10"), dec("0")).is_err());
        assert!(Modulus.execute(dec("-10"), dec("3")).is_err());
    }

    #[test]
    fn integer_division_floors() {
        assert_eq!(
            IntegerDivision.execute(dec("10"), dec("3")).unwrap(),
            dec("3")
        );
        assert_eq!(
            IntegerDivision.execute(dec("9"), dec("3")).unwrap(),
            dec("3")
        );
    }

    #[test]
    fn integer_division_preconditions() {
        assert!(IntegerDivision.execute(dec("10"), dec("0")).is_err());
        assert!(IntegerDivision.execute(dec("-10"), dec("3")).is_err());
    }

    #[test]
    fn percentage_scales_by_hundred() {
        assert_eq!(
            Percentage.execute(dec("50"), dec("200")).unwrap(),
            dec("25")
        );
    }

    #[test]
    fn percentage_rejects_zero_whole() {
        assert!(Percentage.execute(dec("50"), dec("0")).is_err());
    }

    #[test]
    fn absolute_difference_is_symmetric() {
        assert_eq!(
            AbsoluteDifference.execute(dec("3"), dec("10")).unwrap(),
            dec("7")
        );
        assert_eq!(
            AbsoluteDifference.execute(dec("10"), dec("3")).unwrap(),
            dec("7")
        );
    }

    #[test]
    fn execute_is_deterministic() {
        let ops: [&dyn BinaryOp; 4] = [&Addition, &Division, &Power, &Percentage];
        for op in ops {
            let first = op.execute(dec("12.5"), dec("4")).unwrap();
            let second = op.execute(dec("12.5"), dec("4")).unwrap();
            assert_eq!(first, second, "{} not deterministic", op.name());
        }
    }
}
