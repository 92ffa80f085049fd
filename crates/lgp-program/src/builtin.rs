//! Built-in operations over `f64` registers.

use crate::operation::{OperationCatalogue, OperationRef};
use crate::Operation;
use lgp_core::Arity;
use std::sync::Arc;

/// Inputs to `exp` are clamped to this magnitude to keep results finite
const EXPONENT_LIMIT: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Addition;

impl Operation<f64> for Addition {
    fn name(&self) -> &str {
        "add"
    }

    fn arity(&self) -> Arity {
        Arity::Binary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        arguments[0] + arguments[1]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Subtraction;

impl Operation<f64> for Subtraction {
    fn name(&self) -> &str {
        "sub"
    }

    fn arity(&self) -> Arity {
        Arity::Binary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        arguments[0] - arguments[1]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Multiplication;

impl Operation<f64> for Multiplication {
    fn name(&self) -> &str {
        "mul"
    }

    fn arity(&self) -> Arity {
        Arity::Binary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        arguments[0] * arguments[1]
    }
}

/// Protected division: a zero divisor yields 1.0
#[derive(Debug, Clone, Copy, Default)]
pub struct Division;

impl Operation<f64> for Division {
    fn name(&self) -> &str {
        "div"
    }

    fn arity(&self) -> Arity {
        Arity::Binary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        if arguments[1] == 0.0 {
            1.0
        } else {
            arguments[0] / arguments[1]
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sine;

impl Operation<f64> for Sine {
    fn name(&self) -> &str {
        "sin"
    }

    fn arity(&self) -> Arity {
        Arity::Unary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        arguments[0].sin()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Operation<f64> for Cosine {
    fn name(&self) -> &str {
        "cos"
    }

    fn arity(&self) -> Arity {
        Arity::Unary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        arguments[0].cos()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Exponent;

impl Operation<f64> for Exponent {
    fn name(&self) -> &str {
        "exp"
    }

    fn arity(&self) -> Arity {
        Arity::Unary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        arguments[0].clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT).exp()
    }
}

/// Branch taken when the first operand is greater than the second
#[derive(Debug, Clone, Copy)]
pub struct IfGreater {
    pub sentinel: f64,
}

impl Default for IfGreater {
    fn default() -> Self {
        Self { sentinel: 1.0 }
    }
}

impl Operation<f64> for IfGreater {
    fn name(&self) -> &str {
        "if_gt"
    }

    fn arity(&self) -> Arity {
        Arity::Binary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        if arguments[0] > arguments[1] {
            self.sentinel
        } else {
            0.0
        }
    }

    fn is_branch(&self) -> bool {
        true
    }
}

/// Branch taken when the first operand is less than or equal to the second
#[derive(Debug, Clone, Copy)]
pub struct IfLessThanOrEqual {
    pub sentinel: f64,
}

impl Default for IfLessThanOrEqual {
    fn default() -> Self {
        Self { sentinel: 1.0 }
    }
}

impl Operation<f64> for IfLessThanOrEqual {
    fn name(&self) -> &str {
        "if_le"
    }

    fn arity(&self) -> Arity {
        Arity::Binary
    }

    fn execute(&self, arguments: &[f64]) -> f64 {
        if arguments[0] <= arguments[1] {
            self.sentinel
        } else {
            0.0
        }
    }

    fn is_branch(&self) -> bool {
        true
    }
}

/// Arithmetic operations only
pub fn arithmetic_catalogue() -> OperationCatalogue<f64> {
    OperationCatalogue::new(vec![
        Arc::new(Addition) as OperationRef<f64>,
        Arc::new(Subtraction),
        Arc::new(Multiplication),
        Arc::new(Division),
    ])
}

/// Every built-in operation, with branches using `sentinel` as their true value
pub fn standard_catalogue(sentinel: f64) -> OperationCatalogue<f64> {
    OperationCatalogue::new(vec![
        Arc::new(Addition) as OperationRef<f64>,
        Arc::new(Subtraction),
        Arc::new(Multiplication),
        Arc::new(Division),
        Arc::new(Sine),
        Arc::new(Cosine),
        Arc::new(Exponent),
        Arc::new(IfGreater { sentinel }),
        Arc::new(IfLessThanOrEqual { sentinel }),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        assert_eq!(Addition.execute(&[2.0, 3.0]), 5.0);
        assert_eq!(Subtraction.execute(&[2.0, 3.0]), -1.0);
        assert_eq!(Multiplication.execute(&[2.0, 3.0]), 6.0);
        assert_eq!(Division.execute(&[3.0, 2.0]), 1.5);
    }

    #[test]
    fn test_protected_division() {
        assert_eq!(Division.execute(&[3.0, 0.0]), 1.0);
    }

    #[test]
    fn test_exponent_is_clamped() {
        assert!(Exponent.execute(&[1_000.0]).is_finite());
        assert_eq!(Exponent.execute(&[0.0]), 1.0);
    }

    #[test]
    fn test_branches() {
        let gt = IfGreater::default();
        assert!(gt.is_branch());
        assert_eq!(gt.execute(&[2.0, 1.0]), 1.0);
        assert_eq!(gt.execute(&[1.0, 2.0]), 0.0);

        let le = IfLessThanOrEqual { sentinel: 5.0 };
        assert_eq!(le.execute(&[1.0, 1.0]), 5.0);
        assert_eq!(le.execute(&[2.0, 1.0]), 0.0);
        assert!(!Addition.is_branch());
    }

    #[test]
    fn test_catalogues() {
        assert_eq!(arithmetic_catalogue().len(), 4);
        let standard = standard_catalogue(1.0);
        assert_eq!(standard.len(), 9);
        assert_eq!(standard.iter().filter(|op| op.is_branch()).count(), 2);
    }
}
