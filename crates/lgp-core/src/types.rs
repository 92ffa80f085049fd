//! Core type definitions shared by programs and operators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a register in a register set's flat index space
pub type RegisterIndex = usize;

/// Region of the register set a register belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterType {
    /// Holds feature data written from a sample
    Input,
    /// Scratch registers that instructions compute into
    Calculation,
    /// Literal values, only changed by constant mutation
    Constant,
}

impl fmt::Display for RegisterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegisterType::Input => "input",
            RegisterType::Calculation => "calculation",
            RegisterType::Constant => "constant",
        };
        write!(f, "{}", name)
    }
}

/// Number of operands an operation consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    Unary,
    Binary,
}

impl Arity {
    pub fn count(&self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
        }
    }
}
