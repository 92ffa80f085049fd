//! Program representation for linear genetic programming.
//!
//! A program is a flat list of register-machine instructions operating on
//! a typed register set:
//! - Input registers hold the features of the current sample
//! - Calculation registers are scratch space instructions write to
//! - Constant registers hold literals that only constant mutation changes
//!
//! The [`effective`] module finds which instructions can affect the
//! output registers; variation operators use it to target live code.

pub mod registers;
pub mod operation;
pub mod builtin;
pub mod instruction;
pub mod program;
pub mod effective;
pub mod generator;

pub use registers::{Register, RegisterLayout, RegisterSet};
pub use operation::{Operation, OperationCatalogue, OperationRef};
pub use instruction::{Instruction, InstructionRecord};
pub use program::Program;
pub use effective::{effective_instructions, effective_positions, EffectiveCalculationRegisterResolver};
pub use generator::{sample_operand, InstructionGenerator, RandomInstructionGenerator, RandomProgramGenerator};
