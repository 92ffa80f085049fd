//! Register-machine instructions.

use crate::operation::{OperationCatalogue, OperationRef};
use crate::registers::RegisterSet;
use lgp_core::{Error, RegisterIndex, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single instruction: `destination = operation(operands...)`.
///
/// Branch instructions ignore their destination and instead decide
/// whether the following instruction runs.
#[derive(Clone)]
pub struct Instruction<T> {
    pub destination: RegisterIndex,
    pub operands: Vec<RegisterIndex>,
    pub operation: OperationRef<T>,
}

impl<T> Instruction<T> {
    pub fn new(
        operation: OperationRef<T>,
        destination: RegisterIndex,
        operands: Vec<RegisterIndex>,
    ) -> Self {
        Self {
            destination,
            operands,
            operation,
        }
    }

    pub fn is_branch(&self) -> bool {
        self.operation.is_branch()
    }

    /// Number of operands the current operation expects
    pub fn arity(&self) -> usize {
        self.operation.arity().count()
    }

    pub fn to_record(&self) -> InstructionRecord {
        InstructionRecord {
            destination: self.destination,
            operands: self.operands.clone(),
            operation: self.operation.name().to_string(),
        }
    }

    /// Rebuild an instruction, resolving its operation against `catalogue`
    pub fn from_record(record: InstructionRecord, catalogue: &OperationCatalogue<T>) -> Result<Self> {
        let operation = catalogue
            .find(&record.operation)
            .cloned()
            .ok_or(Error::UnknownOperation(record.operation))?;

        Ok(Self {
            destination: record.destination,
            operands: record.operands,
            operation,
        })
    }
}

impl<T: Clone> Instruction<T> {
    /// Apply the operation to the operand values without writing anything
    pub fn evaluate(&self, registers: &RegisterSet<T>) -> Result<T> {
        let arguments = self
            .operands
            .iter()
            .map(|&operand| registers.read(operand))
            .collect::<Result<Vec<_>>>()?;

        if arguments.len() != self.arity() {
            return Err(Error::InvalidArgument(format!(
                "operation {} expects {} operands, instruction has {}",
                self.operation.name(),
                self.arity(),
                arguments.len()
            )));
        }

        Ok(self.operation.execute(&arguments))
    }

    /// Evaluate and store the result in the destination register
    pub fn execute(&self, registers: &mut RegisterSet<T>) -> Result<()> {
        let value = self.evaluate(registers)?;
        registers.write(self.destination, value)
    }
}

impl<T> PartialEq for Instruction<T> {
    fn eq(&self, other: &Self) -> bool {
        self.destination == other.destination
            && self.operands == other.operands
            && self.operation.name() == other.operation.name()
    }
}

impl<T> fmt::Debug for Instruction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("destination", &self.destination)
            .field("operands", &self.operands)
            .field("operation", &self.operation.name())
            .finish()
    }
}

impl<T> fmt::Display for Instruction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = self
            .operands
            .iter()
            .map(|operand| format!("r[{}]", operand))
            .collect::<Vec<_>>()
            .join(", ");

        if self.is_branch() {
            write!(f, "if {}({})", self.operation.name(), operands)
        } else {
            write!(f, "r[{}] = {}({})", self.destination, self.operation.name(), operands)
        }
    }
}

/// Serializable form of an instruction; the operation is stored by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRecord {
    pub destination: RegisterIndex,
    pub operands: Vec<RegisterIndex>,
    pub operation: String,
}
