//! Linear register-machine programs.

use crate::effective;
use crate::instruction::{Instruction, InstructionRecord};
use crate::operation::OperationCatalogue;
use crate::registers::RegisterSet;
use lgp_core::{Error, RegisterIndex, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An individual: an instruction sequence plus the registers it runs on.
///
/// Cloning a program deep-copies its register set, so a clone can be
/// mutated without affecting the original.
#[derive(Debug, Clone)]
pub struct Program<T> {
    pub instructions: Vec<Instruction<T>>,
    pub registers: RegisterSet<T>,
    pub output_registers: Vec<RegisterIndex>,
    /// Lower is better; `f64::INFINITY` until evaluated
    pub fitness: f64,
    sentinel: T,
    effective: Vec<usize>,
}

impl<T: Clone> Program<T> {
    /// Create a program. `sentinel` is the branch result that lets a
    /// guarded instruction run.
    pub fn new(
        instructions: Vec<Instruction<T>>,
        registers: RegisterSet<T>,
        output_registers: Vec<RegisterIndex>,
        sentinel: T,
    ) -> Self {
        Self {
            instructions,
            registers,
            output_registers,
            fitness: f64::INFINITY,
            sentinel,
            effective: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn sentinel(&self) -> &T {
        &self.sentinel
    }

    /// Run intron elimination and cache the result.
    ///
    /// Returns the positions of the effective instructions in program order.
    pub fn find_effective_program(&mut self) -> &[usize] {
        self.effective = effective::effective_positions(self);
        &self.effective
    }

    /// Positions cached by the last call to [`Program::find_effective_program`]
    pub fn effective_positions(&self) -> &[usize] {
        &self.effective
    }

    /// Instructions cached by the last call to [`Program::find_effective_program`]
    pub fn effective_instructions(&self) -> impl Iterator<Item = &Instruction<T>> {
        self.effective
            .iter()
            .filter_map(|&position| self.instructions.get(position))
    }

    /// Load a feature vector into the input registers
    pub fn write_instance(&mut self, sample: &[T]) -> Result<()> {
        self.registers.write_instance(sample)
    }

    pub fn reset(&mut self) {
        self.registers.reset();
    }

    /// Current values of the output registers
    pub fn outputs(&self) -> Result<Vec<T>> {
        self.output_registers
            .iter()
            .map(|&index| self.registers.read(index))
            .collect()
    }
}

impl<T: Clone + PartialEq> Program<T> {
    /// Run every instruction in order.
    ///
    /// A branch whose result is not the sentinel skips the run of branches
    /// directly after it together with the instruction they guard.
    pub fn execute(&mut self) -> Result<()> {
        let len = self.instructions.len();
        let mut position = 0;

        while position < len {
            let instruction = &self.instructions[position];

            if instruction.is_branch() {
                if instruction.evaluate(&self.registers)? != self.sentinel {
                    position += 1;
                    while position < len && self.instructions[position].is_branch() {
                        position += 1;
                    }
                }
            } else {
                instruction.execute(&mut self.registers)?;
            }

            position += 1;
        }

        Ok(())
    }
}

impl<T: Clone + Serialize + DeserializeOwned> Program<T> {
    /// Serialize the program to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let record = ProgramRecord {
            instructions: self.instructions.iter().map(Instruction::to_record).collect(),
            registers: self.registers.clone(),
            output_registers: self.output_registers.clone(),
            fitness: self.fitness,
            sentinel: self.sentinel.clone(),
        };
        Ok(bincode::serialize(&record)?)
    }

    /// Deserialize a program, resolving operations by name against `catalogue`
    pub fn from_bytes(bytes: &[u8], catalogue: &OperationCatalogue<T>) -> Result<Self> {
        let record: ProgramRecord<T> = bincode::deserialize(bytes)?;

        let instructions = record
            .instructions
            .into_iter()
            .map(|inst| Instruction::from_record(inst, catalogue))
            .collect::<Result<Vec<_>>>()?;

        if let Some(&index) = record
            .output_registers
            .iter()
            .find(|&&index| index >= record.registers.len())
        {
            return Err(Error::RegisterAccess {
                index,
                reason: "output register out of range".to_string(),
            });
        }

        let mut program = Program::new(
            instructions,
            record.registers,
            record.output_registers,
            record.sentinel,
        );
        program.fitness = record.fitness;
        Ok(program)
    }
}

impl<T> fmt::Display for Program<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct ProgramRecord<T> {
    instructions: Vec<InstructionRecord>,
    registers: RegisterSet<T>,
    output_registers: Vec<RegisterIndex>,
    fitness: f64,
    sentinel: T,
}
