//! Random instruction and program generation.

use crate::instruction::Instruction;
use crate::operation::OperationCatalogue;
use crate::program::Program;
use crate::registers::{RegisterLayout, RegisterSet};
use lgp_core::{Error, ProgramConfig, RegisterIndex, Result};
use rand::Rng;
use tracing::debug;

/// Draw an operand register.
///
/// With probability `constants_rate` a constant register is chosen,
/// otherwise an input or calculation register. Falls back to whichever
/// group is non-empty.
pub fn sample_operand<R: Rng>(layout: &RegisterLayout, constants_rate: f64, rng: &mut R) -> RegisterIndex {
    let variable_count = layout.input_count + layout.calculation_count;
    let constants = layout.constant_range();

    let use_constant = !constants.is_empty() && (variable_count == 0 || rng.gen::<f64>() < constants_rate);
    if use_constant {
        rng.gen_range(constants)
    } else {
        // inputs and calculation registers are contiguous from index 0
        rng.gen_range(0..variable_count)
    }
}

/// Produces new instructions for insertion mutations and program generation
pub trait InstructionGenerator<T> {
    fn generate_instruction<R: Rng>(&self, rng: &mut R) -> Result<Instruction<T>>;
}

/// Uniformly random instructions over a fixed register layout
#[derive(Debug, Clone)]
pub struct RandomInstructionGenerator<T> {
    catalogue: OperationCatalogue<T>,
    layout: RegisterLayout,
    constants_rate: f64,
}

impl<T> RandomInstructionGenerator<T> {
    pub fn new(catalogue: OperationCatalogue<T>, layout: RegisterLayout, constants_rate: f64) -> Result<Self> {
        if catalogue.is_empty() {
            return Err(Error::InvalidConfiguration(
                "operation catalogue is empty".to_string(),
            ));
        }
        if layout.calculation_count == 0 {
            return Err(Error::InvalidConfiguration(
                "register layout has no calculation registers".to_string(),
            ));
        }

        Ok(Self {
            catalogue,
            layout,
            constants_rate,
        })
    }

    /// Generator drawing constant operands at `config.constants_rate`
    pub fn from_config(
        catalogue: OperationCatalogue<T>,
        layout: RegisterLayout,
        config: &ProgramConfig,
    ) -> Result<Self> {
        config.validate()?;
        Self::new(catalogue, layout, config.constants_rate)
    }

    pub fn catalogue(&self) -> &OperationCatalogue<T> {
        &self.catalogue
    }
}

impl<T> InstructionGenerator<T> for RandomInstructionGenerator<T> {
    fn generate_instruction<R: Rng>(&self, rng: &mut R) -> Result<Instruction<T>> {
        let operation = self.catalogue.choose(rng).cloned().ok_or_else(|| {
            Error::InvalidConfiguration("operation catalogue is empty".to_string())
        })?;

        let destination = rng.gen_range(self.layout.calculation_range());
        let operands = (0..operation.arity().count())
            .map(|_| sample_operand(&self.layout, self.constants_rate, rng))
            .collect();

        Ok(Instruction::new(operation, destination, operands))
    }
}

/// Builds initial programs, each owning a fresh copy of a template register set
#[derive(Debug, Clone)]
pub struct RandomProgramGenerator<T, G> {
    config: ProgramConfig,
    instruction_generator: G,
    registers: RegisterSet<T>,
    output_registers: Vec<RegisterIndex>,
    sentinel: T,
}

impl<T: Clone, G: InstructionGenerator<T>> RandomProgramGenerator<T, G> {
    pub fn new(
        config: ProgramConfig,
        instruction_generator: G,
        registers: RegisterSet<T>,
        output_registers: Vec<RegisterIndex>,
        sentinel: T,
    ) -> Result<Self> {
        config.validate()?;

        if output_registers.is_empty() {
            return Err(Error::InvalidConfiguration(
                "at least one output register is required".to_string(),
            ));
        }
        for &index in &output_registers {
            registers.register_type(index)?;
        }

        Ok(Self {
            config,
            instruction_generator,
            registers,
            output_registers,
            sentinel,
        })
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<Program<T>> {
        let length = rng.gen_range(
            self.config.initial_minimum_program_length..=self.config.initial_maximum_program_length,
        );

        let instructions = (0..length)
            .map(|_| self.instruction_generator.generate_instruction(rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(Program::new(
            instructions,
            self.registers.clone(),
            self.output_registers.clone(),
            self.sentinel.clone(),
        ))
    }

    pub fn generate_population<R: Rng>(&self, count: usize, rng: &mut R) -> Result<Vec<Program<T>>> {
        debug!("Generating {} programs", count);
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

impl<G: InstructionGenerator<f64>> RandomProgramGenerator<f64, G> {
    /// Generator whose programs get `config.calculation_registers` scratch
    /// registers reset to `config.default_register_value`, and whose
    /// branches compare against `config.branch_sentinel`
    pub fn from_config(
        config: ProgramConfig,
        instruction_generator: G,
        input_count: usize,
        constants: Vec<f64>,
        output_registers: Vec<RegisterIndex>,
    ) -> Result<Self> {
        let registers = RegisterSet::from_config(input_count, constants, &config);
        let sentinel = config.branch_sentinel;
        Self::new(config, instruction_generator, registers, output_registers, sentinel)
    }
}
