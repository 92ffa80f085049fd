//! Configuration types for programs and variation operators.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that two rates partition a binary choice
pub const RATE_EPSILON: f64 = 1e-5;

/// Program shape and register layout parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Smallest number of instructions a program may hold
    pub minimum_program_length: usize,
    /// Largest number of instructions a program may hold
    pub maximum_program_length: usize,
    /// Lower bound on the length of freshly generated programs
    pub initial_minimum_program_length: usize,
    /// Upper bound on the length of freshly generated programs
    pub initial_maximum_program_length: usize,
    /// Probability that a drawn operand is a constant register (0.0 to 1.0)
    pub constants_rate: f64,
    /// Number of calculation registers per program
    pub calculation_registers: usize,
    /// Value input and calculation registers are reset to
    pub default_register_value: f64,
    /// Branch result that lets the guarded instruction run
    pub branch_sentinel: f64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            minimum_program_length: 10,
            maximum_program_length: 200,
            initial_minimum_program_length: 10,
            initial_maximum_program_length: 30,
            constants_rate: 0.5,
            calculation_registers: 4,
            default_register_value: 1.0,
            branch_sentinel: 1.0,
        }
    }
}

impl ProgramConfig {
    pub fn validate(&self) -> Result<()> {
        if self.minimum_program_length == 0 {
            return Err(Error::InvalidConfiguration(
                "minimum_program_length must be at least 1".to_string(),
            ));
        }
        if self.minimum_program_length > self.maximum_program_length {
            return Err(Error::InvalidConfiguration(format!(
                "minimum_program_length ({}) exceeds maximum_program_length ({})",
                self.minimum_program_length, self.maximum_program_length
            )));
        }
        if self.initial_minimum_program_length < self.minimum_program_length
            || self.initial_maximum_program_length > self.maximum_program_length
            || self.initial_minimum_program_length > self.initial_maximum_program_length
        {
            return Err(Error::InvalidConfiguration(format!(
                "initial program lengths [{}, {}] must lie within [{}, {}]",
                self.initial_minimum_program_length,
                self.initial_maximum_program_length,
                self.minimum_program_length,
                self.maximum_program_length
            )));
        }
        if !(0.0..=1.0).contains(&self.constants_rate) {
            return Err(Error::InvalidConfiguration(format!(
                "constants_rate must be within [0, 1], got {}",
                self.constants_rate
            )));
        }
        if self.calculation_registers == 0 {
            return Err(Error::InvalidConfiguration(
                "at least one calculation register is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a program of the given length respects the length bounds
    pub fn admits_length(&self, length: usize) -> bool {
        (self.minimum_program_length..=self.maximum_program_length).contains(&length)
    }

    /// Reject a program whose length is outside the bounds
    pub fn check_length(&self, length: usize) -> Result<()> {
        if !self.admits_length(length) {
            return Err(Error::InvalidArgument(format!(
                "program length {} outside [{}, {}]",
                length, self.minimum_program_length, self.maximum_program_length
            )));
        }
        Ok(())
    }
}

/// Instruction insertion/deletion rates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroMutationConfig {
    pub insertion_rate: f64,
    pub deletion_rate: f64,
}

impl Default for MacroMutationConfig {
    fn default() -> Self {
        Self {
            insertion_rate: 0.67,
            deletion_rate: 0.33,
        }
    }
}

impl MacroMutationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.insertion_rate <= 0.0 || self.deletion_rate <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "insertion_rate ({}) and deletion_rate ({}) must be positive",
                self.insertion_rate, self.deletion_rate
            )));
        }
        let total = self.insertion_rate + self.deletion_rate;
        if (total - 1.0).abs() > RATE_EPSILON {
            return Err(Error::InvalidConfiguration(format!(
                "insertion_rate + deletion_rate must equal 1.0, got {}",
                total
            )));
        }
        Ok(())
    }
}

/// Register/operator mutation rates; the remainder goes to constant mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroMutationConfig {
    pub register_mutation_rate: f64,
    pub operator_mutation_rate: f64,
}

impl Default for MicroMutationConfig {
    fn default() -> Self {
        Self {
            register_mutation_rate: 0.5,
            operator_mutation_rate: 0.3,
        }
    }
}

impl MicroMutationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.register_mutation_rate < 0.0 || self.operator_mutation_rate < 0.0 {
            return Err(Error::InvalidConfiguration(
                "micro mutation rates must not be negative".to_string(),
            ));
        }
        let total = self.register_mutation_rate + self.operator_mutation_rate;
        if total > 1.0 {
            return Err(Error::InvalidConfiguration(format!(
                "register_mutation_rate + operator_mutation_rate must not exceed 1.0, got {}",
                total
            )));
        }
        Ok(())
    }

    /// Probability left over for constant mutation
    pub fn constant_mutation_rate(&self) -> f64 {
        1.0 - (self.register_mutation_rate + self.operator_mutation_rate)
    }
}

/// Linear crossover bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossoverConfig {
    pub maximum_segment_length: usize,
    pub maximum_crossover_distance: usize,
    pub maximum_segment_length_difference: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            maximum_segment_length: 6,
            maximum_crossover_distance: 5,
            maximum_segment_length_difference: 3,
        }
    }
}

impl CrossoverConfig {
    pub fn validate(&self) -> Result<()> {
        if self.maximum_segment_length < 1 {
            return Err(Error::InvalidConfiguration(
                "maximum_segment_length must be at least 1".to_string(),
            ));
        }
        if self.maximum_crossover_distance < 1 {
            return Err(Error::InvalidConfiguration(
                "maximum_crossover_distance must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tournament selection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Individuals drawn per tournament
    pub tournament_size: usize,
    /// Number of winners returned per selection call
    pub offspring_count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tournament_size: 2,
            offspring_count: 50,
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tournament_size == 0 {
            return Err(Error::InvalidConfiguration(
                "tournament_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration for a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub program: ProgramConfig,
    pub macro_mutation: MacroMutationConfig,
    pub micro_mutation: MicroMutationConfig,
    pub crossover: CrossoverConfig,
    pub selection: SelectionConfig,
}

impl EvolutionConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EvolutionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.program.validate()?;
        self.macro_mutation.validate()?;
        self.micro_mutation.validate()?;
        self.crossover.validate()?;
        self.selection.validate()?;
        Ok(())
    }
}
