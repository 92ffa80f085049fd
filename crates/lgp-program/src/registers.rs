//! Typed register storage for programs.

use lgp_core::{Error, ProgramConfig, RegisterIndex, RegisterType, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A single register slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Register<T> {
    pub value: T,
    pub index: RegisterIndex,
}

/// Sizes of the three register regions.
///
/// Regions are laid out contiguously: inputs first, then calculation
/// registers, then constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterLayout {
    pub input_count: usize,
    pub calculation_count: usize,
    pub constant_count: usize,
}

impl RegisterLayout {
    pub fn new(input_count: usize, calculation_count: usize, constant_count: usize) -> Self {
        Self {
            input_count,
            calculation_count,
            constant_count,
        }
    }

    pub fn total_count(&self) -> usize {
        self.input_count + self.calculation_count + self.constant_count
    }

    pub fn input_range(&self) -> Range<RegisterIndex> {
        0..self.input_count
    }

    pub fn calculation_range(&self) -> Range<RegisterIndex> {
        self.input_count..self.input_count + self.calculation_count
    }

    pub fn constant_range(&self) -> Range<RegisterIndex> {
        let start = self.input_count + self.calculation_count;
        start..start + self.constant_count
    }

    /// Register type for an index, or `None` when it is out of range
    pub fn register_type(&self, index: RegisterIndex) -> Option<RegisterType> {
        if self.input_range().contains(&index) {
            Some(RegisterType::Input)
        } else if self.calculation_range().contains(&index) {
            Some(RegisterType::Calculation)
        } else if self.constant_range().contains(&index) {
            Some(RegisterType::Constant)
        } else {
            None
        }
    }

    pub fn is_constant(&self, index: RegisterIndex) -> bool {
        self.constant_range().contains(&index)
    }

    pub fn is_calculation(&self, index: RegisterIndex) -> bool {
        self.calculation_range().contains(&index)
    }
}

/// Input, calculation and constant registers in one flat index space.
///
/// Cloning produces a fully independent copy; every program owns its own
/// register set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterSet<T> {
    registers: Vec<Register<T>>,
    layout: RegisterLayout,
    default_value: T,
}

impl<T: Clone> RegisterSet<T> {
    /// Create a register set with `input_count` inputs, `calculation_count`
    /// scratch registers and one constant register per entry in `constants`.
    /// Inputs and calculation registers start at `default_value`.
    pub fn new(
        input_count: usize,
        calculation_count: usize,
        constants: Vec<T>,
        default_value: T,
    ) -> Self {
        let layout = RegisterLayout::new(input_count, calculation_count, constants.len());

        let registers = std::iter::repeat(default_value.clone())
            .take(input_count + calculation_count)
            .chain(constants)
            .enumerate()
            .map(|(index, value)| Register { value, index })
            .collect();

        Self {
            registers,
            layout,
            default_value,
        }
    }

    pub fn layout(&self) -> RegisterLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    pub fn register_type(&self, index: RegisterIndex) -> Result<RegisterType> {
        self.layout
            .register_type(index)
            .ok_or_else(|| out_of_range(index, self.len()))
    }

    pub fn read(&self, index: RegisterIndex) -> Result<T> {
        self.registers
            .get(index)
            .map(|register| register.value.clone())
            .ok_or_else(|| out_of_range(index, self.len()))
    }

    /// Write a value to an input or calculation register
    pub fn write(&mut self, index: RegisterIndex, value: T) -> Result<()> {
        if self.layout.is_constant(index) {
            return Err(Error::RegisterAccess {
                index,
                reason: "constant registers are read-only".to_string(),
            });
        }
        self.overwrite(index, value)
    }

    /// Write a value to any register, constants included.
    ///
    /// Only constant mutation is expected to reach the constant region.
    pub fn overwrite(&mut self, index: RegisterIndex, value: T) -> Result<()> {
        let len = self.len();
        let register = self
            .registers
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        register.value = value;
        Ok(())
    }

    /// Copy a feature vector into the input registers
    pub fn write_instance(&mut self, sample: &[T]) -> Result<()> {
        if sample.len() != self.layout.input_count {
            return Err(Error::RegisterWriteRange {
                expected: self.layout.input_count,
                actual: sample.len(),
            });
        }

        for (register, value) in self.registers.iter_mut().zip(sample) {
            register.value = value.clone();
        }
        Ok(())
    }

    /// Restore inputs and calculation registers to the default value
    pub fn reset(&mut self) {
        let end = self.layout.calculation_range().end;
        for register in &mut self.registers[..end] {
            register.value = self.default_value.clone();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Register<T>> {
        self.registers.iter()
    }
}

impl RegisterSet<f64> {
    /// Register set with the calculation region and default value taken
    /// from `config`
    pub fn from_config(input_count: usize, constants: Vec<f64>, config: &ProgramConfig) -> Self {
        Self::new(
            input_count,
            config.calculation_registers,
            constants,
            config.default_register_value,
        )
    }
}

fn out_of_range(index: RegisterIndex, len: usize) -> Error {
    Error::RegisterAccess {
        index,
        reason: format!("index out of range for {} registers", len),
    }
}
