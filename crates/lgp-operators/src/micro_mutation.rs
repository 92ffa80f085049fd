//! Register, operator and constant mutation of a single effective instruction.

use crate::constant::ConstantMutationFunction;
use crate::operator::MutationOperator;
use lgp_core::{Error, MicroMutationConfig, ProgramConfig, RegisterIndex, Result};
use lgp_program::{
    sample_operand, EffectiveCalculationRegisterResolver, Instruction, OperationCatalogue, Program,
    RegisterLayout,
};
use rand::Rng;
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MicroMutationType {
    Register,
    Operator,
    Constant,
}

/// Makes a small change to one effective instruction.
///
/// The kind of change is drawn per call: a register swap, an operation
/// swap, or (with the remaining probability) a perturbation of a constant
/// the instruction reads.
pub struct MicroMutationOperator<T> {
    config: MicroMutationConfig,
    constants_rate: f64,
    catalogue: OperationCatalogue<T>,
    constant_mutation: Box<dyn ConstantMutationFunction<T>>,
}

impl<T: Clone> MicroMutationOperator<T> {
    pub fn new(
        config: MicroMutationConfig,
        program_config: &ProgramConfig,
        catalogue: OperationCatalogue<T>,
        constant_mutation: Box<dyn ConstantMutationFunction<T>>,
    ) -> Result<Self> {
        config.validate()?;
        program_config.validate()?;

        if catalogue.is_empty() {
            return Err(Error::InvalidConfiguration(
                "operation catalogue is empty".to_string(),
            ));
        }

        Ok(Self {
            config,
            constants_rate: program_config.constants_rate,
            catalogue,
            constant_mutation,
        })
    }

    fn mutation_type(&self, p: f64) -> MicroMutationType {
        if p < self.config.register_mutation_rate {
            MicroMutationType::Register
        } else if p < self.config.register_mutation_rate + self.config.operator_mutation_rate {
            MicroMutationType::Operator
        } else {
            MicroMutationType::Constant
        }
    }

    /// Slot 0 is the destination and slot `k` is operand `k - 1`. Branches
    /// never write their destination, so only their operands are drawn.
    fn mutate_register<R: Rng>(&self, program: &mut Program<T>, position: usize, rng: &mut R) -> Result<()> {
        let instruction = &program.instructions[position];
        let first_slot = usize::from(instruction.is_branch());
        let slot = rng.gen_range(first_slot..=instruction.operands.len());

        if slot == 0 {
            let live = EffectiveCalculationRegisterResolver::after_instruction(program, position)?;
            replace_destination(&mut program.instructions[position], &live, rng);
        } else {
            let layout = program.registers.layout();
            let operand = sample_operand(&layout, self.constants_rate, rng);
            trace!("Operand {} of instruction {} set to r[{}]", slot - 1, position, operand);
            program.instructions[position].operands[slot - 1] = operand;
        }
        Ok(())
    }

    fn mutate_operator<R: Rng>(&self, program: &mut Program<T>, position: usize, rng: &mut R) -> Result<()> {
        let operation = self.catalogue.choose(rng).cloned().ok_or_else(|| {
            Error::InvalidConfiguration("operation catalogue is empty".to_string())
        })?;
        let layout = program.registers.layout();

        let instruction = &mut program.instructions[position];
        trace!(
            "Operation of instruction {} changed from {} to {}",
            position,
            instruction.operation.name(),
            operation.name()
        );
        instruction.operation = operation;
        fit_operands(instruction, &layout, self.constants_rate, rng);
        Ok(())
    }

    fn mutate_constant<R: Rng>(
        &self,
        program: &mut Program<T>,
        position: usize,
        effective: &[usize],
        rng: &mut R,
    ) -> Result<()> {
        let layout = program.registers.layout();
        let mut candidate = position;

        for attempt in 0..effective.len() {
            if attempt > 0 {
                candidate = effective[rng.gen_range(0..effective.len())];
            }

            let constants: Vec<RegisterIndex> = program.instructions[candidate]
                .operands
                .iter()
                .copied()
                .filter(|&operand| layout.is_constant(operand))
                .collect();

            if !constants.is_empty() {
                let index = constants[rng.gen_range(0..constants.len())];
                let value = program.registers.read(index)?;
                let mutated = self.constant_mutation.mutate(&value, rng);
                trace!("Constant r[{}] of instruction {} mutated", index, candidate);
                return program.registers.overwrite(index, mutated);
            }
        }

        debug!("No effective instruction reads a constant, skipping constant mutation");
        Ok(())
    }
}

impl<T: Clone> MutationOperator<T> for MicroMutationOperator<T> {
    #[instrument(skip_all, fields(length = program.len()))]
    fn mutate<R: Rng>(&self, program: &mut Program<T>, rng: &mut R) -> Result<()> {
        let effective = program.find_effective_program().to_vec();
        if effective.is_empty() {
            debug!("No effective instructions, skipping micro mutation");
            return Ok(());
        }

        let position = effective[rng.gen_range(0..effective.len())];
        let mutation_type = self.mutation_type(rng.gen::<f64>());
        debug!("Applying {:?} mutation to instruction {}", mutation_type, position);

        match mutation_type {
            MicroMutationType::Register => self.mutate_register(program, position, rng)?,
            MicroMutationType::Operator => self.mutate_operator(program, position, rng)?,
            MicroMutationType::Constant => self.mutate_constant(program, position, &effective, rng)?,
        }

        program.find_effective_program();
        Ok(())
    }
}

/// Point the instruction at a uniformly chosen register from `live`.
///
/// Leaves the instruction unchanged when `live` is empty.
fn replace_destination<T, R: Rng>(instruction: &mut Instruction<T>, live: &[RegisterIndex], rng: &mut R) {
    if live.is_empty() {
        debug!("No live calculation registers, destination unchanged");
        return;
    }
    instruction.destination = live[rng.gen_range(0..live.len())];
}

/// Truncate or extend the operand list to match the operation's arity
fn fit_operands<T, R: Rng>(
    instruction: &mut Instruction<T>,
    layout: &RegisterLayout,
    constants_rate: f64,
    rng: &mut R,
) {
    let arity = instruction.arity();
    if instruction.operands.len() > arity {
        instruction.operands.truncate(arity);
    }
    while instruction.operands.len() < arity {
        instruction.operands.push(sample_operand(layout, constants_rate, rng));
    }
}
