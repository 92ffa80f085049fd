//! Effective instruction insertion and deletion.

use crate::operator::MutationOperator;
use lgp_core::{MacroMutationConfig, ProgramConfig, Result};
use lgp_program::{EffectiveCalculationRegisterResolver, InstructionGenerator, Program};
use rand::Rng;
use tracing::{debug, instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MacroMutationType {
    Insertion,
    Deletion,
}

/// Grows or shrinks a program by one instruction.
///
/// Inserted instructions write to a register that is live at the
/// insertion point, and deletions only remove effective instructions, so
/// every change alters the program's behavior.
#[derive(Debug, Clone)]
pub struct MacroMutationOperator<G> {
    config: MacroMutationConfig,
    program_config: ProgramConfig,
    instruction_generator: G,
}

impl<G> MacroMutationOperator<G> {
    pub fn new(
        config: MacroMutationConfig,
        program_config: &ProgramConfig,
        instruction_generator: G,
    ) -> Result<Self> {
        config.validate()?;
        program_config.validate()?;

        Ok(Self {
            config,
            program_config: program_config.clone(),
            instruction_generator,
        })
    }

    fn insert<T: Clone, R: Rng>(&self, program: &mut Program<T>, point: usize, rng: &mut R) -> Result<()>
    where
        G: InstructionGenerator<T>,
    {
        let mut instruction = self.instruction_generator.generate_instruction(rng)?;

        let registers = EffectiveCalculationRegisterResolver::at_insertion_point(program, point)?;
        if registers.is_empty() {
            debug!("No live calculation registers at position {}, skipping insertion", point);
            return Ok(());
        }

        instruction.destination = registers[rng.gen_range(0..registers.len())];
        trace!("Inserting {} at position {}", instruction, point);
        program.instructions.insert(point, instruction);
        Ok(())
    }

    fn delete<T: Clone, R: Rng>(&self, program: &mut Program<T>, rng: &mut R) {
        let effective = program.effective_positions();
        if effective.is_empty() {
            debug!("No effective instructions, skipping deletion");
            return;
        }

        let position = effective[rng.gen_range(0..effective.len())];
        let removed = program.instructions.remove(position);
        trace!("Deleted {} at position {}", removed, position);
    }
}

impl<T: Clone, G: InstructionGenerator<T>> MutationOperator<T> for MacroMutationOperator<G> {
    #[instrument(skip_all, fields(length = program.len()))]
    fn mutate<R: Rng>(&self, program: &mut Program<T>, rng: &mut R) -> Result<()> {
        self.program_config.check_length(program.len())?;
        program.find_effective_program();

        let length = program.len();
        let mutation_type = if rng.gen::<f64>() < self.config.insertion_rate {
            MacroMutationType::Insertion
        } else {
            MacroMutationType::Deletion
        };
        let point = rng.gen_range(0..length);

        let minimum = self.program_config.minimum_program_length;
        let maximum = self.program_config.maximum_program_length;
        let can_grow = length < maximum;
        let can_shrink = length > minimum;

        if can_grow && (mutation_type == MacroMutationType::Insertion || length == minimum) {
            self.insert(program, point, rng)?;
        } else if can_shrink
            && (mutation_type == MacroMutationType::Deletion || length == maximum)
        {
            self.delete(program, rng);
        } else {
            debug!("Program length fixed at {}, no macro mutation possible", length);
        }

        program.find_effective_program();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgp_core::{Error, RegisterIndex};
    use lgp_program::builtin::{arithmetic_catalogue, standard_catalogue};
    use lgp_program::{Instruction, RandomInstructionGenerator, RegisterSet};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // inputs 0..2, calculation 2..6, constants 6..8
    fn registers() -> RegisterSet<f64> {
        RegisterSet::new(2, 4, vec![1.0, 2.0], 0.0)
    }

    fn program(lines: &[(&str, RegisterIndex, &[RegisterIndex])]) -> Program<f64> {
        let catalogue = standard_catalogue(1.0);
        let instructions = lines
            .iter()
            .map(|(name, destination, operands)| {
                Instruction::new(catalogue.find(name).unwrap().clone(), *destination, operands.to_vec())
            })
            .collect();
        Program::new(instructions, registers(), vec![2], 1.0)
    }

    fn program_config(minimum: usize, maximum: usize) -> ProgramConfig {
        ProgramConfig {
            minimum_program_length: minimum,
            maximum_program_length: maximum,
            initial_minimum_program_length: minimum,
            initial_maximum_program_length: maximum,
            ..Default::default()
        }
    }

    fn operator(
        insertion_rate: f64,
        minimum: usize,
        maximum: usize,
    ) -> MacroMutationOperator<RandomInstructionGenerator<f64>> {
        let generator =
            RandomInstructionGenerator::new(arithmetic_catalogue(), registers().layout(), 0.3).unwrap();
        MacroMutationOperator::new(
            MacroMutationConfig {
                insertion_rate,
                deletion_rate: 1.0 - insertion_rate,
            },
            &program_config(minimum, maximum),
            generator,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_rates() {
        let generator =
            RandomInstructionGenerator::new(arithmetic_catalogue(), registers().layout(), 0.3).unwrap();
        let result = MacroMutationOperator::new(
            MacroMutationConfig {
                insertion_rate: 0.6,
                deletion_rate: 0.6,
            },
            &program_config(1, 10),
            generator,
        );
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_program_outside_bounds() {
        let operator = operator(0.5, 3, 10);
        let mut program = program(&[("add", 2, &[0, 1])]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        assert!(matches!(
            operator.mutate(&mut program, &mut rng),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_insertion_targets_live_register() {
        // only position 1 has a live calculation register (r3)
        let operator = operator(1.0 - 1e-9, 1, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..20 {
            let mut program = program(&[("add", 3, &[0, 1]), ("mul", 2, &[3, 6])]);
            operator.mutate(&mut program, &mut rng).unwrap();

            if program.len() == 3 {
                assert_eq!(program.instructions[1].destination, 3);
                assert!(program.effective_positions().contains(&1));
            }
        }
    }

    #[test]
    fn test_insertion_with_no_live_registers_is_noop() {
        // at the only insertion point the live set is {r0, r1}: inputs only
        let operator = operator(1.0 - 1e-9, 1, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..20 {
            let mut program = program(&[("add", 2, &[0, 1])]);
            let before = program.instructions.clone();
            operator.mutate(&mut program, &mut rng).unwrap();
            assert_eq!(program.instructions, before);
        }
    }

    #[test]
    fn test_insertion_forced_at_minimum_length() {
        // deletion drawn almost always, but the program cannot shrink
        let operator = operator(1e-9, 2, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut grew = 0;
        for _ in 0..20 {
            let mut program = program(&[("add", 3, &[0, 1]), ("mul", 2, &[3, 6])]);
            operator.mutate(&mut program, &mut rng).unwrap();
            assert!(program.len() >= 2);
            if program.len() == 3 {
                grew += 1;
            }
        }
        assert!(grew > 0);
    }

    #[test]
    fn test_deletion_forced_at_maximum_length() {
        let operator = operator(1.0 - 1e-9, 1, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut program = program(&[("add", 3, &[0, 1]), ("sub", 4, &[0, 1]), ("mul", 2, &[3, 6])]);
        operator.mutate(&mut program, &mut rng).unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_deletion_only_removes_effective_instructions() {
        let operator = operator(1e-9, 1, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..20 {
            // r4 and r5 writes are introns
            let mut program = program(&[
                ("add", 4, &[0, 1]),
                ("add", 3, &[0, 1]),
                ("sub", 5, &[0, 7]),
                ("mul", 2, &[3, 6]),
            ]);
            operator.mutate(&mut program, &mut rng).unwrap();

            assert_eq!(program.len(), 3);
            assert!(program.instructions.iter().any(|inst| inst.destination == 4));
            assert!(program.instructions.iter().any(|inst| inst.destination == 5));
        }
    }

    #[test]
    fn test_deletion_without_effective_instructions_is_noop() {
        let operator = operator(1e-9, 1, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut program = program(&[("add", 4, &[0, 1]), ("add", 3, &[0, 1])]);
        operator.mutate(&mut program, &mut rng).unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_fixed_length_is_noop() {
        let operator = operator(0.5, 2, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..10 {
            let mut program = program(&[("add", 3, &[0, 1]), ("mul", 2, &[3, 6])]);
            operator.mutate(&mut program, &mut rng).unwrap();
            assert_eq!(program.len(), 2);
        }
    }

    proptest! {
        #[test]
        fn prop_length_stays_within_bounds(seed in any::<u64>(), insertion_rate in 0.05f64..0.95) {
            let operator = operator(insertion_rate, 2, 8);
            let generator =
                RandomInstructionGenerator::new(standard_catalogue(1.0), registers().layout(), 0.3).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let length = rng.gen_range(2..=8);
            let instructions = (0..length).map(|_| generator.generate_instruction(&mut rng).unwrap()).collect();
            let mut program = Program::new(instructions, registers(), vec![2], 1.0);

            for _ in 0..30 {
                let before = program.instructions.clone();
                let effective_before = lgp_program::effective_instructions(&program);

                operator.mutate(&mut program, &mut rng).unwrap();
                prop_assert!((2..=8).contains(&program.len()));

                if program.len() < before.len() {
                    // the removed instruction was effective
                    let removed = before
                        .iter()
                        .zip(program.instructions.iter().chain(std::iter::once(&before[before.len() - 1])))
                        .position(|(a, b)| a != b)
                        .unwrap_or(before.len() - 1);
                    prop_assert!(effective_before.contains(&before[removed]));
                }
            }
        }
    }
}
