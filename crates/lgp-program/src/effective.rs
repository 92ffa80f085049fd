//! Intron elimination.
//!
//! An instruction is effective when it can influence an output register.
//! Both the full analysis and the bounded register resolver walk the
//! program backwards from the outputs, tracking which registers are still
//! live:
//!
//! - a non-branch instruction whose destination is live is effective; its
//!   destination stops being live (unless a branch directly precedes it,
//!   since the guarded write may be skipped) and its non-constant operands
//!   become live;
//! - a branch is effective when the instruction directly after it is; its
//!   non-constant operands become live and nothing is released.

use crate::instruction::Instruction;
use crate::program::Program;
use lgp_core::{Error, RegisterIndex, Result};
use std::collections::BTreeSet;
use tracing::trace;

struct Scan {
    live: BTreeSet<RegisterIndex>,
    effective: Vec<bool>,
}

/// Walk `program` backwards, stopping after `stop_point` instructions
fn scan<T: Clone>(program: &Program<T>, stop_point: usize) -> Scan {
    let instructions = &program.instructions;
    let layout = program.registers.layout();
    let len = instructions.len();

    let mut live: BTreeSet<RegisterIndex> = program.output_registers.iter().copied().collect();
    let mut effective = vec![false; len];

    for position in (0..len).rev().take(stop_point) {
        let instruction = &instructions[position];

        if instruction.is_branch() {
            if position + 1 < len && effective[position + 1] {
                effective[position] = true;
            }
        } else if live.contains(&instruction.destination) {
            effective[position] = true;

            let guarded = position > 0 && instructions[position - 1].is_branch();
            if !guarded {
                live.remove(&instruction.destination);
            }
        }

        if effective[position] {
            live.extend(
                instruction
                    .operands
                    .iter()
                    .copied()
                    .filter(|&operand| !layout.is_constant(operand)),
            );
        }
    }

    Scan { live, effective }
}

/// Positions of the effective instructions, in program order
pub fn effective_positions<T: Clone>(program: &Program<T>) -> Vec<usize> {
    let scan = scan(program, program.len());

    let positions: Vec<usize> = scan
        .effective
        .iter()
        .enumerate()
        .filter_map(|(position, &effective)| effective.then_some(position))
        .collect();

    trace!(
        "{} of {} instructions effective",
        positions.len(),
        program.len()
    );
    positions
}

/// The effective instructions of `program`, in program order.
///
/// Does not touch the program's cache; see
/// [`Program::find_effective_program`] for the caching variant.
pub fn effective_instructions<T: Clone>(program: &Program<T>) -> Vec<Instruction<T>> {
    effective_positions(program)
        .into_iter()
        .map(|position| program.instructions[position].clone())
        .collect()
}

/// Calculation registers that are live at a cut point of a program.
///
/// Mutation operators use this to find destinations that keep a new or
/// changed instruction effective, without a full analysis.
pub struct EffectiveCalculationRegisterResolver;

impl EffectiveCalculationRegisterResolver {
    /// Live calculation registers after scanning `stop_point` instructions
    /// backwards from the end of the program.
    ///
    /// With `stop_point == 0` this is the output registers. The result is
    /// sorted ascending and never contains input or constant registers.
    pub fn resolve<T: Clone>(program: &Program<T>, stop_point: usize) -> Result<Vec<RegisterIndex>> {
        if stop_point > program.len() {
            return Err(Error::InvalidArgument(format!(
                "stop point {} exceeds program length {}",
                stop_point,
                program.len()
            )));
        }

        let layout = program.registers.layout();
        let live = scan(program, stop_point).live;

        Ok(live
            .into_iter()
            .filter(|&index| layout.is_calculation(index))
            .collect())
    }

    /// Registers live just before instruction `position`, i.e. legal
    /// destinations for an instruction inserted at `position`
    pub fn at_insertion_point<T: Clone>(
        program: &Program<T>,
        position: usize,
    ) -> Result<Vec<RegisterIndex>> {
        let stop_point = program.len().checked_sub(position).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "insertion point {} beyond program length {}",
                position,
                program.len()
            ))
        })?;
        Self::resolve(program, stop_point)
    }

    /// Registers live just after instruction `position`, i.e. legal new
    /// destinations for that instruction
    pub fn after_instruction<T: Clone>(
        program: &Program<T>,
        position: usize,
    ) -> Result<Vec<RegisterIndex>> {
        if position >= program.len() {
            return Err(Error::InvalidArgument(format!(
                "instruction {} out of range for program length {}",
                position,
                program.len()
            )));
        }
        Self::resolve(program, program.len() - position - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::standard_catalogue;
    use crate::generator::{InstructionGenerator, RandomInstructionGenerator};
    use crate::registers::RegisterSet;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// inputs 0..2, calculation 2..6, constants 6..8
    fn program(lines: &[(&str, RegisterIndex, &[RegisterIndex])], outputs: &[RegisterIndex]) -> Program<f64> {
        let catalogue = standard_catalogue(1.0);
        let instructions = lines
            .iter()
            .map(|(name, destination, operands)| {
                Instruction::new(
                    catalogue.find(name).unwrap().clone(),
                    *destination,
                    operands.to_vec(),
                )
            })
            .collect();

        Program::new(
            instructions,
            RegisterSet::new(2, 4, vec![1.0, 2.0], 0.0),
            outputs.to_vec(),
            1.0,
        )
    }

    #[test]
    fn test_single_instruction_program() {
        let program = program(&[("add", 2, &[0, 1])], &[2]);

        assert_eq!(effective_positions(&program), vec![0]);
        assert_eq!(effective_instructions(&program), program.instructions);
        assert_eq!(
            EffectiveCalculationRegisterResolver::resolve(&program, 0).unwrap(),
            vec![2]
        );
    }

    #[test]
    fn test_introns_are_removed() {
        let program = program(
            &[
                ("add", 3, &[0, 1]), // effective: feeds r2
                ("mul", 4, &[0, 6]), // intron: r4 never read
                ("sub", 5, &[0, 1]), // intron: r5 overwritten below
                ("add", 5, &[3, 7]), // effective
                ("mul", 2, &[5, 3]), // effective
                ("sin", 4, &[2]),    // intron: r4 not an output
            ],
            &[2],
        );

        assert_eq!(effective_positions(&program), vec![0, 3, 4]);
    }

    #[test]
    fn test_degenerate_program_has_no_effective_instructions() {
        let program = program(&[("add", 3, &[0, 1]), ("add", 4, &[3, 1])], &[2]);
        assert!(effective_positions(&program).is_empty());
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let mut program = program(&[("add", 3, &[0, 1]), ("add", 2, &[3, 1])], &[2]);
        let first = program.find_effective_program().to_vec();
        let second = program.find_effective_program().to_vec();
        assert_eq!(first, second);
        assert_eq!(first, vec![0, 1]);
    }

    #[test]
    fn test_branch_guarding_effective_instruction() {
        let program = program(
            &[
                ("add", 2, &[0, 1]),   // effective: r2 survives a skipped write
                ("if_gt", 2, &[3, 0]), // effective: guards the write to r2
                ("mul", 2, &[2, 6]),   // effective
            ],
            &[2],
        );

        assert_eq!(effective_positions(&program), vec![0, 1, 2]);
    }

    #[test]
    fn test_branch_guarding_intron() {
        let program = program(
            &[
                ("add", 2, &[0, 1]),
                ("if_gt", 2, &[3, 0]), // guards an intron
                ("mul", 4, &[2, 6]),   // intron
            ],
            &[2],
        );

        assert_eq!(effective_positions(&program), vec![0]);
    }

    #[test]
    fn test_branch_chain_propagates() {
        let program = program(
            &[
                ("add", 3, &[0, 1]),   // effective: read by first branch
                ("if_gt", 2, &[3, 0]), // effective
                ("if_le", 2, &[4, 7]), // effective
                ("add", 2, &[0, 6]),   // effective, destination retained
            ],
            &[2],
        );

        assert_eq!(effective_positions(&program), vec![0, 1, 2, 3]);

        let live = EffectiveCalculationRegisterResolver::resolve(&program, 3).unwrap();
        // r2 kept alive by the guarded write, r3 and r4 read by the branches
        assert_eq!(live, vec![2, 3, 4]);
    }

    #[test]
    fn test_trailing_branch_is_never_effective() {
        let program = program(&[("add", 2, &[0, 1]), ("if_gt", 2, &[2, 0])], &[2]);
        assert_eq!(effective_positions(&program), vec![0]);
    }

    #[test]
    fn test_resolver_stops_early() {
        let program = program(
            &[
                ("add", 3, &[0, 1]),
                ("add", 4, &[3, 6]),
                ("mul", 2, &[4, 5]),
            ],
            &[2],
        );

        let resolve = |stop| EffectiveCalculationRegisterResolver::resolve(&program, stop).unwrap();
        assert_eq!(resolve(0), vec![2]);
        assert_eq!(resolve(1), vec![4, 5]);
        assert_eq!(resolve(2), vec![3, 5]);
        assert_eq!(resolve(3), vec![5]);

        assert!(EffectiveCalculationRegisterResolver::resolve(&program, 4).is_err());
    }

    #[test]
    fn test_resolver_position_helpers() {
        let program = program(&[("add", 3, &[0, 1]), ("mul", 2, &[3, 3])], &[2]);

        assert_eq!(
            EffectiveCalculationRegisterResolver::at_insertion_point(&program, 2).unwrap(),
            vec![2]
        );
        assert_eq!(
            EffectiveCalculationRegisterResolver::at_insertion_point(&program, 1).unwrap(),
            vec![3]
        );
        assert!(EffectiveCalculationRegisterResolver::at_insertion_point(&program, 0)
            .unwrap()
            .is_empty());
        assert!(EffectiveCalculationRegisterResolver::at_insertion_point(&program, 3).is_err());

        assert_eq!(
            EffectiveCalculationRegisterResolver::after_instruction(&program, 1).unwrap(),
            vec![2]
        );
        assert_eq!(
            EffectiveCalculationRegisterResolver::after_instruction(&program, 0).unwrap(),
            vec![3]
        );
        assert!(EffectiveCalculationRegisterResolver::after_instruction(&program, 2).is_err());
    }

    proptest! {
        #[test]
        fn prop_random_programs_analyze_consistently(seed in any::<u64>(), length in 1usize..12) {
            let registers = RegisterSet::new(2, 4, vec![1.0, 2.0], 0.0);
            let layout = registers.layout();
            let generator =
                RandomInstructionGenerator::new(standard_catalogue(1.0), layout, 0.3).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            let instructions = (0..length)
                .map(|_| generator.generate_instruction(&mut rng).unwrap())
                .collect();
            let mut program = Program::new(instructions, registers, vec![2, 3], 1.0);

            // effective code is an order-preserving subsequence
            let positions = effective_positions(&program);
            prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
            prop_assert!(positions.iter().all(|&position| position < length));
            let expected: Vec<_> = positions
                .iter()
                .map(|&position| program.instructions[position].clone())
                .collect();
            prop_assert_eq!(effective_instructions(&program), expected);

            let before = program.instructions.clone();
            let first = program.find_effective_program().to_vec();
            let second = program.find_effective_program().to_vec();
            prop_assert_eq!(&first, &positions);
            prop_assert_eq!(first, second);
            prop_assert_eq!(&program.instructions, &before);

            for stop in 0..=length {
                let live = EffectiveCalculationRegisterResolver::resolve(&program, stop).unwrap();
                prop_assert!(live.iter().all(|&index| layout.is_calculation(index)));
                prop_assert!(live.windows(2).all(|pair| pair[0] < pair[1]));
            }
            prop_assert!(EffectiveCalculationRegisterResolver::resolve(&program, length + 1).is_err());
        }
    }
}
