//! Variation and selection operators for linear genetic programming.
//!
//! Every operator transforms programs in place and is driven by a caller
//! supplied random number generator, so a fixed seed reproduces a run.
//! Invalid configuration fails at construction; situations where an
//! operator simply has nothing to do leave the program unchanged.

pub mod operator;
pub mod constant;
pub mod macro_mutation;
pub mod micro_mutation;
pub mod crossover;
pub mod selection;

pub use operator::{MutationOperator, RecombinationOperator, SelectionOperator};
pub use constant::{ConstantMutationFunction, GaussianNoise, Identity};
pub use macro_mutation::MacroMutationOperator;
pub use micro_mutation::MicroMutationOperator;
pub use crossover::{CrossoverPointProvider, LinearCrossover, SegmentProvider};
pub use selection::TournamentSelection;
