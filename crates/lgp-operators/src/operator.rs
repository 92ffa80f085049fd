//! Operator contracts.

use lgp_core::Result;
use lgp_program::Program;
use rand::Rng;

/// Changes a single program in place
pub trait MutationOperator<T> {
    fn mutate<R: Rng>(&self, program: &mut Program<T>, rng: &mut R) -> Result<()>;
}

/// Exchanges genetic material between two programs in place
pub trait RecombinationOperator<T> {
    fn combine<R: Rng>(
        &self,
        mother: &mut Program<T>,
        father: &mut Program<T>,
        rng: &mut R,
    ) -> Result<()>;
}

/// Picks individuals for reproduction, returning independent copies
pub trait SelectionOperator<T> {
    fn select<R: Rng>(&self, population: &[Program<T>], rng: &mut R) -> Result<Vec<Program<T>>>;
}
