//! Tournament selection.

use crate::operator::SelectionOperator;
use lgp_core::{Error, Result, SelectionConfig};
use lgp_program::Program;
use rand::Rng;
use tracing::{debug, instrument};

/// Keeps the fittest of `tournament_size` individuals drawn with
/// replacement, once per requested offspring. Lower fitness wins.
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    config: SelectionConfig,
}

impl TournamentSelection {
    pub fn new(config: SelectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn tournament<'a, T, R: Rng>(&self, population: &'a [Program<T>], rng: &mut R) -> &'a Program<T> {
        let mut winner = &population[rng.gen_range(0..population.len())];

        for _ in 1..self.config.tournament_size {
            let challenger = &population[rng.gen_range(0..population.len())];
            if challenger.fitness < winner.fitness {
                winner = challenger;
            }
        }

        winner
    }
}

impl<T: Clone> SelectionOperator<T> for TournamentSelection {
    #[instrument(skip_all, fields(population = population.len()))]
    fn select<R: Rng>(&self, population: &[Program<T>], rng: &mut R) -> Result<Vec<Program<T>>> {
        if population.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot select from an empty population".to_string(),
            ));
        }

        let selected: Vec<Program<T>> = (0..self.config.offspring_count)
            .map(|_| self.tournament(population, rng).clone())
            .collect();

        debug!(
            "Selected {} individuals with tournaments of {}",
            selected.len(),
            self.config.tournament_size
        );
        Ok(selected)
    }
}
