//! Linear crossover: exchange of instruction segments between two programs.

use crate::operator::RecombinationOperator;
use lgp_core::{CrossoverConfig, ProgramConfig, Result};
use lgp_program::Program;
use rand::Rng;
use tracing::{debug, instrument, trace};

/// Draws per point or segment search before crossover gives up
pub const MAXIMUM_CROSSOVER_ATTEMPTS: usize = 20;

/// Chooses one crossover point in each program
#[derive(Debug, Clone, Copy)]
pub struct CrossoverPointProvider {
    maximum_crossover_distance: usize,
}

impl CrossoverPointProvider {
    pub fn new(maximum_crossover_distance: usize) -> Self {
        Self {
            maximum_crossover_distance,
        }
    }

    /// Whether points `i1` (in the shorter program) and `i2` (in the longer)
    /// are close enough to exchange
    pub fn accepts(&self, i1: usize, i2: usize, shorter_length: usize) -> bool {
        let limit = shorter_length
            .saturating_sub(1)
            .min(self.maximum_crossover_distance);
        i1.abs_diff(i2) <= limit
    }

    /// Draw an acceptable pair of points, or `None` once the attempts run out
    pub fn draw<R: Rng>(
        &self,
        shorter_length: usize,
        longer_length: usize,
        rng: &mut R,
    ) -> Option<(usize, usize)> {
        (0..MAXIMUM_CROSSOVER_ATTEMPTS)
            .map(|_| (rng.gen_range(0..shorter_length), rng.gen_range(0..longer_length)))
            .find(|&(i1, i2)| self.accepts(i1, i2, shorter_length))
    }
}

/// Chooses the segment lengths exchanged at a pair of crossover points
#[derive(Debug, Clone, Copy)]
pub struct SegmentProvider {
    maximum_segment_length: usize,
    maximum_segment_length_difference: usize,
}

impl SegmentProvider {
    pub fn new(maximum_segment_length: usize, maximum_segment_length_difference: usize) -> Self {
        Self {
            maximum_segment_length,
            maximum_segment_length_difference,
        }
    }

    /// Segments must not grow from the first program to the second by more
    /// than the allowed difference, and the first is never the longer one
    pub fn accepts(&self, s1: usize, s2: usize) -> bool {
        s1 <= s2 && s2 - s1 <= self.maximum_segment_length_difference
    }

    /// Draw segment lengths starting at `i1` in a program of `length1` and at
    /// `i2` in a program of `length2`
    pub fn draw<R: Rng>(
        &self,
        (length1, i1): (usize, usize),
        (length2, i2): (usize, usize),
        rng: &mut R,
    ) -> Option<(usize, usize)> {
        let limit1 = (length1 - i1).min(self.maximum_segment_length);
        let limit2 = (length2 - i2).min(self.maximum_segment_length);

        (0..MAXIMUM_CROSSOVER_ATTEMPTS)
            .map(|_| (rng.gen_range(1..=limit1), rng.gen_range(1..=limit2)))
            .find(|&(s1, s2)| self.accepts(s1, s2))
    }
}

/// Two-point linear crossover after Brameier & Banzhaf.
///
/// A segment of the shorter parent is swapped with a segment of the longer
/// one; the windows start near each other and differ little in size, and
/// both children stay within the program length bounds.
#[derive(Debug, Clone)]
pub struct LinearCrossover {
    program_config: ProgramConfig,
    points: CrossoverPointProvider,
    segments: SegmentProvider,
}

impl LinearCrossover {
    pub fn new(config: CrossoverConfig, program_config: &ProgramConfig) -> Result<Self> {
        config.validate()?;
        program_config.validate()?;

        Ok(Self {
            program_config: program_config.clone(),
            points: CrossoverPointProvider::new(config.maximum_crossover_distance),
            segments: SegmentProvider::new(
                config.maximum_segment_length,
                config.maximum_segment_length_difference,
            ),
        })
    }

    /// Equalize the segments when the exchange would break a length bound.
    ///
    /// `s1 <= s2`, so the first program grows by `s2 - s1` and the second
    /// shrinks by the same amount.
    fn fit_segments(
        &self,
        (length1, i1, s1): (usize, usize, usize),
        (length2, s2): (usize, usize),
    ) -> (usize, usize) {
        let growth = s2 - s1;
        if self.program_config.admits_length(length1 + growth)
            && self.program_config.admits_length(length2 - growth)
        {
            return (s1, s2);
        }

        let segment = if i1 + s1 > length1 { length1 - i1 } else { s1 };
        (segment, segment)
    }
}

impl<T: Clone> RecombinationOperator<T> for LinearCrossover {
    #[instrument(skip_all, fields(mother = mother.len(), father = father.len()))]
    fn combine<R: Rng>(
        &self,
        mother: &mut Program<T>,
        father: &mut Program<T>,
        rng: &mut R,
    ) -> Result<()> {
        self.program_config.check_length(mother.len())?;
        self.program_config.check_length(father.len())?;

        let (first, second) = if mother.len() <= father.len() {
            (mother, father)
        } else {
            (father, mother)
        };
        let (length1, length2) = (first.len(), second.len());

        let Some((i1, i2)) = self.points.draw(length1, length2, rng) else {
            debug!("No crossover points found in {} attempts", MAXIMUM_CROSSOVER_ATTEMPTS);
            return Ok(());
        };

        let Some((s1, s2)) = self.segments.draw((length1, i1), (length2, i2), rng) else {
            debug!("No segment lengths found in {} attempts", MAXIMUM_CROSSOVER_ATTEMPTS);
            return Ok(());
        };

        let (s1, s2) = self.fit_segments((length1, i1, s1), (length2, s2));
        trace!(
            "Exchanging [{}, {}) with [{}, {})",
            i1,
            i1 + s1,
            i2,
            i2 + s2
        );

        let from_first = first.instructions[i1..i1 + s1].to_vec();
        let from_second: Vec<_> = second
            .instructions
            .splice(i2..i2 + s2, from_first)
            .collect();
        first.instructions.splice(i1..i1 + s1, from_second);

        first.find_effective_program();
        second.find_effective_program();
        Ok(())
    }
}
