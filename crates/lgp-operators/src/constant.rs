//! Policies for perturbing constant register values.

use lgp_core::{Error, Result};
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

/// Maps a constant's current value to its mutated value
pub trait ConstantMutationFunction<T>: Send + Sync {
    fn mutate(&self, value: &T, rng: &mut dyn RngCore) -> T;
}

/// Leaves constants unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T: Clone> ConstantMutationFunction<T> for Identity {
    fn mutate(&self, value: &T, _rng: &mut dyn RngCore) -> T {
        value.clone()
    }
}

/// Adds normally distributed noise with standard deviation `sigma`
#[derive(Debug, Clone, Copy)]
pub struct GaussianNoise {
    sigma: f64,
}

impl GaussianNoise {
    pub fn new(sigma: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "noise standard deviation must be finite and non-negative, got {}",
                sigma
            )));
        }
        Ok(Self { sigma })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self { sigma: 1.0 }
    }
}

impl ConstantMutationFunction<f64> for GaussianNoise {
    fn mutate(&self, value: &f64, rng: &mut dyn RngCore) -> f64 {
        let noise: f64 = StandardNormal.sample(rng);
        value + noise * self.sigma
    }
}
