//! Operations instructions can apply, and the catalogue they are drawn from.

use lgp_core::Arity;
use rand::Rng;
use std::fmt;
use std::sync::Arc;

/// A pure function over register values.
///
/// Branch operations return a value that is compared against the
/// program's sentinel; the instruction they guard only runs on a match.
pub trait Operation<T>: Send + Sync + fmt::Debug {
    /// Stable name, used for display and serialization
    fn name(&self) -> &str;

    fn arity(&self) -> Arity;

    /// Apply the operation to exactly `arity().count()` arguments
    fn execute(&self, arguments: &[T]) -> T;

    fn is_branch(&self) -> bool {
        false
    }
}

/// Shared handle to an operation
pub type OperationRef<T> = Arc<dyn Operation<T>>;

/// Ordered collection of the operations available to a run
#[derive(Debug, Clone)]
pub struct OperationCatalogue<T> {
    operations: Vec<OperationRef<T>>,
}

impl<T> OperationCatalogue<T> {
    pub fn new(operations: Vec<OperationRef<T>>) -> Self {
        Self { operations }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[OperationRef<T>] {
        &self.operations
    }

    pub fn get(&self, index: usize) -> Option<&OperationRef<T>> {
        self.operations.get(index)
    }

    /// Look up an operation by name
    pub fn find(&self, name: &str) -> Option<&OperationRef<T>> {
        self.operations.iter().find(|operation| operation.name() == name)
    }

    /// Uniformly choose an operation, irrespective of arity
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&OperationRef<T>> {
        if self.operations.is_empty() {
            return None;
        }
        self.operations.get(rng.gen_range(0..self.operations.len()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationRef<T>> {
        self.operations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{Addition, IfGreater, Sine};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn catalogue() -> OperationCatalogue<f64> {
        OperationCatalogue::new(vec![
            Arc::new(Addition) as OperationRef<f64>,
            Arc::new(Sine),
            Arc::new(IfGreater::default()),
        ])
    }

    #[test]
    fn test_find_by_name() {
        let catalogue = catalogue();
        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.find("sin").unwrap().arity(), Arity::Unary);
        assert!(catalogue.find("if_gt").unwrap().is_branch());
        assert!(catalogue.find("tan").is_none());
    }

    #[test]
    fn test_choose_covers_catalogue() {
        let catalogue = catalogue();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(catalogue.choose(&mut rng).unwrap().name().to_string());
        }
        assert_eq!(seen.len(), 3);

        let empty: OperationCatalogue<f64> = OperationCatalogue::new(Vec::new());
        assert!(empty.choose(&mut rng).is_none());
    }

    #[test]
    fn test_choose_with_trait_object_rng() {
        let catalogue = catalogue();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let rng: &mut dyn RngCore = &mut rng;

        assert!(catalogue.choose(rng).is_some());
    }
}
