//! Core types and utilities for the LGP-Evo linear genetic programming engine.

pub mod types;
pub mod config;
pub mod error;
pub mod rng;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
