//! Synthetic data generation.

pub mod portfolio;
