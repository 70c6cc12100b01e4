//! Foundational types: contracts, parties, the repository and its cache,
//! currency formatting and the error taxonomy.

pub mod cache;
pub mod contract;
pub mod currency;
pub mod error;
pub mod party;
pub mod repository;
