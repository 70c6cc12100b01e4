//! Narrowing the repository down to the contracts a user selected.

pub mod engine;
pub mod selection;
