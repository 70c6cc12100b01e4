use serde::{Deserialize, Serialize};
use std::fmt;

/// The partner (sócio) responsible for a contract.
///
/// Partners are the primary grouping key of the portfolio: the consolidated
/// table has exactly one row per partner present in the filtered view.
///
/// # Examples
///
/// ```
/// use debt_portfolio::core::party::PartnerId;
///
/// let joao = PartnerId::new("João Silva");
/// let maria = PartnerId::new("Maria Souza");
/// assert!(joao < maria);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(String);

impl PartnerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the partner name as written in the source data.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The lending institution (banco) of a contract.
///
/// Lenders are an optional dimension: a dataset where no contract names a
/// bank has no lender filter and no lender chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LenderId(String);

impl LenderId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LenderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
