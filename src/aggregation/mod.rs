//! Pure reductions over a filtered view: per-partner and per-lender totals,
//! the grand total, and the debt-over-time series.

pub mod consolidation;
pub mod time_series;
