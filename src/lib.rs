//! # debt-portfolio
//!
//! Filtering, grouping and aggregation engine for a portfolio of debt
//! contracts.
//!
//! A JSON document of contracts is parsed once into an immutable
//! repository. Each user selection is applied to it to produce a filtered
//! view, from which the consolidated per-partner table, the per-lender
//! totals, the grand total and the debt-over-time series are recomputed.
//!
//! ## Architecture
//!
//! - **core** — Contracts, partners and lenders, the repository and its
//!   per-path cache, currency formatting, errors
//! - **filter** — Filter selections and the filter engine
//! - **aggregation** — Per-partner/per-lender totals and the time series
//! - **report** — One owned snapshot of everything a dashboard renders
//! - **simulation** — Random portfolios for benchmarks and testing

pub mod aggregation;
pub mod core;
pub mod filter;
pub mod report;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::aggregation::consolidation::{
        consolidate_by_partner, grand_total, total_by_lender, ConsolidatedRow,
    };
    pub use crate::aggregation::time_series::{time_series, Granularity, SeriesPoint, TimeSeries};
    pub use crate::core::cache::RepositoryCache;
    pub use crate::core::contract::{ContractRecord, DateField};
    pub use crate::core::currency::{CurrencyFormatter, LocaleConvention, MonetaryLocale};
    pub use crate::core::error::{LoadError, RecordShapeError};
    pub use crate::core::party::{LenderId, PartnerId};
    pub use crate::core::repository::ContractRepository;
    pub use crate::filter::engine::{FilterEngine, FilteredView};
    pub use crate::filter::selection::FilterSelection;
    pub use crate::report::DashboardReport;
}
