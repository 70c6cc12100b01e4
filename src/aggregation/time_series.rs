use crate::filter::engine::FilteredView;
use chrono::Datelike;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Calendar month names used as labels in month granularity.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// How the series is bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "year", rename_all = "snake_case")]
pub enum Granularity {
    Year,
    /// Months of the single selected year.
    Month(i32),
}

impl Granularity {
    /// Exactly one selected year switches to months; zero or several
    /// stay on years.
    pub fn for_selected_years(selected_years: &BTreeSet<i32>) -> Self {
        match selected_years.len() {
            1 => selected_years
                .iter()
                .next()
                .map(|&y| Granularity::Month(y))
                .unwrap_or(Granularity::Year),
            _ => Granularity::Year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub total: Decimal,
    pub contract_count: usize,
}

/// Debt over time, ready for a line or bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub granularity: Granularity,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.points.iter().map(|p| p.total).sum()
    }
}

/// Bucket the view's debt by contract date.
///
/// Contracts without a known contract date cannot be bucketed and are left
/// out. Empty buckets are omitted. In month granularity only contracts
/// dated within the selected year count.
///
/// # Examples
///
/// ```
/// use debt_portfolio::aggregation::time_series::{time_series, Granularity};
/// use debt_portfolio::core::contract::{ContractRecord, DateField};
/// use debt_portfolio::core::party::PartnerId;
/// use debt_portfolio::filter::engine::FilteredView;
/// use rust_decimal_macros::dec;
/// use std::collections::BTreeSet;
///
/// let records = vec![
///     ContractRecord::new(PartnerId::new("Ana"), "Custeio", dec!(10))
///         .with_contract_date(DateField::parse("2022-03-01")),
///     ContractRecord::new(PartnerId::new("Ana"), "Custeio", dec!(5))
///         .with_contract_date(DateField::parse("2022-01-20")),
/// ];
/// let view = FilteredView::from_records(&records);
///
/// let series = time_series(&view, &BTreeSet::from([2022]));
/// assert_eq!(series.granularity, Granularity::Month(2022));
/// assert_eq!(series.points[0].label, "Janeiro");
/// assert_eq!(series.points[1].label, "Março");
/// ```
pub fn time_series(view: &FilteredView<'_>, selected_years: &BTreeSet<i32>) -> TimeSeries {
    let granularity = Granularity::for_selected_years(selected_years);
    let mut buckets: BTreeMap<i32, (Decimal, usize)> = BTreeMap::new();

    for record in view.iter() {
        let Some(date) = record.contract_date().date() else {
            continue;
        };
        let key = match granularity {
            Granularity::Year => date.year(),
            Granularity::Month(year) if date.year() == year => date.month0() as i32,
            Granularity::Month(_) => continue,
        };
        let bucket = buckets.entry(key).or_insert((Decimal::ZERO, 0));
        bucket.0 += record.total_amount();
        bucket.1 += 1;
    }

    debug!("time series {:?} with {} buckets", granularity, buckets.len());

    let points = buckets
        .into_iter()
        .map(|(key, (total, contract_count))| SeriesPoint {
            label: match granularity {
                Granularity::Year => key.to_string(),
                Granularity::Month(_) => MONTH_NAMES[key as usize].to_string(),
            },
            total,
            contract_count,
        })
        .collect();

    TimeSeries {
        granularity,
        points,
    }
}
