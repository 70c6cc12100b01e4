use crate::core::contract::ContractRecord;
use crate::core::repository::ContractRepository;
use crate::filter::selection::FilterSelection;
use log::debug;
use rust_decimal::Decimal;

/// The contracts that passed a [`FilterSelection`], in repository order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    records: Vec<&'a ContractRecord>,
}

impl<'a> FilteredView<'a> {
    /// A view over an arbitrary sequence of records. Records should come
    /// from a [`ContractRepository`], which bounds every amount so the
    /// view's sums cannot overflow.
    pub fn from_records(records: impl IntoIterator<Item = &'a ContractRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    pub fn records(&self) -> &[&'a ContractRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ContractRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_amount(&self) -> Decimal {
        self.iter().map(|r| r.total_amount()).sum()
    }
}

/// Evaluates a selection against a repository.
///
/// A record passes when its partner and contract type are selected, its
/// lender is selected (only if the repository has lenders at all), and its
/// contract year is known and selected (only if the repository has years at
/// all). A missing lender or unknown year never matches an active dimension.
pub struct FilterEngine;

impl FilterEngine {
    /// Single order-preserving pass over the repository.
    ///
    /// # Examples
    ///
    /// ```
    /// use debt_portfolio::core::repository::ContractRepository;
    /// use debt_portfolio::filter::engine::FilterEngine;
    /// use debt_portfolio::filter::selection::FilterSelection;
    /// use serde_json::json;
    ///
    /// let repo = ContractRepository::from_records(&[
    ///     json!({ "socioResponsavel": "Ana", "tipoContrato": "Custeio",
    ///             "valorTotal": 10, "dataContratacao": "2021-02-01" }),
    ///     json!({ "socioResponsavel": "Ana", "tipoContrato": "Custeio",
    ///             "valorTotal": 20, "dataContratacao": "2022-02-01" }),
    /// ]);
    ///
    /// let selection = FilterSelection::all(&repo).with_years([2022]);
    /// let view = FilterEngine::apply(&repo, &selection);
    /// assert_eq!(view.len(), 1);
    /// ```
    pub fn apply<'a>(repo: &'a ContractRepository, selection: &FilterSelection) -> FilteredView<'a> {
        let lender_active = repo.has_lender_dimension();
        let year_active = repo.has_year_dimension();

        let records: Vec<&ContractRecord> = repo
            .records()
            .iter()
            .filter(|r| Self::matches(r, selection, lender_active, year_active))
            .collect();

        debug!(
            "filter kept {} of {} contracts (lender filter: {}, year filter: {})",
            records.len(),
            repo.len(),
            lender_active,
            year_active
        );

        FilteredView { records }
    }

    fn matches(
        record: &ContractRecord,
        selection: &FilterSelection,
        lender_active: bool,
        year_active: bool,
    ) -> bool {
        if !selection.partners.contains(record.partner()) {
            return false;
        }
        if !selection.contract_types.contains(record.contract_type()) {
            return false;
        }
        if lender_active {
            match record.lender() {
                Some(lender) if selection.lenders.contains(lender) => {}
                _ => return false,
            }
        }
        if year_active {
            match record.contract_year() {
                Some(year) if selection.years.contains(&year) => {}
                _ => return false,
            }
        }
        true
    }
}
