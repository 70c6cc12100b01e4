use crate::core::party::{LenderId, PartnerId};
use crate::core::repository::ContractRepository;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The values currently chosen for each filterable dimension.
///
/// An empty set lets nothing through for that dimension. Dimensions the
/// repository does not have (lenders, years) are ignored by the filter
/// regardless of what their sets hold.
///
/// # Examples
///
/// ```
/// use debt_portfolio::core::party::PartnerId;
/// use debt_portfolio::core::repository::ContractRepository;
/// use debt_portfolio::filter::selection::FilterSelection;
/// use serde_json::json;
///
/// let repo = ContractRepository::from_records(&[
///     json!({ "socioResponsavel": "Ana", "tipoContrato": "Custeio", "valorTotal": 10 }),
///     json!({ "socioResponsavel": "Bia", "tipoContrato": "Custeio", "valorTotal": 20 }),
/// ]);
///
/// let selection = FilterSelection::all(&repo).with_partners([PartnerId::new("Bia")]);
/// assert_eq!(selection.partners.len(), 1);
/// assert_eq!(selection.contract_types.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub partners: BTreeSet<PartnerId>,
    pub lenders: BTreeSet<LenderId>,
    pub contract_types: BTreeSet<String>,
    pub years: BTreeSet<i32>,
}

impl FilterSelection {
    /// Nothing selected in any dimension.
    pub fn none() -> Self {
        Self::default()
    }

    /// Every distinct value of the repository selected.
    pub fn all(repo: &ContractRepository) -> Self {
        Self {
            partners: repo.partners().into_iter().collect(),
            lenders: repo.lenders().into_iter().collect(),
            contract_types: repo.contract_types().into_iter().collect(),
            years: repo.years().into_iter().collect(),
        }
    }

    pub fn with_partners(mut self, partners: impl IntoIterator<Item = PartnerId>) -> Self {
        self.partners = partners.into_iter().collect();
        self
    }

    pub fn with_lenders(mut self, lenders: impl IntoIterator<Item = LenderId>) -> Self {
        self.lenders = lenders.into_iter().collect();
        self
    }

    pub fn with_contract_types<S: Into<String>>(
        mut self,
        contract_types: impl IntoIterator<Item = S>,
    ) -> Self {
        self.contract_types = contract_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years = years.into_iter().collect();
        self
    }

    /// Drop every selected value the repository does not contain.
    pub fn restrict_to(mut self, repo: &ContractRepository) -> Self {
        retain_known(&mut self.partners, &repo.partners(), "partner");
        retain_known(&mut self.lenders, &repo.lenders(), "lender");
        retain_known(&mut self.contract_types, &repo.contract_types(), "contract type");
        retain_known(&mut self.years, &repo.years(), "year");
        self
    }

    /// Whether every selected value exists in the repository.
    pub fn is_subset_of(&self, repo: &ContractRepository) -> bool {
        is_known(&self.partners, &repo.partners())
            && is_known(&self.lenders, &repo.lenders())
            && is_known(&self.contract_types, &repo.contract_types())
            && is_known(&self.years, &repo.years())
    }
}

fn retain_known<T: Ord + std::fmt::Debug>(selected: &mut BTreeSet<T>, known: &[T], dimension: &str) {
    selected.retain(|value| {
        let present = known.binary_search(value).is_ok();
        if !present {
            warn!("ignoring unknown {} {:?} in selection", dimension, value);
        }
        present
    });
}

fn is_known<T: Ord>(selected: &BTreeSet<T>, known: &[T]) -> bool {
    selected.iter().all(|v| known.binary_search(v).is_ok())
}
