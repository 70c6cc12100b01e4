use crate::core::party::{LenderId, PartnerId};
use crate::filter::engine::FilteredView;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One line of the consolidated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    pub partner: PartnerId,
    pub contract_count: usize,
    pub total_amount: Decimal,
}

/// Count and total per partner, ascending by partner name.
///
/// Only partners with at least one contract in the view appear.
///
/// # Examples
///
/// ```
/// use debt_portfolio::aggregation::consolidation::consolidate_by_partner;
/// use debt_portfolio::core::contract::ContractRecord;
/// use debt_portfolio::core::party::PartnerId;
/// use debt_portfolio::filter::engine::FilteredView;
/// use rust_decimal_macros::dec;
///
/// let records = vec![
///     ContractRecord::new(PartnerId::new("Bia"), "Custeio", dec!(10)),
///     ContractRecord::new(PartnerId::new("Ana"), "Custeio", dec!(5)),
///     ContractRecord::new(PartnerId::new("Bia"), "Custeio", dec!(7)),
/// ];
/// let rows = consolidate_by_partner(&FilteredView::from_records(&records));
///
/// assert_eq!(rows[0].partner.as_str(), "Ana");
/// assert_eq!(rows[1].contract_count, 2);
/// assert_eq!(rows[1].total_amount, dec!(17));
/// ```
pub fn consolidate_by_partner(view: &FilteredView<'_>) -> Vec<ConsolidatedRow> {
    let mut groups: BTreeMap<&PartnerId, (usize, Decimal)> = BTreeMap::new();
    for record in view.iter() {
        let entry = groups
            .entry(record.partner())
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += record.total_amount();
    }

    debug!("consolidated {} contracts into {} partners", view.len(), groups.len());

    groups
        .into_iter()
        .map(|(partner, (contract_count, total_amount))| ConsolidatedRow {
            partner: partner.clone(),
            contract_count,
            total_amount,
        })
        .collect()
}

/// Debt per lender, ascending by lender name.
///
/// Contracts without a lender are left out, so the map is empty when no
/// contract in the view names one.
pub fn total_by_lender(view: &FilteredView<'_>) -> BTreeMap<LenderId, Decimal> {
    let mut totals: BTreeMap<LenderId, Decimal> = BTreeMap::new();
    for record in view.iter() {
        if let Some(lender) = record.lender() {
            *totals.entry(lender.clone()).or_insert(Decimal::ZERO) += record.total_amount();
        }
    }
    totals
}

/// Sum of every contract in the view; zero when empty.
pub fn grand_total(view: &FilteredView<'_>) -> Decimal {
    view.total_amount()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contract::ContractRecord;
    use rust_decimal_macros::dec;

    fn records() -> Vec<ContractRecord> {
        vec![
            ContractRecord::new(PartnerId::new("Caio"), "Custeio", dec!(100))
                .with_lender(LenderId::new("Itaú")),
            ContractRecord::new(PartnerId::new("Ana"), "Custeio", dec!(250.50))
                .with_lender(LenderId::new("Bradesco")),
            ContractRecord::new(PartnerId::new("Caio"), "Investimento", dec!(50))
                .with_lender(LenderId::new("Itaú")),
            ContractRecord::new(PartnerId::new("Ana"), "Custeio", dec!(10)),
        ]
    }

    #[test]
    fn test_consolidation_sorted_and_summed() {
        let records = records();
        let rows = consolidate_by_partner(&FilteredView::from_records(&records));
        assert_eq!(
            rows,
            vec![
                ConsolidatedRow {
                    partner: PartnerId::new("Ana"),
                    contract_count: 2,
                    total_amount: dec!(260.50),
                },
                ConsolidatedRow {
                    partner: PartnerId::new("Caio"),
                    contract_count: 2,
                    total_amount: dec!(150),
                },
            ]
        );
    }

    #[test]
    fn test_consolidation_independent_of_input_order() {
        let mut records = records();
        let forward = consolidate_by_partner(&FilteredView::from_records(&records));
        records.reverse();
        let backward = consolidate_by_partner(&FilteredView::from_records(&records));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_lender_totals_skip_missing_lender() {
        let records = records();
        let view = FilteredView::from_records(&records);
        let totals = total_by_lender(&view);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&LenderId::new("Itaú")], dec!(150));
        assert_eq!(totals[&LenderId::new("Bradesco")], dec!(250.50));

        let lender_sum: Decimal = totals.values().copied().sum();
        assert!(lender_sum < grand_total(&view));
    }

    #[test]
    fn test_grand_total() {
        let records = records();
        assert_eq!(grand_total(&FilteredView::from_records(&records)), dec!(410.50));
    }

    #[test]
    fn test_empty_view() {
        let view = FilteredView::from_records(Vec::new());
        assert!(consolidate_by_partner(&view).is_empty());
        assert!(total_by_lender(&view).is_empty());
        assert_eq!(grand_total(&view), Decimal::ZERO);
    }
}
