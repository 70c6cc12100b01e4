//! Everything the dashboard renders for one selection, as plain owned data.

use crate::aggregation::consolidation::{
    consolidate_by_partner, grand_total, total_by_lender, ConsolidatedRow,
};
use crate::aggregation::time_series::{time_series, Granularity, TimeSeries};
use crate::core::contract::ContractRecord;
use crate::core::currency::CurrencyFormatter;
use crate::core::party::LenderId;
use crate::core::repository::ContractRepository;
use crate::filter::engine::FilterEngine;
use crate::filter::selection::FilterSelection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A consolidated row together with its formatted total.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedLine {
    #[serde(flatten)]
    pub row: ConsolidatedRow,
    pub total_display: String,
}

/// One line of the detail table.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub partner: String,
    pub lender: Option<String>,
    pub contract_type: String,
    pub contract_number: String,
    pub total_amount: Decimal,
    pub amount_display: String,
    pub contract_date: String,
    pub due_date: String,
    pub contract_year: Option<i32>,
    pub duration_years: Option<Decimal>,
}

impl DetailRow {
    fn from_record(record: &ContractRecord, formatter: &CurrencyFormatter) -> Self {
        Self {
            partner: record.partner().to_string(),
            lender: record.lender().map(|l| l.to_string()),
            contract_type: record.contract_type().to_string(),
            contract_number: record.contract_number().to_string(),
            total_amount: record.total_amount(),
            amount_display: formatter.format(record.total_amount()),
            contract_date: record.contract_date().to_string(),
            due_date: record.due_date().to_string(),
            contract_year: record.contract_year(),
            duration_years: record.duration_years(),
        }
    }
}

/// Snapshot of the dashboard for one selection.
///
/// Built from scratch on every selection change. An empty report means
/// "no data for the current filters", not an error.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub client_name: String,
    pub loaded_count: usize,
    pub skipped_count: usize,
    pub consolidated: Vec<ConsolidatedLine>,
    pub details: Vec<DetailRow>,
    pub grand_total: Decimal,
    pub grand_total_display: String,
    pub lender_totals: BTreeMap<LenderId, Decimal>,
    pub lender_totals_display: BTreeMap<LenderId, String>,
    pub time_series: TimeSeries,
    /// Formatted total of each series point, in point order.
    pub time_series_display: Vec<String>,
}

impl DashboardReport {
    /// Filter once, then run every aggregation over the same view.
    pub fn build(
        repo: &ContractRepository,
        selection: &FilterSelection,
        formatter: &CurrencyFormatter,
    ) -> Self {
        let view = FilterEngine::apply(repo, selection);
        let total = grand_total(&view);

        let lender_totals = total_by_lender(&view);
        let series = time_series(&view, &selection.years);

        let consolidated = consolidate_by_partner(&view)
            .into_iter()
            .map(|row| ConsolidatedLine {
                total_display: formatter.format(row.total_amount),
                row,
            })
            .collect();

        Self {
            client_name: repo.client_name().to_string(),
            loaded_count: repo.len(),
            skipped_count: repo.skipped_count(),
            consolidated,
            details: view
                .iter()
                .map(|r| DetailRow::from_record(r, formatter))
                .collect(),
            grand_total: total,
            grand_total_display: formatter.format(total),
            lender_totals_display: lender_totals
                .iter()
                .map(|(lender, amount)| (lender.clone(), formatter.format(*amount)))
                .collect(),
            lender_totals,
            time_series_display: series
                .points
                .iter()
                .map(|point| formatter.format(point.total))
                .collect(),
            time_series: series,
        }
    }

    /// No contract passed the filters.
    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dashboard de Gestão de Endividamento ===")?;
        writeln!(f, "Cliente: {}", self.client_name)?;
        if self.skipped_count > 0 {
            writeln!(
                f,
                "Aviso: {} contrato(s) ignorado(s) por dados incompletos",
                self.skipped_count
            )?;
        }

        if self.is_empty() {
            writeln!(f, "\nNenhum dado encontrado com os filtros selecionados.")?;
            return Ok(());
        }

        writeln!(f, "\n--- Consolidado de Contratos ---")?;
        for line in &self.consolidated {
            writeln!(
                f,
                "  {:<30} {:>4} contrato(s)  {}",
                line.row.partner.as_str(), line.row.contract_count, line.total_display
            )?;
        }

        writeln!(f, "\n--- Contratos ---")?;
        for d in &self.details {
            writeln!(
                f,
                "  {} | {} | {} | {} | {} | {} -> {}",
                d.partner,
                d.lender.as_deref().unwrap_or("-"),
                d.contract_type,
                d.contract_number,
                d.amount_display,
                d.contract_date,
                d.due_date
            )?;
        }

        writeln!(f, "\n--- Resumo ---")?;
        writeln!(f, "Total da Dívida: {}", self.grand_total_display)?;

        if !self.lender_totals.is_empty() {
            writeln!(f, "\n--- Dívida por Banco ---")?;
            for (lender, amount) in &self.lender_totals_display {
                writeln!(f, "  {:<30} {}", lender.as_str(), amount)?;
            }
        }

        if !self.time_series.is_empty() {
            match self.time_series.granularity {
                Granularity::Year => writeln!(f, "\n--- Dívida por Ano ---")?,
                Granularity::Month(year) => writeln!(f, "\n--- Dívida por Mês ({}) ---", year)?,
            }
            for (point, total) in self.time_series.points.iter().zip(&self.time_series_display) {
                writeln!(
                    f,
                    "  {:<12} {:>4} contrato(s)  {}",
                    point.label, point.contract_count, total
                )?;
            }
        }
        Ok(())
    }
}
