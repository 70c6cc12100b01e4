//! Random contract portfolios for benchmarks and manual testing.

use rand::Rng;
use rust_decimal::Decimal;
use serde_json::{json, Value};

/// Configuration for generating a random portfolio document.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub client_name: String,
    pub contract_count: usize,
    pub partners: Vec<String>,
    pub lenders: Vec<String>,
    pub contract_types: Vec<String>,
    /// Inclusive range of contract years.
    pub first_year: i32,
    pub last_year: i32,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    /// Share of contracts written without a lender, 0.0 to 1.0.
    pub missing_lender_ratio: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            client_name: "Fazenda Modelo".to_string(),
            contract_count: 50,
            partners: vec!["Ana Costa".into(), "Bruno Lima".into(), "Carla Dias".into()],
            lenders: vec![
                "Banco do Brasil".into(),
                "Bradesco".into(),
                "Itaú".into(),
                "Sicredi".into(),
            ],
            contract_types: vec!["Custeio".into(), "Investimento".into(), "CPR".into()],
            first_year: 2019,
            last_year: 2024,
            min_amount: Decimal::from(10_000),
            max_amount: Decimal::from(2_000_000),
            missing_lender_ratio: 0.0,
        }
    }
}

/// Generate a source document in the same shape the loader reads.
pub fn generate_random_portfolio(config: &PortfolioConfig) -> Value {
    let mut rng = rand::thread_rng();

    let min_f64: f64 = config.min_amount.to_string().parse().unwrap_or(10_000.0);
    let max_f64: f64 = config.max_amount.to_string().parse().unwrap_or(2_000_000.0);

    let contracts: Vec<Value> = (0..config.contract_count)
        .map(|i| {
            let year = rng.gen_range(config.first_year..=config.last_year);
            let month = rng.gen_range(1..=12);
            let day = rng.gen_range(1..=28);
            let term = rng.gen_range(1..=10);
            let amount = Decimal::from_f64_retain(rng.gen_range(min_f64..=max_f64))
                .unwrap_or(config.min_amount)
                .round_dp(2);

            let mut contract = json!({
                "socioResponsavel": pick(&mut rng, &config.partners),
                "tipoContrato": pick(&mut rng, &config.contract_types),
                "numeroContrato": format!("CT-{:05}", i + 1),
                "valorTotal": amount.to_string().parse::<f64>().unwrap_or(min_f64),
                "dataContratacao": format!("{:04}-{:02}-{:02}", year, month, day),
                "vencimentoContrato": format!("{:04}-{:02}-{:02}", year + term, month, day),
            });
            if !config.lenders.is_empty() && !rng.gen_bool(config.missing_lender_ratio.clamp(0.0, 1.0)) {
                contract["banco"] = json!(pick(&mut rng, &config.lenders));
            }
            contract
        })
        .collect();

    json!({
        "cliente": { "nomeEmpresa": config.client_name },
        "contratos": contracts,
    })
}

fn pick<'a>(rng: &mut impl Rng, values: &'a [String]) -> &'a str {
    if values.is_empty() {
        return "";
    }
    &values[rng.gen_range(0..values.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repository::ContractRepository;

    #[test]
    fn test_generated_portfolio_loads_cleanly() {
        let config = PortfolioConfig {
            contract_count: 40,
            ..Default::default()
        };
        let document = generate_random_portfolio(&config);
        let repo = ContractRepository::from_document(&document).unwrap();

        assert_eq!(repo.len(), 40);
        assert_eq!(repo.skipped_count(), 0);
        assert_eq!(repo.client_name(), "Fazenda Modelo");
        assert!(repo.has_lender_dimension());
        assert!(repo
            .years()
            .iter()
            .all(|y| (config.first_year..=config.last_year).contains(y)));
        assert!(repo.records().iter().all(|r| r.duration_years().is_some()));
    }

    #[test]
    fn test_missing_lenders() {
        let config = PortfolioConfig {
            contract_count: 10,
            missing_lender_ratio: 1.0,
            ..Default::default()
        };
        let repo = ContractRepository::from_document(&generate_random_portfolio(&config)).unwrap();
        assert!(!repo.has_lender_dimension());
    }
}
