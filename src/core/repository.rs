use crate::core::contract::{ContractRecord, DateField};
use crate::core::error::{LoadError, RecordShapeError, Result};
use crate::core::party::{LenderId, PartnerId};
use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Shown when the document carries no `cliente.nomeEmpresa`.
pub const UNDEFINED_CLIENT: &str = "Cliente não definido";

/// Largest accepted contract amount, in absolute value. Keeps every sum over
/// a repository far below `Decimal::MAX`.
pub const MAX_CONTRACT_AMOUNT: Decimal = dec!(1_000_000_000_000_000);

// Source document keys.
const KEY_CLIENT: &str = "cliente";
const KEY_COMPANY_NAME: &str = "nomeEmpresa";
const KEY_CONTRACTS: &str = "contratos";
const KEY_PARTNER: &str = "socioResponsavel";
const KEY_LENDER: &str = "banco";
const KEY_CONTRACT_TYPE: &str = "tipoContrato";
const KEY_CONTRACT_NUMBER: &str = "numeroContrato";
const KEY_TOTAL_AMOUNT: &str = "valorTotal";
const KEY_CONTRACT_DATE: &str = "dataContratacao";
const KEY_DUE_DATE: &str = "vencimentoContrato";

/// A raw record that could not become a [`ContractRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

impl From<RecordShapeError> for SkippedRecord {
    fn from(err: RecordShapeError) -> Self {
        Self {
            index: err.index(),
            reason: err.to_string(),
        }
    }
}

/// The normalized, immutable set of contracts from one source document.
///
/// Built once per load. Everything downstream borrows from it; nothing
/// mutates it.
///
/// # Examples
///
/// ```
/// use debt_portfolio::core::repository::ContractRepository;
/// use serde_json::json;
///
/// let repo = ContractRepository::from_document(&json!({
///     "cliente": { "nomeEmpresa": "Fazenda Boa Vista" },
///     "contratos": [
///         { "socioResponsavel": "Ana", "tipoContrato": "Custeio", "valorTotal": 1000 },
///         { "socioResponsavel": "Ana", "tipoContrato": "Custeio" }
///     ]
/// })).unwrap();
///
/// assert_eq!(repo.client_name(), "Fazenda Boa Vista");
/// assert_eq!(repo.len(), 1);
/// assert_eq!(repo.skipped_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContractRepository {
    client_name: Option<String>,
    records: Vec<ContractRecord>,
    skipped: Vec<SkippedRecord>,
}

impl ContractRepository {
    /// An empty repository, used when the source cannot be loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a whole document: `{ "cliente": {...}, "contratos": [...] }`.
    pub fn from_document(document: &Value) -> Result<Self> {
        let root = document.as_object().ok_or_else(|| {
            LoadError::MalformedDocument("top-level value is not an object".to_string())
        })?;
        let contracts = root
            .get(KEY_CONTRACTS)
            .ok_or_else(|| LoadError::MalformedDocument(format!("missing '{}' key", KEY_CONTRACTS)))?
            .as_array()
            .ok_or_else(|| {
                LoadError::MalformedDocument(format!("'{}' is not an array", KEY_CONTRACTS))
            })?;

        let client_name = root
            .get(KEY_CLIENT)
            .and_then(|c| c.get(KEY_COMPANY_NAME))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut repo = Self::from_records(contracts);
        repo.client_name = client_name;
        Ok(repo)
    }

    /// Parse a JSON string holding a whole document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_document(&document)
    }

    /// Parse raw contract objects. Malformed records are skipped and kept
    /// in [`skipped`](Self::skipped) with the reason.
    pub fn from_records(raw: &[Value]) -> Self {
        let mut records = Vec::with_capacity(raw.len());
        let mut skipped = Vec::new();

        for (index, value) in raw.iter().enumerate() {
            match parse_record(index, value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("skipping contract: {}", e);
                    skipped.push(SkippedRecord::from(e));
                }
            }
        }

        info!(
            "loaded {} contracts ({} skipped)",
            records.len(),
            skipped.len()
        );

        Self {
            client_name: None,
            records,
            skipped,
        }
    }

    /// Build directly from already-typed records. Records whose amount
    /// exceeds [`MAX_CONTRACT_AMOUNT`] are skipped like malformed input.
    pub fn from_contracts(contracts: Vec<ContractRecord>) -> Self {
        let mut records = Vec::with_capacity(contracts.len());
        let mut skipped = Vec::new();

        for (index, record) in contracts.into_iter().enumerate() {
            match check_amount(index, record.total_amount()) {
                Ok(_) => records.push(record),
                Err(e) => {
                    warn!("skipping contract: {}", e);
                    skipped.push(SkippedRecord::from(e));
                }
            }
        }

        Self {
            client_name: None,
            records,
            skipped,
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    // --- Accessors ---

    /// Company name passthrough, for display only.
    pub fn client_name(&self) -> &str {
        self.client_name.as_deref().unwrap_or(UNDEFINED_CLIENT)
    }

    /// Records in source order.
    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Sum of every loaded contract, ignoring filters.
    pub fn gross_total(&self) -> Decimal {
        self.records.iter().map(|r| r.total_amount()).sum()
    }

    // --- Dimensions ---

    /// Distinct partners, ascending.
    pub fn partners(&self) -> Vec<PartnerId> {
        distinct(self.records.iter().map(|r| r.partner().clone()))
    }

    /// Distinct lenders, ascending. Empty when the dimension is absent.
    pub fn lenders(&self) -> Vec<LenderId> {
        distinct(self.records.iter().filter_map(|r| r.lender().cloned()))
    }

    pub fn contract_types(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.contract_type().to_string()))
    }

    /// Distinct known contract years, ascending.
    pub fn years(&self) -> Vec<i32> {
        distinct(self.records.iter().filter_map(|r| r.contract_year()))
    }

    /// Whether at least one record names a lender.
    pub fn has_lender_dimension(&self) -> bool {
        self.records.iter().any(|r| r.lender().is_some())
    }

    /// Whether at least one record has a known contract year.
    pub fn has_year_dimension(&self) -> bool {
        self.records.iter().any(|r| r.contract_year().is_some())
    }
}

fn distinct<T: Ord>(values: impl Iterator<Item = T>) -> Vec<T> {
    values.collect::<BTreeSet<_>>().into_iter().collect()
}

fn parse_record(index: usize, value: &Value) -> std::result::Result<ContractRecord, RecordShapeError> {
    let obj = value
        .as_object()
        .ok_or(RecordShapeError::NotAnObject { index })?;

    let partner = required_str(obj, index, KEY_PARTNER)?;
    let contract_type = required_str(obj, index, KEY_CONTRACT_TYPE)?;
    let total_amount = parse_amount(obj, index)?;

    let mut record = ContractRecord::new(PartnerId::new(partner), contract_type, total_amount)
        .with_contract_date(date_field(obj, KEY_CONTRACT_DATE))
        .with_due_date(date_field(obj, KEY_DUE_DATE));

    if let Some(lender) = optional_str(obj, KEY_LENDER) {
        record = record.with_lender(LenderId::new(lender));
    }
    if let Some(number) = optional_text(obj, KEY_CONTRACT_NUMBER) {
        record = record.with_contract_number(number);
    }
    Ok(record)
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    index: usize,
    field: &'static str,
) -> std::result::Result<&'a str, RecordShapeError> {
    optional_str(obj, field).ok_or(RecordShapeError::MissingField { index, field })
}

fn optional_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    obj.get(field).and_then(Value::as_str)
}

/// Contract numbers are sometimes written as JSON numbers.
fn optional_text(obj: &Map<String, Value>, field: &str) -> Option<String> {
    match obj.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_amount(obj: &Map<String, Value>, index: usize) -> std::result::Result<Decimal, RecordShapeError> {
    let value = match obj.get(KEY_TOTAL_AMOUNT) {
        None | Some(Value::Null) => {
            return Err(RecordShapeError::MissingField {
                index,
                field: KEY_TOTAL_AMOUNT,
            })
        }
        Some(value) => value,
    };
    let parsed = match value {
        Value::Number(n) => decimal_from_str(&n.to_string()),
        Value::String(s) => decimal_from_str(s.trim()),
        _ => None,
    };
    let amount = parsed.ok_or_else(|| RecordShapeError::InvalidAmount {
        index,
        value: value.to_string(),
    })?;
    check_amount(index, amount)
}

fn check_amount(index: usize, amount: Decimal) -> std::result::Result<Decimal, RecordShapeError> {
    if amount.abs() > MAX_CONTRACT_AMOUNT {
        return Err(RecordShapeError::InvalidAmount {
            index,
            value: amount.to_string(),
        });
    }
    Ok(amount)
}

fn decimal_from_str(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn date_field(obj: &Map<String, Value>, field: &str) -> DateField {
    match obj.get(field) {
        None | Some(Value::Null) => DateField::Missing,
        Some(Value::String(s)) => DateField::parse(s),
        Some(other) => DateField::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "cliente": { "nomeEmpresa": "Agro Vale" },
            "contratos": [
                {
                    "socioResponsavel": "Carlos",
                    "banco": "Itaú",
                    "tipoContrato": "Custeio",
                    "numeroContrato": "C-001",
                    "valorTotal": 150000.75,
                    "dataContratacao": "2021-03-10",
                    "vencimentoContrato": "2024-03-10"
                },
                {
                    "socioResponsavel": "Ana",
                    "banco": "Banco do Brasil",
                    "tipoContrato": "Investimento",
                    "valorTotal": "80000",
                    "dataContratacao": "2022-07-01"
                },
                {
                    "socioResponsavel": "Ana",
                    "tipoContrato": "Custeio",
                    "numeroContrato": 4471,
                    "valorTotal": 20000,
                    "dataContratacao": "ontem"
                }
            ]
        })
    }

    #[test]
    fn test_load_document() {
        let repo = ContractRepository::from_document(&sample_document()).unwrap();
        assert_eq!(repo.client_name(), "Agro Vale");
        assert_eq!(repo.len(), 3);
        assert_eq!(repo.skipped_count(), 0);
        assert_eq!(repo.gross_total(), dec!(250000.75));

        let first = &repo.records()[0];
        assert_eq!(first.contract_number(), "C-001");
        assert_eq!(first.duration_years(), Some(dec!(3.0)));

        let third = &repo.records()[2];
        assert_eq!(third.contract_number(), "4471");
        assert!(matches!(third.contract_date(), DateField::Unknown(_)));
    }

    #[test]
    fn test_distinct_dimensions_sorted() {
        let repo = ContractRepository::from_document(&sample_document()).unwrap();
        assert_eq!(repo.partners(), vec![PartnerId::new("Ana"), PartnerId::new("Carlos")]);
        assert_eq!(
            repo.lenders(),
            vec![LenderId::new("Banco do Brasil"), LenderId::new("Itaú")]
        );
        assert_eq!(repo.contract_types(), vec!["Custeio", "Investimento"]);
        assert_eq!(repo.years(), vec![2021, 2022]);
        assert!(repo.has_lender_dimension());
        assert!(repo.has_year_dimension());
    }

    #[test]
    fn test_missing_contracts_key() {
        let err = ContractRepository::from_document(&json!({ "cliente": {} })).unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument(_)));

        let err = ContractRepository::from_document(&json!({ "contratos": {} })).unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = ContractRepository::from_json_str("[1, 2").unwrap_err();
        assert!(matches!(err, LoadError::MalformedDocument(_)));
    }

    #[test]
    fn test_skips_malformed_records() {
        let raw = vec![
            json!({ "socioResponsavel": "Ana", "tipoContrato": "Custeio", "valorTotal": 10 }),
            json!({ "socioResponsavel": "Ana", "tipoContrato": "Custeio" }),
            json!({ "tipoContrato": "Custeio", "valorTotal": 10 }),
            json!({ "socioResponsavel": "Ana", "tipoContrato": "Custeio", "valorTotal": "dez" }),
            json!("not a contract"),
        ];
        let repo = ContractRepository::from_records(&raw);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.skipped_count(), 4);
        assert_eq!(
            repo.skipped()[0],
            SkippedRecord::from(RecordShapeError::MissingField {
                index: 1,
                field: "valorTotal"
            })
        );
        assert_eq!(repo.skipped()[3].index, 4);
    }

    #[test]
    fn test_optional_dimensions_absent() {
        let raw = vec![json!({
            "socioResponsavel": "Ana",
            "tipoContrato": "Custeio",
            "valorTotal": 10,
            "dataContratacao": "n/d"
        })];
        let repo = ContractRepository::from_records(&raw);
        assert!(!repo.has_lender_dimension());
        assert!(!repo.has_year_dimension());
        assert!(repo.lenders().is_empty());
        assert!(repo.years().is_empty());
        assert_eq!(repo.client_name(), UNDEFINED_CLIENT);
    }

    #[test]
    fn test_scientific_amount() {
        let raw = vec![json!({
            "socioResponsavel": "Ana",
            "tipoContrato": "Custeio",
            "valorTotal": 1.5e6
        })];
        let repo = ContractRepository::from_records(&raw);
        assert_eq!(repo.records()[0].total_amount(), dec!(1500000));
    }

    #[test]
    fn test_rejects_amounts_above_ceiling() {
        let raw = vec![
            json!({ "socioResponsavel": "Ana", "tipoContrato": "Custeio",
                    "valorTotal": "50000000000000000000000000000" }),
            json!({ "socioResponsavel": "Bia", "tipoContrato": "Custeio",
                    "valorTotal": "50000000000000000000000000000" }),
            json!({ "socioResponsavel": "Caio", "tipoContrato": "Custeio",
                    "valorTotal": "-1000000000000001" }),
            json!({ "socioResponsavel": "Davi", "tipoContrato": "Custeio",
                    "valorTotal": "1000000000000000" }),
        ];
        let repo = ContractRepository::from_records(&raw);

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.skipped_count(), 3);
        assert!(repo.skipped()[0].reason.contains("50000000000000000000000000000"));
        assert_eq!(repo.gross_total(), MAX_CONTRACT_AMOUNT);
    }

    #[test]
    fn test_from_contracts_applies_ceiling() {
        let repo = ContractRepository::from_contracts(vec![
            ContractRecord::new(PartnerId::new("Ana"), "Custeio", Decimal::MAX),
            ContractRecord::new(PartnerId::new("Ana"), "Custeio", Decimal::MAX),
            ContractRecord::new(PartnerId::new("Bia"), "Custeio", dec!(10)),
        ]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.skipped()[1].index, 1);
        assert_eq!(repo.gross_total(), dec!(10));
    }

    #[test]
    fn test_empty_repository() {
        let repo = ContractRepository::empty();
        assert!(repo.is_empty());
        assert!(repo.partners().is_empty());
        assert!(repo.contract_types().is_empty());
        assert_eq!(repo.gross_total(), Decimal::ZERO);
    }
}
