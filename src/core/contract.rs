use crate::core::party::{LenderId, PartnerId};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown in place of a contract number the source does not provide.
pub const UNDEFINED_CONTRACT_NUMBER: &str = "Não definido";

/// A date column of a contract.
///
/// Parse failures never abort a load: the raw text is kept as `Unknown` and
/// every computation needing the date simply has no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DateField {
    Missing,
    Unknown(String),
    Known(NaiveDate),
}

impl DateField {
    /// Parse an ISO-like date.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` and RFC 3339.
    ///
    /// # Examples
    ///
    /// ```
    /// use debt_portfolio::core::contract::DateField;
    /// use chrono::NaiveDate;
    ///
    /// assert_eq!(
    ///     DateField::parse("2022-03-15"),
    ///     DateField::Known(NaiveDate::from_ymd_opt(2022, 3, 15).unwrap())
    /// );
    /// assert!(matches!(DateField::parse("15/03/2022"), DateField::Unknown(_)));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return DateField::Known(date);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return DateField::Known(dt.date());
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return DateField::Known(dt.date_naive());
        }
        DateField::Unknown(raw.to_string())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateField::Known(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, DateField::Known(_))
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::Missing => write!(f, "-"),
            DateField::Unknown(raw) => write!(f, "{} (inválida)", raw),
            DateField::Known(d) => write!(f, "{}", d.format("%d/%m/%Y")),
        }
    }
}

/// One debt contract.
///
/// Records are immutable once loaded; the contract year and the duration
/// are derived at construction and never recomputed.
///
/// # Examples
///
/// ```
/// use debt_portfolio::core::contract::{ContractRecord, DateField};
/// use debt_portfolio::core::party::PartnerId;
/// use rust_decimal_macros::dec;
///
/// let record = ContractRecord::new(PartnerId::new("Ana"), "Custeio", dec!(50_000))
///     .with_contract_date(DateField::parse("2022-01-10"))
///     .with_due_date(DateField::parse("2024-01-10"));
///
/// assert_eq!(record.contract_year(), Some(2022));
/// assert_eq!(record.duration_years(), Some(dec!(2.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    partner: PartnerId,
    lender: Option<LenderId>,
    contract_type: String,
    contract_number: String,
    total_amount: Decimal,
    contract_date: DateField,
    due_date: DateField,
    contract_year: Option<i32>,
    duration_years: Option<Decimal>,
}

impl ContractRecord {
    pub fn new(partner: PartnerId, contract_type: impl Into<String>, total_amount: Decimal) -> Self {
        Self {
            partner,
            lender: None,
            contract_type: contract_type.into(),
            contract_number: UNDEFINED_CONTRACT_NUMBER.to_string(),
            total_amount,
            contract_date: DateField::Missing,
            due_date: DateField::Missing,
            contract_year: None,
            duration_years: None,
        }
    }

    pub fn with_lender(mut self, lender: LenderId) -> Self {
        self.lender = Some(lender);
        self
    }

    pub fn with_contract_number(mut self, number: impl Into<String>) -> Self {
        self.contract_number = number.into();
        self
    }

    pub fn with_contract_date(mut self, date: DateField) -> Self {
        self.contract_date = date;
        self.derive();
        self
    }

    pub fn with_due_date(mut self, date: DateField) -> Self {
        self.due_date = date;
        self.derive();
        self
    }

    fn derive(&mut self) {
        self.contract_year = self.contract_date.date().map(|d| d.year());
        self.duration_years = match (self.contract_date.date(), self.due_date.date()) {
            (Some(start), Some(end)) => {
                let days = (end - start).num_days();
                Some((Decimal::from(days) / Decimal::from(365)).round_dp(1))
            }
            _ => None,
        };
    }

    // --- Accessors ---

    pub fn partner(&self) -> &PartnerId {
        &self.partner
    }

    pub fn lender(&self) -> Option<&LenderId> {
        self.lender.as_ref()
    }

    pub fn contract_type(&self) -> &str {
        &self.contract_type
    }

    pub fn contract_number(&self) -> &str {
        &self.contract_number
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn contract_date(&self) -> &DateField {
        &self.contract_date
    }

    pub fn due_date(&self) -> &DateField {
        &self.due_date
    }

    pub fn contract_year(&self) -> Option<i32> {
        self.contract_year
    }

    /// Years between contract and due date, one decimal place.
    pub fn duration_years(&self) -> Option<Decimal> {
        self.duration_years
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> ContractRecord {
        ContractRecord::new(PartnerId::new("Ana"), "Custeio", dec!(1000))
    }

    #[test]
    fn test_defaults() {
        let record = sample();
        assert_eq!(record.contract_number(), UNDEFINED_CONTRACT_NUMBER);
        assert!(record.lender().is_none());
        assert_eq!(record.contract_date(), &DateField::Missing);
        assert_eq!(record.contract_year(), None);
        assert_eq!(record.duration_years(), None);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();
        assert_eq!(DateField::parse("2021-06-30").date(), Some(expected));
        assert_eq!(DateField::parse("2021-06-30T10:15:00").date(), Some(expected));
        assert_eq!(DateField::parse("2021-06-30T10:15:00.250").date(), Some(expected));
        assert_eq!(DateField::parse("2021-06-30T10:15:00-03:00").date(), Some(expected));
        assert_eq!(DateField::parse(" 2021-06-30 ").date(), Some(expected));
    }

    #[test]
    fn test_unparseable_date_is_unknown() {
        let field = DateField::parse("2021-13-45");
        assert_eq!(field, DateField::Unknown("2021-13-45".to_string()));
        assert!(!field.is_known());

        let record = sample().with_contract_date(field);
        assert_eq!(record.contract_year(), None);
    }

    #[test]
    fn test_duration_rounding() {
        let record = sample()
            .with_contract_date(DateField::parse("2020-01-01"))
            .with_due_date(DateField::parse("2025-06-30"));
        // 2007 days / 365 = 5.4986...
        assert_eq!(record.duration_years(), Some(dec!(5.5)));
        assert_eq!(record.contract_year(), Some(2020));
    }

    #[test]
    fn test_duration_needs_both_dates() {
        let record = sample().with_due_date(DateField::parse("2025-06-30"));
        assert_eq!(record.duration_years(), None);

        let record = sample()
            .with_contract_date(DateField::parse("2020-01-01"))
            .with_due_date(DateField::parse("sem data"));
        assert_eq!(record.duration_years(), None);
        assert_eq!(record.contract_year(), Some(2020));
    }

    #[test]
    fn test_date_display() {
        assert_eq!(DateField::parse("2022-03-05").to_string(), "05/03/2022");
        assert_eq!(DateField::Missing.to_string(), "-");
    }
}
