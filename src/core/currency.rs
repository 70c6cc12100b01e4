use crate::core::error::FormatError;
use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Prefix used by the fallback path.
pub const BRL_PREFIX: &str = "R$ ";

/// A host facility able to render monetary amounts.
///
/// Implementations may fail for any reason (missing locale data, bad
/// configuration); [`CurrencyFormatter`] recovers from every failure.
pub trait MonetaryLocale: Send + Sync {
    fn format_currency(&self, amount: Decimal) -> Result<String, FormatError>;
}

/// Table-driven monetary convention, the equivalent of a locale's
/// `LC_MONETARY` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleConvention {
    pub name: String,
    pub symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
    pub fraction_digits: u32,
}

impl LocaleConvention {
    /// Brazilian Real as rendered by the `pt_BR` locale.
    pub fn pt_br() -> Self {
        Self {
            name: "pt_BR.UTF-8".to_string(),
            symbol: "R$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
            fraction_digits: 2,
        }
    }

    /// Resolve a locale by name.
    ///
    /// Accepts the POSIX and Windows spellings of the Brazilian locale; any
    /// other name is unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use debt_portfolio::core::currency::LocaleConvention;
    ///
    /// assert!(LocaleConvention::for_name("pt_BR.UTF-8").is_some());
    /// assert!(LocaleConvention::for_name("Portuguese_Brazil.1252").is_some());
    /// assert!(LocaleConvention::for_name("C").is_none());
    /// ```
    pub fn for_name(name: &str) -> Option<Self> {
        let base = name.split(['.', '@']).next().unwrap_or(name);
        match base {
            "pt_BR" | "pt-BR" | "Portuguese_Brazil" => Some(Self {
                name: name.to_string(),
                ..Self::pt_br()
            }),
            _ => None,
        }
    }
}

impl MonetaryLocale for LocaleConvention {
    fn format_currency(&self, amount: Decimal) -> Result<String, FormatError> {
        if self.thousands_separator == self.decimal_separator {
            return Err(FormatError::AmbiguousSeparators(self.thousands_separator));
        }
        let (negative, integer, fraction) = split_rounded(amount, self.fraction_digits);
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.symbol);
        out.push(' ');
        out.push_str(&group_thousands(&integer, self.thousands_separator));
        if !fraction.is_empty() {
            out.push(self.decimal_separator);
            out.push_str(&fraction);
        }
        Ok(out)
    }
}

/// Converts amounts into Brazilian Real strings. Never fails.
///
/// With a locale attached the locale is tried first; without one, or when
/// the locale errors, the deterministic fallback is used: two decimals,
/// `.` for thousands, `,` for decimals, and an `R$ ` prefix.
///
/// # Examples
///
/// ```
/// use debt_portfolio::core::currency::CurrencyFormatter;
/// use rust_decimal_macros::dec;
///
/// let formatter = CurrencyFormatter::fallback();
/// assert_eq!(formatter.format(dec!(1234.5)), "R$ 1.234,50");
/// ```
#[derive(Default)]
pub struct CurrencyFormatter {
    locale: Option<Box<dyn MonetaryLocale>>,
}

impl CurrencyFormatter {
    /// A formatter that always takes the fallback path.
    pub fn fallback() -> Self {
        Self { locale: None }
    }

    pub fn with_locale(locale: impl MonetaryLocale + 'static) -> Self {
        Self {
            locale: Some(Box::new(locale)),
        }
    }

    /// Build a formatter from a locale name, falling back when the name
    /// does not resolve.
    pub fn for_locale_name(name: &str) -> Self {
        match LocaleConvention::for_name(name) {
            Some(convention) => Self::with_locale(convention),
            None => {
                warn!(
                    "{}; amounts will use the fallback format",
                    FormatError::LocaleUnavailable(name.to_string())
                );
                Self::fallback()
            }
        }
    }

    pub fn has_locale(&self) -> bool {
        self.locale.is_some()
    }

    pub fn format(&self, amount: Decimal) -> String {
        if let Some(locale) = &self.locale {
            match locale.format_currency(amount) {
                Ok(s) => return s,
                Err(e) => debug!("locale formatting failed ({}), using fallback", e),
            }
        }
        format_fallback(amount)
    }
}

impl fmt::Debug for CurrencyFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrencyFormatter")
            .field("has_locale", &self.has_locale())
            .finish()
    }
}

/// The locale-independent rendering.
///
/// Formats with machine grouping (`1,234.50`), swaps the two separators,
/// then prepends [`BRL_PREFIX`].
pub fn format_fallback(amount: Decimal) -> String {
    let (negative, integer, fraction) = split_rounded(amount, 2);
    let machine = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        group_thousands(&integer, ','),
        fraction
    );
    let swapped: String = machine
        .chars()
        .map(|c| match c {
            ',' => '.',
            '.' => ',',
            other => other,
        })
        .collect();
    format!("{}{}", BRL_PREFIX, swapped)
}

/// Round half-to-even and split into sign, integer digits and fraction digits.
fn split_rounded(amount: Decimal, digits: u32) -> (bool, String, String) {
    let mut rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);
    rounded.rescale(digits);
    let text = rounded.to_string();
    match text.split_once('.') {
        Some((int, frac)) => (negative, int.to_string(), frac.to_string()),
        None => (negative, text, String::new()),
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
