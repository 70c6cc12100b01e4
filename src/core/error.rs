use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent a contract document from being loaded at all.
///
/// Neither variant is fatal: [`RepositoryCache::load_or_empty`] turns both
/// into an empty repository plus the classified error, so the caller can
/// report it and keep going.
///
/// [`RepositoryCache::load_or_empty`]: crate::core::cache::RepositoryCache::load_or_empty
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data source {path} could not be read: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed contract document: {0}")]
    MalformedDocument(String),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::MalformedDocument(err.to_string())
    }
}

/// Why a single raw contract was skipped during load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordShapeError {
    #[error("record {index} is not an object")]
    NotAnObject { index: usize },

    #[error("record {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index} has an invalid amount: {value}")]
    InvalidAmount { index: usize, value: String },
}

impl RecordShapeError {
    /// Position of the offending record in the source array.
    pub fn index(&self) -> usize {
        match self {
            RecordShapeError::NotAnObject { index }
            | RecordShapeError::MissingField { index, .. }
            | RecordShapeError::InvalidAmount { index, .. } => *index,
        }
    }
}

/// Raised by a [`MonetaryLocale`](crate::core::currency::MonetaryLocale).
///
/// Never reaches callers of
/// [`CurrencyFormatter::format`](crate::core::currency::CurrencyFormatter::format).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("locale '{0}' is not available")]
    LocaleUnavailable(String),

    #[error("thousands and decimal separators are both '{0}'")]
    AmbiguousSeparators(char),
}

pub type Result<T> = std::result::Result<T, LoadError>;
