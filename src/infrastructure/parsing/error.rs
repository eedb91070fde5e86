//! Parsing error types
//!
//! A parse failure is always local to one page: the scrape loop logs it and
//! moves on to the next identifier.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Required field '{field}' not found on {url}")]
    RequiredFieldMissing { field: String, url: String },

    #[error("Invalid value for '{field}' on {url}: {value:?}")]
    InvalidValue {
        field: String,
        value: String,
        url: String,
    },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ParsingError {
    pub fn required_field_missing(field: &str, url: &str) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            url: url.to_string(),
        }
    }

    pub fn invalid_value(field: &str, value: &str, url: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            url: url.to_string(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Name of the field involved, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::RequiredFieldMissing { field, .. } | Self::InvalidValue { field, .. } => {
                Some(field)
            }
            Self::InvalidSelector { .. } => None,
        }
    }
}

/// Result type for parsing operations
pub type ParsingResult<T> = Result<T, ParsingError>;
