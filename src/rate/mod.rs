//! Rate text handling: grammar validation and display/numeric conversion.

mod format;
mod grammar;

pub use format::{
    amount_from_rate, to_display, to_numeric, DisplaySource, NumericRate, RATE_BASE_OFFSET,
    RATE_DECIMALS,
};
pub use grammar::{permitted_decimal_separators, RateGrammar, MAX_INTEGER_DIGITS};

use thiserror::Error;

/// Errors that can occur when building rate rules for a locale.
#[derive(Debug, Error)]
pub enum RateFormatError {
    #[error("'{0}' cannot be used as a decimal separator")]
    InvalidSeparator(char),

    #[error("Failed to build rate grammar: {0}")]
    Grammar(#[from] regex::Error),
}
