use regex::{Regex, RegexBuilder};

use crate::rate::format::RATE_DECIMALS;
use crate::rate::RateFormatError;

/// Most integer digits a rate may have.
pub const MAX_INTEGER_DIGITS: usize = 8;

/// Separators accepted in rate input for a locale.
///
/// Decimal keypads on some platforms always send `.`, so it is accepted
/// alongside the locale's own separator.
pub fn permitted_decimal_separators(separator: char) -> Vec<char> {
    let mut permitted = vec![separator];
    if separator != '.' {
        permitted.push('.');
    }
    permitted
}

/// Validator for rate text typed by the user.
#[derive(Debug, Clone)]
pub struct RateGrammar {
    separator: char,
    pattern: Regex,
}

impl RateGrammar {
    /// Build the grammar for a locale decimal separator.
    ///
    /// # Errors
    /// Returns an error if the separator is a digit or whitespace.
    pub fn new(separator: char) -> Result<Self, RateFormatError> {
        if separator.is_ascii_digit() || separator.is_whitespace() {
            return Err(RateFormatError::InvalidSeparator(separator));
        }

        let class: String = permitted_decimal_separators(separator)
            .iter()
            .map(|c| regex::escape(&c.to_string()))
            .collect();
        let pattern = RegexBuilder::new(&format!(
            r"^[0-9]{{1,{MAX_INTEGER_DIGITS}}}([{class}][0-9]{{0,{RATE_DECIMALS}}})?$"
        ))
        .case_insensitive(true)
        .build()?;

        Ok(Self { separator, pattern })
    }

    /// The locale decimal separator this grammar was built for.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Whether `input` may replace the current rate text.
    ///
    /// Empty input is always accepted so the field can be cleared.
    pub fn accepts(&self, input: &str) -> bool {
        input.is_empty() || self.pattern.is_match(input)
    }
}
