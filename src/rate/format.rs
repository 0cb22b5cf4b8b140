//! Conversion between rate display text and numeric values.
//!
//! Both directions are pure and take the locale decimal separator
//! explicitly, so nothing here depends on an ambient locale.

use std::borrow::Cow;

/// Scaling between a displayed amount and the stored rate.
pub const RATE_BASE_OFFSET: f64 = 100.0;

/// Fractional digits kept when a rate is parsed.
pub const RATE_DECIMALS: usize = 3;

const RATE_PRECISION: f64 = 1000.0;

/// A rate parsed from display text, fixed to [`RATE_DECIMALS`] decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRate {
    fixed: String,
    value: f64,
}

impl NumericRate {
    /// Canonical rendering with `.` as separator, e.g. `"2.500"`.
    pub fn fixed(&self) -> &str {
        &self.fixed
    }

    /// The amount after rounding to three decimals.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Scale into the stored representation.
    ///
    /// The result is snapped to the nearest thousandth of the amount, so all
    /// three decimals survive: `2.575` is stored as `257.5`.
    pub fn scaled(&self) -> f64 {
        let thousandths = (self.value * RATE_PRECISION).round();
        thousandths * RATE_BASE_OFFSET / RATE_PRECISION
    }
}

/// Input to [`to_display`].
#[derive(Debug, Clone, Copy)]
pub enum DisplaySource<'a> {
    /// Text typed by the user. The rendering is cut to its length.
    Text(&'a str),
    /// Amount derived from a stored rate. Rendered in full.
    Amount(f64),
}

/// Convert a stored rate into a display amount.
pub fn amount_from_rate(rate: f64) -> f64 {
    rate / RATE_BASE_OFFSET
}

/// Parse locale-formatted text into a rate.
///
/// The first occurrence of `separator` is read as the decimal point and the
/// longest numeric prefix is parsed, then rounded to three decimals.
/// Returns `None` when no number can be read.
pub fn to_numeric(input: &str, separator: char) -> Option<NumericRate> {
    let canonical = input.replacen(separator, ".", 1);
    let mut parsed = parse_float_prefix(&canonical)?;
    if parsed == 0.0 {
        // Drop the sign of negative zero.
        parsed = 0.0;
    }

    let fixed = format!("{:.*}", RATE_DECIMALS, parsed);
    let value = fixed.parse().ok()?;
    Some(NumericRate { fixed, value })
}

/// Render a rate for display in the given locale.
///
/// Text input keeps at most as many characters as it had, so a value typed
/// as `"2.5"` stays `"2.5"` while `"7"` is cut back from `"7.000"` to `"7"`.
/// Unparseable input renders as the empty string.
pub fn to_display(source: DisplaySource<'_>, separator: char) -> String {
    let text = match source {
        DisplaySource::Text(text) => Cow::Borrowed(text),
        DisplaySource::Amount(amount) => Cow::Owned(amount.to_string()),
    };

    let Some(numeric) = to_numeric(&text, separator) else {
        return String::new();
    };

    let mut buf = [0u8; 4];
    let localized = numeric
        .fixed
        .replacen('.', separator.encode_utf8(&mut buf), 1);

    match source {
        DisplaySource::Text(text) => localized.chars().take(text.chars().count()).collect(),
        DisplaySource::Amount(_) => localized,
    }
}

/// Longest leading decimal literal of `text`, ignoring leading whitespace.
fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let is_digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while is_digit_at(end) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while is_digit_at(frac_end) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while is_digit_at(exp_end) {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
