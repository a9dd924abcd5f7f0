//! Number formatting for popup values.
//!
//! Monthly averages are shown with one decimal place. Rent averages are
//! grouped by thousands using the separators of a [`NumberLocale`].

use serde::{Deserialize, Serialize};

/// Placeholder shown for absent numeric values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator conventions used when grouping large numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberLocale {
    /// `1,234,567.5`
    #[default]
    En,
    /// `1.234.567,5`
    EsCo,
}

impl NumberLocale {
    /// Returns the thousands separator.
    #[must_use]
    pub const fn group_separator(self) -> char {
        match self {
            Self::En => ',',
            Self::EsCo => '.',
        }
    }

    /// Returns the decimal separator.
    #[must_use]
    pub const fn decimal_separator(self) -> char {
        match self {
            Self::En => '.',
            Self::EsCo => ',',
        }
    }
}

/// Formats a value with exactly one decimal place, or [`NOT_AVAILABLE`].
///
/// Exact ties round away from zero (`12.25` is `"12.3"`), matching how
/// browsers display the same value.
#[must_use]
pub fn format_one_decimal(value: Option<f64>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |v| format!("{:.1}", round_tie_away_from_zero(v)),
    )
}

/// A value sits exactly halfway between two tenths only when it is an odd
/// number of quarters; `{:.1}` would round those to even, so round them
/// away from zero first. Scaling such a value by ten is exact.
#[allow(clippy::float_cmp)]
fn round_tie_away_from_zero(value: f64) -> f64 {
    if (value * 4.0).rem_euclid(2.0) == 1.0 {
        (value * 10.0).round() / 10.0
    } else {
        value
    }
}

/// Formats a value with thousands grouping and at most three fraction
/// digits, trimming trailing zeros.
#[must_use]
pub fn format_grouped(value: f64, locale: NumberLocale) -> String {
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded
        .split_once('.')
        .unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(rounded.len() + int_part.len() / 3 + 1);
    if value.is_sign_negative() && (int_part != "0" || !frac.is_empty()) {
        out.push('-');
    }

    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(locale.group_separator());
        }
        out.push(ch);
    }

    if !frac.is_empty() {
        out.push(locale.decimal_separator());
        out.push_str(frac);
    }

    out
}

/// Formats a rent average, or [`NOT_AVAILABLE`] when absent.
#[must_use]
pub fn format_rent(value: Option<f64>, locale: NumberLocale) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |v| format_grouped(v, locale),
    )
}
