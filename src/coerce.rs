//! Per-field type coercion from raw CSV text to SQL literal fragments.
//!
//! `coerce` is deliberately permissive: malformed numeric or date text never
//! raises, it degrades to best-effort output (`NULL` for numerics that cannot
//! be salvaged, pass-through for dates) so a handful of bad fields cannot
//! abort a large import. The dtype tags are the lower-cased type names the
//! destination store reports: `int`, `float`, `decimal`, `real`, `money`,
//! `bit`, `date`, `datetime`, and a catch-all quoted-text default.

use std::sync::OnceLock;

use regex::Regex;

use crate::{
    sanitize::scrub_field,
    value::{SqlValue, parse_naive_date, parse_naive_datetime},
};

const DEFAULT_SENTINELS: &[&str] = &["n/a", "undefined", "null", "none"];

/// Controls which raw values count as empty (and therefore coerce to `NULL`).
///
/// Source systems disagree on whether placeholder tokens such as `n/a`
/// count as empty; both behaviors are selectable. Token matching is a
/// case-insensitive prefix match on the trimmed value, so `None given`
/// coerces to `NULL` under the default set. This is a known data-loss
/// hazard for text columns whose legitimate values start with a token.
#[derive(Debug, Clone)]
pub struct CoercionPolicy {
    /// Treat sentinel tokens as empty in addition to whitespace-only values.
    pub sentinels_as_null: bool,
    /// Sentinel tokens, matched case-insensitively against the value prefix.
    pub sentinels: Vec<String>,
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        Self {
            sentinels_as_null: true,
            sentinels: DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CoercionPolicy {
    /// The looser observed policy: only whitespace-only values are empty.
    pub fn whitespace_only() -> Self {
        Self {
            sentinels_as_null: false,
            sentinels: Vec::new(),
        }
    }

    fn is_empty(&self, value: &str) -> bool {
        if value.is_empty() {
            return true;
        }
        if !self.sentinels_as_null {
            return false;
        }
        let lowered = value.to_ascii_lowercase();
        self.sentinels
            .iter()
            .any(|token| lowered.starts_with(&token.to_ascii_lowercase()))
    }
}

static NUMERIC_STRIP: OnceLock<Regex> = OnceLock::new();
static UTC_SUFFIX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

fn numeric_strip() -> &'static Regex {
    NUMERIC_STRIP.get_or_init(|| Regex::new(r"[^0-9.\-]+").expect("numeric pattern"))
}

fn utc_suffix() -> &'static Regex {
    UTC_SUFFIX.get_or_init(|| Regex::new(r"\sUTC$").expect("utc pattern"))
}

fn whitespace_run() -> &'static Regex {
    WHITESPACE_RUN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern"))
}

/// Coerces one raw field into a literal fragment ready for direct
/// concatenation into a statement.
pub fn coerce(raw: &str, dtype: &str, policy: &CoercionPolicy) -> String {
    let value = raw.trim();
    if policy.is_empty(value) {
        return "NULL".to_string();
    }
    match dtype {
        "date" | "datetime" => quote(&iso_datetime(value)),
        "bit" => to_bit(value).to_string(),
        "int" | "float" | "decimal" | "real" | "money" => numeric_literal(value, dtype),
        _ => quote(&scrub_field(value)),
    }
}

/// Typed counterpart of [`coerce`] for parameter-bound execution backends.
///
/// Same emptiness and cleaning decisions, but values that would have been
/// spliced as literals come back as [`SqlValue`] variants. Dates that fail
/// every known format fall back to cleaned text rather than erroring.
pub fn coerce_typed(raw: &str, dtype: &str, policy: &CoercionPolicy) -> SqlValue {
    let value = raw.trim();
    if policy.is_empty(value) {
        return SqlValue::Null;
    }
    match dtype {
        "date" => {
            let trimmed = utc_suffix().replace(value, "");
            parse_naive_date(trimmed.as_ref())
                .map(SqlValue::Date)
                .or_else(|| parse_naive_datetime(trimmed.as_ref()).map(|dt| SqlValue::Date(dt.date())))
                .unwrap_or_else(|| SqlValue::Text(scrub_field(value)))
        }
        "datetime" => {
            let trimmed = utc_suffix().replace(value, "");
            parse_naive_datetime(trimmed.as_ref())
                .map(SqlValue::DateTime)
                .unwrap_or_else(|| SqlValue::Text(scrub_field(value)))
        }
        "bit" => SqlValue::Bit(to_bit(value) == 1),
        "int" => {
            let digits = numeric_strip().replace_all(value, "");
            integer_part(&digits)
                .and_then(|part| part.parse::<i64>().ok())
                .map(SqlValue::Int)
                .unwrap_or(SqlValue::Null)
        }
        "float" | "real" => {
            let digits = numeric_strip().replace_all(value, "");
            digits
                .parse::<f64>()
                .ok()
                .map(SqlValue::Float)
                .unwrap_or(SqlValue::Null)
        }
        "decimal" | "money" => {
            let digits = numeric_strip().replace_all(value, "");
            digits
                .parse::<rust_decimal::Decimal>()
                .ok()
                .map(SqlValue::Decimal)
                .unwrap_or(SqlValue::Null)
        }
        _ => SqlValue::Text(scrub_field(value)),
    }
}

fn quote(value: &str) -> String {
    format!("'{value}'")
}

/// `2022-03-14 13:23:15 UTC` becomes `2022-03-14T13:23:15`. No structural
/// validation: malformed dates pass through as-is.
fn iso_datetime(value: &str) -> String {
    let trimmed = utc_suffix().replace(value, "");
    whitespace_run().replacen(trimmed.as_ref(), 1, "T").into_owned()
}

/// Lenient substring match: any value containing `yes`, `1`, or `true`
/// anywhere is truthy, so `truely` yields 1. A known coercion hazard.
fn to_bit(value: &str) -> u8 {
    let lowered = value.to_ascii_lowercase();
    if ["yes", "1", "true"].iter().any(|t| lowered.contains(t)) {
        1
    } else {
        0
    }
}

fn integer_part(digits: &str) -> Option<&str> {
    if digits.is_empty() {
        return None;
    }
    digits.split('.').next()
}

fn numeric_literal(value: &str, dtype: &str) -> String {
    let digits = numeric_strip().replace_all(value, "");
    if digits.is_empty() {
        return "NULL".to_string();
    }
    if dtype == "int" {
        return integer_part(&digits)
            .and_then(|part| part.parse::<i64>().ok())
            .map(|n| n.to_string())
            .unwrap_or_else(|| "NULL".to_string());
    }
    digits
        .parse::<f64>()
        .map(|f| f.to_string())
        .unwrap_or_else(|_| "NULL".to_string())
}
