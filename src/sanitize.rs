//! Lossy field cleaning applied to headers, row values, and quoted text
//! literals.
//!
//! The rule keeps printable 7-bit ASCII only: anything outside `0x20..=0x7E`
//! (which covers tab, carriage return, and line feed) plus both quote
//! characters is removed outright. Runs of stripped characters collapse to
//! nothing, so `O'Brien` becomes `OBrien` and non-ASCII text is destroyed,
//! not escaped.

use std::sync::OnceLock;

use regex::Regex;

static SCRUB: OnceLock<Regex> = OnceLock::new();

fn scrub_pattern() -> &'static Regex {
    SCRUB.get_or_init(|| Regex::new(r#"([^\x20-\x7E]|"|')+"#).expect("scrub pattern"))
}

/// Strips every character outside printable 7-bit ASCII, plus single and
/// double quotes.
pub fn scrub_field(raw: &str) -> String {
    scrub_pattern().replace_all(raw, "").into_owned()
}
