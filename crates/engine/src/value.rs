//! Cell value normalization and the format-insensitive comparison.
//!
//! Comparison is textual, not numeric: both sides are canonicalized
//! (whitespace stripped, comma separator converted, lowercased) and
//! compared as strings. `"1.0"` and `"1.00"` only meet because the
//! blur-time settle formats to two fraction digits; `"01.5"` vs `"1.5"`
//! stay unequal. This matches the shipped behavior exactly and must not
//! be "fixed" into a numeric comparison.

/// Keystroke filter: an optionally-signed decimal with at most one
/// separator (comma or period). Empty input is allowed — it means
/// "blank the cell".
pub fn is_valid_cell_input(raw: &str) -> bool {
    let body = raw.strip_prefix('-').unwrap_or(raw);
    let mut seen_separator = false;
    for c in body.chars() {
        if c.is_ascii_digit() {
            continue;
        }
        if (c == ',' || c == '.') && !seen_separator {
            seen_separator = true;
            continue;
        }
        return false;
    }
    true
}

/// Canonical text form: all whitespace stripped, `,` → `.`, lowercased.
pub fn canon(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Parse a cell's text to its storage value. Blank is `None` (null);
/// non-numeric leftovers (a lone `-` or `.`) also collapse to `None`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let c = canon(raw);
    if c.is_empty() {
        return None;
    }
    c.parse::<f64>().ok()
}

/// Blur-time normalization: canonicalize, parse, re-format with exactly
/// two fraction digits. `None` when the text does not parse as a number.
pub fn settle(raw: &str) -> Option<String> {
    parse_decimal(raw).map(|n| format!("{n:.2}"))
}

/// Textual rendering of a server baseline value: blank for null, two
/// fraction digits otherwise. This is the form the comparison runs
/// against — reloaded grids display the same rendering.
pub fn baseline_text(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(n) => format!("{n:.2}"),
    }
}

/// Format-insensitive equality: both blank means equal, otherwise the
/// canonical forms must match exactly.
pub fn values_are_equal(a: &str, b: &str) -> bool {
    let ca = canon(a);
    let cb = canon(b);
    if ca.is_empty() && cb.is_empty() {
        return true;
    }
    ca == cb
}
