use rust_decimal::Decimal;

/// Strips surrounding whitespace and thousands separators.
fn normalize_amount_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a money amount typed into a form field.
///
/// `"1,250,000"` and `" 90000.50 "` are accepted. Blank input is zero, and
/// so is anything unparseable (logged at warn, since the form should not
/// have let it through).
pub fn parse_amount(s: &str) -> Decimal {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    normalized.parse().unwrap_or_else(|e| {
        tracing::warn!(input = %s, "invalid amount, using 0: {}", e);
        Decimal::ZERO
    })
}
