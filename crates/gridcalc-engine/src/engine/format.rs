use rust_decimal::{Decimal, RoundingStrategy};

use super::Value;

/// Default width above which numbers switch to scientific notation.
pub const DEFAULT_MAX_PLAIN_WIDTH: usize = 10;

/// Format a Value for display.
pub fn format_value(value: &Value, max_plain_width: usize) -> String {
    match value {
        Value::Number(n) => format_number(*n, max_plain_width),
        Value::Text(s) => s.clone(),
    }
}

/// Format a number for display.
///
/// Numbers keep their decimal scale (`1.50` stays `1.50`). When that text is
/// wider than `max_plain_width`, the number is shown with five significant
/// digits and a three-digit exponent instead, e.g. `1.2346E+010`.
pub fn format_number(n: Decimal, max_plain_width: usize) -> String {
    let plain = n.to_string();
    if plain.len() > max_plain_width {
        format_scientific(n)
    } else {
        plain
    }
}

fn format_scientific(n: Decimal) -> String {
    if n.is_zero() {
        return "0.0000E+000".to_string();
    }

    let rounded = n
        .round_sf_with_strategy(5, RoundingStrategy::MidpointAwayFromZero)
        .unwrap_or(n);
    let normalized = rounded.abs().normalize();
    let digits = normalized.mantissa().to_string();
    let exponent = digits.len() as i64 - 1 - i64::from(normalized.scale());

    let mut significant: String = digits.chars().take(5).collect();
    while significant.len() < 5 {
        significant.push('0');
    }

    format!(
        "{}{}.{}E{}{:03}",
        if n.is_sign_negative() { "-" } else { "" },
        &significant[..1],
        &significant[1..],
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}
