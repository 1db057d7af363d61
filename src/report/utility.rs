use crate::telemetry::finite_or_zero;

/// Formats kilometres with two fixed decimals and comma thousands separators.
///
/// Non-finite input renders as `0.00`.
pub fn format_km(km: f64) -> String {
    let km = finite_or_zero(km);
    let fixed = format!("{:.2}", km.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if km < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
