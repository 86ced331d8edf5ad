//! Number formatting for stat cards and chart tables (Indian digit grouping).

const COMPACT_UNITS: &[(f64, &str)] = &[
    (1e12, "LCr"),
    (1e10, "KCr"),
    (1e7, "Cr"),
    (1e5, "L"),
    (1e3, "K"),
];

/// Formats `value` with `fraction_digits` decimals and en-IN grouping
/// (`12,34,567.50`). Non-finite values render as `"0"`.
pub fn format_number(value: f64, fraction_digits: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", fraction_digits, value.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::with_capacity(fixed.len() + 8);
    if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        out.push('-');
    }
    out.push_str(&group_indian(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Compact en-IN notation with at most two fraction digits: `1.23K`,
/// `4.5L`, `12Cr`.
pub fn format_compact_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    for (base, suffix) in COMPACT_UNITS {
        let scaled = round_to_hundredths(magnitude / base);
        if scaled >= 1.0 {
            return format!("{sign}{}{suffix}", trim_fraction(scaled));
        }
    }
    let rounded = round_to_hundredths(magnitude);
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{sign}{}", trim_fraction(rounded))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn trim_fraction(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
