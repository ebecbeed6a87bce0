//! Human-readable formatting for diagnostic log lines and statistics reports.

use indicatif::HumanBytes;

/// Format a byte count like "1.5MB".
pub fn pretty_size(bytes: usize) -> String {
    format!("{}", HumanBytes(bytes as u64))
}

/// Format an integer with thousands separators.
pub fn pretty_uint(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format `value` as a percentage of `total`.
pub fn pretty_percent(value: u64, total: u64) -> String {
    if total == 0 {
        "n/a".to_owned()
    } else {
        format!("{:.1}%", 100.0 * value as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_grouping() {
        assert_eq!(pretty_uint(0), "0");
        assert_eq!(pretty_uint(999), "999");
        assert_eq!(pretty_uint(8192), "8,192");
        assert_eq!(pretty_uint(1_234_567), "1,234,567");
    }

    #[test]
    fn percent() {
        assert_eq!(pretty_percent(1, 4), "25.0%");
        assert_eq!(pretty_percent(0, 0), "n/a");
    }
}
