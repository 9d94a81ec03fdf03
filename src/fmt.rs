/// Dollar amount with thousands separators: $1,234.56. NaN shows as "$NaN"
/// so a poisoned total is visible rather than hidden.
pub fn money(val: f64) -> String {
    if val.is_nan() {
        return "$NaN".to_string();
    }
    let sign = if val < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", val.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{frac}")
}

/// Whole-number percentage, e.g. "67%".
pub fn percent(val: f64) -> String {
    format!("{:.0}%", val)
}

pub fn format_bytes(len: u64) -> String {
    match len {
        n if n >= 1 << 20 => format!("{:.1} MB", n as f64 / (1u64 << 20) as f64),
        n if n >= 1 << 10 => format!("{:.1} KB", n as f64 / (1u64 << 10) as f64),
        n => format!("{n} B"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(15.0), "$15.00");
        assert_eq!(money(f64::NAN), "$NaN");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(66.666), "67%");
        assert_eq!(percent(0.0), "0%");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
