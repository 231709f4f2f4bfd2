//! Number formatting for narration

/// Format a number for speech.
///
/// Integers have no decimals; everything else gets two. Magnitudes of
/// 1000 and up are grouped with commas.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "unknown".to_string();
    }

    let text = if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    };

    // Decide on the rounded text: 999.999 prints as 1000.00
    let int_digits = text
        .trim_start_matches('-')
        .split('.')
        .next()
        .map_or(0, str::len);
    if int_digits > 3 {
        group_thousands(&text)
    } else {
        text
    }
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(999.0), "999");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(1234567.0), "1,234,567");
        assert_eq!(format_number(-25000.0), "-25,000");
    }

    #[test]
    fn test_decimals() {
        assert_eq!(format_number(3.14159), "3.14");
        assert_eq!(format_number(0.5), "0.50");
        assert_eq!(format_number(1234.5), "1,234.50");
    }

    #[test]
    fn test_rounding_into_thousands_is_grouped() {
        assert_eq!(format_number(999.999), "1,000.00");
        assert_eq!(format_number(-999.996), "-1,000.00");
        assert_eq!(format_number(999.99), "999.99");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_number(f64::NAN), "unknown");
        assert_eq!(format_number(f64::INFINITY), "unknown");
    }
}
