//! Unit conversion and numeric formatting
//!
//! Bores are specified in millimeters and machined in inches. Every
//! coordinate and feed word in an emitted program goes through
//! [`format_number`].

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Maximum decimal places emitted in a program word
pub const MAX_DECIMALS: usize = 4;

/// Convert millimeters to inches
pub fn mm_to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// Convert inches to millimeters
pub fn in_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

/// Format a value as a program word number.
///
/// Rounds to four decimal places, strips trailing zeros and always keeps the
/// decimal point: `1.5` not `1.50`, `2.` not `2`, `0.` for zero.
pub fn format_number(value: f64) -> String {
    let scale = 10f64.powi(MAX_DECIMALS as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 || !rounded.is_finite() {
        return "0.".to_string();
    }

    let mut text = format!("{:.*}", MAX_DECIMALS, rounded);
    while text.ends_with('0') {
        text.pop();
    }
    text
}

/// Parse a program word number such as `2.`, `-0.09` or `.5`
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "+" || trimmed == "." {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(1.50), "1.5");
        assert_eq!(format_number(0.0), "0.");
        assert_eq!(format_number(-0.0), "0.");
        assert_eq!(format_number(2.0), "2.");
        assert_eq!(format_number(-0.09), "-0.09");
        assert_eq!(format_number(3.429134), "3.4291");
        assert_eq!(format_number(0.00004), "0.");
        assert_eq!(format_number(-1.65), "-1.65");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("2."), Some(2.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("-0.09"), Some(-0.09));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_conversions() {
        assert!((mm_to_in(25.4) - 1.0).abs() < 1e-12);
        assert!((in_to_mm(0.5) - 12.7).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn formatted_numbers_parse_back_within_tolerance(value in -100.0f64..100.0) {
            let text = format_number(value);
            prop_assert!(text.contains('.'));
            let parsed = parse_number(&text).unwrap();
            prop_assert!((parsed - value).abs() < 1e-4);
        }
    }
}
