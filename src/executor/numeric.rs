//! Numeric parsing of text cells
//!
//! Values are stored as text and parsed on demand. Two policies exist and
//! every query picks one of them:
//! - lenient: an unparsable value counts as zero
//! - strict: a row with an unparsable value is left out

/// Parse a cell as a finite number
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Lenient parse: absent or unparsable values become `0.0`
pub fn parse_or_default(cell: Option<&str>) -> f64 {
    parse_or_exclude(cell).unwrap_or(0.0)
}

/// Strict parse: absent or unparsable values yield `None`
pub fn parse_or_exclude(cell: Option<&str>) -> Option<f64> {
    cell.and_then(parse_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_lenient_and_strict_policies() {
        assert_eq!(parse_or_default(Some("x")), 0.0);
        assert_eq!(parse_or_default(None), 0.0);
        assert_eq!(parse_or_default(Some("7")), 7.0);

        assert_eq!(parse_or_exclude(Some("x")), None);
        assert_eq!(parse_or_exclude(None), None);
        assert_eq!(parse_or_exclude(Some("7")), Some(7.0));
    }
}
