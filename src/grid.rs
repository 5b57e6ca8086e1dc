//! Text grid references for the command-line front end.
//!
//! Short references are read the way they are called over the net:
//! - 1-3 digits: hundreds of meters (`048` → 4800)
//! - 4 digits: 100 m square plus a tens digit (`0482` → 4820)
//! - 5 digits: 100 m square plus meters (`04825` → 4825)
//!
//! Six or more characters are taken as a full coordinate in meters.

/// Parse one easting or northing
pub fn parse_grid_coordinate(input: &str) -> Option<f64> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    if text.len() > 5 {
        return text.parse::<f64>().ok().filter(|v| v.is_finite());
    }

    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num: u64 = text.parse().ok()?;

    let meters = match text.len() {
        4 => (num / 10) * 100 + (num % 10) * 10,
        5 => (num / 100) * 100 + num % 100,
        _ => num * 100,
    };
    Some(meters as f64)
}

/// Format a coordinate back to a grid reference of `digits` digits
///
/// Digits outside 3..=5 print the full rounded coordinate.
pub fn format_grid_coordinate(value: f64, digits: usize) -> String {
    match digits {
        3 => format!("{:03}", (value / 100.0).round() as i64),
        4 => format!("{:04}", (value / 10.0).round() as i64),
        5 => format!("{:05}", value.round() as i64),
        _ => format!("{}", value.round() as i64),
    }
}

/// Digits to use when echoing an adjusted coordinate
///
/// Any applied correction needs at least 10 m resolution to show up.
pub fn display_digits(original: &str, adjusted: bool) -> usize {
    let len = original.trim().len();
    if adjusted {
        len.max(4)
    } else {
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_references() {
        assert_eq!(parse_grid_coordinate("048"), Some(4800.0));
        assert_eq!(parse_grid_coordinate("0482"), Some(4820.0));
        assert_eq!(parse_grid_coordinate("04825"), Some(4825.0));
        assert_eq!(parse_grid_coordinate("7"), Some(700.0));
        assert_eq!(parse_grid_coordinate(" 110 "), Some(11000.0));
    }

    #[test]
    fn test_parse_full_coordinates() {
        assert_eq!(parse_grid_coordinate("548250"), Some(548250.0));
        assert_eq!(parse_grid_coordinate("548250.5"), Some(548250.5));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_grid_coordinate(""), None);
        assert_eq!(parse_grid_coordinate("   "), None);
        assert_eq!(parse_grid_coordinate("04a"), None);
        assert_eq!(parse_grid_coordinate("-12"), None);
        assert_eq!(parse_grid_coordinate("not-a-number"), None);
        assert_eq!(parse_grid_coordinate("infinity"), None);
    }

    #[test]
    fn test_format_matches_parse() {
        for text in ["048", "0482", "04825"] {
            let value = parse_grid_coordinate(text).unwrap();
            assert_eq!(format_grid_coordinate(value, text.len()), text);
        }
        assert_eq!(format_grid_coordinate(548250.4, 6), "548250");
    }

    #[test]
    fn test_display_digits_raised_for_adjustments() {
        assert_eq!(display_digits("048", false), 3);
        assert_eq!(display_digits("048", true), 4);
        assert_eq!(display_digits("04825", true), 5);
    }
}
