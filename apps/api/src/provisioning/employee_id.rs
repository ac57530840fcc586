//! Sequential employee IDs of the form `PREFIX-NNNN`.

/// Minimum zero-padded width of the numeric suffix.
const SUFFIX_WIDTH: usize = 4;

pub fn format_employee_id(prefix: &str, number: u32) -> String {
    format!("{prefix}-{number:0width$}", width = SUFFIX_WIDTH)
}

/// Returns the numeric suffix when `id` is exactly `prefix` + `-` + digits.
pub fn parse_employee_number(prefix: &str, id: &str) -> Option<u32> {
    let digits = id.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Max-plus-one over existing suffixes; gaps are never reused.
pub fn next_employee_number(current_max: Option<u32>) -> u32 {
    current_max.map_or(1, |max| max.saturating_add(1))
}

/// Postgres regex matching IDs that carry `prefix`.
pub fn employee_id_pattern(prefix: &str) -> String {
    format!("^{}-[0-9]+$", regex::escape(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_four_digits() {
        assert_eq!(format_employee_id("MAV", 1), "MAV-0001");
        assert_eq!(format_employee_id("MAV", 42), "MAV-0042");
    }

    #[test]
    fn test_format_grows_past_four_digits() {
        assert_eq!(format_employee_id("MAV", 12345), "MAV-12345");
    }

    #[test]
    fn test_parse_accepts_matching_prefix_only() {
        assert_eq!(parse_employee_number("MAV", "MAV-0003"), Some(3));
        assert_eq!(parse_employee_number("MAV", "ABC-0003"), None);
        assert_eq!(parse_employee_number("MAV", "MAVX-0003"), None);
        assert_eq!(parse_employee_number("MAV", "MAV-"), None);
        assert_eq!(parse_employee_number("MAV", "MAV-12a4"), None);
    }

    #[test]
    fn test_next_is_max_plus_one_not_first_gap() {
        let existing = ["MAV-0001", "MAV-0003"];
        let max = existing
            .iter()
            .filter_map(|id| parse_employee_number("MAV", id))
            .max();
        assert_eq!(format_employee_id("MAV", next_employee_number(max)), "MAV-0004");
    }

    #[test]
    fn test_next_starts_at_one() {
        assert_eq!(next_employee_number(None), 1);
    }

    #[test]
    fn test_pattern_escapes_prefix() {
        assert_eq!(employee_id_pattern("MAV"), "^MAV-[0-9]+$");
        assert_eq!(employee_id_pattern("A.B"), r"^A\.B-[0-9]+$");
    }
}
