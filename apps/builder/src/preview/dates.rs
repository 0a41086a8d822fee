//! Display formatting for the "YYYY-MM" dates stored in entries.

use chrono::NaiveDate;

/// Formats "2020-01" as "Jan 2020".
///
/// Empty input yields an empty string. Anything that is not a valid year-month
/// is passed through untouched, so a stray value never breaks the render.
pub fn format_month(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d") {
        Ok(date) => date.format("%b %Y").to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// "Jan 2020 - Present", "Jan 2020 - Mar 2022", or whichever side exists.
pub fn format_range(start: &str, end: &str, current: bool) -> String {
    let start = format_month(start);
    let end = if current {
        "Present".to_string()
    } else {
        format_month(end)
    };
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start,
        (true, false) => end,
        (false, false) => format!("{start} - {end}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_year_month() {
        assert_eq!(format_month("2020-01"), "Jan 2020");
        assert_eq!(format_month("1999-12"), "Dec 1999");
    }

    #[test]
    fn test_empty_is_empty() {
        assert_eq!(format_month(""), "");
        assert_eq!(format_month("   "), "");
    }

    #[test]
    fn test_unparsable_is_passed_through() {
        assert_eq!(format_month("2020-13"), "2020-13");
        assert_eq!(format_month("spring 2020"), "spring 2020");
        assert_eq!(format_month("2020-01-15"), "2020-01-15");
    }

    #[test]
    fn test_current_range_ends_in_present() {
        assert_eq!(format_range("2020-01", "", true), "Jan 2020 - Present");
        assert_eq!(format_range("2020-01", "2021-06", true), "Jan 2020 - Present");
    }

    #[test]
    fn test_closed_and_open_ranges() {
        assert_eq!(format_range("2020-01", "2021-06", false), "Jan 2020 - Jun 2021");
        assert_eq!(format_range("2020-01", "", false), "Jan 2020");
        assert_eq!(format_range("", "2021-06", false), "Jun 2021");
        assert_eq!(format_range("", "", false), "");
    }
}
