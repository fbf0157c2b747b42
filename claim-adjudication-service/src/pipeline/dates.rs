use chrono::NaiveDate;
use tracing::warn;

/// Candidate formats, tried in order. The order is the tie-break for
/// ambiguous inputs: "01/02/2023" parses day-first because `%d/%m/%Y`
/// appears before `%m/%d/%Y`.
const DATE_FORMATS: [&str; 10] = [
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y/%m/%d",
    "%d-%b-%y",
    "%m-%d-%Y",
    "%B %d, %Y",
];

const OUTPUT_FORMAT: &str = "%d/%m/%Y";

/// Parses a free-form date string and renders it as `dd/mm/yyyy`.
///
/// Returns an empty string for empty, whitespace-only, or unparseable input;
/// never errors.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.format(OUTPUT_FORMAT).to_string();
        }
    }

    warn!(input = %raw, "could not parse date, returning empty string");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_format_round_trips() {
        // Day 25 keeps day-first and month-first renderings distinguishable.
        let date = NaiveDate::from_ymd_opt(2023, 1, 25).unwrap();
        for format in DATE_FORMATS {
            let rendered = date.format(format).to_string();
            assert_eq!(normalize(&rendered), "25/01/2023", "format {format} via {rendered}");
        }
    }

    #[test]
    fn ambiguous_numeric_dates_resolve_day_first() {
        assert_eq!(normalize("01/02/2023"), "01/02/2023");
        assert_eq!(normalize("03-04-2023"), "03/04/2023");
    }

    #[test]
    fn month_first_applies_when_day_first_is_impossible() {
        assert_eq!(normalize("01/25/2023"), "25/01/2023");
        assert_eq!(normalize("12-28-2023"), "28/12/2023");
    }

    #[test]
    fn textual_month_variants() {
        assert_eq!(normalize("5 Mar 2021"), "05/03/2021");
        assert_eq!(normalize("5 March 2021"), "05/03/2021");
        assert_eq!(normalize("17-Aug-24"), "17/08/2024");
        assert_eq!(normalize("August 17, 2024"), "17/08/2024");
    }

    #[test]
    fn iso_and_slashed_iso_orders() {
        assert_eq!(normalize("2023-11-09"), "09/11/2023");
        assert_eq!(normalize("2023/11/09"), "09/11/2023");
    }

    #[test]
    fn blank_input_yields_empty_string() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn unparseable_input_yields_empty_string() {
        assert_eq!(normalize("not a date"), "");
        assert_eq!(normalize("32/01/2023"), "");
        assert_eq!(normalize("2023"), "");
    }
}
