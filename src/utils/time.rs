// src/utils/time.rs

use chrono::{NaiveDate, NaiveTime, Utc};

/// Gets the current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parses a `YYYY-MM-DD` query parameter into an inclusive lower bound in
/// unix milliseconds (start of day, UTC). Unparseable input means no bound.
pub fn parse_date_from(raw: Option<&str>) -> Option<i64> {
    let date = NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Parses a `YYYY-MM-DD` query parameter into an inclusive upper bound in
/// unix milliseconds, extended to the end of that day (23:59:59.999 UTC).
pub fn parse_date_to(raw: Option<&str>) -> Option<i64> {
    let date = NaiveDate::parse_from_str(raw?.trim(), "%Y-%m-%d").ok()?;
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
    Some(date.and_time(end_of_day).and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_from_start_of_day() {
        let ts = parse_date_from(Some("2024-03-01")).unwrap();
        assert_eq!(ts, 1_709_251_200_000); // 2024-03-01T00:00:00Z
    }

    #[test]
    fn test_parse_date_to_end_of_day() {
        let from = parse_date_from(Some("2024-03-01")).unwrap();
        let to = parse_date_to(Some("2024-03-01")).unwrap();
        assert_eq!(to - from, 86_400_000 - 1);
    }

    #[test]
    fn test_malformed_dates_mean_no_bound() {
        assert_eq!(parse_date_from(None), None);
        assert_eq!(parse_date_from(Some("")), None);
        assert_eq!(parse_date_from(Some("01.03.2024")), None);
        assert_eq!(parse_date_to(Some("not-a-date")), None);
    }
}
