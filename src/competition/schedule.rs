use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use thiserror::Error;

/// Fixed reference timezone for all due-date checks (UTC+05:30).
pub const REFERENCE_TZ_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The only end-date spellings a competition document may carry.
pub const ACCEPTED_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unrecognized date {0:?}; accepted formats are YYYY-MM-DD and DD/MM/YYYY")]
    UnrecognizedDate(String),

    #[error("competition has no end date")]
    MissingEndDate,
}

fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_TZ_OFFSET_SECS).expect("offset is in range")
}

/// Parses an end date from one of the accepted formats. Anything else is an
/// error, never a silently invalid date.
pub fn parse_end_date(raw: &str) -> Result<NaiveDate, ScheduleError> {
    let trimmed = raw.trim();
    for format in ACCEPTED_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(ScheduleError::UnrecognizedDate(raw.to_string()))
}

/// The last instant of `date` in the reference timezone.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let wall_clock = date.and_hms_opt(23, 59, 59).expect("valid wall clock");
    reference_offset()
        .from_local_datetime(&wall_clock)
        .single()
        .expect("fixed offsets are unambiguous")
        .with_timezone(&Utc)
}

/// Prize distribution is due once now has reached the end of the final day of
/// the competition's end date.
pub fn prizes_due(end_date: Option<&str>, now: DateTime<Utc>) -> Result<bool, ScheduleError> {
    let raw = end_date.ok_or(ScheduleError::MissingEndDate)?;
    let date = parse_end_date(raw)?;
    Ok(now >= end_of_day(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2026-03-14")]
    #[case("14/03/2026")]
    #[case("  2026-03-14 ")]
    fn accepts_both_formats(#[case] raw: &str) {
        let date = parse_end_date(raw).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
    }

    #[rstest]
    #[case("03/14/2026")]
    #[case("14-03-2026")]
    #[case("March 14, 2026")]
    #[case("")]
    fn rejects_everything_else(#[case] raw: &str) {
        assert!(matches!(
            parse_end_date(raw),
            Err(ScheduleError::UnrecognizedDate(_))
        ));
    }

    #[test]
    fn end_of_day_is_in_the_reference_timezone() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        // 23:59:59 at +05:30 is 18:29:59 UTC.
        let expected = Utc.with_ymd_and_hms(2026, 3, 14, 18, 29, 59).unwrap();
        assert_eq!(end_of_day(date), expected);
    }

    #[test]
    fn due_gate_flips_at_end_of_day() {
        let before = Utc.with_ymd_and_hms(2026, 3, 14, 18, 29, 58).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 18, 29, 59).unwrap();

        assert!(!prizes_due(Some("2026-03-14"), before).unwrap());
        assert!(prizes_due(Some("2026-03-14"), at).unwrap());
    }

    #[test]
    fn missing_end_date_is_an_error() {
        assert_eq!(
            prizes_due(None, Utc::now()),
            Err(ScheduleError::MissingEndDate)
        );
    }
}
