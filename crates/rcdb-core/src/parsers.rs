//! Timestamp parsing and formatting for values stored by RCDB.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::errors::ParseTimestampError;

const SPACE_FORMATS: (&str, &str) = ("%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f%:z");
const T_FORMATS: (&str, &str) = ("%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f%:z");

/// Parses a stored timestamp of the form `YYYY-MM-DD HH:MM:SS[.fraction][±HH:MM]`.
///
/// `T` is accepted in place of the space. Text without an offset is read as UTC
/// and an explicit offset is converted to UTC. Every field is required, so a
/// date without a time is rejected rather than completed.
///
/// # Errors
///
/// Returns [`ParseTimestampError::Empty`] for blank input and
/// [`ParseTimestampError::ChronoError`] if the text is not a complete timestamp.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, ParseTimestampError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ParseTimestampError::Empty);
    }
    let (naive_format, offset_format) = if text.get(10..11) == Some("T") {
        T_FORMATS
    } else {
        SPACE_FORMATS
    };
    match NaiveDateTime::parse_from_str(text, naive_format) {
        Ok(naive) => Ok(naive.and_utc()),
        Err(naive_error) => DateTime::parse_from_str(text, offset_format)
            .map(|stamp| stamp.with_timezone(&Utc))
            .map_err(|_| ParseTimestampError::ChronoError {
                input: text.to_string(),
                source: naive_error,
            }),
    }
}

/// Formats a timestamp the way RCDB stores it, appending a fractional part only
/// when the instant has sub-second precision.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn full_timestamp_round_trips() {
        let parsed = parse_timestamp("2015-12-08 15:47:20").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2015, 12, 8, 15, 47, 20).unwrap());
        assert_eq!(format_timestamp(&parsed), "2015-12-08 15:47:20");
        assert_eq!(parse_timestamp("2015-12-08T15:47:20").unwrap(), parsed);
    }

    #[test]
    fn fractional_seconds_are_kept() {
        let parsed = parse_timestamp("2015-12-08 15:47:20.250000").unwrap();
        assert_eq!(parsed.nanosecond(), 250_000_000);
        assert_eq!(parse_timestamp(&format_timestamp(&parsed)).unwrap(), parsed);
    }

    #[test]
    fn explicit_offset_is_converted_to_utc() {
        let parsed = parse_timestamp("2016-02-10 08:30:15+05:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2016, 2, 10, 3, 30, 15).unwrap());
        assert_eq!(parsed.nanosecond(), 0);
    }

    #[test]
    fn incomplete_timestamps_are_rejected() {
        for text in ["2016-02-10", "2016-02", "2016", "2016-02-10 08:30"] {
            assert!(
                matches!(
                    parse_timestamp(text),
                    Err(ParseTimestampError::ChronoError { .. })
                ),
                "{text} should not parse"
            );
        }
    }

    #[test]
    fn oversized_fields_are_rejected() {
        assert!(parse_timestamp("2016-02-10 08:30:99999999999999999999").is_err());
        assert!(parse_timestamp("2016-13-01 00:00:00").is_err());
        assert!(parse_timestamp("2016-02-30 00:00:00").is_err());
    }

    #[test]
    fn trailing_text_is_rejected() {
        assert!(parse_timestamp("2016-02-10 08:30:15 local").is_err());
        assert!(parse_timestamp("2016-02-10 08:30:15+5").is_err());
    }

    #[test]
    fn blank_text_is_empty() {
        assert_eq!(parse_timestamp(""), Err(ParseTimestampError::Empty));
        assert_eq!(parse_timestamp("  "), Err(ParseTimestampError::Empty));
    }
}
