pub mod timestamp {
    use chrono::{DateTime, TimeZone as _, Utc};

    /// Numeric timestamps above this value are read as milliseconds.
    const MILLISECONDS_THRESHOLD: u64 = 100_000_000_000;

    /// Parses an instant as sent by GPS trackers: either RFC 3339 or unix
    /// seconds/milliseconds given as a number string.
    pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
            return Some(datetime.with_timezone(&Utc));
        }
        if let Ok(number) = value.parse::<i64>() {
            return if number.unsigned_abs() >= MILLISECONDS_THRESHOLD {
                Utc.timestamp_millis_opt(number).single()
            } else {
                Utc.timestamp_opt(number, 0).single()
            };
        }
        let number: f64 = value.parse().ok()?;
        if !number.is_finite() {
            return None;
        }
        let seconds = if number.abs() >= MILLISECONDS_THRESHOLD as f64 {
            number / 1000.0
        } else {
            number
        };
        from_fractional_seconds(seconds)
    }

    fn from_fractional_seconds(seconds: f64) -> Option<DateTime<Utc>> {
        let whole = seconds.floor();
        if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
            return None;
        }
        let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
        Utc.timestamp_opt(whole as i64, nanos).single()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_rfc3339() {
            let instant = parse_instant("2024-08-03T12:00:00+02:00").unwrap();
            assert_eq!(instant.to_rfc3339(), "2024-08-03T10:00:00+00:00");
        }

        #[test]
        fn test_parse_unix_seconds_and_millis() {
            let seconds = parse_instant("1722686400").unwrap();
            let millis = parse_instant("1722686400000").unwrap();
            assert_eq!(seconds, millis);
        }

        #[test]
        fn test_parse_fractional_seconds() {
            let instant = parse_instant("1722686400.5").unwrap();
            assert_eq!(instant.timestamp(), 1722686400);
            assert_eq!(instant.timestamp_subsec_millis(), 500);
            assert_eq!(
                parse_instant("1722686400000.0"),
                parse_instant("1722686400")
            );
        }

        #[test]
        fn test_parse_extreme_numbers() {
            assert!(parse_instant("-9223372036854775808").is_none());
            assert!(parse_instant("9223372036854775807").is_none());
            assert!(parse_instant("1e300").is_none());
            assert!(parse_instant("NaN").is_none());
        }

        #[test]
        fn test_parse_garbage() {
            assert!(parse_instant("yesterday").is_none());
            assert!(parse_instant("").is_none());
        }
    }
}

/// Serializes an `f64` rounded to two decimals.
pub mod two_decimals {
    use serde::Serializer;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(crate::geo::round_to(*value, 2))
    }
}
