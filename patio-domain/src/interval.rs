use chrono::{DateTime, Utc};

/// A window is valid only when it has positive length. Zero-length
/// windows are rejected.
pub fn is_valid_range(start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    start < end
}

/// Duration of `[start, end)` in fractional hours.
pub fn segment_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, min, 0).unwrap()
    }

    #[test]
    fn valid_range_requires_strict_order() {
        assert!(is_valid_range(at(9, 0), at(21, 0)));
        assert!(!is_valid_range(at(9, 0), at(9, 0)));
        assert!(!is_valid_range(at(21, 0), at(9, 0)));
    }

    #[test]
    fn segment_hours_is_fractional() {
        assert_eq!(segment_hours(at(9, 0), at(13, 0)), 4.0);
        assert_eq!(segment_hours(at(9, 0), at(9, 30)), 0.5);
        assert_eq!(segment_hours(at(13, 0), at(14, 15)), 1.25);
    }
}
