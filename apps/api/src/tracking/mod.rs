//! Progress logging and study time tracking.

use chrono::{DateTime, Utc};

pub mod handlers;

/// Whole minutes between session start and end, floored at zero.
/// Clock skew between client-supplied timestamps must not produce a
/// negative duration.
pub fn session_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> i32 {
    let minutes = (ended_at - started_at).num_minutes();
    minutes.clamp(0, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_minutes_floors_partial_minutes() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 2, 9, 45, 59).unwrap();
        assert_eq!(session_minutes(start, end), 45);
    }

    #[test]
    fn test_session_minutes_never_negative() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        assert_eq!(session_minutes(start, end), 0);
    }

    #[test]
    fn test_session_minutes_multi_hour() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 2, 12, 30, 0).unwrap();
        assert_eq!(session_minutes(start, end), 210);
    }
}
