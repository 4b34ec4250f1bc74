//! Time helpers: downtime formatting and timezone rendering.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format the downtime between `last_down` and now as `"<N> minutes"`.
///
/// `None` (no outage recorded yet) yields `"0 minutes"`. The count is whole
/// minutes, truncated.
pub fn downtime_since(last_down: Option<DateTime<Utc>>) -> String {
    downtime_between(last_down, Utc::now())
}

/// Like [`downtime_since`], against an explicit reference time.
pub fn downtime_between(last_down: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let minutes = match last_down {
        Some(from) => (now - from).num_minutes().max(0),
        None => 0,
    };

    format!("{minutes} minutes")
}

/// Re-render an RFC 3339 timestamp (Airflow heartbeats carry nanoseconds) in
/// the given timezone. Returns the raw input unchanged when it does not
/// parse, so a malformed upstream value still surfaces in the message.
pub fn render_in_tz(raw: &str, tz: Tz) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Parse a timezone name from config, defaulting to UTC when missing or
/// unknown.
pub fn parse_tz(name: Option<&str>) -> Tz {
    name.and_then(|n| n.parse().ok()).unwrap_or(chrono_tz::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_downtime_none_is_zero() {
        assert_eq!(downtime_since(None), "0 minutes");
    }

    #[test]
    fn test_downtime_whole_minutes() {
        let from = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 7, 59).unwrap();
        assert_eq!(downtime_between(Some(from), now), "7 minutes");
    }

    #[test]
    fn test_downtime_is_non_decreasing() {
        let from = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let mut last = 0;
        for secs in [0, 59, 60, 61, 600, 3600] {
            let now = from + chrono::Duration::seconds(secs);
            let rendered = downtime_between(Some(from), now);
            let minutes: i64 = rendered
                .split(' ')
                .next()
                .unwrap()
                .parse()
                .expect("leading minute count");
            assert!(minutes >= last, "downtime went backwards: {rendered}");
            last = minutes;
        }
    }

    #[test]
    fn test_render_in_tz() {
        let rendered = render_in_tz("2026-03-01T10:00:00.123456+00:00", chrono_tz::Asia::Jakarta);
        assert_eq!(rendered, "2026-03-01 17:00:00 WIB");
    }

    #[test]
    fn test_render_unparseable_passthrough() {
        assert_eq!(render_in_tz("not-a-time", chrono_tz::UTC), "not-a-time");
    }

    #[test]
    fn test_parse_tz_default() {
        assert_eq!(parse_tz(None), chrono_tz::UTC);
        assert_eq!(parse_tz(Some("Asia/Jakarta")), chrono_tz::Asia::Jakarta);
        assert_eq!(parse_tz(Some("Not/AZone")), chrono_tz::UTC);
    }
}
