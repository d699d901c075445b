use chrono::DateTime;
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{ArchiveError, Result};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── Timezone parsing ──────────────────────────────────────────────────────────

/// Parse an IANA timezone name, or `"auto"` for the system timezone.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    let resolved = if name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    };
    resolved
        .parse::<Tz>()
        .map_err(|_| ArchiveError::Config(format!("unrecognised timezone \"{}\"", resolved)))
}

/// Like [`parse_timezone`] but falls back to UTC with a warning.
pub fn resolve_timezone(name: &str) -> Tz {
    parse_timezone(name).unwrap_or_else(|e| {
        warn!("{}, falling back to UTC", e);
        Tz::UTC
    })
}

/// Validate that `tz_name` is a recognised IANA timezone identifier.
pub fn validate_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

// ── Epoch conversion ──────────────────────────────────────────────────────────

/// Convert epoch milliseconds to a local instant in `tz`.
///
/// Sub-second precision is kept. Returns `None` when `millis` is outside
/// the range chrono can represent.
pub fn datetime_from_millis(millis: i64, tz: Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(&tz))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_validate_timezone_valid() {
        assert!(validate_timezone("UTC"));
        assert!(validate_timezone("Europe/Warsaw"));
        assert!(validate_timezone("America/New_York"));
    }

    #[test]
    fn test_validate_timezone_invalid() {
        assert!(!validate_timezone("Mars/Olympus_Mons"));
        assert!(!validate_timezone(""));
    }

    #[test]
    fn test_parse_timezone_named() {
        assert_eq!(parse_timezone("Asia/Tokyo").unwrap(), Tz::Asia__Tokyo);
    }

    #[test]
    fn test_parse_timezone_invalid_is_config_error() {
        let err = parse_timezone("Not/AZone").unwrap_err();
        assert!(matches!(err, ArchiveError::Config(_)));
        assert!(err.to_string().contains("Not/AZone"));
    }

    #[test]
    fn test_resolve_timezone_invalid_falls_back_to_utc() {
        assert_eq!(resolve_timezone("Not/AZone"), Tz::UTC);
    }

    #[test]
    fn test_resolve_timezone_auto_does_not_panic() {
        // Result depends on the host; any valid zone is fine.
        let tz = resolve_timezone("auto");
        assert!(validate_timezone(tz.name()));
    }

    #[test]
    fn test_datetime_from_millis_keeps_subsecond() {
        let dt = datetime_from_millis(1_709_985_600_250, Tz::UTC).unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 3);
        assert_eq!(dt.day(), 9);
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_datetime_from_millis_applies_timezone() {
        // 2024-03-09T12:00:00Z is 21:00 in Tokyo.
        let dt = datetime_from_millis(1_709_985_600_000, Tz::Asia__Tokyo).unwrap();
        assert_eq!(dt.hour(), 21);
    }

    #[test]
    fn test_datetime_from_millis_out_of_range() {
        assert!(datetime_from_millis(i64::MAX, Tz::UTC).is_none());
    }
}
