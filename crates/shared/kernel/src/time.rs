//! Timestamp helpers shared by the repositories.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time as a fixed-width RFC 3339 string with microsecond
/// precision, e.g. `2026-08-24T09:15:02.000413Z`.
///
/// Every persisted timestamp uses this format: constant width keeps
/// lexicographic order identical to chronological order, so `ORDER BY`
/// over timestamp columns needs no parsing.
#[must_use]
pub fn utc_now() -> String {
    format_utc(Utc::now())
}

/// Formats an explicit instant the same way [`utc_now`] does.
#[must_use]
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_is_fixed_width() {
        let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().unwrap();
        let late = early + chrono::Duration::microseconds(1);

        let a = format_utc(early);
        let b = format_utc(late);
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(a, "2026-01-02T03:04:05.000000Z");
    }
}
