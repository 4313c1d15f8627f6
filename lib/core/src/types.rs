use chrono::{NaiveDate, Utc};

/// Random identifier: a dashless UUIDv4, 32 hex chars.
///
/// Used for request ids, sessions, maintenance tasks and agenda
/// entries alike.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current instant as an RFC 3339 string, for createdAt/updatedAt
/// columns.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Today's date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a form date (`YYYY-MM-DD`), tolerating surrounding whitespace.
///
/// Usage windows and expiration dates are stored in this format; system
/// timestamps use RFC 3339 instead. The plain lexicographic ordering of
/// `YYYY-MM-DD` strings matches date order, which the expiry queries
/// rely on.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Format a date back into the stored `YYYY-MM-DD` form.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dashless_and_unique() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
        assert_ne!(a, b);
    }

    #[test]
    fn timestamps_are_rfc3339() {
        assert!(now_rfc3339().contains('T'));
    }

    #[test]
    fn dates_round_trip() {
        let d = parse_date("2026-03-14").unwrap();
        assert_eq!(format_date(d), "2026-03-14");
        assert_eq!(parse_date("  2026-03-14 "), Some(d));
    }

    #[test]
    fn bad_dates_are_rejected() {
        assert!(parse_date("14/03/2026").is_none());
        assert!(parse_date("2026-13-01").is_none());
        assert!(parse_date("").is_none());
    }
}
