// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Convert a Unix timestamp (seconds) to a UTC datetime.
pub fn from_unix_secs(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Whether `expires_at` is still comfortably in the future.
///
/// A missing expiry never counts as valid. Negative skew is treated as
/// zero, and a skew too large to represent means nothing is valid.
pub fn is_still_valid(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>, skew_secs: i64) -> bool {
    let Some(expires_at) = expires_at else {
        return false;
    };
    Duration::try_seconds(skew_secs.max(0))
        .and_then(|skew| now.checked_add_signed(skew))
        .is_some_and(|deadline| deadline < expires_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_respects_skew() {
        let now = Utc::now();
        assert!(is_still_valid(Some(now + Duration::hours(1)), now, 60));
        assert!(!is_still_valid(Some(now + Duration::seconds(30)), now, 60));
        assert!(!is_still_valid(Some(now - Duration::seconds(1)), now, 0));
        assert!(!is_still_valid(None, now, 0));
    }

    #[test]
    fn extreme_skew_is_never_valid_and_never_panics() {
        let now = Utc::now();
        let far = Some(now + Duration::days(365));
        assert!(!is_still_valid(far, now, i64::MAX));
        assert!(!is_still_valid(far, now, 9_000_000_000_000));
    }

    #[test]
    fn negative_skew_cannot_revive_expired() {
        let now = Utc::now();
        let expired = Some(now - Duration::minutes(30));
        assert!(!is_still_valid(expired, now, -3600));
        assert!(!is_still_valid(expired, now, i64::MIN));
    }

    #[test]
    fn unix_secs_conversion() {
        let date = from_unix_secs(1_700_000_000).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2023-11-14T22:13:20Z");
    }
}
