//! Expiration window evaluation

use chrono::NaiveDate;

/// Sentinel GitLab uses for tokens that never expire
pub const NEVER_EXPIRES: &str = "∞";

/// Signed whole days from `today` (UTC) until the expiry date.
///
/// `None` means the token never expires and must never be flagged: no
/// date, the `∞` sentinel, or a date that does not parse as `YYYY-MM-DD`.
/// Negative values mean the token is already expired.
pub fn days_until_expiration(expires_at: Option<&str>, today: NaiveDate) -> Option<i64> {
    let raw = expires_at?.trim();
    if raw.is_empty() || raw == NEVER_EXPIRES {
        return None;
    }

    let expiry = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some((expiry - today).num_days())
}

/// Whether the token falls inside the reporting window.
///
/// Inclusive boundary: expiring in exactly `threshold_days` days is within
/// the window. Already-expired tokens (negative days left) are within the
/// window too; operators still need to hear about them.
pub fn within_window(expires_at: Option<&str>, threshold_days: i64, today: NaiveDate) -> bool {
    matches!(
        days_until_expiration(expires_at, today),
        Some(days) if days <= threshold_days
    )
}
