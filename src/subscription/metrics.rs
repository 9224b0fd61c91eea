//! Traffic and date arithmetic for the dashboard.
//!
//! Everything here is a pure function of its inputs. Timestamps are Unix
//! seconds; calendar calculations take the user's local date.

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, Utc};
use serde::Serialize;

use super::record::SubscriptionRecord;

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Sentinel for [`ExpirySnapshot::remaining_days`] when the plan never expires.
pub const NEVER_EXPIRES: i64 = -1;

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Percentage of the quota that has been used.
///
/// Returns `0.0` for a zero quota. Not clamped above 100; callers show
/// values of 100 or more as "exceeded".
#[must_use]
pub fn usage_percentage(used: u64, quota: u64) -> f64 {
    if quota == 0 {
        return 0.0;
    }
    used as f64 * 100.0 / quota as f64
}

/// Whole days from `now` until `target`, rounded up. Never negative.
#[must_use]
pub fn remaining_days(now: i64, target: i64) -> i64 {
    let diff = target.saturating_sub(now);
    if diff <= 0 {
        return 0;
    }
    diff.saturating_add(SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

/// The next date on which traffic resets.
///
/// This month's `reset_day` if today's day-of-month is still before it,
/// otherwise next month's. Months shorter than `reset_day` reset on their
/// last day.
#[must_use]
pub fn next_reset_date(today: NaiveDate, reset_day: u32) -> NaiveDate {
    let Some(first_of_month) = today.with_day(1) else {
        return today;
    };
    let month_start = if today.day() < reset_day {
        Some(first_of_month)
    } else {
        first_of_month.checked_add_months(Months::new(1))
    };

    month_start
        .and_then(|start| {
            let day = reset_day.clamp(1, days_in_month(start));
            start.with_day(day)
        })
        .unwrap_or(today)
}

/// Days from `today` until the next reset.
#[must_use]
pub fn days_until_reset(today: NaiveDate, reset_day: u32) -> i64 {
    (next_reset_date(today, reset_day) - today).num_days().max(0)
}

fn days_in_month(first_of_month: NaiveDate) -> u32 {
    first_of_month
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

/// Human-readable byte count using binary units, e.g. `1.50 GB`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, BYTE_UNITS[unit])
}

/// Format a date with a `chrono` format string.
///
/// Returns `None` for an invalid format string instead of panicking.
pub(crate) fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

/// Local calendar date of a Unix timestamp.
pub(crate) fn local_date(timestamp: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.with_timezone(&offset).date_naive())
}

/// Traffic figures for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSnapshot {
    pub used_bytes: u64,
    pub upload_bytes: u64,
    pub download_bytes: u64,
    pub remaining_bytes: u64,
    pub quota_bytes: u64,
    pub used: String,
    pub upload: String,
    pub download: String,
    pub remaining: String,
    pub quota: String,
    /// Usage in `[0, 100]`.
    pub percentage: f64,
}

impl TrafficSnapshot {
    #[must_use]
    pub fn from_record(record: &SubscriptionRecord) -> Self {
        let used = record.used_bytes();
        let remaining = record.quota_bytes.saturating_sub(used);
        let percentage = usage_percentage(used, record.quota_bytes).clamp(0.0, 100.0);

        Self {
            used_bytes: used,
            upload_bytes: record.upload_bytes,
            download_bytes: record.download_bytes,
            remaining_bytes: remaining,
            quota_bytes: record.quota_bytes,
            used: format_bytes(used),
            upload: format_bytes(record.upload_bytes),
            download: format_bytes(record.download_bytes),
            remaining: format_bytes(remaining),
            quota: format_bytes(record.quota_bytes),
            percentage,
        }
    }

    /// Whether usage has reached the quota.
    #[must_use]
    pub fn is_exceeded(&self) -> bool {
        self.quota_bytes > 0 && self.used_bytes >= self.quota_bytes
    }
}

/// Expiry figures for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpirySnapshot {
    pub is_never_expires: bool,
    /// Days left, or [`NEVER_EXPIRES`].
    pub remaining_days: i64,
    pub formatted_date: Option<String>,
}

impl ExpirySnapshot {
    #[must_use]
    pub fn from_record(
        record: &SubscriptionRecord,
        now: i64,
        offset: FixedOffset,
        date_format: &str,
    ) -> Self {
        match record.expiry() {
            None => Self {
                is_never_expires: true,
                remaining_days: NEVER_EXPIRES,
                formatted_date: None,
            },
            Some(expires_at) => Self {
                is_never_expires: false,
                remaining_days: remaining_days(now, expires_at),
                formatted_date: local_date(expires_at, offset)
                    .and_then(|date| format_date(date, date_format)),
            },
        }
    }
}

/// Next traffic reset for periodic plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetSnapshot {
    pub reset_day: u32,
    pub days_until_reset: i64,
    pub next_reset_date: NaiveDate,
    pub formatted_date: String,
}

impl ResetSnapshot {
    /// Present only for periodic records with a non-zero reset day.
    #[must_use]
    pub fn from_record(
        record: &SubscriptionRecord,
        today: NaiveDate,
        date_format: &str,
    ) -> Option<Self> {
        record.expiry()?;
        let reset_day = record.periodic_reset_day()?;
        let next = next_reset_date(today, reset_day);

        Some(Self {
            reset_day,
            days_until_reset: days_until_reset(today, reset_day),
            next_reset_date: next,
            formatted_date: format_date(next, date_format).unwrap_or_else(|| next.to_string()),
        })
    }
}
