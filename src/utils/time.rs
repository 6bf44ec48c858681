use chrono::prelude::*;
use chrono::Duration;

/// Convert a Windows FILETIME (100-nanosecond ticks since 1601-01-01 UTC)
/// to a UTC datetime. Returns `None` when the value falls outside the
/// representable range.
pub(crate) fn datetime_from_filetime(filetime: u64) -> Option<DateTime<Utc>> {
    let windows_epoch = NaiveDate::from_ymd_opt(1601, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let datetime = windows_epoch.checked_add_signed(Duration::microseconds((filetime / 10) as i64))?;
    Some(Utc.from_utc_datetime(&datetime))
}
