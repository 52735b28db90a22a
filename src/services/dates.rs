//! Epoch-millisecond helpers: day boundaries and ISO calendar dates.

use time::{
    Date, OffsetDateTime, Time, UtcOffset, format_description::well_known::Rfc3339,
    macros::format_description,
};

const NANOS_PER_MILLI: i128 = 1_000_000;

fn to_datetime(epoch_ms: i64, offset: UtcOffset) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * NANOS_PER_MILLI)
        .ok()
        .map(|dt| dt.to_offset(offset))
}

fn to_epoch_ms(dt: OffsetDateTime) -> i64 {
    (dt.unix_timestamp_nanos() / NANOS_PER_MILLI) as i64
}

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    to_epoch_ms(OffsetDateTime::now_utc())
}

/// Widen `[start, end]` to whole days: 00:00:00.000 of the start day through
/// 23:59:59.999 of the end day, both evaluated in `offset`.
pub fn normalize_epoch_range(start_ms: i64, end_ms: i64, offset: UtcOffset) -> (i64, i64) {
    let start = to_datetime(start_ms, offset)
        .map(|dt| to_epoch_ms(dt.replace_time(Time::MIDNIGHT)))
        .unwrap_or(start_ms);
    let end = to_datetime(end_ms, offset)
        .and_then(|dt| {
            Time::from_hms_milli(23, 59, 59, 999)
                .ok()
                .map(|t| dt.replace_time(t))
        })
        .map(to_epoch_ms)
        .unwrap_or(end_ms);
    (start, end)
}

/// `YYYY-MM-DD` of an epoch in UTC.
pub fn format_iso_date(epoch_ms: i64) -> Option<String> {
    to_datetime(epoch_ms, UtcOffset::UTC)?
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .ok()
}

/// Parse `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_iso_date(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(date) = Date::parse(value, format_description!("[year]-[month]-[day]")) {
        return Some(to_epoch_ms(date.midnight().assume_utc()));
    }
    OffsetDateTime::parse(value, &Rfc3339).ok().map(to_epoch_ms)
}
