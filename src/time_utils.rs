use chrono::DateTime;

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Format timestamp according to the visible time span using UTC components.
///
/// - span up to two days -> `HH:MM`
/// - span up to a year -> `DD.MM`
/// - longer spans -> `MM.YYYY`
pub fn format_time_label(timestamp_ms: i64, visible_span_ms: i64) -> String {
    let Some(date) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return timestamp_ms.to_string();
    };
    let span = visible_span_ms.saturating_abs();
    if span <= 2 * DAY_MS {
        date.format("%H:%M").to_string()
    } else if span <= 365 * DAY_MS {
        date.format("%d.%m").to_string()
    } else {
        date.format("%m.%Y").to_string()
    }
}

/// Full `YYYY-MM-DD HH:MM` UTC stamp used by the tap overlay.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}
