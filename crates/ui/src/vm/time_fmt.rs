use chrono::{DateTime, Local, Utc};

/// Local wall-clock time, e.g. `14:05:09`.
#[must_use]
pub fn format_time(value: DateTime<Utc>) -> String {
    value.with_timezone(&Local).format("%H:%M:%S").to_string()
}
