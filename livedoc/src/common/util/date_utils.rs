use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, or zero when the clock is before it.
#[inline]
pub fn current_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
