use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the UNIX epoch, 0 if the clock is before it
pub fn timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}
