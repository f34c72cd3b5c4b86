use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

/// Millisecond-precision ISO-8601; lexicographic order equals temporal order
/// for any two stamps produced with this format.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_stamp(dt: DateTime<Utc>) -> String { dt.format(DATE_FORMAT).to_string() }

/// Stamp for the genesis table: a fixed 0 ms base plus 1 ms per table row,
/// so insertion order and lexicographic order agree and re-runs are
/// byte-identical.
pub fn genesis_stamp(step: u64) -> String {
    let dt = DateTime::from_timestamp_millis(step as i64).unwrap_or(DateTime::UNIX_EPOCH);
    format_stamp(dt)
}

/// Issues strictly increasing stamps. If the wall clock stalls or steps
/// backwards, the next stamp is bumped 1 ms past the previous one.
#[derive(Debug)]
pub struct WallClock {
    last: Mutex<DateTime<Utc>>,
}

impl WallClock {
    pub fn new() -> Self { Self { last: Mutex::new(DateTime::UNIX_EPOCH) } }

    pub fn now_stamp(&self) -> String {
        let mut last = self.last.lock().unwrap();
        let mut now = Utc::now();
        if now <= *last {
            now = *last + Duration::milliseconds(1);
        }
        *last = now;
        format_stamp(now)
    }
}

impl Default for WallClock {
    fn default() -> Self { Self::new() }
}
