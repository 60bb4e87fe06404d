//! Write timestamps
//!
//! Microseconds since the epoch, strictly increasing per session. The store
//! lets a tombstone win a timestamp tie, so a write issued right after a
//! delete must never reuse the delete's timestamp.

use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Default)]
pub(crate) struct Clock {
    last: i64,
}

impl Clock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Next timestamp, never equal to or below a previously returned one
    pub(crate) fn tick(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        self.last = now.max(self.last + 1);
        self.last
    }
}
