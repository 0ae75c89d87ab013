use std::time::{Duration, Instant};

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

pub fn millis_since(start: Instant) -> u64 {
    to_millis(start.elapsed())
}
