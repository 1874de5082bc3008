//! Time-related abstractions.
//!
//! `Instant`, `sleep`, and `timeout` all come from `tokio::time`, so tests that
//! run with a paused clock (`#[tokio::test(start_paused = true)]`) control
//! download ticks and recommendation timeouts deterministically.

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};
pub use tokio::time::error::Elapsed;
pub use tokio::time::{sleep, timeout, Instant, Sleep, Timeout};

/// Milliseconds since the Unix epoch, or 0 if the system clock is before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
