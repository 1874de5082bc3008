//! Async runtime seam for the Svaram playback core.
//!
//! Every core-* crate spawns tasks, sleeps, and builds channels through this
//! crate instead of naming Tokio directly. The playback core only needs a small
//! surface: spawning timer tasks, bounded waits, and the channels the service
//! actor uses as its mailbox.
//!
//! # Modules
//!
//! - `task`: Task spawning, plus [`task::TaskGuard`] which aborts a task when dropped
//! - `time`: Sleep, timeout, and monotonic instants (pausable in tests)
//! - `sync`: Channels
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let guard = task::TaskGuard::new(task::spawn(async {
//!         loop {
//!             sleep(Duration::from_millis(250)).await;
//!         }
//!     }));
//!
//!     // Dropping the guard cancels the loop.
//!     drop(guard);
//! }
//! ```

pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
