//! Synchronization primitives.
//!
//! The service actor receives intents over `mpsc`, publishes snapshots over
//! `watch`, and answers queries over `oneshot`. Event fan-out uses `broadcast`.
//!
//! ```rust
//! use core_async::sync::watch;
//!
//! let (tx, rx) = watch::channel(0_u32);
//! tx.send_replace(1);
//! assert_eq!(*rx.borrow(), 1);
//! ```

pub use tokio::sync::{broadcast, mpsc, oneshot, watch};
