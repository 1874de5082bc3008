//! Task spawning and cancellation.
//!
//! Spawned tasks run on the ambient Tokio runtime. A [`TaskGuard`] ties the
//! lifetime of a background task to an owner: when the owner drops the guard
//! (or calls [`TaskGuard::abort`]), the task is cancelled at its next await
//! point. Download timers and the service's forwarding loops are owned this way.

pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime, like `tokio::spawn`.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Owns a spawned task and aborts it on drop.
#[derive(Debug)]
pub struct TaskGuard<T = ()> {
    handle: JoinHandle<T>,
}

impl<T> TaskGuard<T> {
    pub fn new(handle: JoinHandle<T>) -> Self {
        Self { handle }
    }

    /// Cancels the task. Calling this more than once is harmless.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Drop for TaskGuard<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
