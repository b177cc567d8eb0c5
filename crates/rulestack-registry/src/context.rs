use std::time::{Duration, Instant};

/// Default deadline applied when a caller does not supply one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A deadline threaded through every registry operation. Every constructor
/// that does not take an explicit duration falls back to [`DEFAULT_TIMEOUT`].
/// Cancellation is left to the caller: dropping the future that holds a
/// `CallContext` is enough, since backends check `is_expired`/`remaining`
/// rather than polling a separate cancel flag.
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    deadline: Instant,
}

impl CallContext {
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
        }
    }

    /// How much time is left before the deadline. Zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}
