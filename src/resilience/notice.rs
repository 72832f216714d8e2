//! Rate limiting for user-facing notices.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Lets one notice through per cooldown window.
#[derive(Debug)]
pub struct NoticeThrottle {
    cooldown: Duration,
    last_emitted: Mutex<Option<Instant>>,
}

impl NoticeThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emitted: Mutex::new(None),
        }
    }

    /// Returns true if a notice may be shown now, and starts a new window.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut last = self
            .last_emitted
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match *last {
            Some(at) if now.duration_since(at) < self.cooldown => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
