//! Process-wide connectivity state.
//!
//! # Responsibilities
//! - Track whether the runtime believes the network is reachable
//! - Let requests fail fast instead of hanging while offline
//!
//! # Design Decisions
//! - Shared through `Arc` by every actor's pipeline
//! - Updated only by external online/offline signals, never inferred from
//!   individual request failures

use std::sync::atomic::{AtomicBool, Ordering};

/// Online/offline flag fed by runtime signals.
#[derive(Debug)]
pub struct Connectivity {
    online: AtomicBool,
}

impl Connectivity {
    /// Starts online.
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn set_online(&self) {
        self.set(true);
    }

    pub fn set_offline(&self) {
        self.set(false);
    }

    /// Record a connectivity signal. Returns true if the state changed.
    pub fn set(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            if online {
                tracing::info!("Connectivity restored");
            } else {
                tracing::warn!("Connectivity lost, requests will fail fast");
            }
        }
        previous != online
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new()
    }
}
