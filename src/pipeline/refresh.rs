//! Single-flight credential refresh.
//!
//! # States
//! - Idle: no refresh running
//! - Refreshing: one leader is calling the refresh endpoint; everyone else
//!   queues a continuation and waits
//!
//! # State Transitions
//! ```text
//! Idle → Refreshing: first caller to join becomes the leader
//! Refreshing → Idle: leader settles; queued callers woken FIFO with the outcome
//! ```
//!
//! # Design Decisions
//! - Clearing the flag and draining the queue happen under one lock, so a
//!   caller arriving afterwards starts a fresh flight instead of joining a
//!   settled one
//! - The lock is never held across `.await`
//! - A dropped leader settles as a soft failure, so the state cannot stay
//!   stuck in Refreshing

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Result of one refresh flight, as seen by every waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed { hard: bool },
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Refreshed => "refreshed",
            RefreshOutcome::Failed { hard: true } => "failed_hard",
            RefreshOutcome::Failed { hard: false } => "failed_soft",
        }
    }
}

#[derive(Debug, Default)]
struct RefreshState {
    is_refreshing: bool,
    subscribers: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Per-actor refresh coordinator.
#[derive(Debug, Default)]
pub struct SingleFlight {
    state: Mutex<RefreshState>,
}

/// How a caller takes part in the current flight.
#[derive(Debug)]
pub enum Ticket<'a> {
    /// Perform the refresh, then settle the guard.
    Leader(LeaderGuard<'a>),
    /// Wait for the leader's outcome.
    Follower(oneshot::Receiver<RefreshOutcome>),
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join the current flight, or start one.
    pub fn join(&self) -> Ticket<'_> {
        let mut state = self.lock();
        if state.is_refreshing {
            let (tx, rx) = oneshot::channel();
            state.subscribers.push(tx);
            Ticket::Follower(rx)
        } else {
            state.is_refreshing = true;
            Ticket::Leader(LeaderGuard {
                flight: self,
                settled: false,
            })
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().is_refreshing
    }

    /// Callers currently waiting on the leader.
    pub fn waiting(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn settle(&self, outcome: RefreshOutcome) -> usize {
        let mut state = self.lock();
        state.is_refreshing = false;
        let subscribers = std::mem::take(&mut state.subscribers);
        let woken = subscribers.len();
        for subscriber in subscribers {
            // A waiter that went away has nothing left to resubmit.
            let _ = subscriber.send(outcome);
        }
        woken
    }
}

/// Held by the caller performing the refresh.
#[derive(Debug)]
pub struct LeaderGuard<'a> {
    flight: &'a SingleFlight,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// End the flight and wake all waiters. Returns how many were woken.
    pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.flight.settle(outcome)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Refresh abandoned before completion, failing waiters");
            self.flight.settle(RefreshOutcome::Failed { hard: false });
        }
    }
}
