//! Session guard: turns pipeline events into auth state changes.
//!
//! # Responsibilities
//! - Subscribe to the pipeline's session event bus
//! - Force logout on `SessionExpired` for the store's actor
//! - Raise the network banner on `NetworkUnavailable`
//!
//! # Design Decisions
//! - Events for other actors are ignored, so one bus can serve both
//! - Lagging only loses banners; the store's own failure handling still
//!   dispatches `SessionExpired` for the request that triggered it

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::http::Transport;
use crate::lifecycle::ShutdownSignal;
use crate::session::events::SessionEvent;
use crate::session::state::AuthAction;
use crate::session::store::SessionStore;

/// Spawn the guard task for a store.
pub fn spawn_session_guard<T: Transport>(
    store: Arc<SessionStore<T>>,
    mut shutdown: ShutdownSignal,
) -> JoinHandle<()> {
    let mut events = store.pipeline().subscribe();
    let actor = store.actor();

    tokio::spawn(async move {
        tracing::debug!(actor = %actor, "Session guard started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) if event.actor() != actor => {}
                    Ok(SessionEvent::SessionExpired { .. }) => {
                        tracing::warn!(actor = %actor, "Session expired, logging out");
                        store.dispatch(AuthAction::SessionExpired);
                    }
                    Ok(SessionEvent::NetworkUnavailable { .. }) => {
                        store.dispatch(AuthAction::NetworkUnavailable);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(actor = %actor, missed, "Session guard lagged behind events");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = shutdown.recv() => break,
            }
        }
        tracing::debug!(actor = %actor, "Session guard stopped");
    })
}
