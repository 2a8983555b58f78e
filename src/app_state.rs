//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::service::RaffleManager;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// There is exactly one [`RaffleManager`] per process. Handlers hold the
/// lock for the whole of a mutation, so draws and removals reach the
/// manager one at a time.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The raffle.
    pub raffle: Arc<Mutex<RaffleManager>>,
}

impl AppState {
    /// Wraps a loaded manager.
    #[must_use]
    pub fn new(raffle: RaffleManager) -> Self {
        Self {
            raffle: Arc::new(Mutex::new(raffle)),
        }
    }
}
