//! Backend data source.
//!
//! Loads run as background tasks on a tokio runtime and report back over a
//! channel. Each load is tagged with a generation number when it is
//! requested; results older than the newest one applied are dropped, so an
//! earlier slow response never replaces a later one.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use statusboard_gateway::Gateway;

use super::{Batch, DataSource};

type LoadResult = (u64, Result<Batch, String>);

/// A data source that fetches services and events through a [`Gateway`].
pub struct GatewaySource {
    gateway: Arc<dyn Gateway>,
    runtime: Handle,
    description: String,
    history_days: i64,
    sender: mpsc::UnboundedSender<LoadResult>,
    receiver: mpsc::UnboundedReceiver<LoadResult>,
    /// Generation handed to the most recent load request.
    requested: u64,
    /// Generation of the batch currently on screen.
    applied: u64,
    last_error: Option<String>,
}

impl fmt::Debug for GatewaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySource")
            .field("description", &self.description)
            .field("history_days", &self.history_days)
            .field("requested", &self.requested)
            .field("applied", &self.applied)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl GatewaySource {
    /// Create a source that spawns loads on `runtime`.
    ///
    /// Nothing is fetched until the first [`refresh`](DataSource::refresh).
    pub fn new(
        gateway: Arc<dyn Gateway>,
        runtime: Handle,
        source_description: &str,
        history_days: i64,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            gateway,
            runtime,
            description: format!("backend: {}", source_description),
            history_days,
            sender,
            receiver,
            requested: 0,
            applied: 0,
            last_error: None,
        }
    }

    /// Fold one finished load into the source state.
    ///
    /// Returns the batch if it is newer than everything applied so far.
    fn accept(&mut self, generation: u64, result: Result<Batch, String>) -> Option<Batch> {
        if generation <= self.applied {
            debug!(generation, applied = self.applied, "Discarding stale load");
            return None;
        }

        match result {
            Ok(batch) => {
                self.applied = generation;
                self.last_error = None;
                Some(batch)
            }
            Err(e) if generation == self.requested => {
                warn!(generation, error = %e, "Load failed");
                self.last_error = Some(e);
                None
            }
            Err(e) => {
                debug!(generation, requested = self.requested, error = %e, "Superseded load failed");
                None
            }
        }
    }
}

async fn load(
    gateway: Arc<dyn Gateway>,
    generation: u64,
    history_days: i64,
) -> Result<Batch, String> {
    let since = Utc::now() - Duration::days(history_days);
    let (services, events) =
        tokio::try_join!(gateway.latest_statuses(), gateway.fetch_events(Some(since)))
            .map_err(|e| e.to_string())?;

    debug!(
        generation,
        services = services.len(),
        events = events.len(),
        "Loaded status data"
    );
    Ok(Batch {
        generation,
        events,
        services,
    })
}

impl DataSource for GatewaySource {
    fn poll(&mut self) -> Option<Batch> {
        let mut newest = None;
        while let Ok((generation, result)) = self.receiver.try_recv() {
            if let Some(batch) = self.accept(generation, result) {
                newest = Some(batch);
            }
        }
        newest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn refresh(&mut self) {
        self.requested += 1;
        let generation = self.requested;
        let gateway = self.gateway.clone();
        let sender = self.sender.clone();
        let history_days = self.history_days;

        self.runtime.spawn(async move {
            let result = load(gateway, generation, history_days).await;
            // Receiver gone means the TUI has exited.
            let _ = sender.send((generation, result));
        });
    }
}
