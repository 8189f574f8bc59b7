//! Data source abstraction for receiving status events.
//!
//! This module provides a trait-based abstraction for receiving event batches
//! from various sources (the REST backend, a JSON file, an in-memory channel).

mod channel;
mod file;
mod gateway;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use gateway::GatewaySource;

use std::fmt::Debug;

use statusboard_gateway::ServiceStatus;
use statusboard_types::StatusEvent;

/// One complete load of status data.
///
/// Every batch replaces the previous one wholesale; `generation` orders
/// batches so a slow, older load can never overwrite a newer one.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub generation: u64,
    pub events: Vec<StatusEvent>,
    /// Known services with their latest check. Empty when the source only
    /// has events, in which case services are taken from the events.
    pub services: Vec<ServiceStatus>,
}

/// Trait for receiving status data from various sources.
///
/// # Example
///
/// ```
/// use statusboard::{DataSource, FileSource};
///
/// let mut source = FileSource::new("events.json");
/// if let Some(batch) = source.poll() {
///     println!("Got {} events", batch.events.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest batch.
    ///
    /// Returns `Some(batch)` if new data is available, `None` otherwise.
    /// This method must be non-blocking.
    fn poll(&mut self) -> Option<Batch>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if the last load failed.
    fn error(&self) -> Option<&str>;

    /// Ask the source to load fresh data. The result shows up in a later `poll`.
    fn refresh(&mut self) {}
}
