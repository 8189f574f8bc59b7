//! Channel-based data source.
//!
//! Receives event lists via a tokio watch channel. Useful when statusboard
//! is embedded in a process that already holds the events.

use tokio::sync::watch;

use statusboard_types::StatusEvent;

use super::{Batch, DataSource};

/// A data source that receives status events via a channel.
///
/// Each value sent replaces the whole event list.
///
/// # Example
///
/// ```
/// use statusboard::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("embedded");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Vec<StatusEvent>>,
    description: String,
    generation: u64,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    pub fn new(receiver: watch::Receiver<Vec<StatusEvent>>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            generation: 0,
            initial_returned: false,
        }
    }

    /// Create a channel pair. The sender pushes complete event lists.
    pub fn create(source_description: &str) -> (watch::Sender<Vec<StatusEvent>>, Self) {
        let (tx, rx) = watch::channel(Vec::new());
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Batch> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if !self.receiver.has_changed().unwrap_or(false) {
            return None;
        }

        self.generation += 1;
        Some(Batch {
            generation: self.generation,
            events: self.receiver.borrow_and_update().clone(),
            services: Vec::new(),
        })
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }

    fn refresh(&mut self) {
        self.receiver.mark_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statusboard_types::Status;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");

        // Initially returns the default (empty) list
        let batch = source.poll().unwrap();
        assert!(batch.events.is_empty());
        assert_eq!(batch.generation, 1);

        // No change, so poll returns None
        assert!(source.poll().is_none());

        tx.send(vec![StatusEvent::new(
            "a",
            "2025-12-10 01:00:00+00",
            Status::Ok,
        )])
        .unwrap();

        let batch = source.poll().unwrap();
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.generation, 2);
    }

    #[test]
    fn test_channel_source_refresh_replays_current_value() {
        let (_tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();
        assert!(source.poll().is_none());

        source.refresh();
        assert!(source.poll().is_some());
    }
}
