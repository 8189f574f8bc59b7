//! File-based data source.
//!
//! Polls a JSON file of status events.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Deserialize;
use statusboard_gateway::{Service, ServiceStatus};
use statusboard_types::StatusEvent;

use super::{Batch, DataSource};

/// Accepted file layouts: a bare array of log rows, or rows plus services.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileContents {
    Events(Vec<StatusEvent>),
    Full {
        #[serde(default)]
        services: Vec<Service>,
        events: Vec<StatusEvent>,
    },
}

/// A data source that reads status events from a JSON file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    generation: u64,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
            generation: 0,
        }
    }

    /// Returns the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Read and parse the file.
    fn read_file(&mut self) -> Option<FileContents> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(contents) => {
                    self.last_error = None;
                    Some(contents)
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}", e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Batch> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep what we have
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            return None;
        }

        let contents = self.read_file()?;
        self.last_modified = current_modified;
        self.generation += 1;

        let (events, services) = match contents {
            FileContents::Events(events) => (events, Vec::new()),
            FileContents::Full { services, events } => (
                events,
                services
                    .into_iter()
                    .map(|service| ServiceStatus {
                        service,
                        current: None,
                        last_checked: None,
                    })
                    .collect(),
            ),
        };

        tracing::debug!(path = %self.path.display(), events = events.len(), "Loaded events file");
        Some(Batch {
            generation: self.generation,
            events,
            services,
        })
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn refresh(&mut self) {
        self.last_modified = None;
    }
}
