//! # statusboard-types
//!
//! Core types for statusboard, plus the pure engine that turns a stream of
//! timestamped status checks into per-day, per-service rollups.
//!
//! Nothing in this crate performs I/O. Callers fetch rows from wherever they
//! live (a REST backend, a JSON file, a test fixture), hand them to
//! [`aggregate`], and read the resulting [`DailyBuckets`] with keyed lookups.
//!
//! ## Features
//!
//! - `serde`: (de)serialization of events, summaries and keys in the
//!   backend's row format
//!
//! ## Example
//!
//! ```rust
//! use chrono::FixedOffset;
//! use statusboard_types::{aggregate, DateKey, DayStatus, Status, StatusEvent};
//!
//! let events = vec![
//!     StatusEvent::new("api", "2025-12-09 23:55:00+00", Status::Ok),
//!     StatusEvent::new("api", "2025-12-10 00:05:00+00", Status::Error),
//! ];
//!
//! // Viewer sits at UTC+9: both checks land on the 10th locally.
//! let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
//! let result = aggregate(&events, &seoul);
//!
//! let day: DateKey = "2025-12-10".parse().unwrap();
//! assert_eq!(result.buckets.status(&day, &"api".into()), DayStatus::Reported(Status::Error));
//!
//! let before: DateKey = "2025-12-09".parse().unwrap();
//! assert_eq!(result.buckets.status(&before, &"api".into()), DayStatus::NoData);
//! ```

mod aggregate;
mod calendar;
mod error;
mod event;
mod status;
mod timestamp;

pub use aggregate::*;
pub use calendar::*;
pub use error::*;
pub use event::*;
pub use status::*;
pub use timestamp::*;
