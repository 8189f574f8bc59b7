//! Display data derived from status events.
//!
//! ## Submodules
//!
//! - [`board`]: [`BoardData`], the per-refresh model every view renders
//! - [`duration`]: parsing refresh intervals and formatting elapsed times
//! - [`export`]: JSON export of derived daily summaries
//!
//! ## Data Flow
//!
//! ```text
//! Batch (events + services)
//!        │
//!        ▼
//! ViewerZone::aggregate()
//!        │
//!        ▼
//! DailyBuckets ──▶ BoardData::build() ──▶ ServiceRow (current, uptime, strip)
//!                         │
//!                         └──▶ ExportDocument (daily summaries, rejected rows)
//! ```

pub mod board;
pub mod duration;
pub mod export;

pub use board::{BoardData, ServiceRow};
pub use export::ExportDocument;
