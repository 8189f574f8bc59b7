//! # statusboard
//!
//! A terminal status page for HTTP services, and the library behind it.
//!
//! Health checks are stored as raw per-check events. statusboard fetches
//! them, groups them into calendar days in the viewer's timezone, and
//! renders the result: an overall banner, one row per service with a strip
//! of recent days, and month calendars of the worst status per day.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(board)   │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── GatewaySource | FileSource | ChannelSource │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) for the REST
//!   backend, a JSON file, or an in-memory channel
//! - **[`data`]**: [`BoardData`] built from each batch, plus JSON export
//! - **[`ui`]**: Terminal rendering using ratatui
//! - **[`config`]**: Layered settings and the viewer's timezone
//!
//! Day bucketing lives in `statusboard-types`; the REST client, health probes
//! and Slack alerts live in `statusboard-gateway`.
//!
//! ## Usage
//!
//! ```bash
//! # Live view of the configured backend
//! statusboard --config statusboard.toml
//!
//! # View a JSON dump of events, bucketed in Seoul time
//! statusboard --file events.json --timezone Asia/Seoul
//!
//! # One health-check pass
//! statusboard check
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use statusboard::{App, ChannelSource, ViewOptions};
//!
//! let (tx, source) = ChannelSource::create("embedded");
//! let app = App::new(Box::new(source), ViewOptions::default());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

pub use app::{App, View, ViewOptions};
pub use config::{Settings, ViewerZone};
pub use data::{BoardData, ExportDocument, ServiceRow};
pub use source::{Batch, ChannelSource, DataSource, FileSource, GatewaySource};
