//! # statusboard-gateway
//!
//! Everything in statusboard that talks to the network.
//!
//! - [`Gateway`]: async trait for reading status events and services and
//!   for admin writes, with [`PostgrestGateway`] as the REST implementation
//! - [`probe`]: HTTP health probes, the OK/WARN/ERROR classification rule and
//!   the one-shot [`run_checks`] pass
//! - [`SlackNotifier`]: alerts on transitions into WARN or ERROR
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use statusboard_gateway::{run_checks, PostgrestGateway, Prober};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = PostgrestGateway::builder()
//!         .url("https://project.supabase.co")
//!         .api_key("service-role-key")
//!         .build()?;
//!     let prober = Prober::new(Duration::from_secs(10))?;
//!
//!     for outcome in run_checks(&gateway, &prober, None).await? {
//!         println!("[{}] {}", outcome.result.status, outcome.service.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod gateway;
pub mod postgrest;
pub mod probe;
mod service;
pub mod slack;

pub use error::GatewayError;
pub use gateway::Gateway;
pub use postgrest::{PostgrestGateway, PostgrestGatewayBuilder};
pub use probe::{classify, run_checks, CheckOutcome, CheckResult, Prober};
pub use service::{
    NewService, Service, ServiceInput, ServiceStatus, ServiceUpdate, DEFAULT_THRESHOLD_MS,
};
pub use slack::SlackNotifier;

// Re-export types for convenience
pub use statusboard_types::{ServiceId, Status, StatusEvent};
