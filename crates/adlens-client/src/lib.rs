//! adlens-client
//!
//! Asynchronous acquisition of report payloads:
//! - `session`: the owner task driving fetch, pending-poll retry and
//!   override commits over a watch-observable state snapshot
//! - `fetch`: the `FetchBackend` trait and the reqwest-backed default
//! - `params`: seller/date invocation parameters
//! - `config`: session tunables (endpoint, poll interval, attempt cap)
//!
//! The crate owns all suspension points; classification and reduction stay
//! in `adlens-core` and run on immutable snapshots.

pub mod config;
pub mod fetch;
pub mod params;
pub mod session;

pub use crate::config::{validate_config, SessionConfig};
pub use crate::fetch::{FetchBackend, FetchOutcome, HttpBackend};
pub use crate::params::ReportParams;
pub use crate::session::{Phase, ReportState, Session};
