//! # chassis-daemon
//!
//! Enclosure credential store, token refresher, and authenticated proxy.
//!
//! The daemon holds per-enclosure session state for a fleet of
//! independently-authenticated hardware management endpoints, refreshes
//! each device's short-lived bearer token on a fixed timer, and forwards
//! caller-specified API calls with the current token attached. Callers
//! never see raw credentials; all session state is process-local memory,
//! rebuilt from configuration on restart.
//!
//! The front door that exposes [`ProxyService`] to callers lives outside
//! this crate; it consumes the library API re-exported here.

pub mod config;
pub mod error;
pub mod proxy;
pub mod scheduler;
pub mod sessions;

pub use config::{DaemonConfig, Settings};
pub use error::{DaemonError, Result};
pub use proxy::{ProxyError, ProxyService};
pub use scheduler::run_refresh_scheduler;
pub use sessions::{SessionStore, SessionView};
