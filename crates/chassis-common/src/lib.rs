//! # chassis-common
//!
//! Shared types for enclosure session and proxy management.
//!
//! This crate provides the foundational types used across the chassisd
//! workspace:
//! - Enclosure descriptors with secrecy-wrapped credentials
//! - Proxy call descriptors (method, path, optional body)
//! - Read-only session status snapshots for diagnostics
//!
//! ## Example
//!
//! ```
//! use chassis_common::{EnclosureDescriptor, ProxyRequest};
//!
//! let enclosure = EnclosureDescriptor::new(
//!     "rack1-top",
//!     "Rack 1 upper chassis",
//!     "10.0.0.1",
//!     "admin",
//!     "hunter2",
//! );
//! assert_eq!(enclosure.base_url(), "https://10.0.0.1");
//!
//! let request = ProxyRequest::new("GET", "api/status");
//! assert!(request.validate().is_ok());
//! ```

/// Enclosure descriptors and session status snapshots.
pub mod enclosure;
/// Proxy call descriptors and their validation.
pub mod proxy;

pub use enclosure::{EnclosureDescriptor, SessionStatus};
pub use proxy::{ProxyRequest, ProxyRequestError};
