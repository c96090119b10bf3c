//! nodeport - reach services of a local single-node Kubernetes cluster from the host
//!
//! A service is reachable from the host when the cluster has assigned it a
//! node port. This crate waits for such a service to appear, renders one URL
//! per node port from a template, and prints the URLs or opens them in a
//! browser. It also manages opaque secrets with upsert semantics.
//!
//! # Modules
//!
//! - [`client`] - Cluster client capability (services, endpoints, secrets)
//! - [`host`] - Resolution of the node's externally reachable address
//! - [`template`] - URL format templates
//! - [`service`] - URL resolution, readiness polling, and exposure
//! - [`secret`] - Idempotent secret create/delete
//! - [`retry`] - Exponential backoff bounded by a wait budget
//! - [`config`] - Kubeconfig and profile resolution
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod retry;
pub mod secret;
pub mod service;
pub mod template;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "default";

/// Profile (kubeconfig context/cluster/user name) used when none is given
pub const DEFAULT_PROFILE: &str = "minikube";

/// Default URL template: one URL per node port on the node's address
pub const DEFAULT_URL_FORMAT: &str = "http://{{ ip }}:{{ port }}";

/// Default total wait budget for a service to become ready, in seconds
pub const DEFAULT_WAIT_SECS: u64 = 20;

/// Default initial interval between readiness checks, in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 6;

/// Default kube client connect/read timeout, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// Secret type for opaque key/value data
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";
