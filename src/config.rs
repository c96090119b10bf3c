//! Kubeconfig and profile resolution
//!
//! The kubeconfig resolution chain (highest priority first):
//! 1. Explicit `--kubeconfig` flag
//! 2. `NODEPORT_KUBECONFIG` environment variable
//! 3. Fall back to kube default (`KUBECONFIG` env / `~/.kube/config`)
//!
//! The profile names the kubeconfig context, cluster and user of the local
//! cluster; it defaults to [`crate::DEFAULT_PROFILE`].

use std::time::Duration;

/// Environment variable overriding the kubeconfig path
pub const NODEPORT_KUBECONFIG_ENV: &str = "NODEPORT_KUBECONFIG";

/// Settings shared by every command
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterSettings {
    /// Kubeconfig path, `None` for kube defaults
    pub kubeconfig: Option<String>,
    /// Profile selecting context, cluster and user
    pub profile: String,
    /// Connect and read timeout for API calls
    pub request_timeout: Duration,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            profile: crate::DEFAULT_PROFILE.to_string(),
            request_timeout: Duration::from_secs(crate::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClusterSettings {
    /// Profile as passed to the client; empty means the current context
    pub fn profile(&self) -> Option<&str> {
        Some(self.profile.as_str()).filter(|p| !p.is_empty())
    }
}

/// Resolve a kubeconfig path using the priority chain.
///
/// Returns `Some(path)` if one is configured, `None` to use kube defaults.
pub fn resolve_kubeconfig(explicit: Option<&str>) -> Option<String> {
    resolve_kubeconfig_with(explicit, std::env::var(NODEPORT_KUBECONFIG_ENV).ok())
}

fn resolve_kubeconfig_with(explicit: Option<&str>, env: Option<String>) -> Option<String> {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return Some(path.to_string());
    }
    env.filter(|p| !p.is_empty())
}
