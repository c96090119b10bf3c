//! Resolution of the node's externally reachable address

use std::net::Ipv6Addr;

use async_trait::async_trait;
use tracing::debug;
use url::Host;

use crate::client::load_config;
use crate::{Error, Result};

/// Resolves the address the host machine uses to reach the cluster node.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Address of the node for the given profile
    async fn host_ip(&self, profile: &str) -> Result<String>;
}

/// A fixed address, e.g. from `--host-ip`
///
/// A bare IPv6 literal is bracketed so it can sit in front of `:port`.
#[derive(Clone, Debug)]
pub struct StaticHost(pub String);

#[async_trait]
impl HostResolver for StaticHost {
    async fn host_ip(&self, _profile: &str) -> Result<String> {
        Ok(url_host(&self.0))
    }
}

/// Bracket a bare IPv6 literal; anything else is returned unchanged.
pub fn url_host(ip: &str) -> String {
    match ip.parse::<Ipv6Addr>() {
        Ok(addr) => format!("[{}]", addr),
        Err(_) => ip.to_string(),
    }
}

/// Reads the node address from the API server URL of the profile's
/// kubeconfig cluster entry.
///
/// On a single-node cluster the API server runs on the node itself, so its
/// host is also where node ports are served.
#[derive(Clone, Debug, Default)]
pub struct KubeconfigHost {
    kubeconfig: Option<String>,
}

impl KubeconfigHost {
    /// Resolve from the given kubeconfig path, or the kube defaults if `None`
    pub fn new(kubeconfig: Option<String>) -> Self {
        Self { kubeconfig }
    }
}

#[async_trait]
impl HostResolver for KubeconfigHost {
    async fn host_ip(&self, profile: &str) -> Result<String> {
        let config = load_config(self.kubeconfig.as_deref(), Some(profile)).await?;
        let host = host_from_server_url(&config.cluster_url)?;
        debug!(profile = %profile, host = %host, "resolved node address");
        Ok(host)
    }
}

/// Extract the host component of an API server URL.
///
/// IPv6 hosts keep their brackets, so `http://{{ ip }}:{{ port }}` renders a
/// valid URL for them too.
pub fn host_from_server_url(url: &impl std::fmt::Display) -> Result<String> {
    let url = url.to_string();
    let parsed = url::Url::parse(&url)
        .map_err(|e| Error::validation(format!("invalid server url {}: {}", url, e)))?;
    match parsed.host() {
        Some(Host::Ipv6(addr)) => Ok(format!("[{}]", addr)),
        Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
        Some(Host::Domain(domain)) => Ok(domain.to_string()),
        None => Err(Error::validation(format!("server url {} has no host", url))),
    }
}
