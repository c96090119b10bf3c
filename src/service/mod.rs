//! Service URL resolution
//!
//! Maps a service's declared ports to URLs reachable from the host. Only
//! ports with an assigned node port qualify; each is rendered through a
//! [`UrlTemplate`] together with the name of the endpoint port backing it.
//!
//! - [`readiness`] - waiting for a service to exist with ports
//! - [`expose`] - the wait/resolve/print-or-open flow
//! - [`format`] - HTTPS upgrade and the tabular report

pub mod expose;
pub mod format;
pub mod readiness;

use std::collections::HashMap;

use k8s_openapi::api::core::v1::{Endpoints, Service, ServicePort};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;
use tracing::debug;

use crate::client::ClusterClient;
use crate::template::UrlTemplate;
use crate::{Error, Result};

pub use expose::{BrowserLauncher, ExposeOptions, Exposer, SystemBrowser};
pub use format::{optionally_https_formatted_url, print_service_list, service_list_row};
pub use readiness::{check_service, wait_for_service};

/// The URLs under which a service is reachable from the host.
///
/// `urls[i]` is served by the endpoint port named `port_names[i]`; both
/// follow the order in which the service declares its ports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceExposure {
    /// Namespace of the service
    pub namespace: String,
    /// Service name
    pub name: String,
    /// One rendered URL per node port
    pub urls: Vec<String>,
    /// Endpoint port name for each URL (empty if unnamed)
    pub port_names: Vec<String>,
}

impl ServiceExposure {
    /// Whether any port of the service has a node port
    pub fn has_node_port(&self) -> bool {
        !self.urls.is_empty()
    }
}

/// Target port number to endpoint port name, across all endpoint subsets.
///
/// When a port appears in several subsets the last one scanned wins.
pub fn endpoint_port_index(endpoints: Option<&Endpoints>) -> HashMap<i32, String> {
    endpoints
        .and_then(|ep| ep.subsets.as_ref())
        .into_iter()
        .flatten()
        .flat_map(|subset| subset.ports.iter().flatten())
        .map(|p| (p.port, p.name.clone().unwrap_or_default()))
        .collect()
}

/// Numeric target port; named target ports resolve to 0
fn target_port_number(port: &ServicePort) -> i32 {
    match &port.target_port {
        Some(IntOrString::Int(n)) => *n,
        _ => 0,
    }
}

/// Ports declared by a service, in declaration order
pub(crate) fn declared_ports(svc: &Service) -> &[ServicePort] {
    svc.spec
        .as_ref()
        .and_then(|s| s.ports.as_deref())
        .unwrap_or_default()
}

/// Resolve the host-reachable URLs of one service.
///
/// A missing service is a fatal error here; a missing Endpoints object is
/// not, and only leaves port names empty. Any render failure discards the
/// whole result.
pub async fn service_urls_for_service(
    client: &dyn ClusterClient,
    ip: &str,
    namespace: &str,
    service: &str,
    template: &UrlTemplate,
) -> Result<ServiceExposure> {
    let svc = client
        .get_service(namespace, service)
        .await
        .map_err(|e| e.context(format!("service '{}' could not be found running", service)))?;

    let endpoints = match client.get_endpoints(namespace, service).await {
        Ok(ep) => Some(ep),
        Err(e) => {
            debug!(namespace = %namespace, service = %service, error = %e, "no endpoints, port names unavailable");
            None
        }
    };
    let port_index = endpoint_port_index(endpoints.as_ref());

    let mut urls = Vec::new();
    let mut port_names = Vec::new();
    for port in declared_ports(&svc) {
        let node_port = port.node_port.unwrap_or_default();
        if node_port <= 0 {
            continue;
        }
        let name = port_index
            .get(&target_port_number(port))
            .cloned()
            .unwrap_or_default();
        urls.push(template.render(ip, node_port, &name)?);
        port_names.push(name);
    }

    Ok(ServiceExposure {
        namespace: svc
            .metadata
            .namespace
            .unwrap_or_else(|| namespace.to_string()),
        name: svc.metadata.name.unwrap_or_else(|| service.to_string()),
        urls,
        port_names,
    })
}

/// Resolve every service in a namespace, in list order.
///
/// The first service that fails to resolve aborts the listing.
pub async fn service_urls(
    client: &dyn ClusterClient,
    ip: &str,
    namespace: &str,
    template: &UrlTemplate,
) -> Result<Vec<ServiceExposure>> {
    let services = client
        .list_services(namespace, "")
        .await
        .map_err(|e| e.context(format!("listing services in {}", namespace)))?;

    let mut exposures = Vec::with_capacity(services.len());
    for svc in &services {
        let Some(name) = svc.metadata.name.as_deref() else {
            continue;
        };
        let ns = svc.metadata.namespace.as_deref().unwrap_or(namespace);
        exposures.push(service_urls_for_service(client, ip, ns, name, template).await?);
    }
    Ok(exposures)
}

/// List services whose label `key` equals `value`.
///
/// Client failures are retriable.
pub async fn list_services_by_label(
    client: &dyn ClusterClient,
    namespace: &str,
    key: &str,
    value: &str,
) -> Result<Vec<Service>> {
    let selector = format!("{}={}", key, value);
    client
        .list_services(namespace, &selector)
        .await
        .map_err(|e| Error::retriable(e.context(format!("listing services with {}", selector))))
}
