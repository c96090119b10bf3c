//! Waiting for a service to exist with ports.
//!
//! A service that cannot be fetched yet is retried: it may still be being
//! created. A service that exists without ports is a fatal error, since
//! waiting will not give it any.

use tracing::debug;

use crate::client::ClusterClient;
use crate::retry::{retry_expo, BackoffConfig};
use crate::{Error, Result};

use super::declared_ports;

/// Check once that a service exists and declares at least one port.
pub async fn check_service(
    client: &dyn ClusterClient,
    namespace: &str,
    service: &str,
) -> Result<()> {
    let svc = client
        .get_service(namespace, service)
        .await
        .map_err(|e| Error::retriable(e.context(format!("error getting service {}", service))))?;

    if declared_ports(&svc).is_empty() {
        return Err(Error::NoPorts {
            namespace: namespace.to_string(),
            service: service.to_string(),
        });
    }

    debug!(service = ?svc, "found service");
    Ok(())
}

/// Poll [`check_service`] with exponential backoff until it passes.
///
/// On exhaustion the last error is returned with the service named in its
/// context.
pub async fn wait_for_service(
    client: &dyn ClusterClient,
    namespace: &str,
    service: &str,
    backoff: &BackoffConfig,
) -> Result<()> {
    retry_expo(backoff, "check_service", || {
        check_service(client, namespace, service)
    })
    .await
    .map_err(|e| {
        e.context(format!(
            "could not find finalized endpoint being pointed to by {}",
            service
        ))
    })
}
