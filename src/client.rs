//! Cluster client capability
//!
//! Every component takes a [`ClusterClient`] as an argument instead of
//! reaching for a process-wide client, so tests can substitute a mock.
//! [`KubeClusterClient`] is the kube-rs implementation used by the binary.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Endpoints, Secret, Service};
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::{Error, Result};

/// Namespaced access to the core objects nodeport reads and writes.
///
/// Each call is an independent round trip to the API server; implementations
/// hold no cache. A missing object is reported as [`Error::NotFound`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Get a Service by name
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service>;

    /// List Services, optionally filtered by a label selector (empty for all)
    async fn list_services(&self, namespace: &str, label_selector: &str) -> Result<Vec<Service>>;

    /// Get the Endpoints object backing a Service
    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints>;

    /// Get a Secret by name
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret>;

    /// Create a Secret
    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<()>;

    /// Delete a Secret by name
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()>;
}

/// Real Kubernetes client implementation
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Create a new KubeClusterClient wrapping the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn not_found_or(kind: &'static str, namespace: &str, name: &str, err: kube::Error) -> Error {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => Error::not_found(kind, namespace, name),
        e => e.into(),
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| not_found_or("service", namespace, name, e))
    }

    async fn list_services(&self, namespace: &str, label_selector: &str) -> Result<Vec<Service>> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let params = if label_selector.is_empty() {
            ListParams::default()
        } else {
            ListParams::default().labels(label_selector)
        };
        Ok(api.list(&params).await?.items)
    }

    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| not_found_or("endpoints", namespace, name, e))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| not_found_or("secret", namespace, name, e))
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<()> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.create(&PostParams::default(), secret).await?;
        Ok(())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default())
            .await
            .map_err(|e| not_found_or("secret", namespace, name, e))?;
        Ok(())
    }
}

/// Kubeconfig options selecting `profile` as context, cluster and user.
///
/// An empty or absent profile leaves the kubeconfig's current context in
/// effect.
pub fn profile_options(profile: Option<&str>) -> KubeConfigOptions {
    match profile.filter(|p| !p.is_empty()) {
        Some(p) => KubeConfigOptions {
            context: Some(p.to_string()),
            cluster: Some(p.to_string()),
            user: Some(p.to_string()),
            ..Default::default()
        },
        None => KubeConfigOptions::default(),
    }
}

/// Load a kube [`Config`] for the given kubeconfig path and profile.
pub async fn load_config(kubeconfig: Option<&str>, profile: Option<&str>) -> Result<Config> {
    let options = profile_options(profile);
    match kubeconfig {
        Some(path) => {
            let kc = Kubeconfig::read_from(path).map_err(|e| {
                Error::client(format!("failed to read kubeconfig {}: {}", path, e))
            })?;
            Config::from_custom_kubeconfig(kc, &options)
                .await
                .map_err(|e| Error::client(format!("failed to load kubeconfig {}: {}", path, e)))
        }
        None if profile.is_some_and(|p| !p.is_empty()) => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| Error::client(format!("failed to load kubeconfig: {}", e))),
        None => Config::infer()
            .await
            .map_err(|e| Error::client(format!("failed to infer config: {}", e))),
    }
}

/// Build a [`KubeClusterClient`] with `timeout` applied to connect and read.
///
/// Failures are retriable: the cluster may still be starting.
pub async fn connect(
    kubeconfig: Option<&str>,
    profile: Option<&str>,
    timeout: Duration,
) -> Result<KubeClusterClient> {
    let mut config = load_config(kubeconfig, profile)
        .await
        .map_err(Error::retriable)?;
    config.connect_timeout = Some(timeout);
    config.read_timeout = Some(timeout);
    debug!(cluster_url = %config.cluster_url, "connecting to cluster");

    let client = Client::try_from(config)
        .map_err(|e| Error::retriable(Error::client(format!("failed to create client: {}", e))))?;
    Ok(KubeClusterClient::new(client))
}
