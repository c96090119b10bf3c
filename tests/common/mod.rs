//! In-memory cluster shared by the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    EndpointPort, EndpointSubset, Endpoints, Secret, Service, ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use nodeport::client::ClusterClient;
use nodeport::{Error, Result};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// A cluster that keeps objects in maps and counts secret writes.
#[derive(Default)]
pub struct FakeCluster {
    services: Mutex<BTreeMap<Key, Service>>,
    endpoints: Mutex<BTreeMap<Key, Endpoints>>,
    secrets: Mutex<BTreeMap<Key, Secret>>,
    pub secret_deletes: Mutex<usize>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_service(&self, svc: Service) {
        let ns = svc.metadata.namespace.clone().unwrap_or_default();
        let name = svc.metadata.name.clone().unwrap_or_default();
        self.services.lock().unwrap().insert(key(&ns, &name), svc);
    }

    pub fn add_endpoints(&self, namespace: &str, name: &str, ep: Endpoints) {
        self.endpoints
            .lock()
            .unwrap()
            .insert(key(namespace, name), ep);
    }

    pub fn secret(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn secret_count(&self) -> usize {
        self.secrets.lock().unwrap().len()
    }
}

fn label_matches(svc: &Service, selector: &str) -> bool {
    if selector.is_empty() {
        return true;
    }
    let Some((k, v)) = selector.split_once('=') else {
        return false;
    };
    svc.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(k))
        .is_some_and(|value| value == v)
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        self.services
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| Error::not_found("service", namespace, name))
    }

    async fn list_services(&self, namespace: &str, label_selector: &str) -> Result<Vec<Service>> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|((ns, _), svc)| ns == namespace && label_matches(svc, label_selector))
            .map(|(_, svc)| svc.clone())
            .collect())
    }

    async fn get_endpoints(&self, namespace: &str, name: &str) -> Result<Endpoints> {
        self.endpoints
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| Error::not_found("endpoints", namespace, name))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.secret(namespace, name)
            .ok_or_else(|| Error::not_found("secret", namespace, name))
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<()> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        let mut secrets = self.secrets.lock().unwrap();
        if secrets.contains_key(&key(namespace, &name)) {
            return Err(Error::client(format!(
                "secrets \"{}\" already exists",
                name
            )));
        }
        secrets.insert(key(namespace, &name), secret.clone());
        Ok(())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        self.secrets
            .lock()
            .unwrap()
            .remove(&key(namespace, name))
            .ok_or_else(|| Error::not_found("secret", namespace, name))?;
        *self.secret_deletes.lock().unwrap() += 1;
        Ok(())
    }
}

/// A service with (port, target port, node port) entries and optional labels
pub fn service(
    namespace: &str,
    name: &str,
    ports: &[(i32, i32, Option<i32>)],
    labels: &[(&str, &str)],
) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(
                labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            ports: Some(
                ports
                    .iter()
                    .map(|(port, target, node_port)| ServicePort {
                        port: *port,
                        target_port: Some(IntOrString::Int(*target)),
                        node_port: *node_port,
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// A single-subset Endpoints object with (port, name) entries
pub fn endpoints(ports: &[(i32, &str)]) -> Endpoints {
    Endpoints {
        subsets: Some(vec![EndpointSubset {
            ports: Some(
                ports
                    .iter()
                    .map(|(port, name)| EndpointPort {
                        port: *port,
                        name: Some(name.to_string()),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }]),
        ..Default::default()
    }
}
