//! Opaque secret create/replace/delete
//!
//! [`create_secret`] is an upsert: an existing secret of the same name is
//! deleted before the new one is created. The two steps are not atomic, so
//! concurrent writers to one name end up last-write-wins, and the secret is
//! briefly absent in between.
//!
//! Every client failure is returned as [`Error::Retriable`]; callers decide
//! whether to retry.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use tracing::debug;

use crate::client::ClusterClient;
use crate::{Error, Result, SECRET_TYPE_OPAQUE};

/// Build an opaque secret from string values
pub fn opaque_secret(
    name: &str,
    data: &BTreeMap<String, String>,
    labels: &BTreeMap<String, String>,
) -> Secret {
    let data = data
        .iter()
        .map(|(k, v)| (k.clone(), ByteString(v.as_bytes().to_vec())))
        .collect();

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        data: Some(data),
        type_: Some(SECRET_TYPE_OPAQUE.to_string()),
        ..Default::default()
    }
}

/// Create or replace an opaque secret.
pub async fn create_secret(
    client: &dyn ClusterClient,
    namespace: &str,
    name: &str,
    data: &BTreeMap<String, String>,
    labels: &BTreeMap<String, String>,
) -> Result<()> {
    // A failed lookup most likely means the secret is absent
    let existing = match client.get_secret(namespace, name).await {
        Ok(secret) => secret.metadata.name.filter(|n| !n.is_empty()),
        Err(e) => {
            debug!(namespace = %namespace, secret = %name, error = %e, "secret lookup failed, assuming absent");
            None
        }
    };

    if existing.is_some() {
        debug!(namespace = %namespace, secret = %name, "replacing existing secret");
        delete_secret(client, namespace, name).await?;
    }

    client
        .create_secret(namespace, &opaque_secret(name, data, labels))
        .await
        .map_err(|e| {
            Error::retriable(e.context(format!("creating secret {}/{}", namespace, name)))
        })?;

    debug!(namespace = %namespace, secret = %name, keys = data.len(), "secret created");
    Ok(())
}

/// Delete a secret.
///
/// Deleting a secret that does not exist is an error like any other.
pub async fn delete_secret(client: &dyn ClusterClient, namespace: &str, name: &str) -> Result<()> {
    client
        .delete_secret(namespace, name)
        .await
        .map_err(|e| {
            Error::retriable(e.context(format!("deleting secret {}/{}", namespace, name)))
        })?;

    debug!(namespace = %namespace, secret = %name, "secret deleted");
    Ok(())
}
