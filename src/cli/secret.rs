//! `nodeport secret` - create or delete opaque secrets

use std::collections::BTreeMap;

use clap::{Args, Subcommand};

use crate::config::ClusterSettings;
use crate::secret::{create_secret, delete_secret};
use crate::Result;

use super::cluster_client;

/// Secret commands
#[derive(Subcommand, Debug)]
pub enum SecretCommands {
    /// Create a secret, replacing any existing one of the same name
    Create(CreateArgs),
    /// Delete a secret
    Delete(DeleteArgs),
}

/// Arguments for `secret create`
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Secret name
    pub name: String,

    /// Namespace of the secret
    #[arg(short, long, default_value = crate::DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Data entry as KEY=VALUE (repeatable)
    #[arg(long = "from-literal", value_parser = parse_key_val)]
    pub data: Vec<(String, String)>,

    /// Label as KEY=VALUE (repeatable)
    #[arg(short, long = "label", value_parser = parse_key_val)]
    pub labels: Vec<(String, String)>,
}

/// Arguments for `secret delete`
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Secret name
    pub name: String,

    /// Namespace of the secret
    #[arg(short, long, default_value = crate::DEFAULT_NAMESPACE)]
    pub namespace: String,
}

/// Parse `KEY=VALUE`; the value may itself contain `=`
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Run a secret command
pub async fn run(cmd: SecretCommands, settings: &ClusterSettings) -> Result<()> {
    let client = cluster_client(settings).await?;
    match cmd {
        SecretCommands::Create(args) => {
            let data: BTreeMap<String, String> = args.data.into_iter().collect();
            let labels: BTreeMap<String, String> = args.labels.into_iter().collect();
            create_secret(&client, &args.namespace, &args.name, &data, &labels).await?;
            println!("secret {}/{} created", args.namespace, args.name);
        }
        SecretCommands::Delete(args) => {
            delete_secret(&client, &args.namespace, &args.name).await?;
            println!("secret {}/{} deleted", args.namespace, args.name);
        }
    }
    Ok(())
}
