//! Command-line interface

pub mod secret;
pub mod service;

use clap::{Args, Parser, Subcommand};

use crate::client::{connect, KubeClusterClient};
use crate::config::{resolve_kubeconfig, ClusterSettings};
use crate::Result;

/// nodeport - reach node-port services of a local cluster from the host
#[derive(Parser, Debug)]
#[command(name = "nodeport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Flags shared by all commands
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to kubeconfig file (default: $NODEPORT_KUBECONFIG, then kube defaults)
    #[arg(long, global = true)]
    pub kubeconfig: Option<String>,

    /// Cluster profile: kubeconfig context, cluster and user name (empty for current context)
    #[arg(short, long, env = "NODEPORT_PROFILE", default_value = crate::DEFAULT_PROFILE, global = true)]
    pub profile: String,

    /// Timeout for each API request, in seconds
    #[arg(long, default_value_t = crate::DEFAULT_REQUEST_TIMEOUT_SECS, global = true)]
    pub request_timeout: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Resolve the cluster settings these flags describe
    pub fn settings(&self) -> ClusterSettings {
        ClusterSettings {
            kubeconfig: resolve_kubeconfig(self.kubeconfig.as_deref()),
            profile: self.profile.clone(),
            request_timeout: std::time::Duration::from_secs(self.request_timeout),
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for services and print or open their node-port URLs
    #[command(subcommand)]
    Service(service::ServiceCommands),
    /// Manage opaque secrets
    #[command(subcommand)]
    Secret(secret::SecretCommands),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        let settings = self.global.settings();
        match self.command {
            Commands::Service(cmd) => service::run(cmd, &settings).await,
            Commands::Secret(cmd) => secret::run(cmd, &settings).await,
        }
    }
}

/// Build the cluster client for the resolved settings
pub async fn cluster_client(settings: &ClusterSettings) -> Result<KubeClusterClient> {
    connect(
        settings.kubeconfig.as_deref(),
        settings.profile(),
        settings.request_timeout,
    )
    .await
}
