//! `nodeport service` - open, print, or list node-port URLs

use std::io::Write;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};

use crate::client::ClusterClient;
use crate::config::ClusterSettings;
use crate::host::{HostResolver, KubeconfigHost, StaticHost};
use crate::service::{
    print_service_list, service_list_row, service_urls, BrowserLauncher, ExposeOptions, Exposer,
    SystemBrowser,
};
use crate::template::UrlTemplate;
use crate::Result;

use super::cluster_client;

/// Service commands
#[derive(Subcommand, Debug)]
pub enum ServiceCommands {
    /// Wait for a service, then open its URLs in a browser or print them
    Open(OpenArgs),
    /// List the node-port URLs of every service in a namespace
    List(ListArgs),
}

/// Arguments shared by service commands
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Namespace of the service(s)
    #[arg(short, long, default_value = crate::DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// URL template; variables: ip, port, name
    #[arg(long, default_value = crate::DEFAULT_URL_FORMAT)]
    pub format: String,

    /// Node address to use instead of the kubeconfig API server host
    #[arg(long)]
    pub host_ip: Option<String>,
}

/// Arguments for `service open`
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Service name
    pub name: String,

    /// Namespace, template and host
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print the URLs instead of opening them
    #[arg(long)]
    pub url: bool,

    /// Open (or print) https instead of http URLs
    #[arg(long)]
    pub https: bool,

    /// Total seconds to wait for the service to be ready
    #[arg(long, default_value_t = crate::DEFAULT_WAIT_SECS)]
    pub wait: u64,

    /// Initial seconds between readiness checks
    #[arg(long, default_value_t = crate::DEFAULT_INTERVAL_SECS)]
    pub interval: u64,
}

/// Arguments for `service list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Namespace, template and host
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub output: OutputFormat,
}

/// Output format
#[derive(Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Bordered table (default)
    #[default]
    Table,
    /// JSON
    Json,
}

/// Run a service command
pub async fn run(cmd: ServiceCommands, settings: &ClusterSettings) -> Result<()> {
    match cmd {
        ServiceCommands::Open(args) => open(args, settings).await,
        ServiceCommands::List(args) => list(args, settings).await,
    }
}

async fn host_ip(target: &TargetArgs, settings: &ClusterSettings) -> Result<String> {
    match &target.host_ip {
        Some(ip) => StaticHost(ip.clone()).host_ip(&settings.profile).await,
        None => {
            KubeconfigHost::new(settings.kubeconfig.clone())
                .host_ip(&settings.profile)
                .await
        }
    }
}

async fn open(args: OpenArgs, settings: &ClusterSettings) -> Result<()> {
    let template = UrlTemplate::new(args.target.format.as_str())?;
    let ip = host_ip(&args.target, settings).await?;
    let client = cluster_client(settings).await?;

    let options = ExposeOptions {
        url_mode: args.url,
        https: args.https,
        wait: Duration::from_secs(args.wait),
        interval: Duration::from_secs(args.interval),
    };

    expose_to_terminal(
        &client,
        &SystemBrowser,
        &template,
        options,
        &ip,
        &args.target.namespace,
        &args.name,
    )
    .await
}

/// Run the exposure flow, reporting to stdout and stderr.
///
/// The handles are unlocked: a std lock held across the readiness poll would
/// block log output from other runtime threads, including the client's own
/// connection tasks.
async fn expose_to_terminal(
    client: &dyn ClusterClient,
    browser: &dyn BrowserLauncher,
    template: &UrlTemplate,
    options: ExposeOptions,
    ip: &str,
    namespace: &str,
    name: &str,
) -> Result<()> {
    Exposer::new(client, browser, template, options)
        .wait_and_maybe_open(
            ip,
            namespace,
            name,
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )
        .await
}

async fn list(args: ListArgs, settings: &ClusterSettings) -> Result<()> {
    let template = UrlTemplate::new(args.target.format.as_str())?;
    let ip = host_ip(&args.target, settings).await?;
    let client = cluster_client(settings).await?;

    let exposures = service_urls(&client, &ip, &args.target.namespace, &template)
        .await
        .map_err(|e| {
            e.context(
                "check that the cluster is running and that you have specified the correct namespace",
            )
        })?;

    let mut out = std::io::stdout().lock();
    match args.output {
        OutputFormat::Table => {
            let rows: Vec<Vec<String>> = exposures.iter().map(service_list_row).collect();
            print_service_list(&mut out, &rows)?;
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&exposures)?)?;
        }
    }
    Ok(())
}
