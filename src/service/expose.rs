//! Waiting for a service and reporting or opening its URLs.
//!
//! The flow for one service:
//! 1. poll until the service exists with ports (see [`super::readiness`])
//! 2. resolve its node-port URLs
//! 3. in table mode, print the report row
//! 4. if there are no URLs, say so and stop; this is not an error
//! 5. for each URL, apply the HTTPS upgrade, then print it or open it in a
//!    browser. Browser failures are reported and skipped.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use crate::client::ClusterClient;
use crate::retry::BackoffConfig;
use crate::template::UrlTemplate;
use crate::Result;

use super::format::{optionally_https_formatted_url, print_service_list, service_list_row};
use super::readiness::wait_for_service;
use super::service_urls_for_service;

/// Opens URLs in the user's browser.
#[cfg_attr(test, automock)]
pub trait BrowserLauncher: Send + Sync {
    /// Open a URL
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// The system default browser
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        webbrowser::open(url)
    }
}

/// How to report a service once it is ready
#[derive(Clone, Debug)]
pub struct ExposeOptions {
    /// Print URLs only, never a table or a browser
    pub url_mode: bool,
    /// Upgrade `http` URLs to `https`
    pub https: bool,
    /// Total time to wait for the service
    pub wait: Duration,
    /// Initial interval between readiness checks
    pub interval: Duration,
}

impl Default for ExposeOptions {
    fn default() -> Self {
        Self {
            url_mode: false,
            https: false,
            wait: Duration::from_secs(crate::DEFAULT_WAIT_SECS),
            interval: Duration::from_secs(crate::DEFAULT_INTERVAL_SECS),
        }
    }
}

/// Waits for services and prints or opens their URLs.
pub struct Exposer<'a> {
    client: &'a dyn ClusterClient,
    browser: &'a dyn BrowserLauncher,
    template: &'a UrlTemplate,
    options: ExposeOptions,
}

impl<'a> Exposer<'a> {
    /// Create an exposer over the given client, browser and URL template
    pub fn new(
        client: &'a dyn ClusterClient,
        browser: &'a dyn BrowserLauncher,
        template: &'a UrlTemplate,
        options: ExposeOptions,
    ) -> Self {
        Self {
            client,
            browser,
            template,
            options,
        }
    }

    /// Wait for `service` and print or open its URLs.
    ///
    /// Reports go to `out`; browser failures go to `err` and do not fail
    /// the call.
    pub async fn wait_and_maybe_open(
        &self,
        host_ip: &str,
        namespace: &str,
        service: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<()> {
        let backoff = BackoffConfig::expo(self.options.interval, self.options.wait);
        wait_for_service(self.client, namespace, service, &backoff).await?;

        let exposure =
            service_urls_for_service(self.client, host_ip, namespace, service, self.template)
                .await
                .map_err(|e| {
                    e.context(
                        "check that the cluster is running and that you have specified the correct namespace",
                    )
                })?;

        if !self.options.url_mode {
            print_service_list(out, &[service_list_row(&exposure)])?;
        }

        if !exposure.has_node_port() {
            writeln!(out, "service {}/{} has no node port", namespace, service)?;
            return Ok(());
        }

        for bare_url in &exposure.urls {
            let (url, is_http_schemed) =
                optionally_https_formatted_url(bare_url, self.options.https);

            if self.options.url_mode || !is_http_schemed {
                writeln!(out, "{}", url)?;
                continue;
            }

            writeln!(
                out,
                "Opening kubernetes service {}/{} in default browser...",
                namespace, service
            )?;
            debug!(namespace = %namespace, service = %service, url = %url, "opening browser");
            if let Err(e) = self.browser.open(&url) {
                warn!(url = %url, error = %e, "browser failed to open url");
                writeln!(err, "browser failed to open url: {}", e)?;
            }
        }

        Ok(())
    }
}
