//! Service resolution and exposure against an in-memory cluster

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{endpoints, service, FakeCluster};
use nodeport::service::{
    list_services_by_label, service_urls, BrowserLauncher, ExposeOptions, Exposer,
};
use nodeport::template::UrlTemplate;

/// Records opened URLs; fails every open when `fail` is set.
#[derive(Default)]
struct RecordingBrowser {
    opened: Mutex<Vec<String>>,
    fail: bool,
}

impl BrowserLauncher for RecordingBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::other("no display"));
        }
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

fn minikube() -> FakeCluster {
    let cluster = FakeCluster::new();
    cluster.add_service(service(
        "default",
        "web",
        &[(80, 8080, Some(30080)), (443, 8443, Some(30443))],
        &[("app", "web")],
    ));
    cluster.add_endpoints("default", "web", endpoints(&[(8080, "http"), (8443, "https")]));
    cluster.add_service(service(
        "default",
        "cache",
        &[(6379, 6379, None)],
        &[("app", "cache")],
    ));
    cluster.add_service(service(
        "kube-system",
        "dashboard",
        &[(80, 9090, Some(31000))],
        &[("app", "web")],
    ));
    cluster
}

fn options(url_mode: bool, https: bool) -> ExposeOptions {
    ExposeOptions {
        url_mode,
        https,
        wait: Duration::from_secs(20),
        interval: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn namespace_listing_resolves_each_service() {
    let cluster = minikube();
    let template = UrlTemplate::default();

    let exposures = service_urls(&cluster, "192.168.49.2", "default", &template)
        .await
        .unwrap();

    assert_eq!(exposures.len(), 2);
    let cache = exposures.iter().find(|e| e.name == "cache").unwrap();
    assert!(!cache.has_node_port());
    let web = exposures.iter().find(|e| e.name == "web").unwrap();
    assert_eq!(
        web.urls,
        vec!["http://192.168.49.2:30080", "http://192.168.49.2:30443"]
    );
    assert_eq!(web.port_names, vec!["http", "https"]);
}

#[tokio::test]
async fn template_sees_port_name() {
    let cluster = minikube();
    let template = UrlTemplate::new("{{ name }}://{{ ip }}:{{ port }}").unwrap();

    let exposures = service_urls(&cluster, "10.0.0.1", "default", &template)
        .await
        .unwrap();

    let web = exposures.iter().find(|e| e.name == "web").unwrap();
    assert_eq!(web.urls, vec!["http://10.0.0.1:30080", "https://10.0.0.1:30443"]);
}

#[tokio::test]
async fn label_lookup_stays_in_namespace() {
    let cluster = minikube();

    let found = list_services_by_label(&cluster, "default", "app", "web")
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].metadata.name.as_deref(), Some("web"));
}

#[tokio::test]
async fn open_launches_browser_for_each_http_url() {
    let cluster = minikube();
    let browser = RecordingBrowser::default();
    let template = UrlTemplate::default();
    let mut out = Vec::new();
    let mut err = Vec::new();

    Exposer::new(&cluster, &browser, &template, options(false, false))
        .wait_and_maybe_open("192.168.49.2", "default", "web", &mut out, &mut err)
        .await
        .unwrap();

    assert_eq!(
        *browser.opened.lock().unwrap(),
        vec!["http://192.168.49.2:30080", "http://192.168.49.2:30443"]
    );
    let out = String::from_utf8(out).unwrap();
    assert_eq!(
        out.matches("Opening kubernetes service default/web in default browser...")
            .count(),
        2
    );
    assert!(err.is_empty());
}

#[tokio::test]
async fn browser_failures_are_reported_and_skipped() {
    let cluster = minikube();
    let browser = RecordingBrowser {
        fail: true,
        ..Default::default()
    };
    let template = UrlTemplate::default();
    let mut out = Vec::new();
    let mut err = Vec::new();

    Exposer::new(&cluster, &browser, &template, options(false, false))
        .wait_and_maybe_open("192.168.49.2", "default", "web", &mut out, &mut err)
        .await
        .unwrap();

    let err = String::from_utf8(err).unwrap();
    assert_eq!(err.matches("browser failed to open url: no display").count(), 2);
}

#[tokio::test]
async fn url_mode_with_https_prints_upgraded_urls() {
    let cluster = minikube();
    let browser = RecordingBrowser::default();
    let template = UrlTemplate::default();
    let mut out = Vec::new();
    let mut err = Vec::new();

    Exposer::new(&cluster, &browser, &template, options(true, true))
        .wait_and_maybe_open("192.168.49.2", "kube-system", "dashboard", &mut out, &mut err)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "https://192.168.49.2:31000\n");
    assert!(browser.opened.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn waits_for_a_service_that_appears_later() {
    let cluster = Arc::new(FakeCluster::new());
    let late = Arc::clone(&cluster);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        late.add_service(service("default", "late", &[(80, 80, Some(30001))], &[]));
    });

    let browser = RecordingBrowser::default();
    let template = UrlTemplate::default();
    let mut out = Vec::new();
    let mut err = Vec::new();

    Exposer::new(&*cluster, &browser, &template, options(true, false))
        .wait_and_maybe_open("10.0.0.1", "default", "late", &mut out, &mut err)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "http://10.0.0.1:30001\n");
}

#[tokio::test(start_paused = true)]
async fn missing_service_fails_after_wait() {
    let cluster = FakeCluster::new();
    let browser = RecordingBrowser::default();
    let template = UrlTemplate::default();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let start = tokio::time::Instant::now();

    let result = Exposer::new(&cluster, &browser, &template, options(false, false))
        .wait_and_maybe_open("10.0.0.1", "default", "ghost", &mut out, &mut err)
        .await;

    let error = result.unwrap_err();
    assert!(error
        .to_string()
        .contains("could not find finalized endpoint being pointed to by ghost"));
    assert!(start.elapsed() >= Duration::from_secs(20));
    assert!(out.is_empty());
}
