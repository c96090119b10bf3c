//! HTTPS upgrade and the tabular service report

use std::io::Write;

use comfy_table::presets::ASCII_FULL;
use comfy_table::Table;

use super::ServiceExposure;

/// Column headers of the service report
pub const SERVICE_LIST_HEADERS: [&str; 4] = ["Namespace", "Name", "Target Port", "URL"];

/// URL cell for a service that has no node port
pub const NO_NODE_PORT: &str = "No node port";

/// Leading `scheme:` of a URL, lowercased.
///
/// Only the scheme is inspected: the rest of the URL may be malformed, e.g.
/// an unbracketed IPv6 host. Leading whitespace or a leading digit means
/// there is no scheme.
fn url_scheme(raw: &str) -> Option<String> {
    for (i, c) in raw.char_indices() {
        match c {
            c if c.is_ascii_alphabetic() => {}
            '0'..='9' | '+' | '-' | '.' if i > 0 => {}
            ':' if i > 0 => return Some(raw[..i].to_ascii_lowercase()),
            _ => return None,
        }
    }
    None
}

/// Optionally upgrade an `http` URL to `https`.
///
/// Returns the (possibly rewritten) URL and whether the input's scheme was
/// `http`, regardless of `https`. The rewrite replaces the first literal
/// `http` in the string, wherever it occurs.
pub fn optionally_https_formatted_url(bare_url: &str, https: bool) -> (String, bool) {
    let is_http_schemed = url_scheme(bare_url).as_deref() == Some("http");

    if is_http_schemed && https {
        (bare_url.replacen("http", "https", 1), true)
    } else {
        (bare_url.to_string(), is_http_schemed)
    }
}

/// One report row: namespace, name, newline-joined port names and URLs.
pub fn service_list_row(exposure: &ServiceExposure) -> Vec<String> {
    if exposure.has_node_port() {
        vec![
            exposure.namespace.clone(),
            exposure.name.clone(),
            exposure.port_names.join("\n"),
            exposure.urls.join("\n"),
        ]
    } else {
        vec![
            exposure.namespace.clone(),
            exposure.name.clone(),
            String::new(),
            NO_NODE_PORT.to_string(),
        ]
    }
}

/// Write rows as a bordered table with the service report headers.
pub fn print_service_list(writer: &mut dyn Write, rows: &[Vec<String>]) -> std::io::Result<()> {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(SERVICE_LIST_HEADERS);
    for row in rows {
        table.add_row(row);
    }
    writeln!(writer, "{}", table)
}
