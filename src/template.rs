//! URL format templates
//!
//! A template turns one node port into one URL. Three variables are
//! available:
//! - `ip` - the node's address
//! - `port` - the assigned node port
//! - `name` - the endpoint port name backing it (empty if unnamed)
//!
//! Undefined variables are an error, so a typo in `--format` fails loudly
//! instead of rendering an empty string.

use minijinja::{context, Environment, UndefinedBehavior};

use crate::{Error, Result};

/// A parsed URL template
#[derive(Clone, Debug)]
pub struct UrlTemplate {
    env: Environment<'static>,
    source: String,
}

impl Default for UrlTemplate {
    fn default() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self {
            env,
            source: crate::DEFAULT_URL_FORMAT.to_string(),
        }
    }
}

impl UrlTemplate {
    /// Parse a template, failing on empty input or invalid syntax
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        if source.trim().is_empty() {
            return Err(Error::validation(
                "attempted to generate service url with an empty --format template",
            ));
        }

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.template_from_str(&source)?;

        Ok(Self { env, source })
    }

    /// Render one URL
    pub fn render(&self, ip: &str, port: i32, name: &str) -> Result<String> {
        let rendered = self.env.render_str(
            &self.source,
            context! {
                ip => ip,
                port => port,
                name => name,
            },
        )?;
        Ok(rendered)
    }
}
