//! Error types for nodeport
//!
//! Every failure is either retriable or fatal. The distinction is carried by
//! the [`Error::Retriable`] wrapper: the backoff loop in [`crate::retry`]
//! retries an error only when it is wrapped, and aborts on anything else.

use thiserror::Error;

/// Main error type for nodeport operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A named object does not exist in the cluster
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        /// Resource kind (service, endpoints, secret)
        kind: &'static str,
        /// Namespace that was searched
        namespace: String,
        /// Name of the missing object
        name: String,
    },

    /// Kube client could not be constructed from the kubeconfig
    #[error("client error: {0}")]
    Client(String),

    /// URL template failed to parse or render
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Missing or malformed input
    #[error("validation error: {0}")]
    Validation(String),

    /// The service exists but declares no ports
    #[error("{namespace}:{service} has no ports")]
    NoPorts {
        /// Namespace of the service
        namespace: String,
        /// Service name
        service: String,
    },

    /// Writing to the output sink failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transient failure: the operation may succeed if attempted again
    #[error("{0}")]
    Retriable(Box<Error>),

    /// An error annotated with the operation or target it happened in
    #[error("{context}: {source}")]
    Context {
        /// What was being done
        context: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a client construction error with the given message
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// Create a not-found error for a namespaced object
    pub fn not_found(
        kind: &'static str,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Mark an error as retriable
    pub fn retriable(err: Error) -> Self {
        Self::Retriable(Box::new(err))
    }

    /// Wrap this error with context
    ///
    /// The result is not retriable even if `self` was: once context is added
    /// the error is on its way to the user.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error is tagged retriable
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::Retriable(_))
    }

    /// Check if the root cause is a missing object
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Kube(kube::Error::Api(ae)) => ae.code == 404,
            Error::Retriable(inner) => inner.is_not_found(),
            Error::Context { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
