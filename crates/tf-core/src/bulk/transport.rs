//! Request transports for bulk actions.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;

/// Errors that prevent a response from being received at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Issues one action request per row.
///
/// `send` returns the HTTP status of any response received; non-2xx statuses
/// are not errors at this layer.
pub trait ActionTransport {
    fn send(&self, path: &str) -> Result<u16, TransportError>;
}

/// `POST <base_url><path>` with a JSON content type and no body.
pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, None)
    }

    /// Use `timeout` for the whole request; `None` keeps the agent defaults.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        HttpTransport {
            agent: builder.build(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl ActionTransport for HttpTransport {
    fn send(&self, path: &str) -> Result<u16, TransportError> {
        let url = self.url_for(path);
        match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .call()
        {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(status, _)) => Ok(status),
            Err(ureq::Error::Transport(err)) => Err(TransportError::Transport {
                url,
                message: err.to_string(),
            }),
        }
    }
}

/// Accepts every request without sending anything (dry runs).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransport;

impl ActionTransport for NoopTransport {
    fn send(&self, _path: &str) -> Result<u16, TransportError> {
        Ok(200)
    }
}

/// Canned statuses per path, recording every request (tests and demos).
#[derive(Debug)]
pub struct StaticTransport {
    default_status: u16,
    statuses: HashMap<String, u16>,
    unreachable: Vec<String>,
    sent: Mutex<Vec<String>>,
}

impl Default for StaticTransport {
    fn default() -> Self {
        Self {
            default_status: 200,
            statuses: HashMap::new(),
            unreachable: Vec::new(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, path: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(path.into(), status);
        self
    }

    /// Fail `path` as if the server could not be reached.
    pub fn with_unreachable(mut self, path: impl Into<String>) -> Self {
        self.unreachable.push(path.into());
        self
    }

    /// Paths requested so far, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ActionTransport for StaticTransport {
    fn send(&self, path: &str) -> Result<u16, TransportError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(path.to_string());
        }
        if self.unreachable.iter().any(|p| p == path) {
            return Err(TransportError::Transport {
                url: path.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self
            .statuses
            .get(path)
            .copied()
            .unwrap_or(self.default_status))
    }
}
