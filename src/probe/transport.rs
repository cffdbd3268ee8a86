//! HTTP transport capability behind a trait seam.
//!
//! The scheduler and prober only see [`Transport`]: send one request, get
//! back status + latency or a categorized error. [`HttpTransport`] is the
//! real implementation over `reqwest`; tests substitute their own.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;
use tokio::time::timeout;

use crate::endpoint::EndpointSpec;

/// Category of a transport-level probe failure.
///
/// Response-level failures (bad status, slow-but-received responses) are not
/// transport failures and carry no error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// No response within the probe timeout.
    Timeout,
    /// Connection could not be established (refused, DNS, TLS).
    Connect,
    /// Response arrived but could not be read or decoded.
    Decode,
    /// Any other request failure.
    Request,
}

/// A failed transport exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The probe timeout elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// The request failed before or after the exchange.
    #[error("{kind} error: {message}")]
    Failed { kind: ErrorKind, message: String },
}

impl TransportError {
    /// Failure category for outcome classification and log records.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout => ErrorKind::Timeout,
            Self::Failed { kind, .. } => *kind,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Timeout;
        }
        let kind = if e.is_connect() {
            ErrorKind::Connect
        } else if e.is_decode() || e.is_body() {
            ErrorKind::Decode
        } else {
            ErrorKind::Request
        };
        Self::Failed {
            kind,
            message: e.to_string(),
        }
    }
}

/// Successful transport exchange: status line received within the timeout.
#[derive(Debug, Clone, Copy)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Wall-clock time from request start to response.
    pub latency: Duration,
}

/// One-shot request capability.
///
/// Implementations must be safe to call concurrently with independent
/// arguments; the prober issues the whole cycle batch in parallel.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one request described by `spec`, bounded by `probe_timeout`.
    async fn send(
        &self,
        spec: &EndpointSpec,
        probe_timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Real HTTP transport over a shared `reqwest` connection pool.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the transport.
    ///
    /// # Errors
    /// Returns the underlying `reqwest` error if the client cannot be built.
    pub fn new(probe_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(probe_timeout).build()?;
        Ok(Self { client })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        spec: &EndpointSpec,
        probe_timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.request(spec.method.clone(), spec.url.clone());

        for (key, value) in &spec.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(ref body) = spec.body {
            request = request.json(body);
        }

        // The client carries its own timeout, but wrap the send as well so a
        // misbehaving resolver cannot stretch the bound.
        let start = Instant::now();
        let result = timeout(probe_timeout, request.send()).await;
        let latency = start.elapsed();

        match result {
            Ok(Ok(response)) => Ok(TransportResponse {
                status: response.status().as_u16(),
                latency,
            }),
            Ok(Err(e)) => Err(TransportError::from(e)),
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display_lowercase() {
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
        assert_eq!(ErrorKind::Connect.as_ref(), "connect");
        assert_eq!(ErrorKind::Decode.to_string(), "decode");
        assert_eq!(ErrorKind::Request.as_ref(), "request");
    }

    #[test]
    fn test_transport_error_kind() {
        assert_eq!(TransportError::Timeout.kind(), ErrorKind::Timeout);
        let failed = TransportError::Failed {
            kind: ErrorKind::Connect,
            message: "connection refused".to_string(),
        };
        assert_eq!(failed.kind(), ErrorKind::Connect);
        assert!(failed.to_string().contains("connect"));
    }
}
