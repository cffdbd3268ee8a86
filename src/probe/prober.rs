//! Single-endpoint probe and outcome classification.

use std::sync::Arc;
use std::time::Duration;

use crate::endpoint::EndpointSpec;
use crate::probe::transport::{ErrorKind, Transport};

/// Default probe timeout (500 ms), measured from request start.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Latency bound for availability: a response at or above this is too slow.
pub const AVAILABLE_LATENCY_MS: u64 = 500;

/// Classified result of one probe against one endpoint in one cycle.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// Endpoint name, for warning records.
    pub endpoint: String,
    /// Aggregation key the outcome folds into.
    pub domain: String,
    /// Whether the endpoint counts as available this cycle.
    pub available: bool,
    /// HTTP status, absent on transport failure.
    pub status_code: Option<u16>,
    /// Measured latency, absent on transport failure or timeout.
    pub latency_ms: Option<u64>,
    /// Failure category, present only on transport failure or timeout.
    pub error_kind: Option<ErrorKind>,
}

impl ProbeOutcome {
    /// Availability rule: status in [200, 299] and latency under 500 ms,
    /// both present. Anything else is unavailable.
    fn classify(status_code: Option<u16>, latency_ms: Option<u64>) -> bool {
        matches!(
            (status_code, latency_ms),
            (Some(status), Some(latency))
                if (200..=299).contains(&status) && latency < AVAILABLE_LATENCY_MS
        )
    }
}

/// Issues one bounded HTTP request per call and classifies the result.
///
/// Holds no state beyond the shared transport; safe to clone into any number
/// of concurrent probe tasks. Logging the outcome is the caller's job.
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn Transport>,
    probe_timeout: Duration,
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

impl Prober {
    /// Create a prober over the given transport with the default timeout.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Set the probe timeout.
    pub fn with_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Probe one endpoint. Never fails: every transport error becomes an
    /// unavailable outcome, so one bad endpoint cannot abort a batch.
    pub async fn probe(&self, spec: &EndpointSpec) -> ProbeOutcome {
        match self.transport.send(spec, self.probe_timeout).await {
            Ok(response) => {
                let status_code = Some(response.status);
                let latency_ms = Some(response.latency.as_millis().min(u64::MAX as u128) as u64);
                ProbeOutcome {
                    endpoint: spec.name.clone(),
                    domain: spec.domain.clone(),
                    available: ProbeOutcome::classify(status_code, latency_ms),
                    status_code,
                    latency_ms,
                    error_kind: None,
                }
            }
            Err(e) => ProbeOutcome {
                endpoint: spec.name.clone(),
                domain: spec.domain.clone(),
                available: false,
                status_code: None,
                latency_ms: None,
                error_kind: Some(e.kind()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointConfig;
    use crate::probe::transport::{TransportError, TransportResponse};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    /// Transport stub returning a canned result.
    struct StubTransport {
        result: Result<TransportResponse, ErrorKind>,
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(
            &self,
            _spec: &EndpointSpec,
            _probe_timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            match &self.result {
                Ok(response) => Ok(*response),
                Err(ErrorKind::Timeout) => Err(TransportError::Timeout),
                Err(kind) => Err(TransportError::Failed {
                    kind: *kind,
                    message: "stub failure".to_string(),
                }),
            }
        }
    }

    fn spec() -> EndpointSpec {
        let config = EndpointConfig {
            name: Some("stub".to_string()),
            url: Some("https://svc.test/health".to_string()),
            method: None,
            headers: BTreeMap::new(),
            body: None,
        };
        EndpointSpec::from_config(&config).unwrap()
    }

    fn prober(result: Result<TransportResponse, ErrorKind>) -> Prober {
        Prober::new(Arc::new(StubTransport { result }))
    }

    #[test]
    fn test_classify_requires_2xx_and_fast_latency() {
        assert!(ProbeOutcome::classify(Some(200), Some(0)));
        assert!(ProbeOutcome::classify(Some(204), Some(120)));
        assert!(ProbeOutcome::classify(Some(299), Some(499)));

        // Latency bound is strict.
        assert!(!ProbeOutcome::classify(Some(200), Some(500)));
        assert!(!ProbeOutcome::classify(Some(200), Some(600)));

        // Status outside 2xx.
        assert!(!ProbeOutcome::classify(Some(199), Some(10)));
        assert!(!ProbeOutcome::classify(Some(300), Some(10)));
        assert!(!ProbeOutcome::classify(Some(503), Some(10)));

        // Both fields must be present.
        assert!(!ProbeOutcome::classify(None, Some(10)));
        assert!(!ProbeOutcome::classify(Some(200), None));
        assert!(!ProbeOutcome::classify(None, None));
    }

    #[tokio::test]
    async fn test_probe_success_is_available() {
        let outcome = prober(Ok(TransportResponse {
            status: 200,
            latency: Duration::from_millis(120),
        }))
        .probe(&spec())
        .await;

        assert!(outcome.available);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.latency_ms, Some(120));
        assert_eq!(outcome.error_kind, None);
        assert_eq!(outcome.domain, "svc.test");
        assert_eq!(outcome.endpoint, "stub");
    }

    #[tokio::test]
    async fn test_probe_slow_response_is_unavailable_but_diagnosed() {
        let outcome = prober(Ok(TransportResponse {
            status: 200,
            latency: Duration::from_millis(600),
        }))
        .probe(&spec())
        .await;

        assert!(!outcome.available);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.latency_ms, Some(600));
        assert_eq!(outcome.error_kind, None);
    }

    #[tokio::test]
    async fn test_probe_bad_status_is_unavailable() {
        let outcome = prober(Ok(TransportResponse {
            status: 503,
            latency: Duration::from_millis(80),
        }))
        .probe(&spec())
        .await;

        assert!(!outcome.available);
        assert_eq!(outcome.status_code, Some(503));
    }

    #[tokio::test]
    async fn test_probe_timeout_has_no_status_or_latency() {
        let outcome = prober(Err(ErrorKind::Timeout)).probe(&spec()).await;

        assert!(!outcome.available);
        assert_eq!(outcome.status_code, None);
        assert_eq!(outcome.latency_ms, None);
        assert_eq!(outcome.error_kind, Some(ErrorKind::Timeout));
    }

    #[tokio::test]
    async fn test_probe_connect_failure_is_categorized() {
        let outcome = prober(Err(ErrorKind::Connect)).probe(&spec()).await;

        assert!(!outcome.available);
        assert_eq!(outcome.error_kind, Some(ErrorKind::Connect));
    }
}
