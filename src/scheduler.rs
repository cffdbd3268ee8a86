//! Fixed-cadence check-cycle scheduler.
//!
//! One long-lived driver sequences cycles strictly one after another. Within
//! a cycle every endpoint is probed concurrently in its own Tokio task; the
//! join point is the only serialization. After folding the batch the
//! scheduler sleeps for whatever remains of the period, self-correcting for
//! the time probing and folding took. A cycle that overruns the period skips
//! the sleep and logs a warning; it is resource pressure, not an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};

use crate::aggregate::DomainAggregator;
use crate::endpoint::EndpointSpec;
use crate::probe::{ProbeOutcome, Prober};

/// Default check-cycle period (15 seconds).
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(15);

/// Drives the `Ticking -> Awaiting -> Sleeping` loop until shutdown.
///
/// The period is fixed at construction. Shutdown is cooperative: the signal
/// is honored at every cycle boundary, cuts the inter-cycle sleep short, and
/// abandons an in-flight batch without folding it, so a late outcome can
/// never corrupt aggregator state.
pub struct CycleScheduler {
    endpoints: Vec<EndpointSpec>,
    prober: Prober,
    aggregator: Arc<DomainAggregator>,
    period: Duration,
}

impl std::fmt::Debug for CycleScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleScheduler")
            .field("endpoints", &self.endpoints.len())
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

impl CycleScheduler {
    /// Create a scheduler over the given endpoints with the default period.
    pub fn new(
        endpoints: Vec<EndpointSpec>,
        prober: Prober,
        aggregator: Arc<DomainAggregator>,
    ) -> Self {
        Self {
            endpoints,
            prober,
            aggregator,
            period: DEFAULT_PERIOD,
        }
    }

    /// Set the cycle period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run check cycles until `shutdown` flips to `true` (or its sender is
    /// dropped). Never returns early for any per-endpoint or per-cycle
    /// failure.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            endpoints = self.endpoints.len(),
            period_ms = self.period.as_millis() as u64,
            "Scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let cycle_start = Instant::now();
            let cycle_ts = Utc::now();
            tracing::debug!(endpoints = self.endpoints.len(), "Starting check cycle");

            // Fan out: one task per endpoint, all concurrent, each bounded by
            // the prober's own timeout. A failing endpoint only produces an
            // unavailable outcome; it cannot abort the batch.
            let mut handles = Vec::with_capacity(self.endpoints.len());
            for spec in &self.endpoints {
                let prober = self.prober.clone();
                let spec = spec.clone();
                handles.push(tokio::spawn(async move { prober.probe(&spec).await }));
            }

            let results = tokio::select! {
                // Prefer draining a batch that is already complete over a
                // simultaneous shutdown, so folded work is deterministic.
                biased;
                results = future::join_all(handles) => results,
                _ = signalled(&mut shutdown) => {
                    tracing::info!("Shutdown requested, abandoning in-flight probes");
                    break;
                }
            };

            let mut outcomes = Vec::with_capacity(results.len());
            for result in results {
                match result {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => {
                        tracing::error!(error = %e, "Probe task failed to complete");
                    }
                }
            }

            self.log_failures(&outcomes);

            let report = self.aggregator.fold(&outcomes);
            let domains: HashSet<&str> = outcomes.iter().map(|o| o.domain.as_str()).collect();
            tracing::info!(
                endpoints = outcomes.len(),
                domains = domains.len(),
                "Check cycle complete"
            );

            for (domain, percentage) in &report {
                tracing::info!(
                    domain = %domain,
                    availability_percentage = percentage,
                    cycle_timestamp = %cycle_ts.to_rfc3339(),
                    "Cumulative availability"
                );
            }

            // Cadence correction: sleep only for what remains of the period.
            let elapsed = cycle_start.elapsed();
            match remaining_sleep(self.period, elapsed) {
                Some(remaining) => {
                    tokio::select! {
                        _ = sleep(remaining) => {}
                        _ = signalled(&mut shutdown) => {
                            tracing::info!("Shutdown requested during sleep");
                            break;
                        }
                    }
                }
                None => {
                    tracing::warn!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        period_ms = self.period.as_millis() as u64,
                        "Cycle overran fixed period, starting next cycle immediately"
                    );
                }
            }
        }

        tracing::info!("Scheduler stopped");
    }

    /// One warning record per failed probe; success logging stays at debug.
    fn log_failures(&self, outcomes: &[ProbeOutcome]) {
        for outcome in outcomes {
            if let Some(kind) = outcome.error_kind {
                tracing::warn!(
                    endpoint_name = %outcome.endpoint,
                    domain = %outcome.domain,
                    error_kind = %kind,
                    "Probe failed"
                );
            } else if !outcome.available {
                tracing::warn!(
                    endpoint_name = %outcome.endpoint,
                    domain = %outcome.domain,
                    status_code = outcome.status_code,
                    latency_ms = outcome.latency_ms,
                    "Endpoint unavailable"
                );
            } else {
                tracing::debug!(
                    endpoint_name = %outcome.endpoint,
                    domain = %outcome.domain,
                    status_code = outcome.status_code,
                    latency_ms = outcome.latency_ms,
                    "Endpoint available"
                );
            }
        }
    }
}

/// Time left to sleep after a cycle; `None` when the cycle overran the
/// period and the next one should start immediately.
fn remaining_sleep(period: Duration, elapsed: Duration) -> Option<Duration> {
    match period.checked_sub(elapsed) {
        Some(remaining) if !remaining.is_zero() => Some(remaining),
        _ => None,
    }
}

/// Resolves once a shutdown is requested. A dropped sender counts as a stop
/// request too.
async fn signalled(shutdown: &mut watch::Receiver<bool>) {
    while shutdown.changed().await.is_ok() {
        if *shutdown.borrow() {
            return;
        }
    }
}
