//! Cumulative per-domain availability aggregation.
//!
//! [`DomainAggregator`] owns the only cross-cycle mutable state in the
//! system: a map from domain key to [`DomainStats`]. Counters accumulate for
//! the process lifetime and are never reset or deleted; availability is the
//! cumulative ratio, not a per-cycle value.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::probe::ProbeOutcome;

/// Cumulative counters for one domain.
///
/// Created lazily on the first outcome for the domain. Both counters are
/// monotonically non-decreasing and `available_checks <= total_checks` holds
/// at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainStats {
    /// Probes folded in for this domain across all cycles.
    pub total_checks: u64,
    /// Of those, probes classified available.
    pub available_checks: u64,
}

impl DomainStats {
    /// Rounded availability percentage; `None` until the domain has been
    /// observed at least once.
    pub fn availability_percent(&self) -> Option<u8> {
        if self.total_checks == 0 {
            return None;
        }
        let pct = 100.0 * self.available_checks as f64 / self.total_checks as f64;
        Some(pct.round() as u8)
    }
}

/// Owner of the domain → stats mapping.
///
/// `fold` is the single mutation path, invoked once per cycle; `report` and
/// `snapshot` are concurrent read-only views. A single `RwLock` with
/// await-free critical sections makes each fold one atomic step from any
/// reader's perspective: no torn entry or partially-folded batch is ever
/// visible.
#[derive(Debug, Default)]
pub struct DomainAggregator {
    stats: RwLock<HashMap<String, DomainStats>>,
}

impl DomainAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle's outcomes into the cumulative counters and return the
    /// updated percentages.
    ///
    /// Each outcome bumps its domain's `total_checks` by one, and
    /// `available_checks` by one when classified available.
    pub fn fold(&self, outcomes: &[ProbeOutcome]) -> BTreeMap<String, u8> {
        let mut stats = self.stats.write().unwrap_or_else(|e| e.into_inner());

        for outcome in outcomes {
            let entry = stats.entry(outcome.domain.clone()).or_default();
            entry.total_checks += 1;
            if outcome.available {
                entry.available_checks += 1;
            }
        }

        Self::percentages(&stats)
    }

    /// Current percentages for every observed domain. Pure read; calling it
    /// repeatedly without an intervening fold returns identical results.
    pub fn report(&self) -> BTreeMap<String, u8> {
        let stats = self.stats.read().unwrap_or_else(|e| e.into_inner());
        Self::percentages(&stats)
    }

    /// Raw counters for every observed domain.
    pub fn snapshot(&self) -> BTreeMap<String, DomainStats> {
        let stats = self.stats.read().unwrap_or_else(|e| e.into_inner());
        stats.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    fn percentages(stats: &HashMap<String, DomainStats>) -> BTreeMap<String, u8> {
        stats
            .iter()
            .filter_map(|(domain, s)| s.availability_percent().map(|p| (domain.clone(), p)))
            .collect()
    }
}
