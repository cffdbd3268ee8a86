//! Argus - HTTP Endpoint Availability Monitor
//!
//! This crate probes a configured set of HTTP endpoints on a fixed cadence,
//! classifies each probe as available or unavailable (2xx status and latency
//! under 500ms), and maintains cumulative per-domain availability percentages
//! for the lifetime of the process.
//!
//! # Architecture
//!
//! - **Config**: YAML configuration (cycle period, endpoint records)
//! - **Endpoint**: validated specs and port-stripped domain key derivation
//! - **Probe**: concurrent, timeout-bounded HTTP probes behind a transport seam
//! - **Aggregate**: cumulative per-domain availability counters
//! - **Scheduler**: fixed-period check-cycle loop with graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use argus::{CycleScheduler, DomainAggregator, HttpTransport, Prober};
//! use argus::config::AppConfig;
//! use argus::endpoint::build_specs;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("configs/config.yaml")?;
//! let endpoints = build_specs(&config.endpoints);
//!
//! let transport = Arc::new(HttpTransport::new(config.monitor.probe_timeout)?);
//! let prober = Prober::new(transport).with_timeout(config.monitor.probe_timeout);
//! let aggregator = Arc::new(DomainAggregator::new());
//!
//! let scheduler = CycleScheduler::new(endpoints, prober, aggregator)
//!     .with_period(config.monitor.period);
//! let (_tx, rx) = tokio::sync::watch::channel(false);
//! scheduler.run(rx).await;
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod endpoint;
pub mod probe;
pub mod scheduler;

pub use aggregate::{DomainAggregator, DomainStats};
pub use endpoint::EndpointSpec;
pub use probe::{HttpTransport, ProbeOutcome, Prober, Transport};
pub use scheduler::CycleScheduler;
