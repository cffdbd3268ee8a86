//! Probe layer: one bounded HTTP request per endpoint per cycle.
//!
//! - [`Prober`]: issues a request and classifies it into a [`ProbeOutcome`]
//! - [`Transport`]: seam between the prober and the HTTP stack
//! - [`HttpTransport`]: real transport over `reqwest`

mod prober;
mod transport;

pub use prober::{AVAILABLE_LATENCY_MS, DEFAULT_PROBE_TIMEOUT, ProbeOutcome, Prober};
pub use transport::{ErrorKind, HttpTransport, Transport, TransportError, TransportResponse};
